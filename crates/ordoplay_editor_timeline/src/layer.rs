// SPDX-License-Identifier: MIT OR Apache-2.0
//! Clips layer: one widget per clip, laid out over the track rows.

use crate::item::{same_time, ItemId};
use crate::rows::TRACK_HEIGHT;
use crate::state::WindowState;
use crate::track::TrackId;
use egui::{Color32, Pos2, Rect, Stroke};
use std::collections::HashMap;

/// Connectors are only drawn on clips wider than this (pixels)
const MIN_CONNECTOR_WIDTH: f32 = 14.0;

/// Vertical inset of a clip inside its row
const CLIP_INSET: f32 = 3.0;

/// Drawable state of one clip
#[derive(Debug, Clone, PartialEq)]
pub struct ClipWidget {
    /// Clip shown
    pub clip: ItemId,
    /// Track owning the clip
    pub track: TrackId,
    /// Clip name
    pub name: String,
    /// Start time
    pub start: f64,
    /// End time
    pub end: f64,
    /// Screen rectangle
    pub rect: Rect,
    /// Previous clip on the same track
    pub previous: Option<ItemId>,
    /// Next clip on the same track
    pub next: Option<ItemId>,
    /// Clip content needs re-validation
    pub invalid: bool,
    /// Clip starts where its predecessor ends
    pub connector: bool,
    /// Clip is selected
    pub selected: bool,
}

/// Widgets for every clip on the visible tracks
#[derive(Debug, Default)]
pub struct ClipsLayer {
    widgets: Vec<ClipWidget>,
    by_clip: HashMap<ItemId, usize>,
}

impl ClipsLayer {
    /// Create an empty layer
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the widgets from the rows and time area of `state`.
    ///
    /// Widgets of clips that were already shown keep their `invalid` flag.
    pub fn rebuild(&mut self, state: &WindowState) {
        let previous_flags: HashMap<ItemId, bool> = self.widgets.iter().map(|w| (w.clip, w.invalid)).collect();
        self.widgets.clear();
        self.by_clip.clear();

        for row in state.rows.rows() {
            let Some(track) = state.project.track(row.track) else {
                continue;
            };
            let mut clips: Vec<_> = track.clips.iter().collect();
            clips.sort_by(|a, b| a.start.total_cmp(&b.start));

            for (index, clip) in clips.iter().enumerate() {
                let previous = index.checked_sub(1).and_then(|i| clips.get(i));
                let next = clips.get(index + 1);

                let left = state.time_area.time_to_pixel(clip.start);
                let right = state.time_area.time_to_pixel(clip.end());
                let rect = Rect::from_x_y_ranges(
                    left..=right,
                    row.rect.top() + CLIP_INSET..=row.rect.top() + TRACK_HEIGHT - CLIP_INSET,
                );
                let connector = previous.is_some_and(|p| same_time(p.end(), clip.start))
                    && rect.width() > MIN_CONNECTOR_WIDTH;

                self.by_clip.insert(clip.id, self.widgets.len());
                self.widgets.push(ClipWidget {
                    clip: clip.id,
                    track: row.track,
                    name: clip.name.clone(),
                    start: clip.start,
                    end: clip.end(),
                    rect,
                    previous: previous.map(|p| p.id),
                    next: next.map(|n| n.id),
                    invalid: previous_flags.get(&clip.id).copied().unwrap_or(false),
                    connector,
                    selected: state.selection.contains_item(clip.id),
                });
            }
        }
    }

    /// Widgets in row order
    pub fn widgets(&self) -> &[ClipWidget] {
        &self.widgets
    }

    /// Widget of a clip
    pub fn widget(&self, clip: ItemId) -> Option<&ClipWidget> {
        self.by_clip.get(&clip).map(|&i| &self.widgets[i])
    }

    /// Flag a clip for re-validation
    pub fn set_invalid(&mut self, clip: ItemId, invalid: bool) {
        if let Some(&index) = self.by_clip.get(&clip) {
            self.widgets[index].invalid = invalid;
        }
    }

    /// Topmost clip under a point
    pub fn clip_at(&self, pos: Pos2) -> Option<ItemId> {
        self.widgets.iter().rev().find(|w| w.rect.contains(pos)).map(|w| w.clip)
    }

    /// Paint the clips clipped to the clips area
    pub fn draw(&self, painter: &egui::Painter, state: &WindowState) {
        let painter = painter.with_clip_rect(state.time_area.rect());

        for widget in &self.widgets {
            let Some(track) = state.project.track(widget.track) else {
                continue;
            };
            let color = track.effective_color();
            let mut fill = Color32::from_rgb(color[0], color[1], color[2]);
            if track.muted {
                fill = fill.gamma_multiply(0.4);
            }
            let stroke = if widget.selected {
                Stroke::new(2.0, Color32::WHITE)
            } else {
                Stroke::new(1.0, Color32::from_gray(80))
            };

            painter.rect_filled(widget.rect, 3.0, fill.gamma_multiply(0.7));
            painter.rect_stroke(widget.rect, 3.0, stroke);
            if widget.invalid {
                painter.rect_stroke(widget.rect.shrink(2.0), 2.0, Stroke::new(1.0, Color32::from_rgb(255, 150, 100)));
            }

            if widget.rect.width() > 24.0 {
                painter.text(
                    Pos2::new(widget.rect.left() + 6.0, widget.rect.center().y),
                    egui::Align2::LEFT_CENTER,
                    &widget.name,
                    egui::FontId::proportional(11.0),
                    Color32::from_gray(230),
                );
            }

            if widget.connector {
                let x = widget.rect.left();
                painter.line_segment(
                    [Pos2::new(x, widget.rect.top() + 2.0), Pos2::new(x, widget.rect.bottom() - 2.0)],
                    Stroke::new(2.0, Color32::from_gray(200)),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{Clip, ClipKind};
    use crate::timeline::{Project, TimelineAsset};
    use crate::track::{Track, TrackKind};

    fn state(clips: &[(f64, f64)]) -> (WindowState, TrackId, Vec<ItemId>) {
        let mut timeline = TimelineAsset::new("T");
        let mut track = Track::new("Anim", TrackKind::Animation);
        let ids = clips
            .iter()
            .map(|(start, duration)| track.add_clip(Clip::new("c", ClipKind::Animation, *start, *duration)))
            .collect();
        let track = timeline.add_track(track);
        let id = timeline.id;
        let mut project = Project::new();
        project.add_timeline(timeline);
        (WindowState::new(project, id), track, ids)
    }

    #[test]
    fn test_links_and_rects() {
        let (state, track, ids) = state(&[(0.0, 1.0), (2.0, 1.0)]);
        let mut layer = ClipsLayer::new();
        layer.rebuild(&state);

        let first = layer.widget(ids[0]).unwrap();
        assert_eq!(first.next, Some(ids[1]));
        assert_eq!(first.previous, None);
        assert_eq!(first.rect.left(), state.time_area.time_to_pixel(0.0));
        assert_eq!(first.rect.right(), state.time_area.time_to_pixel(1.0));
        assert_eq!(first.track, track);
        assert_eq!(layer.widget(ids[1]).unwrap().previous, Some(ids[0]));
    }

    #[test]
    fn test_connector_for_adjacent_clips() {
        let (mut state, _, ids) = state(&[(0.0, 1.0), (1.0, 1.0), (3.0, 0.01)]);
        let mut layer = ClipsLayer::new();
        layer.rebuild(&state);
        assert!(layer.widget(ids[1]).unwrap().connector);
        assert!(!layer.widget(ids[2]).unwrap().connector);

        // Too narrow at this zoom
        state.time_area.set_shown_range(0.0, 1000.0);
        layer.rebuild(&state);
        assert!(!layer.widget(ids[1]).unwrap().connector);
    }

    #[test]
    fn test_invalid_flag_survives_rebuild() {
        let (state, _, ids) = state(&[(0.0, 1.0)]);
        let mut layer = ClipsLayer::new();
        layer.rebuild(&state);
        layer.set_invalid(ids[0], true);
        layer.rebuild(&state);
        assert!(layer.widget(ids[0]).unwrap().invalid);
    }

    #[test]
    fn test_clip_at() {
        let (state, _, ids) = state(&[(1.0, 2.0)]);
        let mut layer = ClipsLayer::new();
        layer.rebuild(&state);
        let rect = layer.widget(ids[0]).unwrap().rect;
        assert_eq!(layer.clip_at(rect.center()), Some(ids[0]));
        assert_eq!(layer.clip_at(egui::pos2(rect.right() + 50.0, rect.center().y)), None);
    }
}
