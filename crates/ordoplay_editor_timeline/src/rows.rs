// SPDX-License-Identifier: MIT OR Apache-2.0
//! Vertical layout of track rows and pointer hit-testing.

use crate::timeline::TimelineAsset;
use crate::track::TrackId;
use egui::{Pos2, Rect};

/// Height of a track row in pixels
pub const TRACK_HEIGHT: f32 = 28.0;

/// Height of the time ruler above the rows
pub const RULER_HEIGHT: f32 = 32.0;

/// Indentation per group nesting level in the header area
pub const INDENT_WIDTH: f32 = 16.0;

/// Answers which tracks lie under a pointer position
pub trait SpacePartitioner {
    /// Tracks whose row contains `pos`, topmost first
    fn tracks_at(&self, pos: Pos2) -> Vec<TrackId>;
}

/// One laid-out track row
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Row {
    /// Track drawn in this row
    pub track: TrackId,
    /// Row rectangle, spanning header and clips area
    pub rect: Rect,
    /// Group nesting depth
    pub depth: usize,
}

/// Rows of the visible tracks, top to bottom below the ruler
#[derive(Debug, Clone, PartialEq)]
pub struct RowLayout {
    rect: Rect,
    scroll_y: f32,
    rows: Vec<Row>,
}

impl RowLayout {
    /// Create an empty layout for the window content `rect`
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            scroll_y: 0.0,
            rows: Vec::new(),
        }
    }

    /// Window content rectangle
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Resize the window content
    pub fn set_rect(&mut self, rect: Rect) {
        self.rect = rect;
    }

    /// Lay out the visible tracks of `timeline`.
    ///
    /// The marker track gets the first row when the marker header is shown.
    pub fn rebuild(&mut self, timeline: &TimelineAsset, show_marker_header: bool) {
        let mut tracks: Vec<TrackId> = Vec::new();
        if show_marker_header {
            tracks.extend(timeline.marker_track);
        }
        tracks.extend(timeline.visible_tracks());

        let top = self.rect.top() + RULER_HEIGHT - self.scroll_y;
        self.rows = tracks
            .into_iter()
            .enumerate()
            .map(|(index, track)| {
                let y = top + index as f32 * TRACK_HEIGHT;
                Row {
                    track,
                    rect: Rect::from_x_y_ranges(self.rect.x_range(), y..=y + TRACK_HEIGHT),
                    depth: depth_of(timeline, track),
                }
            })
            .collect();
    }

    /// Laid-out rows, top to bottom
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Row of a track
    pub fn row(&self, track: TrackId) -> Option<&Row> {
        self.rows.iter().find(|r| r.track == track)
    }

    /// Tracks in row order
    pub fn tracks(&self) -> impl Iterator<Item = TrackId> + '_ {
        self.rows.iter().map(|r| r.track)
    }

    /// Vertical scroll offset
    pub fn scroll_y(&self) -> f32 {
        self.scroll_y
    }

    /// Scroll by `dy` pixels, keeping the offset inside the content
    pub fn scroll_by(&mut self, dy: f32) {
        let content = self.rows.len() as f32 * TRACK_HEIGHT;
        let visible = (self.rect.height() - RULER_HEIGHT).max(0.0);
        let max_scroll = (content - visible).max(0.0);
        let new_scroll = (self.scroll_y + dy).clamp(0.0, max_scroll);
        let shift = new_scroll - self.scroll_y;
        self.scroll_y = new_scroll;
        for row in &mut self.rows {
            row.rect = row.rect.translate(egui::vec2(0.0, -shift));
        }
    }
}

impl Default for RowLayout {
    fn default() -> Self {
        Self::new(Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(1200.0, 400.0)))
    }
}

impl SpacePartitioner for RowLayout {
    fn tracks_at(&self, pos: Pos2) -> Vec<TrackId> {
        if pos.y < self.rect.top() + RULER_HEIGHT {
            return Vec::new();
        }
        self.rows
            .iter()
            .filter(|r| r.rect.x_range().contains(pos.x) && pos.y >= r.rect.top() && pos.y < r.rect.bottom())
            .map(|r| r.track)
            .collect()
    }
}

fn depth_of(timeline: &TimelineAsset, track: TrackId) -> usize {
    let mut depth = 0;
    let mut current = timeline.track(track).and_then(|t| t.parent);
    while let Some(parent) = current {
        depth += 1;
        current = timeline.track(parent).and_then(|t| t.parent);
    }
    depth
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::{Track, TrackKind};

    fn timeline() -> (TimelineAsset, TrackId, TrackId, TrackId) {
        let mut timeline = TimelineAsset::new("T");
        let group = timeline.add_track(Track::new("Group", TrackKind::Group));
        let child = timeline.add_child_track(group, Track::new("Anim", TrackKind::Animation));
        let markers = timeline.ensure_marker_track();
        (timeline, group, child, markers)
    }

    #[test]
    fn test_rows_below_ruler() {
        let (timeline, group, child, _) = timeline();
        let mut layout = RowLayout::default();
        layout.rebuild(&timeline, false);

        assert_eq!(layout.tracks().collect::<Vec<_>>(), vec![group, child]);
        assert_eq!(layout.row(group).unwrap().rect.top(), RULER_HEIGHT);
        assert_eq!(layout.row(child).unwrap().depth, 1);
    }

    #[test]
    fn test_marker_header_row_first() {
        let (timeline, group, _, markers) = timeline();
        let mut layout = RowLayout::default();
        layout.rebuild(&timeline, true);
        assert_eq!(layout.rows()[0].track, markers);
        assert_eq!(layout.rows()[1].track, group);
    }

    #[test]
    fn test_tracks_at() {
        let (timeline, group, child, _) = timeline();
        let mut layout = RowLayout::default();
        layout.rebuild(&timeline, false);

        assert_eq!(layout.tracks_at(egui::pos2(500.0, RULER_HEIGHT + 5.0)), vec![group]);
        assert_eq!(layout.tracks_at(egui::pos2(500.0, RULER_HEIGHT + TRACK_HEIGHT + 5.0)), vec![child]);
        assert!(layout.tracks_at(egui::pos2(500.0, 5.0)).is_empty());
        assert!(layout.tracks_at(egui::pos2(500.0, 390.0)).is_empty());
    }

    #[test]
    fn test_row_boundary_hits_lower_track_only() {
        let (timeline, group, child, _) = timeline();
        let mut layout = RowLayout::default();
        layout.rebuild(&timeline, false);

        let boundary = layout.row(group).unwrap().rect.bottom();
        assert_eq!(layout.row(child).unwrap().rect.top(), boundary);
        assert_eq!(layout.tracks_at(egui::pos2(500.0, boundary)), vec![child]);
    }

    #[test]
    fn test_scroll_is_clamped() {
        let (timeline, _, _, _) = timeline();
        let mut layout = RowLayout::default();
        layout.rebuild(&timeline, false);
        layout.scroll_by(500.0);
        assert_eq!(layout.scroll_y(), 0.0);
    }
}
