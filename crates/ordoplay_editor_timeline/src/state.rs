// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timeline window state.
//!
//! Everything an action reads or mutates lives here: the project, the
//! timeline being edited, playhead, selection, clipboard, view and undo.

use crate::clipboard::Clipboard;
use crate::edit_mode::{edit_mode_for, EditMode};
use crate::history::UndoHistory;
use crate::item::ItemId;
use crate::rows::RowLayout;
use crate::selection::Selection;
use crate::settings::TimelineSettings;
use crate::time_area::{snap_to_frame, TimeArea};
use crate::timeline::{Project, TimelineAsset, TimelineId};
use crate::track::TrackId;
use egui::{Pos2, Rect};
use indexmap::IndexMap;

/// Header area width left of the clips area
pub const HEADER_WIDTH: f32 = 200.0;

/// Area of the window that has keyboard focus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyboardFocus {
    /// Neither area
    #[default]
    None,
    /// Track headers
    TrackHeaders,
    /// Clips area
    Clips,
}

/// State of one timeline window
#[derive(Debug)]
pub struct WindowState {
    /// Edited content
    pub project: Project,
    /// Timeline currently being edited
    pub edit_sequence: TimelineId,
    /// Playhead time
    pub time: f64,
    /// Whether playback is running
    pub playing: bool,
    /// Selected tracks and items
    pub selection: Selection,
    /// Copied items and tracks
    pub clipboard: Clipboard,
    /// Horizontal view
    pub time_area: TimeArea,
    /// Vertical layout
    pub rows: RowLayout,
    /// Undo history
    pub undo: UndoHistory,
    /// Settings
    pub settings: TimelineSettings,
    /// Whether the marker track row is shown
    pub show_marker_header: bool,
    /// A text field in the window has focus
    pub text_field_focused: bool,
    /// An inline curve of a clip is being edited
    pub inline_curve_editor: bool,
    /// External animation windows linked to clips
    pub curve_links: IndexMap<ItemId, String>,
    /// Area with keyboard focus
    pub focus: KeyboardFocus,
    /// Last pointer position over the window
    pub hover_pos: Option<Pos2>,
    dirty_stamp: u64,
}

impl WindowState {
    /// Create a window editing `edit_sequence` with default settings
    pub fn new(project: Project, edit_sequence: TimelineId) -> Self {
        Self::with_settings(project, edit_sequence, TimelineSettings::default())
    }

    /// Create a window with the given settings
    pub fn with_settings(project: Project, edit_sequence: TimelineId, settings: TimelineSettings) -> Self {
        let window = Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(1200.0, 400.0));
        let mut time_area = TimeArea::new(Rect::from_min_max(egui::pos2(HEADER_WIDTH, 0.0), window.max));
        time_area.apply_settings(&settings);

        let mut state = Self {
            project,
            edit_sequence,
            time: 0.0,
            playing: false,
            selection: Selection::new(),
            clipboard: Clipboard::new(),
            time_area,
            rows: RowLayout::new(window),
            undo: UndoHistory::new(),
            settings,
            show_marker_header: true,
            text_field_focused: false,
            inline_curve_editor: false,
            curve_links: IndexMap::new(),
            focus: KeyboardFocus::None,
            hover_pos: None,
            dirty_stamp: 0,
        };
        state.refresh();
        state
    }

    /// Resize the window; the clips area starts after the track headers
    pub fn set_window_rect(&mut self, rect: Rect) {
        self.rows.set_rect(rect);
        let clips_left = (rect.left() + HEADER_WIDTH).min(rect.right() - 1.0);
        self.time_area
            .set_rect(Rect::from_min_max(egui::pos2(clips_left, rect.top()), rect.max));
        self.refresh();
    }

    /// Timeline being edited
    pub fn asset(&self) -> Option<&TimelineAsset> {
        self.project.timeline(self.edit_sequence)
    }

    /// Mutable timeline being edited
    pub fn asset_mut(&mut self) -> Option<&mut TimelineAsset> {
        self.project.timeline_mut(self.edit_sequence)
    }

    /// Whether a track belongs to the edited timeline
    pub fn in_edited_asset(&self, track: TrackId) -> bool {
        self.asset().is_some_and(|a| a.contains_track(track))
    }

    /// Edit mode selected in the settings
    pub fn edit_mode(&self) -> &'static dyn EditMode {
        edit_mode_for(self.settings.edit_mode)
    }

    /// Frame rate of the edited timeline
    pub fn frame_rate(&self) -> f64 {
        self.asset()
            .map(|a| a.frame_rate)
            .filter(|r| *r > 0.0)
            .unwrap_or(self.settings.frame_rate)
    }

    /// Duration of the edited timeline
    pub fn duration(&self) -> f64 {
        self.asset().map_or(0.0, TimelineAsset::duration)
    }

    /// Playhead frame
    pub fn frame(&self) -> i64 {
        (self.time * self.frame_rate()).round() as i64
    }

    /// Move the playhead to a frame (never before 0)
    pub fn set_frame(&mut self, frame: i64) {
        self.time = (frame.max(0) as f64) / self.frame_rate();
    }

    /// Move the playhead (never before 0)
    pub fn set_time(&mut self, time: f64) {
        self.time = time.max(0.0);
    }

    /// Toggle playback
    pub fn set_playing(&mut self, playing: bool) {
        self.playing = playing;
    }

    /// Pan the view so the playhead is visible
    pub fn ensure_playhead_visible(&mut self) {
        self.time_area.ensure_visible(self.time);
    }

    /// Time under the pointer, snapped to frames when enabled
    pub fn snapped_time_at(&self, pointer: Pos2) -> f64 {
        let time = self.time_area.pixel_to_time(pointer.x);
        if self.settings.snap_to_frame {
            snap_to_frame(time, self.frame_rate())
        } else {
            time
        }
    }

    /// Placement time for pasted items.
    ///
    /// With a pointer this is the time under it. Without one it is the
    /// playhead, or the end of the target tracks when the playhead is
    /// scrolled out of view.
    pub fn candidate_time(&self, pointer: Option<Pos2>, targets: &[TrackId]) -> f64 {
        let time = match pointer {
            Some(pos) => self.snapped_time_at(pos),
            None if self.time_area.is_time_visible(self.time) => self.time,
            None => targets
                .iter()
                .filter_map(|t| self.project.track(*t))
                .map(|t| t.end())
                .fold(0.0, f64::max),
        };
        time.max(0.0)
    }

    /// Bring items into view
    pub fn frame_items(&mut self, items: &[ItemId]) {
        let mut range: Option<(f64, f64)> = None;
        for id in items {
            if let Some((_, item)) = self.project.find_item(*id) {
                range = Some(match range {
                    Some((s, e)) => (s.min(item.start()), e.max(item.end())),
                    None => (item.start(), item.end()),
                });
            }
        }
        if let Some((start, end)) = range {
            self.time_area.frame_range(start, end, self.settings.frame_padding);
        }
    }

    /// Tracks visible in the tree view plus the marker track
    pub fn visible_tracks(&self) -> Vec<TrackId> {
        let Some(asset) = self.asset() else {
            return Vec::new();
        };
        let mut tracks = asset.visible_tracks();
        tracks.extend(asset.marker_track);
        tracks
    }

    /// Detach external curve windows from deleted clips
    pub fn unlink_curve_windows(&mut self, clips: &[ItemId]) {
        for clip in clips {
            if let Some(window) = self.curve_links.shift_remove(clip) {
                tracing::debug!("Unlinked animation window '{}' from deleted clip", window);
            }
        }
    }

    /// Recompute derived view state after the model changed
    pub fn refresh(&mut self) {
        if let Some(asset) = self.project.timeline(self.edit_sequence) {
            self.selection.prune(asset);
            self.rows.rebuild(asset, self.show_marker_header);
        }
        self.dirty_stamp += 1;
    }

    /// Incremented on every refresh
    pub fn dirty_stamp(&self) -> u64 {
        self.dirty_stamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{Clip, ClipKind};
    use crate::track::{Track, TrackKind};

    fn state_with_clip(start: f64, duration: f64) -> (WindowState, TrackId) {
        let mut timeline = TimelineAsset::new("T");
        let mut track = Track::new("Anim", TrackKind::Animation);
        track.add_clip(Clip::new("a", ClipKind::Animation, start, duration));
        let track_id = timeline.add_track(track);
        let id = timeline.id;
        let mut project = Project::new();
        project.add_timeline(timeline);
        (WindowState::new(project, id), track_id)
    }

    #[test]
    fn test_candidate_time_without_pointer() {
        let (mut state, track) = state_with_clip(20.0, 5.0);
        state.time = 3.0;
        assert_eq!(state.candidate_time(None, &[track]), 3.0);

        state.time = 50.0;
        assert_eq!(state.candidate_time(None, &[track]), 25.0);
    }

    #[test]
    fn test_candidate_time_at_pointer_is_snapped() {
        let (state, track) = state_with_clip(0.0, 1.0);
        let x = state.time_area.time_to_pixel(2.01);
        let time = state.candidate_time(Some(egui::pos2(x, 100.0)), &[track]);
        assert!((time - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_set_frame_never_negative() {
        let (mut state, _) = state_with_clip(0.0, 1.0);
        state.set_frame(-3);
        assert_eq!(state.time, 0.0);
        state.set_frame(45);
        assert_eq!(state.frame(), 45);
    }

    #[test]
    fn test_refresh_bumps_stamp_and_lays_out_rows() {
        let (mut state, track) = state_with_clip(0.0, 1.0);
        let before = state.dirty_stamp();
        state.refresh();
        assert_eq!(state.dirty_stamp(), before + 1);
        assert!(state.rows.row(track).is_some());
    }
}
