// SPDX-License-Identifier: MIT OR Apache-2.0
//! Playback, framing, zoom and marker header toggles.

use crate::state::WindowState;
use egui::Pos2;

pub(super) fn execute_play(state: &mut WindowState, _: Option<Pos2>) -> bool {
    let playing = !state.playing;
    state.set_playing(playing);
    true
}

pub(super) fn execute_previous_frame(state: &mut WindowState, _: Option<Pos2>) -> bool {
    state.set_frame(state.frame() - 1);
    true
}

pub(super) fn execute_next_frame(state: &mut WindowState, _: Option<Pos2>) -> bool {
    state.set_frame(state.frame() + 1);
    true
}

pub(super) fn execute_frame_all(state: &mut WindowState, _: Option<Pos2>) -> bool {
    frame_all(state)
}

pub(super) fn execute_frame_selected(state: &mut WindowState, _: Option<Pos2>) -> bool {
    frame_selected(state)
}

/// Fit every item of the visible tracks into view.
///
/// Returns false when all of them are empty or an inline curve is being
/// edited.
pub fn frame_all(state: &mut WindowState) -> bool {
    if state.inline_curve_editor {
        return false;
    }
    let range = state
        .visible_tracks()
        .into_iter()
        .filter_map(|id| state.project.track(id).and_then(|t| t.item_range()))
        .reduce(|(s0, e0), (s1, e1)| (s0.min(s1), e0.max(e1)));
    let Some((start, end)) = range else {
        return false;
    };
    state.time_area.frame_range(start, end, state.settings.frame_padding);
    true
}

/// Fit the selected clips and markers into view
pub fn frame_selected(state: &mut WindowState) -> bool {
    if state.inline_curve_editor || state.selection.is_empty() {
        return false;
    }
    let Some(asset) = state.asset() else {
        return false;
    };
    let range = state
        .selection
        .items(asset)
        .iter()
        .map(|(_, item)| (item.start(), item.end()))
        .reduce(|(s0, e0), (s1, e1)| (s0.min(s1), e0.max(e1)));
    let Some((start, end)) = range else {
        return false;
    };
    state.time_area.frame_range(start, end, state.settings.frame_padding);
    true
}

/// Item boundaries of the edited timeline, sorted
fn key_times(state: &WindowState) -> Vec<f64> {
    let Some(asset) = state.asset() else {
        return Vec::new();
    };
    let mut keys: Vec<f64> = asset
        .tracks()
        .flat_map(|track| {
            let clips = track.clips.iter().flat_map(|c| [c.start, c.end()]);
            let markers = track.markers.iter().map(|m| m.time);
            clips.chain(markers).collect::<Vec<_>>()
        })
        .collect();
    keys.sort_by(f64::total_cmp);
    keys
}

/// Nearest item boundary before the playhead
pub fn previous_key_time(state: &WindowState) -> Option<f64> {
    let tolerance = 0.01 / state.frame_rate();
    key_times(state)
        .into_iter()
        .rev()
        .find(|t| *t < state.time - tolerance)
}

/// Nearest item boundary after the playhead
pub fn next_key_time(state: &WindowState) -> Option<f64> {
    let tolerance = 0.01 / state.frame_rate();
    key_times(state).into_iter().find(|t| *t > state.time + tolerance)
}

pub(super) fn execute_previous_key(state: &mut WindowState, _: Option<Pos2>) -> bool {
    if let Some(time) = previous_key_time(state) {
        state.set_time(time);
    }
    true
}

pub(super) fn execute_next_key(state: &mut WindowState, _: Option<Pos2>) -> bool {
    if let Some(time) = next_key_time(state) {
        state.set_time(time);
    }
    true
}

pub(super) fn execute_goto_start(state: &mut WindowState, _: Option<Pos2>) -> bool {
    state.set_time(0.0);
    state.ensure_playhead_visible();
    true
}

pub(super) fn execute_goto_end(state: &mut WindowState, _: Option<Pos2>) -> bool {
    state.set_time(state.duration());
    state.ensure_playhead_visible();
    true
}

/// Zoom about the hovered time, or the view center without a pointer
fn zoom_view(state: &mut WindowState, factor: f64, pointer: Option<Pos2>) {
    let focus = pointer
        .or(state.hover_pos)
        .filter(|p| state.time_area.rect().contains(*p));
    match focus {
        Some(pos) => state.time_area.zoom_at(factor, pos.x),
        None => state.time_area.zoom(factor),
    };
}

pub(super) fn execute_zoom_in(state: &mut WindowState, pointer: Option<Pos2>) -> bool {
    let factor = state.settings.zoom_in_factor;
    zoom_view(state, factor, pointer);
    true
}

pub(super) fn execute_zoom_out(state: &mut WindowState, pointer: Option<Pos2>) -> bool {
    let factor = state.settings.zoom_out_factor;
    zoom_view(state, factor, pointer);
    true
}

pub(super) fn markers_muted(state: &WindowState) -> bool {
    state
        .asset()
        .and_then(|a| a.marker_track)
        .and_then(|id| state.project.track(id))
        .is_some_and(|t| t.muted)
}

pub(super) fn markers_shown(state: &WindowState) -> bool {
    state.show_marker_header
}

pub(super) fn execute_toggle_mute_markers(state: &mut WindowState, _: Option<Pos2>) -> bool {
    if !state.show_marker_header {
        return true;
    }
    let edit_sequence = state.edit_sequence;
    let Some(asset) = state.asset_mut() else {
        return true;
    };
    let existed = asset.marker_track.is_some();
    let marker_track = asset.ensure_marker_track();
    if existed {
        if let Err(err) = state.undo.push_undo(&state.project, marker_track, "Toggle Mute") {
            tracing::warn!("Could not record undo for Toggle Mute: {}", err);
        }
    } else {
        state.undo.register_created(edit_sequence, marker_track, "Toggle Mute");
    }
    if let Some(track) = state.project.track_mut(marker_track) {
        track.muted = !track.muted;
    }
    true
}

pub(super) fn execute_toggle_show_markers(state: &mut WindowState, _: Option<Pos2>) -> bool {
    state.show_marker_header = !state.show_marker_header;
    state.refresh();
    true
}
