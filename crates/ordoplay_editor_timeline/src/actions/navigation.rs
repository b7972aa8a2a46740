// SPDX-License-Identifier: MIT OR Apache-2.0
//! Keyboard navigation between tracks and items.

use crate::item::TimelineItem;
use crate::state::{KeyboardFocus, WindowState};
use crate::track::TrackId;
use egui::Pos2;

/// Whether the clips area has keyboard focus
pub fn clip_area_active(state: &WindowState) -> bool {
    state.focus == KeyboardFocus::Clips
}

/// Whether the track headers have keyboard focus
pub fn track_head_active(state: &WindowState) -> bool {
    state.focus == KeyboardFocus::TrackHeaders
}

fn last_selected_item(state: &WindowState) -> Option<(TrackId, TimelineItem)> {
    let asset = state.asset()?;
    let last = state.selection.item_ids().filter(|id| asset.item_parent(*id).is_some()).last()?;
    asset.find_item(last)
}

fn last_selected_track(state: &WindowState) -> Option<TrackId> {
    state.selection.tracks().filter(|t| state.rows.row(*t).is_some()).last()
}

/// Tracks in row order, top to bottom
fn row_tracks(state: &WindowState) -> Vec<TrackId> {
    state.rows.tracks().collect()
}

/// Select `item`, or add it when extending the selection
fn select_item(state: &mut WindowState, item: &TimelineItem, extend_from: Option<&TimelineItem>) {
    match extend_from {
        Some(current) => {
            if state.selection.contains_item(item.id()) {
                state.selection.remove_item(current.id());
            }
            // Re-adding moves the item to the end of the selection order
            state.selection.remove_item(item.id());
            state.selection.add_item(item.id());
        }
        None => state.selection.select_only_item(item.id()),
    }
    state.focus = KeyboardFocus::Clips;
    state.time_area.ensure_visible(item.start());
}

fn select_track(state: &mut WindowState, track: TrackId, extend_from: Option<TrackId>) {
    match extend_from {
        Some(current) => {
            if state.selection.contains_track(track) {
                state.selection.remove_track(current);
            }
            state.selection.remove_track(track);
            state.selection.add_track(track);
        }
        None => state.selection.select_only_track(track),
    }
    state.focus = KeyboardFocus::TrackHeaders;
}

fn select_horizontal_item(state: &mut WindowState, left: bool, extend: bool) -> bool {
    if !clip_area_active(state) {
        return false;
    }
    let Some((track_id, item)) = last_selected_item(state) else {
        return false;
    };
    let Some(track) = state.project.track(track_id) else {
        return false;
    };

    let items = track.items_by_start();
    let Some(index) = items.iter().position(|i| i.id() == item.id()) else {
        return false;
    };
    let neighbour = if left {
        index.checked_sub(1).and_then(|i| items.get(i))
    } else {
        items.get(index + 1)
    };

    match neighbour {
        Some(next) => {
            let next = next.clone();
            select_item(state, &next, extend.then_some(&item));
        }
        None if left && !extend => {
            let is_marker_track = state.asset().and_then(|a| a.marker_track) == Some(track_id);
            if !is_marker_track {
                select_track(state, track_id, None);
            }
        }
        None => {}
    }
    true
}

/// Item on `track` starting closest to `time`
fn closest_item(state: &WindowState, track: TrackId, time: f64) -> Option<TimelineItem> {
    state
        .project
        .track(track)?
        .items()
        .into_iter()
        .min_by(|a, b| (a.start() - time).abs().total_cmp(&(b.start() - time).abs()))
}

fn select_vertical_item(state: &mut WindowState, up: bool, extend: bool) -> bool {
    if !clip_area_active(state) {
        return false;
    }
    let Some((track_id, item)) = last_selected_item(state) else {
        return false;
    };
    let rows = row_tracks(state);
    let Some(index) = rows.iter().position(|t| *t == track_id) else {
        return true;
    };

    let candidates: Vec<TrackId> = if up {
        rows[..index].iter().rev().copied().collect()
    } else {
        rows[index + 1..].to_vec()
    };
    let target = candidates
        .into_iter()
        .find_map(|track| closest_item(state, track, item.start()));
    if let Some(target) = target {
        select_item(state, &target, extend.then_some(&item));
    }
    true
}

fn select_vertical_track(state: &mut WindowState, up: bool, extend: bool) -> bool {
    if !track_head_active(state) {
        return false;
    }
    let rows = row_tracks(state);
    let Some(current) = last_selected_track(state) else {
        if let Some(first) = rows.first() {
            select_track(state, *first, None);
        }
        return true;
    };
    let Some(index) = rows.iter().position(|t| *t == current) else {
        return true;
    };
    let next = if up {
        index.checked_sub(1).and_then(|i| rows.get(i))
    } else {
        rows.get(index + 1)
    };
    if let Some(next) = next.copied() {
        select_track(state, next, extend.then_some(current));
    }
    true
}

/// Select the first item in view, preferring items entirely visible.
///
/// Only `tracks` are searched when given, otherwise every row. Moves
/// keyboard focus to the clips area when an item is found.
pub fn focus_first_visible_item(state: &mut WindowState, tracks: Option<&[TrackId]>) -> bool {
    let (start, end) = state.time_area.shown_range();
    let in_view = |t: f64| t >= start && t <= end;
    let tracks = tracks.map_or_else(|| row_tracks(state), <[TrackId]>::to_vec);

    let items: Vec<TimelineItem> = tracks
        .iter()
        .filter_map(|t| state.project.track(*t))
        .flat_map(|t| t.items_by_start())
        .filter(|i| in_view(i.start()) || in_view(i.end()))
        .collect();
    let target = items
        .iter()
        .find(|i| in_view(i.start()) && in_view(i.end()))
        .or_else(|| items.first())
        .cloned();

    let Some(target) = target else {
        return false;
    };
    state.selection.select_only_item(target.id());
    state.focus = KeyboardFocus::Clips;
    true
}

pub(super) fn execute_select_all(state: &mut WindowState, _: Option<Pos2>) -> bool {
    let tracks = state.asset().map(|a| a.display_order()).unwrap_or_default();
    state.selection.clear();
    for track in tracks {
        state.selection.add_track(track);
    }
    true
}

pub(super) fn execute_collapse_group(state: &mut WindowState, _: Option<Pos2>) -> bool {
    if !track_head_active(state) {
        return false;
    }

    let selected: Vec<TrackId> = state.selection.tracks().collect();
    let mut collapsed_any = false;
    for id in &selected {
        let Some(track) = state.project.track_mut(*id) else {
            continue;
        };
        if track.children.is_empty() {
            continue;
        }
        collapsed_any |= !track.collapsed;
        track.collapsed = true;
    }
    if collapsed_any {
        state.refresh();
        return true;
    }

    // Already collapsed: move up to the parent group
    let parent = selected
        .last()
        .and_then(|id| state.project.track(*id))
        .and_then(|t| t.parent);
    match parent {
        Some(parent) => {
            select_track(state, parent, None);
            true
        }
        None => false,
    }
}

pub(super) fn execute_expand_group(state: &mut WindowState, _: Option<Pos2>) -> bool {
    if !track_head_active(state) {
        return false;
    }

    let selected: Vec<TrackId> = state.selection.tracks().collect();
    let mut expanded_any = false;
    for id in &selected {
        let Some(track) = state.project.track_mut(*id) else {
            continue;
        };
        if track.children.is_empty() {
            continue;
        }
        expanded_any |= track.collapsed;
        track.collapsed = false;
    }
    if expanded_any {
        state.refresh();
        return true;
    }

    // Already expanded: move into the clips area next to the playhead
    let rows = row_tracks(state);
    let from = selected
        .last()
        .and_then(|id| rows.iter().position(|t| t == id))
        .unwrap_or(0);
    let time = state.time;
    let target = rows.iter().skip(from).find_map(|id| {
        let items = state.project.track(*id)?.items_by_start();
        items
            .iter()
            .find(|i| i.start() <= time && i.end() >= time)
            .or_else(|| items.iter().find(|i| i.start() >= time))
            .or_else(|| items.last())
            .cloned()
    });

    match target {
        Some(item) => {
            select_item(state, &item, None);
            true
        }
        None => false,
    }
}

pub(super) fn execute_select_left_item(state: &mut WindowState, _: Option<Pos2>) -> bool {
    select_horizontal_item(state, true, false)
}

pub(super) fn execute_select_right_item(state: &mut WindowState, _: Option<Pos2>) -> bool {
    select_horizontal_item(state, false, false)
}

pub(super) fn execute_select_up_item(state: &mut WindowState, _: Option<Pos2>) -> bool {
    select_vertical_item(state, true, false)
}

pub(super) fn execute_select_up_track(state: &mut WindowState, _: Option<Pos2>) -> bool {
    select_vertical_track(state, true, false)
}

pub(super) fn execute_select_down_item(state: &mut WindowState, _: Option<Pos2>) -> bool {
    select_vertical_item(state, false, false)
}

pub(super) fn execute_select_down_track(state: &mut WindowState, _: Option<Pos2>) -> bool {
    if !clip_area_active(state) && !track_head_active(state) {
        return focus_first_visible_item(state, None);
    }
    select_vertical_track(state, false, false)
}

pub(super) fn execute_multi_select_left(state: &mut WindowState, _: Option<Pos2>) -> bool {
    select_horizontal_item(state, true, true)
}

pub(super) fn execute_multi_select_right(state: &mut WindowState, _: Option<Pos2>) -> bool {
    select_horizontal_item(state, false, true)
}

pub(super) fn execute_multi_select_up(state: &mut WindowState, _: Option<Pos2>) -> bool {
    select_vertical_item(state, true, true) || select_vertical_track(state, true, true)
}

pub(super) fn execute_multi_select_down(state: &mut WindowState, _: Option<Pos2>) -> bool {
    select_vertical_item(state, false, true) || select_vertical_track(state, false, true)
}

pub(super) fn execute_toggle_clip_track_area(state: &mut WindowState, _: Option<Pos2>) -> bool {
    if track_head_active(state) {
        let tracks: Vec<TrackId> = state.selection.tracks().collect();
        return focus_first_visible_item(state, Some(&tracks));
    }
    if !clip_area_active(state) {
        return focus_first_visible_item(state, None);
    }
    let Some((track, _)) = last_selected_item(state) else {
        return false;
    };
    select_track(state, track, None);
    true
}
