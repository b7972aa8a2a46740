// SPDX-License-Identifier: MIT OR Apache-2.0
//! Duplicate, delete and match content.

use super::clipboard::top_level_selected_tracks;
use super::DisplayState;
use crate::clipboard::{group_by_track, ItemsPerTrack};
use crate::item::{same_time, ItemId, TimelineItem};
use crate::state::WindowState;
use crate::timeline::Project;
use crate::track::{Track, TrackId};
use egui::Pos2;

pub(super) fn execute_duplicate(state: &mut WindowState, _: Option<Pos2>) -> bool {
    let Some(asset) = state.asset() else {
        return false;
    };
    let groups = group_by_track(state.selection.items(asset));
    let tracks = top_level_selected_tracks(state);

    let mut new_items = Vec::new();
    if !groups.is_empty() {
        let gap = state.settings.duplicate_gap;
        let frame_rate = state.frame_rate();
        let time = calculate_duplicate_time(&state.project, &groups, |left, right| {
            gap.between(left, right, frame_rate)
        });
        let placements: Vec<(ItemsPerTrack, TrackId)> = groups
            .into_iter()
            .map(|g| {
                let origin = g.origin();
                (g, origin)
            })
            .collect();
        new_items = state
            .edit_mode()
            .duplicate_items(state, &placements, time, "Duplicate Items");
        state.frame_items(&new_items);
    }

    let new_tracks = if tracks.is_empty() {
        Vec::new()
    } else {
        duplicate_tracks(state, &tracks)
    };

    if !new_items.is_empty() || !new_tracks.is_empty() {
        state.selection.remove_timeline_selection();
        for id in &new_items {
            state.selection.add_item(*id);
        }
        for id in &new_tracks {
            state.selection.add_track(*id);
        }
    }
    state.refresh();
    tracing::info!("Duplicated {} items and {} tracks", new_items.len(), new_tracks.len());
    true
}

/// Time at which duplicated items start.
///
/// Duplicates go after the last item of every affected track. When the
/// leftmost copied item would land next to the rightmost item of its own
/// track, `gap` may push it further so the two do not coincide.
pub fn calculate_duplicate_time(
    project: &Project,
    groups: &[ItemsPerTrack],
    gap: impl Fn(&TimelineItem, &TimelineItem) -> f64,
) -> f64 {
    let mut time = groups
        .iter()
        .filter_map(|g| project.track(g.origin()))
        .map(Track::end)
        .fold(0.0, f64::max);

    let leftmost: Vec<(TrackId, &TimelineItem)> = groups
        .iter()
        .filter_map(|g| g.leftmost_item().map(|item| (g.origin(), item)))
        .collect();
    let Some(min_start) = leftmost.iter().map(|(_, item)| item.start()).min_by(f64::total_cmp) else {
        return time;
    };

    for (track, item) in leftmost.iter().filter(|(_, item)| same_time(item.start(), min_start)) {
        let Some(track) = project.track(*track) else {
            continue;
        };
        let siblings = track.items();
        let max_end = siblings.iter().map(TimelineItem::end).fold(f64::NEG_INFINITY, f64::max);
        for sibling in siblings.iter().filter(|s| same_time(s.end(), max_end)) {
            time = time.max(sibling.end() + gap(item, sibling));
        }
    }
    time
}

/// Duplicate track trees next to the originals; returns every new track ID
pub fn duplicate_tracks(state: &mut WindowState, tracks: &[TrackId]) -> Vec<TrackId> {
    let edit_sequence = state.edit_sequence;
    let mut created = Vec::new();
    for track in tracks {
        let Some(asset) = state.asset_mut() else {
            break;
        };
        let Some(parent) = asset.track(*track).map(|t| t.parent) else {
            continue;
        };
        let tree: Vec<Track> = asset
            .flattened_subtree(*track)
            .into_iter()
            .filter_map(|id| asset.track(id).cloned())
            .collect();
        for id in asset.insert_track_tree(&tree, parent) {
            state.undo.register_created(edit_sequence, id, "Duplicate Tracks");
            created.push(id);
        }
    }
    created
}

/// Whether every selected track and item can be deleted
pub fn can_delete(state: &WindowState) -> bool {
    let Some(asset) = state.asset() else {
        return false;
    };
    let tracks_unlocked = state.selection.tracks().all(|t| !asset.locked_in_hierarchy(t));
    let items_unlocked = state
        .selection
        .items(asset)
        .iter()
        .all(|(track, _)| !asset.locked_in_hierarchy(*track));
    tracks_unlocked && items_unlocked
}

pub(super) fn delete_display_state(state: &WindowState, _: Option<Pos2>) -> DisplayState {
    if can_delete(state) {
        DisplayState::Visible
    } else {
        DisplayState::Disabled
    }
}

pub(super) fn execute_delete(state: &mut WindowState, _: Option<Pos2>) -> bool {
    if state.inline_curve_editor || !can_delete(state) {
        return false;
    }
    let Some(asset) = state.asset() else {
        return false;
    };
    let items = state.selection.items(asset);
    let tracks = top_level_selected_tracks(state);

    if !items.is_empty() {
        delete_items(state, &items);
    }
    if !tracks.is_empty() {
        delete_tracks(state, &tracks);
    }
    state.refresh();
    !items.is_empty() || !tracks.is_empty()
}

/// Remove items from their tracks through the current edit mode
pub fn delete_items(state: &mut WindowState, items: &[(TrackId, TimelineItem)]) {
    let groups = group_by_track(items.iter().cloned());
    for group in &groups {
        if let Err(err) = state.undo.push_undo(&state.project, group.origin(), "Delete Items") {
            tracing::warn!("Could not record undo for Delete Items: {}", err);
        }
    }

    let clips: Vec<ItemId> = items
        .iter()
        .filter(|(_, item)| item.is_clip())
        .map(|(_, item)| item.id())
        .collect();
    state.unlink_curve_windows(&clips);

    let mode = state.edit_mode();
    for group in &groups {
        let Some(track) = state.project.track_mut(group.origin()) else {
            continue;
        };
        mode.prepare_delete(track, group.items());
        for item in group.items() {
            track.remove_item(item.id());
        }
    }
    state.selection.clear_items();
}

/// Remove tracks and their descendants from the edited timeline
pub fn delete_tracks(state: &mut WindowState, tracks: &[TrackId]) {
    for track in tracks {
        let Some(asset) = state.asset() else {
            return;
        };
        let Some(parent) = asset.track(*track).map(|t| t.parent) else {
            continue;
        };
        // The parent snapshot keeps the child order for undo
        let snapshot: Vec<TrackId> = parent
            .into_iter()
            .chain(asset.flattened_subtree(*track))
            .collect();
        for id in snapshot {
            if let Err(err) = state.undo.push_undo(&state.project, id, "Delete Tracks") {
                tracing::warn!("Could not record undo for Delete Tracks: {}", err);
            }
        }

        let Some(asset) = state.asset_mut() else {
            return;
        };
        let removed = asset.remove_track(*track);
        for removed in &removed {
            state.selection.remove_track(removed.id);
        }
        tracing::debug!("Deleted track {:?} with {} tracks in its subtree", track, removed.len());
    }
}

pub(super) fn match_content_display_state(state: &WindowState, _: Option<Pos2>) -> DisplayState {
    let Some(asset) = state.asset() else {
        return DisplayState::Hidden;
    };
    let clips = state.selection.clips(asset);
    if clips.is_empty() || state.inline_curve_editor {
        return DisplayState::Hidden;
    }
    if clips.iter().any(|(_, clip)| clip.has_usable_asset_duration()) {
        DisplayState::Visible
    } else {
        DisplayState::Disabled
    }
}

pub(super) fn execute_match_content(state: &mut WindowState, _: Option<Pos2>) -> bool {
    if state.inline_curve_editor {
        return false;
    }
    let Some(asset) = state.asset() else {
        return false;
    };
    let clips = state.selection.clips(asset);

    let mut changed = false;
    for (track, clip) in clips {
        let Some(asset_duration) = clip.asset_duration.filter(|_| clip.has_usable_asset_duration()) else {
            continue;
        };
        if let Err(err) = state.undo.push_undo(&state.project, track, "Match Content") {
            tracing::warn!("Could not record undo for Match Content: {}", err);
        }
        if let Some(target) = state.project.track_mut(track).and_then(|t| t.clip_mut(clip.id)) {
            target.duration = asset_duration - target.clip_in;
            changed = true;
        }
    }
    if changed {
        state.refresh();
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{Clip, ClipKind, Marker, MarkerKind};
    use crate::settings::DuplicateGap;
    use crate::timeline::TimelineAsset;
    use crate::track::TrackKind;

    fn state_with(track: Track) -> (WindowState, TrackId) {
        let mut timeline = TimelineAsset::new("T");
        let track_id = timeline.add_track(track);
        let id = timeline.id;
        let mut project = Project::new();
        project.add_timeline(timeline);
        (WindowState::new(project, id), track_id)
    }

    fn anim_track(clips: &[(f64, f64)]) -> Track {
        let mut track = Track::new("Anim", TrackKind::Animation);
        for (start, duration) in clips {
            track.add_clip(Clip::new("c", ClipKind::Animation, *start, *duration));
        }
        track
    }

    #[test]
    fn test_duplicate_places_after_track_end() {
        let (mut state, track) = state_with(anim_track(&[(0.0, 1.0), (4.0, 2.0)]));
        let first = state.project.track(track).unwrap().clips[0].id;
        state.selection.add_item(first);

        assert!(execute_duplicate(&mut state, None));
        let track = state.project.track(track).unwrap();
        assert_eq!(track.clips.len(), 3);
        assert_eq!(track.clips[2].start, 6.0);
        assert!(state.selection.contains_item(track.clips[2].id));
        assert!(!state.selection.contains_item(first));
    }

    #[test]
    fn test_duplicate_marker_leaves_one_frame_gap() {
        let mut track = Track::new("Signals", TrackKind::Animation);
        let marker = track.add_marker(Marker::new(3.0, MarkerKind::Annotation(String::new())));
        let (state, track_id) = state_with(track);
        let item = state.project.track(track_id).unwrap().item(marker).unwrap();
        let groups = group_by_track([(track_id, item)]);
        let one_frame = calculate_duplicate_time(&state.project, &groups, |l, r| {
            DuplicateGap::OneFrame.between(l, r, 30.0)
        });
        assert!((one_frame - (3.0 + 1.0 / 30.0)).abs() < 1e-9);

        let no_gap = calculate_duplicate_time(&state.project, &groups, |_, _| 0.0);
        assert_eq!(no_gap, 3.0);
    }

    #[test]
    fn test_duplicate_tracks_copies_subtree() {
        let mut timeline = TimelineAsset::new("T");
        let group = timeline.add_track(Track::new("Group", TrackKind::Group));
        timeline.add_child_track(group, anim_track(&[(0.0, 1.0)]));
        let id = timeline.id;
        let mut project = Project::new();
        project.add_timeline(timeline);
        let mut state = WindowState::new(project, id);

        state.selection.add_track(group);
        assert!(execute_duplicate(&mut state, None));
        let asset = state.asset().unwrap();
        assert_eq!(asset.root_tracks().len(), 2);
        assert_eq!(asset.display_order().len(), 4);
        assert_eq!(state.selection.tracks().count(), 2);
    }

    #[test]
    fn test_delete_on_locked_track_is_refused() {
        let (mut state, track) = state_with(anim_track(&[(0.0, 1.0)]));
        let clip = state.project.track(track).unwrap().clips[0].id;
        state.project.track_mut(track).unwrap().locked = true;
        state.selection.add_item(clip);

        assert!(!can_delete(&state));
        assert!(!execute_delete(&mut state, None));
        assert!(state.selection.contains_item(clip));
        assert_eq!(state.project.track(track).unwrap().clips.len(), 1);
    }

    #[test]
    fn test_delete_refused_while_editing_curve() {
        let (mut state, track) = state_with(anim_track(&[(0.0, 1.0)]));
        let clip = state.project.track(track).unwrap().clips[0].id;
        state.selection.add_item(clip);
        state.inline_curve_editor = true;
        assert!(!execute_delete(&mut state, None));
    }

    #[test]
    fn test_delete_items_and_undo() {
        let (mut state, track) = state_with(anim_track(&[(0.0, 1.0), (2.0, 1.0)]));
        let clip = state.project.track(track).unwrap().clips[0].id;
        state.curve_links.insert(clip, "Animation".into());
        state.selection.add_item(clip);

        assert!(execute_delete(&mut state, None));
        assert_eq!(state.project.track(track).unwrap().clips.len(), 1);
        assert!(state.selection.is_empty());
        assert!(state.curve_links.is_empty());

        state.undo.end_group();
        state.undo.undo(&mut state.project).unwrap();
        assert_eq!(state.project.track(track).unwrap().clips.len(), 2);
    }

    #[test]
    fn test_delete_nested_track_and_undo_keeps_order() {
        let mut timeline = TimelineAsset::new("T");
        let group = timeline.add_track(Track::new("Group", TrackKind::Group));
        let first = timeline.add_child_track(group, anim_track(&[]));
        let second = timeline.add_child_track(group, anim_track(&[]));
        let id = timeline.id;
        let mut project = Project::new();
        project.add_timeline(timeline);
        let mut state = WindowState::new(project, id);

        state.selection.add_track(first);
        assert!(execute_delete(&mut state, None));
        assert_eq!(state.project.track(group).unwrap().children, vec![second]);

        state.undo.end_group();
        state.undo.undo(&mut state.project).unwrap();
        assert_eq!(state.project.track(group).unwrap().children, vec![first, second]);
    }

    #[test]
    fn test_match_content() {
        let mut track = Track::new("Anim", TrackKind::Animation);
        let mut clip = Clip::new("walk", ClipKind::Animation, 0.0, 1.0).with_asset_duration(3.0);
        clip.clip_in = 0.5;
        let clip = track.add_clip(clip);
        let short = track.add_clip(Clip::new("pose", ClipKind::Animation, 5.0, 1.0));
        let (mut state, track) = state_with(track);

        state.selection.add_item(short);
        assert_eq!(match_content_display_state(&state, None), DisplayState::Disabled);

        state.selection.add_item(clip);
        assert_eq!(match_content_display_state(&state, None), DisplayState::Visible);
        assert!(execute_match_content(&mut state, None));
        assert_eq!(state.project.track(track).unwrap().clip(clip).unwrap().duration, 2.5);

        state.selection.clear();
        assert_eq!(match_content_display_state(&state, None), DisplayState::Hidden);
    }
}
