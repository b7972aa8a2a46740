// SPDX-License-Identifier: MIT OR Apache-2.0
//! Copy and paste.

use super::DisplayState;
use crate::clipboard::{group_by_track, CopiedTrack, ItemsPerTrack};
use crate::item::{ItemId, TimelineItem};
use crate::rows::SpacePartitioner;
use crate::state::WindowState;
use crate::track::{Track, TrackId};
use egui::Pos2;

pub(super) fn copy_display_state(state: &WindowState, _: Option<Pos2>) -> DisplayState {
    if state.selection.count() > 0 {
        DisplayState::Visible
    } else {
        DisplayState::Disabled
    }
}

pub(super) fn execute_copy(state: &mut WindowState, _: Option<Pos2>) -> bool {
    if state.selection.count() == 0 {
        return false;
    }
    copy_selection(state);
    true
}

pub(super) fn paste_display_state(state: &WindowState, pointer: Option<Pos2>) -> DisplayState {
    if can_paste(state, pointer) {
        DisplayState::Visible
    } else {
        DisplayState::Disabled
    }
}

pub(super) fn execute_paste(state: &mut WindowState, pointer: Option<Pos2>) -> bool {
    paste(state, pointer)
}

/// Replace the clipboard with the selected items and tracks.
///
/// Items are grouped by the track they sit on; clips and markers of one
/// track share a group. A selected track whose ancestor is also selected is
/// copied as part of that ancestor.
pub fn copy_selection(state: &mut WindowState) {
    state.clipboard.clear();
    let Some(asset) = state.asset() else {
        return;
    };

    let clips = state
        .selection
        .clips(asset)
        .into_iter()
        .map(|(track, clip)| (track, TimelineItem::Clip(clip)));
    let markers = state
        .selection
        .markers(asset)
        .into_iter()
        .map(|(track, marker)| (track, TimelineItem::Marker(marker)));
    let clip_groups = group_by_track(clips);
    let marker_groups = group_by_track(markers);

    let tracks: Vec<CopiedTrack> = top_level_selected_tracks(state)
        .into_iter()
        .filter_map(|id| {
            let track = asset.track(id)?;
            let tree: Vec<Track> = asset
                .flattened_subtree(id)
                .into_iter()
                .filter_map(|t| asset.track(t).cloned())
                .collect();
            Some(CopiedTrack {
                tree,
                parent: track.parent,
            })
        })
        .collect();

    state.clipboard.copy_items(clip_groups);
    state.clipboard.copy_items(marker_groups);
    for track in tracks {
        state.clipboard.copy_track(track);
    }

    tracing::info!(
        "Copied {} item groups and {} tracks",
        state.clipboard.copied_items().len(),
        state.clipboard.copied_tracks().len()
    );
}

/// Selected tracks of the edited timeline without their selected descendants
pub(crate) fn top_level_selected_tracks(state: &WindowState) -> Vec<TrackId> {
    let Some(asset) = state.asset() else {
        return Vec::new();
    };
    let selected: Vec<TrackId> = state.selection.tracks().filter(|t| asset.contains_track(*t)).collect();
    selected
        .iter()
        .copied()
        .filter(|track| {
            let mut parent = asset.track(*track).and_then(|t| t.parent);
            while let Some(p) = parent {
                if selected.contains(&p) {
                    return false;
                }
                parent = asset.track(p).and_then(|t| t.parent);
            }
            true
        })
        .collect()
}

/// Whether the clipboard can be pasted, at `pointer` or from the keyboard
pub fn can_paste(state: &WindowState, pointer: Option<Pos2>) -> bool {
    let groups = state.clipboard.copied_items();
    if groups.is_empty() {
        return !state.clipboard.copied_tracks().is_empty();
    }
    can_paste_items(state, groups, pointer)
}

fn can_paste_items(state: &WindowState, groups: &[ItemsPerTrack], pointer: Option<Pos2>) -> bool {
    let multiple_tracks = groups.len() > 1;
    let same_asset = groups.iter().all(|g| state.in_edited_asset(g.origin()));
    let any_locked = groups.iter().any(|g| state.project.locked_in_hierarchy(g.origin()));

    // Items from another timeline only go where the pointer says
    if !same_asset && (multiple_tracks || pointer.is_none()) {
        return false;
    }

    let Some(pos) = pointer else {
        return !any_locked;
    };

    if multiple_tracks {
        let under = state.rows.tracks_at(pos);
        return !any_locked && under.first().is_some_and(|t| groups.iter().any(|g| g.origin() == *t));
    }

    pointer_target(state, &groups[0], pos).is_some()
}

/// First unlocked track under `pos` that accepts every item of `group`
fn pointer_target(state: &WindowState, group: &ItemsPerTrack, pos: Pos2) -> Option<TrackId> {
    state.rows.tracks_at(pos).into_iter().find(|id| {
        !state.project.locked_in_hierarchy(*id)
            && state
                .project
                .track(*id)
                .is_some_and(|t| group.items().iter().all(|item| t.accepts(item)))
    })
}

/// Destination for a single-track paste from the keyboard.
///
/// The origin track when it is selected, otherwise the first selected
/// unlocked track accepting every item, otherwise the origin track.
fn find_suitable_parent(state: &WindowState, group: &ItemsPerTrack) -> TrackId {
    let origin = group.origin();
    if state.selection.contains_track(origin) {
        return origin;
    }
    state
        .selection
        .tracks()
        .find(|id| {
            state.in_edited_asset(*id)
                && !state.project.locked_in_hierarchy(*id)
                && state
                    .project
                    .track(*id)
                    .is_some_and(|t| group.items().iter().all(|item| t.accepts(item)))
        })
        .unwrap_or(origin)
}

/// Paste copied items; returns the new item IDs, which become the selection
fn paste_items(state: &mut WindowState, pointer: Option<Pos2>) -> Vec<ItemId> {
    let groups = state.clipboard.copied_items().to_vec();
    if groups.is_empty() {
        return Vec::new();
    }

    let mode = state.edit_mode();
    let created = if let [group] = groups.as_slice() {
        let target = match pointer {
            Some(pos) => pointer_target(state, group, pos),
            None => Some(find_suitable_parent(state, group)),
        };
        let Some(target) = target else {
            return Vec::new();
        };
        let time = state.candidate_time(pointer, &[target]);
        mode.duplicate_items(state, &[(group.clone(), target)], time, "Paste Items")
    } else {
        let targets: Vec<TrackId> = groups.iter().map(ItemsPerTrack::origin).collect();
        let time = state.candidate_time(pointer, &targets);
        let placements: Vec<(ItemsPerTrack, TrackId)> = groups
            .into_iter()
            .map(|g| {
                let origin = g.origin();
                (g, origin)
            })
            .collect();
        mode.duplicate_items(state, &placements, time, "Paste Items")
    };

    if !created.is_empty() {
        state.frame_items(&created);
        state.selection.remove_timeline_selection();
        for id in &created {
            state.selection.add_item(*id);
        }
    }
    created
}

/// Paste copied track trees; returns the new track IDs, roots and descendants
fn paste_tracks(state: &mut WindowState) -> Vec<TrackId> {
    let copied = state.clipboard.copied_tracks().to_vec();
    if copied.is_empty() {
        return Vec::new();
    }

    state.selection.remove_timeline_selection();
    let edit_sequence = state.edit_sequence;
    let mut created = Vec::new();
    for track in copied {
        let parent = track.parent.filter(|p| state.in_edited_asset(*p));
        let Some(asset) = state.asset_mut() else {
            break;
        };
        for id in asset.insert_track_tree(&track.tree, parent) {
            state.undo.register_created(edit_sequence, id, "Paste Tracks");
            state.selection.add_track(id);
            created.push(id);
        }
    }
    created
}

/// Paste items and tracks from the clipboard.
///
/// With a pointer the items land on the track under it; otherwise they go
/// back to their origin track (or a compatible selected track) at the
/// playhead. Returns false when nothing can be pasted.
pub fn paste(state: &mut WindowState, pointer: Option<Pos2>) -> bool {
    if !can_paste(state, pointer) {
        return false;
    }
    let items = paste_items(state, pointer);
    let tracks = paste_tracks(state);
    state.refresh();
    tracing::info!("Pasted {} items and {} tracks", items.len(), tracks.len());
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::{ActionKind, ActionRegistry};
    use crate::item::{Clip, ClipKind};
    use crate::shortcut::Shortcut;
    use crate::rows::{RULER_HEIGHT, TRACK_HEIGHT};
    use crate::timeline::{Project, TimelineAsset};
    use crate::track::TrackKind;

    struct Fixture {
        state: WindowState,
        anim: TrackId,
        audio: TrackId,
        clip: ItemId,
    }

    fn fixture() -> Fixture {
        let mut timeline = TimelineAsset::new("T");
        let mut anim = Track::new("Anim", TrackKind::Animation);
        let clip = anim.add_clip(Clip::new("walk", ClipKind::Animation, 1.0, 2.0));
        let anim = timeline.add_track(anim);
        let audio = timeline.add_track(Track::new("Audio", TrackKind::Audio));
        let id = timeline.id;
        let mut project = Project::new();
        project.add_timeline(timeline);
        let mut state = WindowState::new(project, id);
        state.show_marker_header = false;
        state.refresh();
        Fixture { state, anim, audio, clip }
    }

    /// Fixture with clips copied from both the animation and audio tracks
    /// and a third, empty animation track
    fn two_track_copy() -> (Fixture, TrackId) {
        let mut f = fixture();
        let timeline = f.state.edit_sequence;
        let asset = f.state.project.timeline_mut(timeline).unwrap();
        let spare = asset.add_track(Track::new("Anim 2", TrackKind::Animation));
        let voice = f
            .state
            .project
            .track_mut(f.audio)
            .unwrap()
            .add_clip(Clip::new("voice", ClipKind::Audio, 3.0, 1.0));
        f.state.refresh();

        f.state.selection.add_item(f.clip);
        f.state.selection.add_item(voice);
        copy_selection(&mut f.state);
        assert_eq!(f.state.clipboard.copied_items().len(), 2);
        (f, spare)
    }

    fn row_center(state: &WindowState, track: TrackId, time: f64) -> Pos2 {
        let row = state.rows.row(track).unwrap();
        egui::pos2(state.time_area.time_to_pixel(time), row.rect.center().y)
    }

    #[test]
    fn test_copy_groups_by_track() {
        let mut f = fixture();
        f.state.selection.add_item(f.clip);
        copy_selection(&mut f.state);
        assert_eq!(f.state.clipboard.copied_items().len(), 1);
        assert_eq!(f.state.clipboard.copied_items()[0].origin(), f.anim);
        assert!(f.state.clipboard.copied_tracks().is_empty());
    }

    #[test]
    fn test_copy_shortcut_with_empty_selection_keeps_clipboard() {
        let mut f = fixture();
        f.state.selection.add_item(f.clip);
        copy_selection(&mut f.state);
        f.state.selection.clear();

        let handled = ActionRegistry::shared().route_shortcut(&mut f.state, Shortcut::ctrl(egui::Key::C));
        assert_ne!(handled, Some(ActionKind::Copy));
        assert_eq!(f.state.clipboard.copied_items().len(), 1);
        assert_eq!(f.state.clipboard.copied_items()[0].origin(), f.anim);
    }

    #[test]
    fn test_paste_without_pointer_goes_to_origin_at_playhead() {
        let mut f = fixture();
        f.state.selection.add_item(f.clip);
        copy_selection(&mut f.state);
        f.state.time = 5.0;

        assert!(paste(&mut f.state, None));
        let track = f.state.project.track(f.anim).unwrap();
        assert_eq!(track.clips.len(), 2);
        assert_eq!(track.clips[1].start, 5.0);
        assert!(!f.state.selection.contains_item(f.clip));
        assert!(f.state.selection.contains_item(track.clips[1].id));
    }

    #[test]
    fn test_paste_at_pointer_requires_compatible_track() {
        let mut f = fixture();
        f.state.selection.add_item(f.clip);
        copy_selection(&mut f.state);

        let over_audio = row_center(&f.state, f.audio, 4.0);
        assert!(!can_paste(&f.state, Some(over_audio)));

        let over_anim = row_center(&f.state, f.anim, 4.0);
        assert!(paste(&mut f.state, Some(over_anim)));
        let starts: Vec<f64> = f.state.project.track(f.anim).unwrap().clips.iter().map(|c| c.start).collect();
        assert_eq!(starts.len(), 2);
        assert!((starts[1] - 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_paste_onto_locked_track_is_unavailable() {
        let mut f = fixture();
        f.state.selection.add_item(f.clip);
        copy_selection(&mut f.state);
        f.state.project.track_mut(f.anim).unwrap().locked = true;

        assert!(!can_paste(&f.state, None));
        let over_anim = row_center(&f.state, f.anim, 4.0);
        assert!(!can_paste(&f.state, Some(over_anim)));
        assert!(!paste(&mut f.state, None));
        assert_eq!(f.state.project.track(f.anim).unwrap().clips.len(), 1);
    }

    #[test]
    fn test_paste_from_other_timeline_needs_pointer() {
        let mut f = fixture();
        f.state.selection.add_item(f.clip);
        copy_selection(&mut f.state);

        let mut other = TimelineAsset::new("Other");
        let other_anim = other.add_track(Track::new("Anim", TrackKind::Animation));
        let other_id = f.state.project.add_timeline(other);
        f.state.edit_sequence = other_id;
        f.state.refresh();

        assert!(!can_paste(&f.state, None));
        let pos = egui::pos2(600.0, f.state.rows.rect().top() + RULER_HEIGHT + TRACK_HEIGHT / 2.0);
        assert_eq!(f.state.rows.tracks_at(pos), vec![other_anim]);
        assert!(paste(&mut f.state, Some(pos)));
        assert_eq!(f.state.project.track(other_anim).unwrap().clips.len(), 1);
    }

    #[test]
    fn test_multi_track_paste_from_keyboard_keeps_origins() {
        let (mut f, spare) = two_track_copy();
        f.state.time = 5.0;

        assert!(can_paste(&f.state, None));
        assert!(paste(&mut f.state, None));
        let anim = f.state.project.track(f.anim).unwrap();
        let audio = f.state.project.track(f.audio).unwrap();
        assert_eq!(anim.clips.len(), 2);
        assert_eq!(audio.clips.len(), 2);
        assert!((anim.clips[1].start - 5.0).abs() < 1e-9);
        assert!((audio.clips[1].start - 7.0).abs() < 1e-9);
        assert!(f.state.project.track(spare).unwrap().clips.is_empty());
        assert_eq!(f.state.selection.count(), 2);
    }

    #[test]
    fn test_multi_track_paste_with_locked_origin_is_unavailable() {
        let (mut f, _) = two_track_copy();
        f.state.project.track_mut(f.audio).unwrap().locked = true;

        assert!(!can_paste(&f.state, None));
        let over_anim = row_center(&f.state, f.anim, 4.0);
        assert!(!can_paste(&f.state, Some(over_anim)));
        assert!(!paste(&mut f.state, None));
        assert_eq!(f.state.project.track(f.anim).unwrap().clips.len(), 1);
    }

    #[test]
    fn test_multi_track_paste_needs_pointer_over_origin() {
        let (mut f, spare) = two_track_copy();

        let over_spare = row_center(&f.state, spare, 4.0);
        assert!(!can_paste(&f.state, Some(over_spare)));

        let over_audio = row_center(&f.state, f.audio, 4.0);
        assert!(can_paste(&f.state, Some(over_audio)));
        assert!(paste(&mut f.state, Some(over_audio)));
        assert_eq!(f.state.project.track(f.anim).unwrap().clips.len(), 2);
        assert_eq!(f.state.project.track(f.audio).unwrap().clips.len(), 2);
        assert!(f.state.project.track(spare).unwrap().clips.is_empty());
    }

    #[test]
    fn test_multi_track_paste_into_other_timeline_is_unavailable() {
        let (mut f, _) = two_track_copy();

        let mut other = TimelineAsset::new("Other");
        let other_anim = other.add_track(Track::new("Anim", TrackKind::Animation));
        other.add_track(Track::new("Audio", TrackKind::Audio));
        let other_id = f.state.project.add_timeline(other);
        f.state.edit_sequence = other_id;
        f.state.refresh();

        assert!(!can_paste(&f.state, None));
        let over_anim = row_center(&f.state, other_anim, 4.0);
        assert!(!can_paste(&f.state, Some(over_anim)));
        assert!(!paste(&mut f.state, Some(over_anim)));
        assert!(f.state.project.track(other_anim).unwrap().clips.is_empty());
    }

    #[test]
    fn test_copy_and_paste_track_tree() {
        let mut f = fixture();
        let timeline = f.state.edit_sequence;
        let asset = f.state.project.timeline_mut(timeline).unwrap();
        let group = asset.add_track(Track::new("Group", TrackKind::Group));
        asset.reparent(f.audio, group);
        f.state.refresh();

        f.state.selection.add_track(group);
        f.state.selection.add_track(f.audio);
        copy_selection(&mut f.state);
        assert_eq!(f.state.clipboard.copied_tracks().len(), 1);
        assert_eq!(f.state.clipboard.copied_tracks()[0].tree.len(), 2);

        assert!(paste(&mut f.state, None));
        let asset = f.state.asset().unwrap();
        assert_eq!(asset.root_tracks().len(), 3);
        assert_eq!(f.state.selection.tracks().count(), 2);

        f.state.undo.end_group();
        f.state.undo.undo(&mut f.state.project).unwrap();
        assert_eq!(f.state.asset().unwrap().root_tracks().len(), 2);
    }
}
