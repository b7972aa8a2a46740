// SPDX-License-Identifier: MIT OR Apache-2.0
//! Marker creation, deletion and cloning.

use crate::item::{ItemId, Marker, MarkerKind, TimelineItem};
use crate::state::WindowState;
use crate::track::TrackId;

/// Add a marker of `kind` at `time` and select it.
///
/// The marker is named after its kind. Returns `None` when the track is
/// missing, locked or does not hold markers.
pub fn create_marker_at_time(state: &mut WindowState, track: TrackId, kind: MarkerKind, time: f64) -> Option<ItemId> {
    let marker = Marker::new(time.max(0.0), kind);
    if state.project.locked_in_hierarchy(track) {
        return None;
    }
    if !state
        .project
        .track(track)?
        .accepts(&TimelineItem::Marker(marker.clone()))
    {
        return None;
    }

    if let Err(err) = state.undo.push_undo(&state.project, track, "Add Marker") {
        tracing::warn!("Could not record undo for Add Marker: {}", err);
    }
    let id = state.project.track_mut(track)?.add_marker(marker);
    state.selection.add_item(id);
    tracing::debug!("Created marker at {:.3}s", time);
    Some(id)
}

/// Remove a marker from the selection and from its track
pub fn delete_marker(state: &mut WindowState, marker: ItemId) -> bool {
    state.selection.remove_item(marker);
    let Some((track, item)) = state.project.find_item(marker) else {
        return false;
    };
    if item.is_clip() {
        return false;
    }
    if let Err(err) = state.undo.push_undo(&state.project, track, "Delete Marker") {
        tracing::warn!("Could not record undo for Delete Marker: {}", err);
    }
    state
        .project
        .track_mut(track)
        .and_then(|t| t.remove_item(marker))
        .is_some()
}

/// Clone markers onto `track`, keeping names and times.
///
/// Returns the IDs of the clones. Unknown IDs and clips are ignored.
pub fn clone_markers_to_parent(state: &mut WindowState, markers: &[ItemId], track: TrackId) -> Vec<ItemId> {
    let clones: Vec<Marker> = markers
        .iter()
        .filter_map(|id| state.project.find_item(*id))
        .filter_map(|(_, item)| match item {
            TimelineItem::Marker(marker) => Some(Marker {
                id: ItemId::new(),
                ..marker
            }),
            TimelineItem::Clip(_) => None,
        })
        .collect();
    if clones.is_empty() || state.project.track(track).is_none() {
        return Vec::new();
    }

    if let Err(err) = state.undo.push_undo(&state.project, track, "Duplicate Markers") {
        tracing::warn!("Could not record undo for Duplicate Markers: {}", err);
    }
    let Some(destination) = state.project.track_mut(track) else {
        return Vec::new();
    };
    clones.into_iter().map(|m| destination.add_marker(m)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::SignalEmitter;
    use crate::timeline::{Project, TimelineAsset};
    use crate::track::{Track, TrackKind};

    fn state() -> (WindowState, TrackId, TrackId) {
        let mut timeline = TimelineAsset::new("T");
        let anim = timeline.add_track(Track::new("Anim", TrackKind::Animation));
        let group = timeline.add_track(Track::new("Group", TrackKind::Group));
        let id = timeline.id;
        let mut project = Project::new();
        project.add_timeline(timeline);
        (WindowState::new(project, id), anim, group)
    }

    #[test]
    fn test_create_marker_named_after_kind() {
        let (mut state, anim, _) = state();
        let id = create_marker_at_time(&mut state, anim, MarkerKind::SignalEmitter(SignalEmitter::default()), 2.0)
            .unwrap();
        let marker = state.project.track(anim).unwrap().marker(id).unwrap();
        assert_eq!(marker.name, "Signal Emitter");
        assert!(state.selection.contains_item(id));
    }

    #[test]
    fn test_group_track_rejects_markers() {
        let (mut state, _, group) = state();
        assert!(create_marker_at_time(&mut state, group, MarkerKind::Annotation("x".into()), 1.0).is_none());
    }

    #[test]
    fn test_delete_marker() {
        let (mut state, anim, _) = state();
        let id = create_marker_at_time(&mut state, anim, MarkerKind::Annotation("x".into()), 1.0).unwrap();
        assert!(delete_marker(&mut state, id));
        assert!(!state.selection.contains_item(id));
        assert!(state.project.track(anim).unwrap().markers.is_empty());
        assert!(!delete_marker(&mut state, id));
    }

    #[test]
    fn test_clone_markers_keeps_names() {
        let (mut state, anim, _) = state();
        let markers_track = state.asset_mut().unwrap().ensure_marker_track();
        let id = create_marker_at_time(&mut state, anim, MarkerKind::Annotation("cue".into()), 3.0).unwrap();
        state.project.track_mut(anim).unwrap().marker_mut(id).unwrap().name = "Cue".into();

        let clones = clone_markers_to_parent(&mut state, &[id], markers_track);
        assert_eq!(clones.len(), 1);
        let clone = state.project.track(markers_track).unwrap().marker(clones[0]).unwrap();
        assert_eq!(clone.name, "Cue");
        assert_eq!(clone.time, 3.0);
        assert_ne!(clones[0], id);
    }
}
