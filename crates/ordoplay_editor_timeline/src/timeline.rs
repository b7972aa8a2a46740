// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timeline assets and the project that holds them.

use crate::binding::{Director, Scene};
use crate::error::{Result, TimelineError};
use crate::item::{ItemId, TimelineItem};
use crate::signals::{SignalAsset, SignalAssetId};
use crate::track::{Track, TrackId, TrackKind};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use uuid::Uuid;

/// Unique identifier for a timeline asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimelineId(pub Uuid);

impl TimelineId {
    /// Create a new random timeline ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TimelineId {
    fn default() -> Self {
        Self::new()
    }
}

/// A timeline asset: a tree of tracks holding clips and markers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineAsset {
    /// Unique timeline ID
    pub id: TimelineId,
    /// Timeline name
    pub name: String,
    /// All tracks, keyed by ID
    tracks: IndexMap<TrackId, Track>,
    /// Top-level tracks in display order
    root_tracks: Vec<TrackId>,
    /// Track holding timeline-level markers
    pub marker_track: Option<TrackId>,
    /// Fixed duration; content duration is used when unset
    pub fixed_duration: Option<f64>,
    /// Frame rate
    pub frame_rate: f64,
}

impl TimelineAsset {
    /// Create a new timeline
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: TimelineId::new(),
            name: name.into(),
            tracks: IndexMap::new(),
            root_tracks: Vec::new(),
            marker_track: None,
            fixed_duration: None,
            frame_rate: 30.0,
        }
    }

    /// Add a top-level track
    pub fn add_track(&mut self, mut track: Track) -> TrackId {
        let id = track.id;
        track.parent = None;
        self.tracks.insert(id, track);
        self.root_tracks.push(id);
        id
    }

    /// Add a track under a group track. Falls back to top level when the parent is unknown.
    pub fn add_child_track(&mut self, parent: TrackId, mut track: Track) -> TrackId {
        let Some(parent_track) = self.tracks.get_mut(&parent) else {
            return self.add_track(track);
        };
        let id = track.id;
        parent_track.children.push(id);
        track.parent = Some(parent);
        self.tracks.insert(id, track);
        id
    }

    /// Move an existing track under `parent`
    pub fn reparent(&mut self, track_id: TrackId, parent: TrackId) -> bool {
        if track_id == parent || !self.tracks.contains_key(&parent) {
            return false;
        }
        let Some(old_parent) = self.tracks.get(&track_id).map(|t| t.parent) else {
            return false;
        };
        self.detach(track_id, old_parent);
        if let Some(p) = self.tracks.get_mut(&parent) {
            p.children.push(track_id);
        }
        if let Some(t) = self.tracks.get_mut(&track_id) {
            t.parent = Some(parent);
        }
        true
    }

    fn detach(&mut self, track_id: TrackId, parent: Option<TrackId>) {
        match parent.and_then(|p| self.tracks.get_mut(&p)) {
            Some(p) => p.children.retain(|c| *c != track_id),
            None => self.root_tracks.retain(|c| *c != track_id),
        }
    }

    /// Create the marker track if missing and return it
    pub fn ensure_marker_track(&mut self) -> TrackId {
        if let Some(id) = self.marker_track {
            return id;
        }
        let track = Track::new("Markers", TrackKind::Markers);
        let id = track.id;
        self.tracks.insert(id, track);
        self.marker_track = Some(id);
        id
    }

    /// Remove a track and all of its descendants
    pub fn remove_track(&mut self, track_id: TrackId) -> Vec<Track> {
        let Some(parent) = self.tracks.get(&track_id).map(|t| t.parent) else {
            return Vec::new();
        };
        self.detach(track_id, parent);
        if self.marker_track == Some(track_id) {
            self.marker_track = None;
        }

        let mut removed = Vec::new();
        for id in self.flattened_subtree(track_id) {
            if let Some(track) = self.tracks.shift_remove(&id) {
                removed.push(track);
            }
        }
        removed
    }

    /// Put a track back exactly as it was, keeping its ID and parent link
    pub fn restore_track(&mut self, track: Track) {
        let id = track.id;
        let parent = track.parent;
        let exists = self.tracks.contains_key(&id);
        self.tracks.insert(id, track);
        if exists || self.marker_track == Some(id) {
            return;
        }
        if let Some(TrackKind::Markers) = self.tracks.get(&id).map(|t| t.kind) {
            self.marker_track = Some(id);
            return;
        }
        match parent {
            // A parent restored later brings its own child list
            Some(p) => {
                if let Some(p) = self.tracks.get_mut(&p) {
                    if !p.children.contains(&id) {
                        p.children.push(id);
                    }
                }
            }
            None => self.root_tracks.push(id),
        }
    }

    /// Get a track
    pub fn track(&self, track_id: TrackId) -> Option<&Track> {
        self.tracks.get(&track_id)
    }

    /// Get a mutable track
    pub fn track_mut(&mut self, track_id: TrackId) -> Option<&mut Track> {
        self.tracks.get_mut(&track_id)
    }

    /// Whether this timeline owns the track
    pub fn contains_track(&self, track_id: TrackId) -> bool {
        self.tracks.contains_key(&track_id)
    }

    /// Get all tracks, in insertion order
    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.tracks.values()
    }

    /// Get track count
    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Top-level tracks in display order
    pub fn root_tracks(&self) -> &[TrackId] {
        &self.root_tracks
    }

    /// The track and all its descendants, depth first
    pub fn flattened_subtree(&self, track_id: TrackId) -> Vec<TrackId> {
        let mut out = Vec::new();
        let mut stack = vec![track_id];
        while let Some(id) = stack.pop() {
            let Some(track) = self.tracks.get(&id) else {
                continue;
            };
            out.push(id);
            stack.extend(track.children.iter().rev().copied());
        }
        out
    }

    /// All tracks in display order, ignoring collapse state (marker track excluded)
    pub fn display_order(&self) -> Vec<TrackId> {
        self.root_tracks
            .iter()
            .flat_map(|root| self.flattened_subtree(*root))
            .collect()
    }

    /// Tracks visible in the tree view: children of collapsed groups are hidden
    pub fn visible_tracks(&self) -> Vec<TrackId> {
        let mut out = Vec::new();
        let mut stack: Vec<TrackId> = self.root_tracks.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let Some(track) = self.tracks.get(&id) else {
                continue;
            };
            out.push(id);
            if !track.collapsed {
                stack.extend(track.children.iter().rev().copied());
            }
        }
        out
    }

    /// Whether the track or one of its ancestors is locked
    pub fn locked_in_hierarchy(&self, track_id: TrackId) -> bool {
        let mut current = self.tracks.get(&track_id);
        while let Some(track) = current {
            if track.locked {
                return true;
            }
            current = track.parent.and_then(|p| self.tracks.get(&p));
        }
        false
    }

    /// Find the track owning an item
    pub fn item_parent(&self, item_id: ItemId) -> Option<TrackId> {
        self.tracks.values().find(|t| t.contains(item_id)).map(|t| t.id)
    }

    /// Find an item and its track
    pub fn find_item(&self, item_id: ItemId) -> Option<(TrackId, TimelineItem)> {
        self.tracks
            .values()
            .find_map(|t| t.item(item_id).map(|item| (t.id, item)))
    }

    /// End of the rightmost item on any track
    pub fn content_duration(&self) -> f64 {
        self.tracks.values().map(Track::end).fold(0.0, f64::max)
    }

    /// Timeline duration
    pub fn duration(&self) -> f64 {
        self.fixed_duration.unwrap_or_else(|| self.content_duration())
    }

    /// Insert a copy of a track tree (root first) under fresh IDs.
    ///
    /// Returns the IDs of the new tracks, root first.
    pub fn insert_track_tree(&mut self, tree: &[Track], parent: Option<TrackId>) -> Vec<TrackId> {
        let Some(root) = tree.first() else {
            return Vec::new();
        };

        let remap: HashMap<TrackId, TrackId> = tree.iter().map(|t| (t.id, TrackId::new())).collect();
        let mut created = Vec::with_capacity(tree.len());

        for source in tree {
            let mut track = source.clone();
            track.id = remap[&source.id];
            track.parent = source.parent.and_then(|p| remap.get(&p).copied());
            track.children = source.children.iter().filter_map(|c| remap.get(c).copied()).collect();
            for clip in &mut track.clips {
                clip.id = ItemId::new();
            }
            for marker in &mut track.markers {
                marker.id = ItemId::new();
            }
            created.push(track.id);

            if source.id == root.id {
                track.parent = None;
                match parent {
                    Some(p) if self.tracks.contains_key(&p) => {
                        self.add_child_track(p, track);
                    }
                    _ => {
                        self.add_track(track);
                    }
                }
            } else {
                self.tracks.insert(track.id, track);
            }
        }

        created
    }

    /// Convert time to frame number
    pub fn time_to_frame(&self, time: f64) -> i64 {
        (time * self.frame_rate).round() as i64
    }

    /// Convert frame number to time
    pub fn frame_to_time(&self, frame: i64) -> f64 {
        frame as f64 / self.frame_rate
    }
}

impl Default for TimelineAsset {
    fn default() -> Self {
        Self::new("Untitled Timeline")
    }
}

/// All editable content: timelines, signal assets and the scene they drive
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Project {
    /// Timeline assets
    pub timelines: IndexMap<TimelineId, TimelineAsset>,
    /// Signal assets available to emitters
    pub signal_assets: IndexMap<SignalAssetId, SignalAsset>,
    /// Scene objects
    pub scene: Scene,
    /// Director per timeline (bindings from tracks to scene objects)
    pub directors: IndexMap<TimelineId, Director>,
}

impl Project {
    /// Create an empty project
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a timeline
    pub fn add_timeline(&mut self, timeline: TimelineAsset) -> TimelineId {
        let id = timeline.id;
        self.timelines.insert(id, timeline);
        id
    }

    /// Get a timeline
    pub fn timeline(&self, id: TimelineId) -> Option<&TimelineAsset> {
        self.timelines.get(&id)
    }

    /// Get a mutable timeline
    pub fn timeline_mut(&mut self, id: TimelineId) -> Option<&mut TimelineAsset> {
        self.timelines.get_mut(&id)
    }

    /// Timeline owning a track
    pub fn timeline_of_track(&self, track_id: TrackId) -> Option<TimelineId> {
        self.timelines
            .values()
            .find(|t| t.contains_track(track_id))
            .map(|t| t.id)
    }

    /// Get a track from any timeline
    pub fn track(&self, track_id: TrackId) -> Option<&Track> {
        self.timelines.values().find_map(|t| t.track(track_id))
    }

    /// Get a mutable track from any timeline
    pub fn track_mut(&mut self, track_id: TrackId) -> Option<&mut Track> {
        self.timelines.values_mut().find_map(|t| t.track_mut(track_id))
    }

    /// Whether a track, wherever it lives, is locked in its hierarchy
    pub fn locked_in_hierarchy(&self, track_id: TrackId) -> bool {
        self.timelines
            .values()
            .find(|t| t.contains_track(track_id))
            .is_some_and(|t| t.locked_in_hierarchy(track_id))
    }

    /// Find an item and its track in any timeline
    pub fn find_item(&self, item_id: ItemId) -> Option<(TrackId, TimelineItem)> {
        self.timelines.values().find_map(|t| t.find_item(item_id))
    }

    /// Register a signal asset
    pub fn add_signal_asset(&mut self, asset: SignalAsset) -> SignalAssetId {
        let id = asset.id;
        self.signal_assets.insert(id, asset);
        id
    }

    /// Parse a project from RON
    pub fn from_ron(source: &str) -> Result<Self> {
        Ok(ron::from_str(source)?)
    }

    /// Serialize the project to pretty RON
    pub fn to_ron(&self) -> Result<String> {
        Ok(ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?)
    }

    /// Load a project file
    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path).map_err(|source| TimelineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron(&source)
    }

    /// Save the project to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let ron = self.to_ron()?;
        std::fs::write(path, ron).map_err(|source| TimelineError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{Clip, ClipKind};

    fn group_with_child() -> (TimelineAsset, TrackId, TrackId) {
        let mut timeline = TimelineAsset::new("Test");
        let group = timeline.add_track(Track::new("Group", TrackKind::Group));
        let child = timeline.add_child_track(group, Track::new("Anim", TrackKind::Animation));
        (timeline, group, child)
    }

    #[test]
    fn test_lock_inherited_from_parent() {
        let (mut timeline, group, child) = group_with_child();
        assert!(!timeline.locked_in_hierarchy(child));
        timeline.track_mut(group).unwrap().locked = true;
        assert!(timeline.locked_in_hierarchy(child));
    }

    #[test]
    fn test_collapsed_group_hides_children() {
        let (mut timeline, group, child) = group_with_child();
        let other = timeline.add_track(Track::new("Audio", TrackKind::Audio));
        assert_eq!(timeline.visible_tracks(), vec![group, child, other]);

        timeline.track_mut(group).unwrap().collapsed = true;
        assert_eq!(timeline.visible_tracks(), vec![group, other]);
        assert_eq!(timeline.display_order(), vec![group, child, other]);
    }

    #[test]
    fn test_remove_track_removes_descendants() {
        let (mut timeline, group, child) = group_with_child();
        let removed = timeline.remove_track(group);
        assert_eq!(removed.len(), 2);
        assert!(!timeline.contains_track(child));
        assert!(timeline.root_tracks().is_empty());
    }

    #[test]
    fn test_restore_track_relinks_parent() {
        let (mut timeline, group, child) = group_with_child();
        let removed = timeline.remove_track(child);
        assert!(timeline.track(group).unwrap().children.is_empty());

        for track in removed {
            timeline.restore_track(track);
        }
        assert_eq!(timeline.track(group).unwrap().children, vec![child]);
    }

    #[test]
    fn test_insert_track_tree_uses_fresh_ids() {
        let (mut timeline, group, child) = group_with_child();
        timeline
            .track_mut(child)
            .unwrap()
            .add_clip(Clip::new("a", ClipKind::Animation, 0.0, 1.0));

        let tree: Vec<Track> = timeline
            .flattened_subtree(group)
            .into_iter()
            .map(|id| timeline.track(id).unwrap().clone())
            .collect();
        let created = timeline.insert_track_tree(&tree, None);

        assert_eq!(created.len(), 2);
        assert_eq!(timeline.track_count(), 4);
        let new_group = timeline.track(created[0]).unwrap();
        assert_eq!(new_group.children, vec![created[1]]);
        let new_child = timeline.track(created[1]).unwrap();
        assert_eq!(new_child.parent, Some(created[0]));
        assert_ne!(new_child.clips[0].id, timeline.track(child).unwrap().clips[0].id);
    }

    #[test]
    fn test_project_ron_round_trip() {
        let mut project = Project::new();
        let (timeline, _, child) = group_with_child();
        let id = project.add_timeline(timeline);

        let ron = project.to_ron().unwrap();
        let loaded = Project::from_ron(&ron).unwrap();
        assert_eq!(loaded.timeline_of_track(child), Some(id));
    }
}
