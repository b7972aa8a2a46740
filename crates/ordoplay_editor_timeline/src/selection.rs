// SPDX-License-Identifier: MIT OR Apache-2.0
//! Selection of tracks and items.

use crate::item::{Clip, ItemId, Marker, TimelineItem};
use crate::timeline::TimelineAsset;
use crate::track::TrackId;
use indexmap::IndexSet;

/// Selected tracks and items, in selection order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    tracks: IndexSet<TrackId>,
    items: IndexSet<ItemId>,
}

impl Selection {
    /// Create an empty selection
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a track
    pub fn add_track(&mut self, track: TrackId) {
        self.tracks.insert(track);
    }

    /// Add an item
    pub fn add_item(&mut self, item: ItemId) {
        self.items.insert(item);
    }

    /// Remove a track
    pub fn remove_track(&mut self, track: TrackId) {
        self.tracks.shift_remove(&track);
    }

    /// Remove an item
    pub fn remove_item(&mut self, item: ItemId) {
        self.items.shift_remove(&item);
    }

    /// Select only this track
    pub fn select_only_track(&mut self, track: TrackId) {
        self.clear();
        self.add_track(track);
    }

    /// Select only this item
    pub fn select_only_item(&mut self, item: ItemId) {
        self.clear();
        self.add_item(item);
    }

    /// Clear everything
    pub fn clear(&mut self) {
        self.tracks.clear();
        self.items.clear();
    }

    /// Clear tracks and items selected in the timeline
    pub fn remove_timeline_selection(&mut self) {
        self.clear();
    }

    /// Clear item selection but keep tracks
    pub fn clear_items(&mut self) {
        self.items.clear();
    }

    /// Whether the track is selected
    pub fn contains_track(&self, track: TrackId) -> bool {
        self.tracks.contains(&track)
    }

    /// Whether the item is selected
    pub fn contains_item(&self, item: ItemId) -> bool {
        self.items.contains(&item)
    }

    /// Number of selected tracks and items
    pub fn count(&self) -> usize {
        self.tracks.len() + self.items.len()
    }

    /// Whether nothing is selected
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Selected tracks
    pub fn tracks(&self) -> impl Iterator<Item = TrackId> + '_ {
        self.tracks.iter().copied()
    }

    /// Selected item IDs
    pub fn item_ids(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.items.iter().copied()
    }

    /// Selected items that live in `timeline`, with their parent track
    pub fn items(&self, timeline: &TimelineAsset) -> Vec<(TrackId, TimelineItem)> {
        self.items.iter().filter_map(|id| timeline.find_item(*id)).collect()
    }

    /// Selected clips that live in `timeline`, with their parent track
    pub fn clips(&self, timeline: &TimelineAsset) -> Vec<(TrackId, Clip)> {
        self.items(timeline)
            .into_iter()
            .filter_map(|(track, item)| match item {
                TimelineItem::Clip(c) => Some((track, c)),
                TimelineItem::Marker(_) => None,
            })
            .collect()
    }

    /// Selected markers that live in `timeline`, with their parent track
    pub fn markers(&self, timeline: &TimelineAsset) -> Vec<(TrackId, Marker)> {
        self.items(timeline)
            .into_iter()
            .filter_map(|(track, item)| match item {
                TimelineItem::Marker(m) => Some((track, m)),
                TimelineItem::Clip(_) => None,
            })
            .collect()
    }

    /// Drop entries that no longer exist in `timeline`
    pub fn prune(&mut self, timeline: &TimelineAsset) {
        self.tracks.retain(|t| timeline.contains_track(*t));
        self.items.retain(|i| timeline.item_parent(*i).is_some());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{ClipKind, MarkerKind};
    use crate::track::{Track, TrackKind};

    #[test]
    fn test_queries_by_kind() {
        let mut timeline = TimelineAsset::new("T");
        let mut track = Track::new("Anim", TrackKind::Animation);
        let clip = track.add_clip(Clip::new("a", ClipKind::Animation, 0.0, 1.0));
        let marker = track.add_marker(Marker::new(2.0, MarkerKind::Annotation(String::new())));
        let track_id = timeline.add_track(track);

        let mut selection = Selection::new();
        selection.add_item(clip);
        selection.add_item(marker);
        selection.add_track(track_id);

        assert_eq!(selection.count(), 3);
        assert_eq!(selection.clips(&timeline).len(), 1);
        assert_eq!(selection.markers(&timeline).len(), 1);
        assert_eq!(selection.items(&timeline)[0].0, track_id);
    }

    #[test]
    fn test_select_only_replaces() {
        let mut selection = Selection::new();
        selection.add_track(TrackId::new());
        let item = ItemId::new();
        selection.select_only_item(item);
        assert_eq!(selection.count(), 1);
        assert!(selection.contains_item(item));
    }

    #[test]
    fn test_prune_drops_missing_entries() {
        let timeline = TimelineAsset::new("T");
        let mut selection = Selection::new();
        selection.add_item(ItemId::new());
        selection.add_track(TrackId::new());
        selection.prune(&timeline);
        assert!(selection.is_empty());
    }
}
