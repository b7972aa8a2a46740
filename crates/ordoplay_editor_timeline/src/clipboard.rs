// SPDX-License-Identifier: MIT OR Apache-2.0
//! Clipboard holding copied items and tracks.

use crate::item::TimelineItem;
use crate::track::{Track, TrackId};

/// Items that shared one origin track when they were copied
#[derive(Debug, Clone, PartialEq)]
pub struct ItemsPerTrack {
    origin: TrackId,
    items: Vec<TimelineItem>,
}

impl ItemsPerTrack {
    /// Create a group of items copied from `origin`
    pub fn new(origin: TrackId, items: Vec<TimelineItem>) -> Self {
        Self { origin, items }
    }

    /// Track the items belonged to at copy time
    pub fn origin(&self) -> TrackId {
        self.origin
    }

    /// Copied items
    pub fn items(&self) -> &[TimelineItem] {
        &self.items
    }

    /// Item with the earliest start
    pub fn leftmost_item(&self) -> Option<&TimelineItem> {
        self.items.iter().min_by(|a, b| a.start().total_cmp(&b.start()))
    }

    /// Earliest start among the items
    pub fn start(&self) -> Option<f64> {
        self.leftmost_item().map(TimelineItem::start)
    }

    fn extend(&mut self, items: impl IntoIterator<Item = TimelineItem>) {
        for item in items {
            if !self.items.iter().any(|i| i.id() == item.id()) {
                self.items.push(item);
            }
        }
    }
}

/// Group `(track, item)` pairs by track, keeping first-seen order
pub fn group_by_track(items: impl IntoIterator<Item = (TrackId, TimelineItem)>) -> Vec<ItemsPerTrack> {
    let mut groups: Vec<ItemsPerTrack> = Vec::new();
    for (track, item) in items {
        match groups.iter_mut().find(|g| g.origin == track) {
            Some(group) => group.extend([item]),
            None => groups.push(ItemsPerTrack::new(track, vec![item])),
        }
    }
    groups
}

/// A copied track tree with the parent it was attached to
#[derive(Debug, Clone, PartialEq)]
pub struct CopiedTrack {
    /// The track followed by its descendants
    pub tree: Vec<Track>,
    /// Parent group at copy time
    pub parent: Option<TrackId>,
}

impl CopiedTrack {
    /// Root of the copied tree
    pub fn root(&self) -> Option<&Track> {
        self.tree.first()
    }
}

/// Clipboard contents
#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    items: Vec<ItemsPerTrack>,
    tracks: Vec<CopiedTrack>,
}

impl Clipboard {
    /// Create an empty clipboard
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove everything
    pub fn clear(&mut self) {
        self.items.clear();
        self.tracks.clear();
    }

    /// Add copied items; groups with an origin already present are merged
    pub fn copy_items(&mut self, groups: impl IntoIterator<Item = ItemsPerTrack>) {
        for group in groups {
            match self.items.iter_mut().find(|g| g.origin == group.origin) {
                Some(existing) => existing.extend(group.items),
                None => self.items.push(group),
            }
        }
    }

    /// Add a copied track tree
    pub fn copy_track(&mut self, track: CopiedTrack) {
        self.tracks.push(track);
    }

    /// Copied item groups
    pub fn copied_items(&self) -> &[ItemsPerTrack] {
        &self.items
    }

    /// Copied tracks
    pub fn copied_tracks(&self) -> &[CopiedTrack] {
        &self.tracks
    }

    /// Whether nothing was copied
    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.tracks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{Clip, ClipKind, Marker, MarkerKind};

    fn clip(start: f64) -> TimelineItem {
        TimelineItem::Clip(Clip::new("c", ClipKind::Animation, start, 1.0))
    }

    #[test]
    fn test_group_by_track_preserves_order() {
        let a = TrackId::new();
        let b = TrackId::new();
        let groups = group_by_track([(b, clip(0.0)), (a, clip(1.0)), (b, clip(2.0))]);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].origin(), b);
        assert_eq!(groups[0].items().len(), 2);
        assert_eq!(groups[1].origin(), a);
    }

    #[test]
    fn test_clips_and_markers_from_one_track_share_a_group() {
        let track = TrackId::new();
        let mut clipboard = Clipboard::new();
        clipboard.copy_items(group_by_track([(track, clip(3.0))]));
        let marker = TimelineItem::Marker(Marker::new(1.0, MarkerKind::Annotation(String::new())));
        clipboard.copy_items(group_by_track([(track, marker)]));

        assert_eq!(clipboard.copied_items().len(), 1);
        assert_eq!(clipboard.copied_items()[0].start(), Some(1.0));
    }

    #[test]
    fn test_clear() {
        let mut clipboard = Clipboard::new();
        clipboard.copy_items(group_by_track([(TrackId::new(), clip(0.0))]));
        clipboard.copy_track(CopiedTrack {
            tree: vec![Track::new("t", crate::track::TrackKind::Audio)],
            parent: None,
        });
        assert!(!clipboard.is_empty());
        clipboard.clear();
        assert!(clipboard.is_empty());
    }
}
