// SPDX-License-Identifier: MIT OR Apache-2.0
//! Track definitions for the timeline.

use crate::item::{Clip, ClipKind, ItemContent, ItemId, Marker, TimelineItem};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TrackId(pub Uuid);

impl TrackId {
    /// Create a new random track ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TrackId {
    fn default() -> Self {
        Self::new()
    }
}

/// Type of track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackKind {
    /// Animation clips
    Animation,
    /// Audio clips
    Audio,
    /// Activation windows
    Activation,
    /// Control clips
    Control,
    /// Folder for other tracks
    Group,
    /// The timeline's own marker track
    Markers,
}

impl TrackKind {
    /// Get the display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Animation => "Animation Track",
            Self::Audio => "Audio Track",
            Self::Activation => "Activation Track",
            Self::Control => "Control Track",
            Self::Group => "Track Group",
            Self::Markers => "Markers",
        }
    }

    /// Get the track color
    pub fn color(&self) -> [u8; 3] {
        match self {
            Self::Animation => [100, 150, 255],
            Self::Audio => [255, 200, 100],
            Self::Activation => [150, 255, 100],
            Self::Control => [200, 100, 255],
            Self::Group => [150, 150, 150],
            Self::Markers => [255, 100, 150],
        }
    }

    /// Clip kind accepted by this track, if any
    pub fn clip_kind(&self) -> Option<ClipKind> {
        match self {
            Self::Animation => Some(ClipKind::Animation),
            Self::Audio => Some(ClipKind::Audio),
            Self::Activation => Some(ClipKind::Activation),
            Self::Control => Some(ClipKind::Control),
            Self::Group | Self::Markers => None,
        }
    }

    /// Whether an item with this content may live on a track of this kind
    pub fn accepts(&self, content: ItemContent) -> bool {
        match content {
            ItemContent::Clip(kind) => self.clip_kind() == Some(kind),
            ItemContent::Marker => *self != Self::Group,
        }
    }
}

/// A track in a timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Unique track ID
    pub id: TrackId,
    /// Track name
    pub name: String,
    /// Track type
    pub kind: TrackKind,
    /// Parent group track
    pub parent: Option<TrackId>,
    /// Child tracks, in display order
    pub children: Vec<TrackId>,
    /// Clips, sorted by start
    pub clips: Vec<Clip>,
    /// Markers, sorted by time
    pub markers: Vec<Marker>,
    /// Whether the track is muted
    pub muted: bool,
    /// Whether the track is locked
    pub locked: bool,
    /// Whether a group track hides its children
    pub collapsed: bool,
    /// Track color override
    pub color: Option<[u8; 3]>,
}

impl Track {
    /// Create a new track
    pub fn new(name: impl Into<String>, kind: TrackKind) -> Self {
        Self {
            id: TrackId::new(),
            name: name.into(),
            kind,
            parent: None,
            children: Vec::new(),
            clips: Vec::new(),
            markers: Vec::new(),
            muted: false,
            locked: false,
            collapsed: false,
            color: None,
        }
    }

    /// Add a clip
    pub fn add_clip(&mut self, clip: Clip) -> ItemId {
        let id = clip.id;
        self.clips.push(clip);
        self.sort_clips();
        id
    }

    /// Add a marker
    pub fn add_marker(&mut self, marker: Marker) -> ItemId {
        let id = marker.id;
        self.markers.push(marker);
        self.sort_markers();
        id
    }

    /// Add an item of either kind
    pub fn add_item(&mut self, item: TimelineItem) -> ItemId {
        match item {
            TimelineItem::Clip(c) => self.add_clip(c),
            TimelineItem::Marker(m) => self.add_marker(m),
        }
    }

    /// Remove an item, returning it if it was on this track
    pub fn remove_item(&mut self, item_id: ItemId) -> Option<TimelineItem> {
        if let Some(idx) = self.clips.iter().position(|c| c.id == item_id) {
            return Some(TimelineItem::Clip(self.clips.remove(idx)));
        }
        let idx = self.markers.iter().position(|m| m.id == item_id)?;
        Some(TimelineItem::Marker(self.markers.remove(idx)))
    }

    /// Sort clips by start time
    pub fn sort_clips(&mut self) {
        self.clips.sort_by(|a, b| a.start.total_cmp(&b.start));
    }

    /// Sort markers by time
    pub fn sort_markers(&mut self) {
        self.markers.sort_by(|a, b| a.time.total_cmp(&b.time));
    }

    /// Whether this track owns the item
    pub fn contains(&self, item_id: ItemId) -> bool {
        self.clips.iter().any(|c| c.id == item_id) || self.markers.iter().any(|m| m.id == item_id)
    }

    /// Get a clip by ID
    pub fn clip(&self, item_id: ItemId) -> Option<&Clip> {
        self.clips.iter().find(|c| c.id == item_id)
    }

    /// Get a mutable clip by ID
    pub fn clip_mut(&mut self, item_id: ItemId) -> Option<&mut Clip> {
        self.clips.iter_mut().find(|c| c.id == item_id)
    }

    /// Get a marker by ID
    pub fn marker(&self, item_id: ItemId) -> Option<&Marker> {
        self.markers.iter().find(|m| m.id == item_id)
    }

    /// Get a mutable marker by ID
    pub fn marker_mut(&mut self, item_id: ItemId) -> Option<&mut Marker> {
        self.markers.iter_mut().find(|m| m.id == item_id)
    }

    /// Get an owned copy of an item by ID
    pub fn item(&self, item_id: ItemId) -> Option<TimelineItem> {
        self.clip(item_id)
            .cloned()
            .map(TimelineItem::Clip)
            .or_else(|| self.marker(item_id).cloned().map(TimelineItem::Marker))
    }

    /// All items, clips first then markers
    pub fn items(&self) -> Vec<TimelineItem> {
        self.clips
            .iter()
            .cloned()
            .map(TimelineItem::Clip)
            .chain(self.markers.iter().cloned().map(TimelineItem::Marker))
            .collect()
    }

    /// All items sorted by start time
    pub fn items_by_start(&self) -> Vec<TimelineItem> {
        let mut items = self.items();
        items.sort_by(|a, b| a.start().total_cmp(&b.start()));
        items
    }

    /// Number of items on this track
    pub fn item_count(&self) -> usize {
        self.clips.len() + self.markers.len()
    }

    /// Time range covered by this track's items, `None` when empty
    pub fn item_range(&self) -> Option<(f64, f64)> {
        let starts = self.clips.iter().map(|c| c.start).chain(self.markers.iter().map(|m| m.time));
        let ends = self.clips.iter().map(Clip::end).chain(self.markers.iter().map(|m| m.time));
        let start = starts.fold(None, |acc: Option<f64>, t| Some(acc.map_or(t, |a| a.min(t))))?;
        let end = ends.fold(f64::MIN, f64::max);
        Some((start, end))
    }

    /// End of the rightmost item (0 when empty)
    pub fn end(&self) -> f64 {
        self.item_range().map_or(0.0, |(_, end)| end)
    }

    /// Whether the item content can live on this track
    pub fn accepts(&self, item: &TimelineItem) -> bool {
        self.kind.accepts(item.content())
    }

    /// Get the effective color for this track
    pub fn effective_color(&self) -> [u8; 3] {
        self.color.unwrap_or_else(|| self.kind.color())
    }

    /// Shift every item starting at or after `from` by `delta`
    pub fn offset_items_from(&mut self, from: f64, delta: f64) {
        for clip in self.clips.iter_mut().filter(|c| c.start >= from) {
            clip.start = (clip.start + delta).max(0.0);
        }
        for marker in self.markers.iter_mut().filter(|m| m.time >= from) {
            marker.time = (marker.time + delta).max(0.0);
        }
        self.sort_clips();
        self.sort_markers();
    }
}
