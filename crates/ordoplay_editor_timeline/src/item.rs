// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timeline items: clips and markers.

use crate::signals::SignalEmitter;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a clip or marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(pub Uuid);

impl ItemId {
    /// Create a new random item ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

/// Kind of playable content a clip references
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClipKind {
    /// Animation clip
    Animation,
    /// Audio clip
    Audio,
    /// Activation window for an object
    Activation,
    /// Nested timeline or particle control
    Control,
}

impl ClipKind {
    /// Get the display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Animation => "Animation Clip",
            Self::Audio => "Audio Clip",
            Self::Activation => "Active",
            Self::Control => "Control Clip",
        }
    }
}

/// A time-ranged item referencing playable content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    /// Unique clip ID
    pub id: ItemId,
    /// Clip name
    pub name: String,
    /// Content kind
    pub kind: ClipKind,
    /// Start time on the track (seconds)
    pub start: f64,
    /// Duration on the track (seconds)
    pub duration: f64,
    /// Offset into the source content
    pub clip_in: f64,
    /// Length of the source content, when known
    pub asset_duration: Option<f64>,
}

impl Clip {
    /// Create a new clip
    pub fn new(name: impl Into<String>, kind: ClipKind, start: f64, duration: f64) -> Self {
        Self {
            id: ItemId::new(),
            name: name.into(),
            kind,
            start,
            duration: duration.max(0.0),
            clip_in: 0.0,
            asset_duration: None,
        }
    }

    /// Set the source content length
    pub fn with_asset_duration(mut self, asset_duration: f64) -> Self {
        self.asset_duration = Some(asset_duration);
        self
    }

    /// End time on the track
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    /// Whether the source length is known and usable for Match Content
    pub fn has_usable_asset_duration(&self) -> bool {
        self.asset_duration
            .is_some_and(|d| d.is_finite() && d > self.clip_in)
    }
}

/// Kind of point-in-time annotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MarkerKind {
    /// Emits a signal to receivers on the bound object
    SignalEmitter(SignalEmitter),
    /// Free-form annotation
    Annotation(String),
}

impl MarkerKind {
    /// Get the display name used when naming new markers
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::SignalEmitter(_) => "Signal Emitter",
            Self::Annotation(_) => "Annotation",
        }
    }
}

/// A point-in-time annotation on a track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    /// Unique marker ID
    pub id: ItemId,
    /// Marker name
    pub name: String,
    /// Time of the marker
    pub time: f64,
    /// Marker payload
    pub kind: MarkerKind,
}

impl Marker {
    /// Create a new marker
    pub fn new(time: f64, kind: MarkerKind) -> Self {
        Self {
            id: ItemId::new(),
            name: kind.display_name().to_string(),
            time,
            kind,
        }
    }

    /// Signal emitter payload, if this marker is one
    pub fn as_signal_emitter(&self) -> Option<&SignalEmitter> {
        match &self.kind {
            MarkerKind::SignalEmitter(emitter) => Some(emitter),
            MarkerKind::Annotation(_) => None,
        }
    }

    /// Mutable signal emitter payload
    pub fn as_signal_emitter_mut(&mut self) -> Option<&mut SignalEmitter> {
        match &mut self.kind {
            MarkerKind::SignalEmitter(emitter) => Some(emitter),
            MarkerKind::Annotation(_) => None,
        }
    }
}

/// Capability tag used for track compatibility checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemContent {
    /// A clip of the given kind
    Clip(ClipKind),
    /// Any marker
    Marker,
}

/// A clip or a marker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TimelineItem {
    /// Clip
    Clip(Clip),
    /// Marker
    Marker(Marker),
}

impl TimelineItem {
    /// Item ID
    pub fn id(&self) -> ItemId {
        match self {
            Self::Clip(c) => c.id,
            Self::Marker(m) => m.id,
        }
    }

    /// Start time
    pub fn start(&self) -> f64 {
        match self {
            Self::Clip(c) => c.start,
            Self::Marker(m) => m.time,
        }
    }

    /// End time (equal to start for markers)
    pub fn end(&self) -> f64 {
        match self {
            Self::Clip(c) => c.end(),
            Self::Marker(m) => m.time,
        }
    }

    /// Move the item so it starts at `time`
    pub fn set_start(&mut self, time: f64) {
        match self {
            Self::Clip(c) => c.start = time,
            Self::Marker(m) => m.time = time,
        }
    }

    /// Capability tag
    pub fn content(&self) -> ItemContent {
        match self {
            Self::Clip(c) => ItemContent::Clip(c.kind),
            Self::Marker(_) => ItemContent::Marker,
        }
    }

    /// Whether this is a clip
    pub fn is_clip(&self) -> bool {
        matches!(self, Self::Clip(_))
    }

    /// Copy of this item under a fresh ID
    pub fn cloned_with_new_id(&self) -> Self {
        let mut copy = self.clone();
        match &mut copy {
            Self::Clip(c) => c.id = ItemId::new(),
            Self::Marker(m) => m.id = ItemId::new(),
        }
        copy
    }
}

/// Item times compared at the resolution of discrete timeline ticks
pub(crate) fn same_time(a: f64, b: f64) -> bool {
    const TICK: f64 = 1e-12;
    (a / TICK).round() == (b / TICK).round()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_end_and_content() {
        let clip = Clip::new("Walk", ClipKind::Animation, 2.0, 3.0);
        assert_eq!(clip.end(), 5.0);
        let item = TimelineItem::Clip(clip);
        assert_eq!(item.content(), ItemContent::Clip(ClipKind::Animation));
        assert!(item.is_clip());
    }

    #[test]
    fn test_marker_named_after_kind() {
        let marker = Marker::new(1.5, MarkerKind::Annotation("cue".into()));
        assert_eq!(marker.name, "Annotation");
        let item = TimelineItem::Marker(marker);
        assert_eq!(item.start(), item.end());
    }

    #[test]
    fn test_clone_gets_new_id() {
        let item = TimelineItem::Clip(Clip::new("A", ClipKind::Audio, 0.0, 1.0));
        let copy = item.cloned_with_new_id();
        assert_ne!(item.id(), copy.id());
        assert_eq!(item.start(), copy.start());
    }

    #[test]
    fn test_usable_asset_duration() {
        let mut clip = Clip::new("A", ClipKind::Audio, 0.0, 1.0);
        assert!(!clip.has_usable_asset_duration());
        clip.asset_duration = Some(4.0);
        assert!(clip.has_usable_asset_duration());
        clip.clip_in = 5.0;
        assert!(!clip.has_usable_asset_duration());
    }

    #[test]
    fn test_same_time_tolerance() {
        assert!(same_time(1.0, 1.0 + 1e-14));
        assert!(!same_time(1.0, 1.0 + 1e-9));
    }
}
