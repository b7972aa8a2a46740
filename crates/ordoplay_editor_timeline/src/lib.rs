// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timeline editing core for OrdoPlay Editor.
//!
//! This crate provides the editing side of the cinematic timeline:
//! - Menu and shortcut driven actions (copy, paste, duplicate, delete,
//!   framing, zoom, keyboard navigation)
//! - Paste and duplicate placement onto compatible tracks
//! - Marker helpers and the signal emitter inspector
//! - The clips layer and pan/zoom manipulators of the timeline window
//!
//! ## Architecture
//!
//! Every action reads and mutates a single [`WindowState`]:
//! - The [`Project`] holding timeline assets, scene objects and bindings
//! - Selection, clipboard and undo history
//! - The time area and row layout of the window
//!
//! Actions never fail with an error. They are either unavailable or run and
//! report whether they handled the request.

pub mod actions;
pub mod binding;
pub mod clipboard;
pub mod edit_mode;
pub mod error;
pub mod history;
pub mod item;
pub mod layer;
pub mod manipulators;
pub mod markers;
pub mod menu;
pub mod rows;
pub mod selection;
pub mod settings;
pub mod shortcut;
pub mod signals;
pub mod state;
pub mod time_area;
pub mod timeline;
pub mod track;
pub mod window;

pub use actions::{ActionDescriptor, ActionKind, ActionRegistry, DisplayState, MenuEntry};
pub use binding::{Component, ComponentId, ComponentKind, Director, ObjectId, Scene, SceneObject, TrackBinding};
pub use clipboard::{Clipboard, ItemsPerTrack};
pub use edit_mode::{EditMode, MixMode, ReplaceMode, RippleMode};
pub use error::{Result, TimelineError};
pub use history::UndoHistory;
pub use item::{Clip, ClipKind, ItemId, Marker, MarkerKind, TimelineItem};
pub use layer::{ClipWidget, ClipsLayer};
pub use manipulators::{EditorCommand, Manipulator, ManipulatorStack, TimelineEvent};
pub use markers::{clone_markers_to_parent, create_marker_at_time, delete_marker};
pub use rows::{RowLayout, SpacePartitioner};
pub use selection::Selection;
pub use settings::{DuplicateGap, EditModeKind, TimelineSettings};
pub use shortcut::{KeyBinding, Modifiers, Platform, Shortcut};
pub use signals::{SignalAsset, SignalAssetId, SignalEmitter, SignalEmitterInspector, SignalReceiver};
pub use state::{KeyboardFocus, WindowState};
pub use time_area::TimeArea;
pub use timeline::{Project, TimelineAsset, TimelineId};
pub use track::{Track, TrackId, TrackKind};
pub use window::TimelineView;
