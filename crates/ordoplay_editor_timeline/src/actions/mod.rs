// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timeline actions and the registry that dispatches them.
//!
//! Every action is a row in a static table: display metadata, an optional
//! key binding and three plain functions (display state, checked state and
//! execute). The registry is built once per process and shared. Context
//! menus, keyboard shortcuts and direct invocation all go through it.
//!
//! Actions never fail with an error. An action is either unavailable
//! (hidden or disabled) or it runs and reports whether it did anything.

mod clipboard;
mod edit;
mod navigation;
mod view;

pub use clipboard::{can_paste, copy_selection, paste};
pub use edit::{calculate_duplicate_time, can_delete, delete_items, delete_tracks, duplicate_tracks};
pub use navigation::{clip_area_active, focus_first_visible_item, track_head_active};
pub use view::{frame_all, frame_selected, next_key_time, previous_key_time};

use crate::settings::TimelineSettings;
use crate::shortcut::{KeyBinding, Platform, Shortcut};
use crate::state::WindowState;
use egui::{Key, Pos2};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Identifies an action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// Copy selection to the clipboard
    Copy,
    /// Paste clipboard contents
    Paste,
    /// Duplicate selection
    Duplicate,
    /// Delete selection
    Delete,
    /// Resize clips to their source length
    MatchContent,
    /// Toggle playback
    Play,
    /// Select every track
    SelectAll,
    /// Playhead one frame back
    PreviousFrame,
    /// Playhead one frame forward
    NextFrame,
    /// Show every item
    FrameAll,
    /// Show the selected items
    FrameSelected,
    /// Playhead to the previous item boundary
    PreviousKey,
    /// Playhead to the next item boundary
    NextKey,
    /// Playhead to the start
    GotoStart,
    /// Playhead to the end
    GotoEnd,
    /// Zoom in about the view center
    ZoomIn,
    /// Zoom out about the view center
    ZoomOut,
    /// Collapse selected groups
    CollapseGroup,
    /// Expand selected groups
    ExpandGroup,
    /// Select the item to the left
    SelectLeftItem,
    /// Select the item to the right
    SelectRightItem,
    /// Select the closest item on the track above
    SelectUpItem,
    /// Select the track above
    SelectUpTrack,
    /// Select the closest item on the track below
    SelectDownItem,
    /// Select the track below
    SelectDownTrack,
    /// Extend selection to the left
    MultiSelectLeft,
    /// Extend selection to the right
    MultiSelectRight,
    /// Extend track selection upwards
    MultiSelectUp,
    /// Extend track selection downwards
    MultiSelectDown,
    /// Move keyboard focus between clips and track headers
    ToggleClipTrackArea,
    /// Mute the marker track
    ToggleMuteMarkers,
    /// Show the marker track row
    ToggleShowMarkers,
}

impl ActionKind {
    /// Every action, in registration order
    pub const ALL: [ActionKind; 32] = [
        Self::Copy,
        Self::Paste,
        Self::Duplicate,
        Self::Delete,
        Self::MatchContent,
        Self::Play,
        Self::SelectAll,
        Self::PreviousFrame,
        Self::NextFrame,
        Self::FrameAll,
        Self::FrameSelected,
        Self::PreviousKey,
        Self::NextKey,
        Self::GotoStart,
        Self::GotoEnd,
        Self::ZoomIn,
        Self::ZoomOut,
        Self::CollapseGroup,
        Self::ExpandGroup,
        Self::SelectLeftItem,
        Self::SelectRightItem,
        Self::SelectUpItem,
        Self::SelectUpTrack,
        Self::SelectDownItem,
        Self::SelectDownTrack,
        Self::MultiSelectLeft,
        Self::MultiSelectRight,
        Self::MultiSelectUp,
        Self::MultiSelectDown,
        Self::ToggleClipTrackArea,
        Self::ToggleMuteMarkers,
        Self::ToggleShowMarkers,
    ];

    /// Stable identifier used in settings and scripts
    pub fn id(&self) -> &'static str {
        match self {
            Self::Copy => "copy",
            Self::Paste => "paste",
            Self::Duplicate => "duplicate",
            Self::Delete => "delete",
            Self::MatchContent => "match_content",
            Self::Play => "play",
            Self::SelectAll => "select_all",
            Self::PreviousFrame => "previous_frame",
            Self::NextFrame => "next_frame",
            Self::FrameAll => "frame_all",
            Self::FrameSelected => "frame_selected",
            Self::PreviousKey => "previous_key",
            Self::NextKey => "next_key",
            Self::GotoStart => "goto_start",
            Self::GotoEnd => "goto_end",
            Self::ZoomIn => "zoom_in",
            Self::ZoomOut => "zoom_out",
            Self::CollapseGroup => "collapse_group",
            Self::ExpandGroup => "expand_group",
            Self::SelectLeftItem => "select_left_item",
            Self::SelectRightItem => "select_right_item",
            Self::SelectUpItem => "select_up_item",
            Self::SelectUpTrack => "select_up_track",
            Self::SelectDownItem => "select_down_item",
            Self::SelectDownTrack => "select_down_track",
            Self::MultiSelectLeft => "multi_select_left",
            Self::MultiSelectRight => "multi_select_right",
            Self::MultiSelectUp => "multi_select_up",
            Self::MultiSelectDown => "multi_select_down",
            Self::ToggleClipTrackArea => "toggle_clip_track_area",
            Self::ToggleMuteMarkers => "toggle_mute_markers",
            Self::ToggleShowMarkers => "toggle_show_markers",
        }
    }

    /// Look up an action by identifier
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.id() == id)
    }
}

/// How an action appears in a menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayState {
    /// Shown and clickable
    Visible,
    /// Shown greyed out
    Disabled,
    /// Not shown
    Hidden,
}

/// Separator placement around a menu entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Separator {
    /// Separator above the entry
    pub before: bool,
    /// Separator below the entry
    pub after: bool,
}

type DisplayStateFn = fn(&WindowState, Option<Pos2>) -> DisplayState;
type CheckedFn = fn(&WindowState) -> bool;
type ExecuteFn = fn(&mut WindowState, Option<Pos2>) -> bool;

fn always_visible(_: &WindowState, _: Option<Pos2>) -> DisplayState {
    DisplayState::Visible
}

fn never_checked(_: &WindowState) -> bool {
    false
}

/// Metadata and behaviour of one action
#[derive(Clone, Copy)]
pub struct ActionDescriptor {
    /// Action identity
    pub kind: ActionKind,
    /// Name shown in menus
    pub name: &'static str,
    /// Submenu path
    pub category: Option<&'static str>,
    /// Menu separators
    pub separator: Separator,
    /// Never listed in menus
    pub hidden_in_menu: bool,
    /// Default key binding
    pub shortcut: Option<KeyBinding>,
    display_state: DisplayStateFn,
    is_checked: CheckedFn,
    execute: ExecuteFn,
}

impl ActionDescriptor {
    /// Create an always-visible action
    pub const fn new(kind: ActionKind, name: &'static str, execute: ExecuteFn) -> Self {
        Self {
            kind,
            name,
            category: None,
            separator: Separator {
                before: false,
                after: false,
            },
            hidden_in_menu: false,
            shortcut: None,
            display_state: always_visible,
            is_checked: never_checked,
            execute,
        }
    }

    /// Bind a default shortcut
    pub const fn with_shortcut(mut self, shortcut: Shortcut) -> Self {
        self.shortcut = Some(KeyBinding::new(shortcut));
        self
    }

    /// Bind a default shortcut with platform overrides
    pub const fn with_binding(mut self, binding: KeyBinding) -> Self {
        self.shortcut = Some(binding);
        self
    }

    /// Place the entry in a submenu
    pub const fn in_category(mut self, category: &'static str) -> Self {
        self.category = Some(category);
        self
    }

    /// Add a separator below the entry
    pub const fn with_separator_after(mut self) -> Self {
        self.separator.after = true;
        self
    }

    /// Keep the action out of menus
    pub const fn hidden_in_menu(mut self) -> Self {
        self.hidden_in_menu = true;
        self
    }

    /// Compute display state from the window state
    pub const fn with_display_state(mut self, display_state: DisplayStateFn) -> Self {
        self.display_state = display_state;
        self
    }

    /// Show a check mark when `is_checked` holds
    pub const fn checkable(mut self, is_checked: CheckedFn) -> Self {
        self.is_checked = is_checked;
        self
    }

    /// Current display state
    pub fn display_state(&self, state: &WindowState, pointer: Option<Pos2>) -> DisplayState {
        (self.display_state)(state, pointer)
    }

    /// Whether the entry shows a check mark
    pub fn is_checked(&self, state: &WindowState) -> bool {
        (self.is_checked)(state)
    }

    /// Run the action; returns whether it handled the request
    pub fn execute(&self, state: &mut WindowState, pointer: Option<Pos2>) -> bool {
        let handled = (self.execute)(state, pointer);
        state.undo.end_group();
        handled
    }

    /// Menu label including the submenu path
    pub fn label(&self) -> String {
        match self.category {
            Some(category) => format!("{}/{}", category.trim_end_matches('/'), self.name),
            None => self.name.to_string(),
        }
    }

    /// Shortcut in effect under `settings` on `platform`
    pub fn effective_shortcut(&self, settings: &TimelineSettings, platform: Platform) -> Option<Shortcut> {
        match settings.shortcut_override(self.kind) {
            Some(custom) => custom,
            None => self.shortcut.map(|b| b.resolve(platform)),
        }
    }
}

impl std::fmt::Debug for ActionDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionDescriptor")
            .field("kind", &self.kind)
            .field("name", &self.name)
            .field("shortcut", &self.shortcut)
            .finish_non_exhaustive()
    }
}

/// One row of a context menu
#[derive(Debug, Clone, PartialEq)]
pub enum MenuEntry {
    /// Clickable action
    Action {
        /// Action to run
        kind: ActionKind,
        /// Label including submenu path
        label: String,
        /// Check mark
        checked: bool,
    },
    /// Greyed-out label
    Disabled {
        /// Label including submenu path
        label: String,
    },
    /// Separator in a submenu (empty for the top level)
    Separator {
        /// Submenu path
        category: String,
    },
}

const DELETE_OVERRIDES: &[(Platform, Shortcut)] = &[(Platform::MacOs, Shortcut::ctrl(Key::Backspace))];

/// Registry of all timeline actions
pub struct ActionRegistry {
    actions: Vec<ActionDescriptor>,
    by_kind: HashMap<ActionKind, usize>,
}

impl ActionRegistry {
    /// Build the registry with every action
    pub fn new() -> Self {
        let mut registry = Self {
            actions: Vec::with_capacity(ActionKind::ALL.len()),
            by_kind: HashMap::new(),
        };

        // Menu actions
        registry.register(ActionDescriptor::new(ActionKind::Copy, "Copy", clipboard::execute_copy)
            .with_shortcut(Shortcut::ctrl(Key::C))
            .with_separator_after()
            .with_display_state(clipboard::copy_display_state));
        registry.register(ActionDescriptor::new(ActionKind::Paste, "Paste", clipboard::execute_paste)
            .with_shortcut(Shortcut::ctrl(Key::V))
            .with_display_state(clipboard::paste_display_state));
        registry.register(ActionDescriptor::new(ActionKind::Duplicate, "Duplicate", edit::execute_duplicate)
            .with_shortcut(Shortcut::ctrl(Key::D)));
        registry.register(ActionDescriptor::new(ActionKind::Delete, "Delete", edit::execute_delete)
            .with_binding(KeyBinding::with_overrides(Shortcut::new(Key::Delete), DELETE_OVERRIDES))
            .with_display_state(edit::delete_display_state));
        registry.register(ActionDescriptor::new(ActionKind::MatchContent, "Match Content", edit::execute_match_content)
            .with_shortcut(Shortcut::new(Key::C))
            .with_display_state(edit::match_content_display_state));

        // Playback and view
        registry.register(ActionDescriptor::new(ActionKind::Play, "Play", view::execute_play)
            .with_shortcut(Shortcut::new(Key::Space))
            .hidden_in_menu());
        registry.register(ActionDescriptor::new(ActionKind::SelectAll, "Select All", navigation::execute_select_all)
            .with_shortcut(Shortcut::ctrl(Key::A))
            .hidden_in_menu());
        registry.register(ActionDescriptor::new(ActionKind::PreviousFrame, "Previous Frame", view::execute_previous_frame)
            .with_shortcut(Shortcut::new(Key::Comma))
            .hidden_in_menu());
        registry.register(ActionDescriptor::new(ActionKind::NextFrame, "Next Frame", view::execute_next_frame)
            .with_shortcut(Shortcut::new(Key::Period))
            .hidden_in_menu());
        registry.register(ActionDescriptor::new(ActionKind::FrameAll, "Frame All", view::execute_frame_all)
            .with_shortcut(Shortcut::new(Key::A))
            .hidden_in_menu());
        registry.register(ActionDescriptor::new(ActionKind::FrameSelected, "Frame Selected", view::execute_frame_selected)
            .with_shortcut(Shortcut::new(Key::F))
            .hidden_in_menu());
        registry.register(ActionDescriptor::new(ActionKind::PreviousKey, "Previous Key", view::execute_previous_key)
            .with_shortcut(Shortcut::alt(Key::Comma))
            .hidden_in_menu());
        registry.register(ActionDescriptor::new(ActionKind::NextKey, "Next Key", view::execute_next_key)
            .with_shortcut(Shortcut::alt(Key::Period))
            .hidden_in_menu());
        registry.register(ActionDescriptor::new(ActionKind::GotoStart, "Go to Start", view::execute_goto_start)
            .with_shortcut(Shortcut::shift(Key::Comma))
            .hidden_in_menu());
        registry.register(ActionDescriptor::new(ActionKind::GotoEnd, "Go to End", view::execute_goto_end)
            .with_shortcut(Shortcut::shift(Key::Period))
            .hidden_in_menu());
        registry.register(ActionDescriptor::new(ActionKind::ZoomIn, "Zoom In", view::execute_zoom_in)
            .with_shortcut(Shortcut::new(Key::Equals))
            .hidden_in_menu());
        registry.register(ActionDescriptor::new(ActionKind::ZoomOut, "Zoom Out", view::execute_zoom_out)
            .with_shortcut(Shortcut::new(Key::Minus))
            .hidden_in_menu());

        // Keyboard navigation; collapse/expand come first so the arrow keys
        // reach item selection only when the track headers are not focused
        registry.register(ActionDescriptor::new(ActionKind::CollapseGroup, "Collapse Group", navigation::execute_collapse_group)
            .with_shortcut(Shortcut::new(Key::ArrowLeft))
            .hidden_in_menu());
        registry.register(ActionDescriptor::new(ActionKind::ExpandGroup, "Expand Group", navigation::execute_expand_group)
            .with_shortcut(Shortcut::new(Key::ArrowRight))
            .hidden_in_menu());
        registry.register(ActionDescriptor::new(ActionKind::SelectLeftItem, "Select Left Item", navigation::execute_select_left_item)
            .with_shortcut(Shortcut::new(Key::ArrowLeft))
            .hidden_in_menu());
        registry.register(ActionDescriptor::new(ActionKind::SelectRightItem, "Select Right Item", navigation::execute_select_right_item)
            .with_shortcut(Shortcut::new(Key::ArrowRight))
            .hidden_in_menu());
        registry.register(ActionDescriptor::new(ActionKind::SelectUpItem, "Select Up Item", navigation::execute_select_up_item)
            .with_shortcut(Shortcut::new(Key::ArrowUp))
            .hidden_in_menu());
        registry.register(ActionDescriptor::new(ActionKind::SelectUpTrack, "Select Up Track", navigation::execute_select_up_track)
            .with_shortcut(Shortcut::new(Key::ArrowUp))
            .hidden_in_menu());
        registry.register(ActionDescriptor::new(ActionKind::SelectDownItem, "Select Down Item", navigation::execute_select_down_item)
            .with_shortcut(Shortcut::new(Key::ArrowDown))
            .hidden_in_menu());
        registry.register(ActionDescriptor::new(ActionKind::SelectDownTrack, "Select Down Track", navigation::execute_select_down_track)
            .with_shortcut(Shortcut::new(Key::ArrowDown))
            .hidden_in_menu());
        registry.register(ActionDescriptor::new(ActionKind::MultiSelectLeft, "Multi-select Left", navigation::execute_multi_select_left)
            .with_shortcut(Shortcut::shift(Key::ArrowLeft))
            .hidden_in_menu());
        registry.register(ActionDescriptor::new(ActionKind::MultiSelectRight, "Multi-select Right", navigation::execute_multi_select_right)
            .with_shortcut(Shortcut::shift(Key::ArrowRight))
            .hidden_in_menu());
        registry.register(ActionDescriptor::new(ActionKind::MultiSelectUp, "Multi-select Up", navigation::execute_multi_select_up)
            .with_shortcut(Shortcut::shift(Key::ArrowUp))
            .hidden_in_menu());
        registry.register(ActionDescriptor::new(ActionKind::MultiSelectDown, "Multi-select Down", navigation::execute_multi_select_down)
            .with_shortcut(Shortcut::shift(Key::ArrowDown))
            .hidden_in_menu());
        registry.register(ActionDescriptor::new(ActionKind::ToggleClipTrackArea, "Toggle Clip/Track Area", navigation::execute_toggle_clip_track_area)
            .with_shortcut(Shortcut::new(Key::Tab))
            .hidden_in_menu());

        // Marker header toggles
        registry.register(ActionDescriptor::new(ActionKind::ToggleMuteMarkers, "Mute", view::execute_toggle_mute_markers)
            .checkable(view::markers_muted)
            .hidden_in_menu());
        registry.register(ActionDescriptor::new(ActionKind::ToggleShowMarkers, "Show Markers", view::execute_toggle_show_markers)
            .checkable(view::markers_shown)
            .hidden_in_menu());

        registry
    }

    /// Registry shared by every window
    pub fn shared() -> &'static ActionRegistry {
        static REGISTRY: OnceLock<ActionRegistry> = OnceLock::new();
        REGISTRY.get_or_init(ActionRegistry::new)
    }

    fn register(&mut self, action: ActionDescriptor) {
        let index = self.actions.len();
        self.by_kind.insert(action.kind, index);
        self.actions.push(action);
    }

    /// Get an action by kind
    pub fn get(&self, kind: ActionKind) -> Option<&ActionDescriptor> {
        self.by_kind.get(&kind).map(|&idx| &self.actions[idx])
    }

    /// All actions, in registration order
    pub fn all(&self) -> &[ActionDescriptor] {
        &self.actions
    }

    /// Run an action if it is currently visible; returns whether it ran and handled
    pub fn invoke(&self, kind: ActionKind, state: &mut WindowState) -> bool {
        let Some(action) = self.get(kind) else {
            return false;
        };
        if action.display_state(state, None) != DisplayState::Visible {
            tracing::debug!("Action '{}' is not available", action.name);
            return false;
        }
        action.execute(state, None)
    }

    /// Run an action picked from a context menu opened at `pointer`
    pub fn execute_from_menu(&self, kind: ActionKind, state: &mut WindowState, pointer: Pos2) -> bool {
        let Some(action) = self.get(kind) else {
            return false;
        };
        action.execute(state, Some(pointer))
    }

    /// Context menu rows for a menu opened at `pointer`, in registration order
    pub fn build_menu_entries(&self, state: &WindowState, pointer: Option<Pos2>) -> Vec<MenuEntry> {
        let mut entries = Vec::new();
        for action in &self.actions {
            if action.hidden_in_menu {
                continue;
            }
            let display_state = action.display_state(state, pointer);
            if display_state == DisplayState::Hidden {
                continue;
            }

            let category = action.category.map_or_else(String::new, |c| format!("{}/", c.trim_end_matches('/')));
            if action.separator.before {
                entries.push(MenuEntry::Separator {
                    category: category.clone(),
                });
            }
            match display_state {
                DisplayState::Visible => entries.push(MenuEntry::Action {
                    kind: action.kind,
                    label: action.label(),
                    checked: action.is_checked(state),
                }),
                DisplayState::Disabled => entries.push(MenuEntry::Disabled { label: action.label() }),
                DisplayState::Hidden => {}
            }
            if action.separator.after {
                entries.push(MenuEntry::Separator { category });
            }
        }
        entries
    }

    /// Route a key press to the first action bound to it that handles it.
    ///
    /// Nothing runs while a text field has focus. Returns the action that
    /// handled the key.
    pub fn route_shortcut(&self, state: &mut WindowState, event: Shortcut) -> Option<ActionKind> {
        if state.text_field_focused {
            return None;
        }

        let platform = Platform::current();
        for action in &self.actions {
            if action.effective_shortcut(&state.settings, platform) != Some(event) {
                continue;
            }
            tracing::debug!("Shortcut {} triggered '{}'", event, action.name);
            if action.execute(state, None) {
                return Some(action.kind);
            }
        }
        None
    }

    /// Display string of an action's shortcut under the window's settings
    pub fn shortcut_display(&self, kind: ActionKind, settings: &TimelineSettings) -> Option<String> {
        self.get(kind)?
            .effective_shortcut(settings, Platform::current())
            .map(|s| s.display())
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
