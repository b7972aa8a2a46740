// SPDX-License-Identifier: MIT OR Apache-2.0
//! Input manipulators: shortcut dispatch, panning, zooming and picking.
//!
//! Raw input is first translated into [`TimelineEvent`]s. The events are
//! offered to each manipulator of a [`ManipulatorStack`] in order until one
//! reports it handled the event.

use crate::actions::{ActionKind, ActionRegistry};
use crate::item::ItemId;
use crate::rows::SpacePartitioner;
use crate::shortcut::{Modifiers, Platform, Shortcut};
use crate::state::{KeyboardFocus, WindowState};
use egui::{Key, PointerButton, Pos2, Vec2};

/// Pixels of fast-zoom drag that double the zoom
const PIXELS_PER_ZOOM: f32 = 300.0;

/// Pick radius around a marker (pixels)
const MARKER_PICK_RADIUS: f32 = 4.0;

/// Editor-level commands delivered by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorCommand {
    /// Copy
    Copy,
    /// Paste
    Paste,
    /// Duplicate
    Duplicate,
    /// Select all
    SelectAll,
    /// Delete
    Delete,
    /// Delete without confirmation
    SoftDelete,
    /// Frame selected
    FrameSelected,
}

impl EditorCommand {
    /// Action that carries out the command
    pub fn action(&self) -> ActionKind {
        match self {
            Self::Copy => ActionKind::Copy,
            Self::Paste => ActionKind::Paste,
            Self::Duplicate => ActionKind::Duplicate,
            Self::SelectAll => ActionKind::SelectAll,
            Self::Delete | Self::SoftDelete => ActionKind::Delete,
            Self::FrameSelected => ActionKind::FrameSelected,
        }
    }
}

/// Input delivered to the timeline window
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimelineEvent {
    /// Key press with modifiers
    Key(Shortcut),
    /// Editor command
    Command(EditorCommand),
    /// Mouse wheel; positive `delta.y` scrolls down
    Wheel {
        /// Pointer position
        pos: Pos2,
        /// Scroll delta
        delta: Vec2,
        /// Held modifiers
        modifiers: Modifiers,
    },
    /// Button pressed
    PointerDown {
        /// Pointer position
        pos: Pos2,
        /// Button
        button: PointerButton,
        /// Held modifiers
        modifiers: Modifiers,
    },
    /// Pointer moved
    PointerMove {
        /// Pointer position
        pos: Pos2,
    },
    /// Button released
    PointerUp {
        /// Pointer position
        pos: Pos2,
        /// Button
        button: PointerButton,
    },
}

/// Handles some kind of input
pub trait Manipulator {
    /// Name used in logs
    fn name(&self) -> &'static str;

    /// React to an event; returns whether it was consumed
    fn handle(&mut self, state: &mut WindowState, event: &TimelineEvent) -> bool;
}

/// Routes key presses and editor commands to actions
#[derive(Debug, Default)]
pub struct ShortcutManipulator;

impl ShortcutManipulator {
    fn execute_command(state: &mut WindowState, command: EditorCommand) -> bool {
        let registry = ActionRegistry::shared();
        match command {
            EditorCommand::SelectAll | EditorCommand::SoftDelete | EditorCommand::FrameSelected => {
                registry.invoke(command.action(), state);
                true
            }
            EditorCommand::Copy | EditorCommand::Paste | EditorCommand::Duplicate | EditorCommand::Delete => {
                let shortcut = registry
                    .get(command.action())
                    .and_then(|a| a.effective_shortcut(&state.settings, Platform::current()));
                match shortcut {
                    Some(shortcut) => registry.route_shortcut(state, shortcut).is_some(),
                    None => false,
                }
            }
        }
    }
}

impl Manipulator for ShortcutManipulator {
    fn name(&self) -> &'static str {
        "shortcut"
    }

    fn handle(&mut self, state: &mut WindowState, event: &TimelineEvent) -> bool {
        if state.text_field_focused {
            return false;
        }
        match event {
            TimelineEvent::Key(shortcut) => ActionRegistry::shared().route_shortcut(state, *shortcut).is_some(),
            TimelineEvent::Command(command) => Self::execute_command(state, *command),
            _ => false,
        }
    }
}

/// Pans with the middle button, or the left button while Alt is held
#[derive(Debug, Default)]
pub struct PanManipulator {
    last: Option<Pos2>,
}

impl Manipulator for PanManipulator {
    fn name(&self) -> &'static str {
        "pan"
    }

    fn handle(&mut self, state: &mut WindowState, event: &TimelineEvent) -> bool {
        match *event {
            TimelineEvent::PointerDown { pos, button, modifiers } => {
                let starts = (button == PointerButton::Middle && modifiers == Modifiers::NONE)
                    || (button == PointerButton::Primary && modifiers == Modifiers::ALT);
                if starts {
                    self.last = Some(pos);
                }
                starts
            }
            TimelineEvent::PointerMove { pos } => {
                let Some(last) = self.last else {
                    return false;
                };
                let delta = pos - last;
                state.rows.scroll_by(-delta.y);
                state.time_area.offset(delta.x);
                state.time_area.invalidate_wheel_zoom();
                self.last = Some(pos);
                true
            }
            TimelineEvent::PointerUp { .. } => self.last.take().is_some(),
            _ => false,
        }
    }
}

/// Map a fast-zoom drag distance to a zoom factor.
///
/// Behaves like `1 + x` until `x = -0.75` (in units of 300 px), then decays
/// smoothly towards zero.
pub fn pixel_to_zoom(pixels: f32) -> f64 {
    let x = f64::from(pixels / PIXELS_PER_ZOOM);
    if x < -0.75 {
        // Meets 1 + x with matching slope at -0.75 and reaches 0.001 at -3
        1.0 / (98.6667 + 268.444 * x + 189.63 * x * x)
    } else {
        1.0 + x
    }
}

#[derive(Debug, Clone, Copy)]
struct FastZoom {
    origin: Pos2,
    reference: (f64, f64),
    focal_time: f64,
}

/// Wheel zoom about the pointer and Alt + right-drag fast zoom
#[derive(Debug, Default)]
pub struct ZoomManipulator {
    fast_zoom: Option<FastZoom>,
}

impl Manipulator for ZoomManipulator {
    fn name(&self) -> &'static str {
        "zoom"
    }

    fn handle(&mut self, state: &mut WindowState, event: &TimelineEvent) -> bool {
        match *event {
            TimelineEvent::Wheel { pos, delta, .. } => {
                if !state.time_area.rect().contains(pos) {
                    return false;
                }
                state.time_area.wheel_zoom(pos.x, delta.y)
            }
            TimelineEvent::PointerDown { pos, button, modifiers } => {
                if button != PointerButton::Secondary || modifiers != Modifiers::ALT {
                    return false;
                }
                state.time_area.invalidate_wheel_zoom();
                self.fast_zoom = Some(FastZoom {
                    origin: pos,
                    reference: state.time_area.shown_range(),
                    focal_time: state.time_area.pixel_to_time(pos.x),
                });
                true
            }
            TimelineEvent::PointerMove { pos } => {
                let Some(zoom) = self.fast_zoom else {
                    return false;
                };
                let delta = pos - zoom.origin;
                let distance = if delta.x.abs() > delta.y.abs() { delta.x } else { -delta.y };
                state
                    .time_area
                    .zoom_from(pixel_to_zoom(distance), zoom.reference, zoom.focal_time);
                true
            }
            TimelineEvent::PointerUp { .. } => self.fast_zoom.take().is_some(),
            _ => false,
        }
    }
}

/// Item under a point in the clips area
pub fn item_at(state: &WindowState, pos: Pos2) -> Option<ItemId> {
    if !state.time_area.rect().contains(pos) {
        return None;
    }
    let time = state.time_area.pixel_to_time(pos.x);
    let marker_radius = state.time_area.pixel_delta_to_time(MARKER_PICK_RADIUS);

    state.rows.tracks_at(pos).into_iter().find_map(|id| {
        let track = state.project.track(id)?;
        let marker = track
            .markers
            .iter()
            .find(|m| (m.time - time).abs() <= marker_radius)
            .map(|m| m.id);
        marker.or_else(|| {
            track
                .clips
                .iter()
                .rev()
                .find(|c| c.start <= time && time <= c.end())
                .map(|c| c.id)
        })
    })
}

/// Selects items and tracks with the left button
#[derive(Debug, Default)]
pub struct SelectManipulator;

impl Manipulator for SelectManipulator {
    fn name(&self) -> &'static str {
        "select"
    }

    fn handle(&mut self, state: &mut WindowState, event: &TimelineEvent) -> bool {
        let TimelineEvent::PointerDown {
            pos,
            button: PointerButton::Primary,
            modifiers,
        } = *event
        else {
            return false;
        };
        let additive = modifiers.ctrl || modifiers.shift;

        if let Some(item) = item_at(state, pos) {
            if !additive {
                state.selection.select_only_item(item);
            } else if state.selection.contains_item(item) {
                state.selection.remove_item(item);
            } else {
                state.selection.add_item(item);
            }
            state.focus = KeyboardFocus::Clips;
            return true;
        }

        let Some(track) = state.rows.tracks_at(pos).first().copied() else {
            if !additive {
                state.selection.clear();
            }
            state.focus = KeyboardFocus::None;
            return true;
        };
        if pos.x < state.time_area.rect().left() {
            if additive {
                state.selection.add_track(track);
            } else {
                state.selection.select_only_track(track);
            }
            state.focus = KeyboardFocus::TrackHeaders;
        } else {
            if !additive {
                state.selection.clear();
            }
            state.focus = KeyboardFocus::Clips;
        }
        true
    }
}

/// Manipulators tried in order
pub struct ManipulatorStack {
    manipulators: Vec<Box<dyn Manipulator>>,
}

impl ManipulatorStack {
    /// Shortcut, pan, zoom and select manipulators
    pub fn new() -> Self {
        Self {
            manipulators: vec![
                Box::new(ShortcutManipulator),
                Box::new(PanManipulator::default()),
                Box::new(ZoomManipulator::default()),
                Box::new(SelectManipulator),
            ],
        }
    }

    /// Stack with custom manipulators
    pub fn with_manipulators(manipulators: Vec<Box<dyn Manipulator>>) -> Self {
        Self { manipulators }
    }

    /// Offer an event to each manipulator until one handles it
    pub fn handle(&mut self, state: &mut WindowState, event: &TimelineEvent) -> bool {
        if let TimelineEvent::PointerDown { pos, .. }
        | TimelineEvent::PointerMove { pos }
        | TimelineEvent::Wheel { pos, .. } = event
        {
            state.hover_pos = Some(*pos);
        }
        for manipulator in &mut self.manipulators {
            if manipulator.handle(state, event) {
                tracing::trace!("{:?} handled by {} manipulator", event, manipulator.name());
                return true;
            }
        }
        false
    }
}

impl Default for ManipulatorStack {
    fn default() -> Self {
        Self::new()
    }
}

/// Translate one frame of egui input into timeline events.
///
/// Wheel deltas are negated so that positive values scroll down. Copy and
/// paste arrive as editor commands; their key presses are dropped.
pub fn events_from_egui(input: &egui::InputState) -> Vec<TimelineEvent> {
    let mut events = Vec::new();
    let has_copy = input.events.iter().any(|e| matches!(e, egui::Event::Copy));
    let has_paste = input.events.iter().any(|e| matches!(e, egui::Event::Paste(_)));
    let hover = input.pointer.hover_pos();

    for event in &input.events {
        match event {
            egui::Event::Copy => events.push(TimelineEvent::Command(EditorCommand::Copy)),
            egui::Event::Paste(_) => events.push(TimelineEvent::Command(EditorCommand::Paste)),
            egui::Event::Key {
                key,
                pressed: true,
                modifiers,
                ..
            } => {
                let shortcut = Shortcut::from_egui(*key, modifiers);
                let is_clipboard_key = shortcut.modifiers == Modifiers::CTRL
                    && ((has_copy && *key == Key::C) || (has_paste && *key == Key::V));
                if !is_clipboard_key {
                    events.push(TimelineEvent::Key(shortcut));
                }
            }
            egui::Event::PointerButton {
                pos,
                button,
                pressed,
                modifiers,
            } => {
                if *pressed {
                    events.push(TimelineEvent::PointerDown {
                        pos: *pos,
                        button: *button,
                        modifiers: Modifiers::from_egui(modifiers),
                    });
                } else {
                    events.push(TimelineEvent::PointerUp {
                        pos: *pos,
                        button: *button,
                    });
                }
            }
            egui::Event::PointerMoved(pos) => events.push(TimelineEvent::PointerMove { pos: *pos }),
            egui::Event::MouseWheel { delta, modifiers, .. } => {
                if let Some(pos) = hover {
                    events.push(TimelineEvent::Wheel {
                        pos,
                        delta: -*delta,
                        modifiers: Modifiers::from_egui(modifiers),
                    });
                }
            }
            _ => {}
        }
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{Clip, ClipKind};
    use crate::timeline::{Project, TimelineAsset};
    use crate::track::{Track, TrackId, TrackKind};

    fn state() -> (WindowState, TrackId, ItemId) {
        let mut timeline = TimelineAsset::new("T");
        let mut track = Track::new("Anim", TrackKind::Animation);
        let clip = track.add_clip(Clip::new("a", ClipKind::Animation, 1.0, 2.0));
        let track = timeline.add_track(track);
        let id = timeline.id;
        let mut project = Project::new();
        project.add_timeline(timeline);
        (WindowState::new(project, id), track, clip)
    }

    fn row_y(state: &WindowState, track: TrackId) -> f32 {
        state.rows.row(track).unwrap().rect.center().y
    }

    #[test]
    fn test_pixel_to_zoom() {
        assert_eq!(pixel_to_zoom(0.0), 1.0);
        assert!((pixel_to_zoom(300.0) - 2.0).abs() < 1e-9);
        assert!((pixel_to_zoom(-225.0) - 0.25).abs() < 1e-3);
        assert!((pixel_to_zoom(-900.0) - 0.001).abs() < 1e-5);
        let far = pixel_to_zoom(-3000.0);
        assert!(far > 0.0 && far < 0.001);
    }

    #[test]
    fn test_pan_with_middle_button() {
        let (mut state, _, _) = state();
        let mut stack = ManipulatorStack::new();
        let start = egui::pos2(600.0, 100.0);
        assert!(stack.handle(
            &mut state,
            &TimelineEvent::PointerDown {
                pos: start,
                button: PointerButton::Middle,
                modifiers: Modifiers::NONE,
            }
        ));
        stack.handle(&mut state, &TimelineEvent::PointerMove { pos: start + egui::vec2(100.0, 0.0) });
        stack.handle(&mut state, &TimelineEvent::PointerUp { pos: start, button: PointerButton::Middle });

        let (s, e) = state.time_area.shown_range();
        assert!((s + 1.0).abs() < 1e-9);
        assert!((e - 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_fast_zoom_with_alt_right_drag() {
        let (mut state, _, _) = state();
        let mut stack = ManipulatorStack::new();
        let start = egui::pos2(700.0, 100.0);
        stack.handle(
            &mut state,
            &TimelineEvent::PointerDown {
                pos: start,
                button: PointerButton::Secondary,
                modifiers: Modifiers::ALT,
            },
        );
        stack.handle(&mut state, &TimelineEvent::PointerMove { pos: start + egui::vec2(300.0, 10.0) });
        let (s, e) = state.time_area.shown_range();
        assert!((e - s - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_wheel_outside_clips_area_is_ignored() {
        let (mut state, _, _) = state();
        let mut zoom = ZoomManipulator::default();
        let event = TimelineEvent::Wheel {
            pos: egui::pos2(50.0, 100.0),
            delta: egui::vec2(0.0, -10.0),
            modifiers: Modifiers::NONE,
        };
        assert!(!zoom.handle(&mut state, &event));
    }

    #[test]
    fn test_click_selects_item_and_focuses_clips() {
        let (mut state, track, clip) = state();
        let mut stack = ManipulatorStack::new();
        let pos = egui::pos2(state.time_area.time_to_pixel(2.0), row_y(&state, track));
        stack.handle(
            &mut state,
            &TimelineEvent::PointerDown {
                pos,
                button: PointerButton::Primary,
                modifiers: Modifiers::NONE,
            },
        );
        assert!(state.selection.contains_item(clip));
        assert_eq!(state.focus, KeyboardFocus::Clips);

        let header = egui::pos2(50.0, row_y(&state, track));
        stack.handle(
            &mut state,
            &TimelineEvent::PointerDown {
                pos: header,
                button: PointerButton::Primary,
                modifiers: Modifiers::NONE,
            },
        );
        assert!(state.selection.contains_track(track));
        assert_eq!(state.focus, KeyboardFocus::TrackHeaders);
    }

    #[test]
    fn test_commands_reach_actions() {
        let (mut state, track, clip) = state();
        let mut stack = ManipulatorStack::new();
        state.selection.add_item(clip);
        assert!(stack.handle(&mut state, &TimelineEvent::Command(EditorCommand::Copy)));
        assert!(!state.clipboard.is_empty());

        assert!(stack.handle(&mut state, &TimelineEvent::Command(EditorCommand::SoftDelete)));
        assert!(state.project.track(track).unwrap().clips.is_empty());
    }

    #[test]
    fn test_text_field_blocks_shortcuts() {
        let (mut state, _, _) = state();
        state.text_field_focused = true;
        let mut shortcuts = ShortcutManipulator;
        assert!(!shortcuts.handle(&mut state, &TimelineEvent::Key(Shortcut::new(Key::Space))));
        assert!(!state.playing);
    }
}
