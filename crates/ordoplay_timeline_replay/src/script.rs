// SPDX-License-Identifier: MIT OR Apache-2.0
//! Replay scripts and the session that runs them.

use crate::error::{ReplayError, Result};
use egui::{pos2, vec2, PointerButton};
use ordoplay_editor_timeline::{
    create_marker_at_time, ActionKind, ActionRegistry, ItemId, ManipulatorStack, MarkerKind, MenuEntry, Modifiers,
    Shortcut, SignalEmitter, SignalEmitterInspector, TimelineEvent, TrackId, WindowState,
};
use serde::Deserialize;
use std::path::Path;

/// Mouse button named in a script
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Button {
    /// Left
    Primary,
    /// Right
    Secondary,
    /// Wheel button
    Middle,
}

impl From<Button> for PointerButton {
    fn from(button: Button) -> Self {
        match button {
            Button::Primary => Self::Primary,
            Button::Secondary => Self::Secondary,
            Button::Middle => Self::Middle,
        }
    }
}

/// What a `Select` step selects
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub enum Selector {
    /// A track by name, added to the selection
    Track(String),
    /// A clip by track and clip name, added to the selection
    Clip(String, String),
    /// A marker by track and time, added to the selection
    Marker(String, f64),
    /// Empty the selection
    Clear,
}

/// One scripted input
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub enum Step {
    /// Change the selection
    Select(Selector),
    /// Invoke an action by id, as from the application menu
    Invoke(String),
    /// Press a key combination such as `"Ctrl+V"`
    Key(String),
    /// Pick an action from the context menu opened at a point
    Menu(String, (f32, f32)),
    /// Mouse wheel at a point; positive values scroll down
    Wheel((f32, f32), f32),
    /// Drag with a button and modifiers such as `"Alt"` (empty for none)
    Drag(Button, String, (f32, f32), (f32, f32)),
    /// Move the playhead
    SetTime(f64),
    /// Add a signal emitter marker on a track
    AddMarker(String, f64),
    /// Create a signal asset and assign it to the selected emitters
    CreateSignal(String),
}

/// Load a script from a RON file
pub fn load_script(path: &Path) -> Result<Vec<Step>> {
    let source = std::fs::read_to_string(path).map_err(|source| ReplayError::ReadScript {
        path: path.to_path_buf(),
        source,
    })?;
    parse_script(&source)
}

/// Parse a script from RON text
pub fn parse_script(source: &str) -> Result<Vec<Step>> {
    Ok(ron::from_str(source)?)
}

/// Parse a modifier string such as `"Ctrl+Alt"`
fn parse_modifiers(text: &str) -> Option<Modifiers> {
    let mut modifiers = Modifiers::NONE;
    for part in text.split('+').map(str::trim).filter(|p| !p.is_empty()) {
        match part.to_lowercase().as_str() {
            "ctrl" | "control" | "cmd" => modifiers.ctrl = true,
            "shift" => modifiers.shift = true,
            "alt" | "option" => modifiers.alt = true,
            _ => return None,
        }
    }
    Some(modifiers)
}

/// A window state driven by script steps
pub struct Session {
    /// Edited window
    pub state: WindowState,
    manipulators: ManipulatorStack,
}

impl Session {
    /// Start a session over a window
    pub fn new(state: WindowState) -> Self {
        Self {
            state,
            manipulators: ManipulatorStack::new(),
        }
    }

    /// Run every step in order, stopping at the first invalid one
    pub fn run(&mut self, steps: &[Step]) -> Result<()> {
        for (index, step) in steps.iter().enumerate() {
            let outcome = self.run_step(index, step)?;
            tracing::info!("Step {}: {:?} -> {}", index, step, outcome);
        }
        Ok(())
    }

    fn track_named(&self, step: usize, name: &str) -> Result<TrackId> {
        self.state
            .asset()
            .and_then(|a| a.tracks().find(|t| t.name == name).map(|t| t.id))
            .ok_or_else(|| ReplayError::UnknownTrack {
                step,
                name: name.to_string(),
            })
    }

    fn action(step: usize, id: &str) -> Result<ActionKind> {
        ActionKind::from_id(id).ok_or_else(|| ReplayError::UnknownAction {
            step,
            id: id.to_string(),
        })
    }

    fn select(&mut self, step: usize, selector: &Selector) -> Result<String> {
        let item = |found: Option<ItemId>, description: String| {
            found.ok_or(ReplayError::UnknownItem { step, description })
        };
        match selector {
            Selector::Clear => {
                self.state.selection.clear();
                return Ok("selection cleared".into());
            }
            Selector::Track(name) => {
                let track = self.track_named(step, name)?;
                self.state.selection.add_track(track);
            }
            Selector::Clip(track_name, clip_name) => {
                let track = self.track_named(step, track_name)?;
                let found = self
                    .state
                    .project
                    .track(track)
                    .and_then(|t| t.clips.iter().find(|c| &c.name == clip_name))
                    .map(|c| c.id);
                let id = item(found, format!("clip '{}' on '{}'", clip_name, track_name))?;
                self.state.selection.add_item(id);
            }
            Selector::Marker(track_name, time) => {
                let track = self.track_named(step, track_name)?;
                let found = self
                    .state
                    .project
                    .track(track)
                    .and_then(|t| t.markers.iter().find(|m| (m.time - time).abs() < 1e-6))
                    .map(|m| m.id);
                let id = item(found, format!("marker at {} on '{}'", time, track_name))?;
                self.state.selection.add_item(id);
            }
        }
        Ok(format!("{} selected", self.state.selection.count()))
    }

    fn create_signal(&mut self, name: &str) -> String {
        let emitters: Vec<ItemId> = self
            .state
            .asset()
            .map(|asset| self.state.selection.markers(asset))
            .unwrap_or_default()
            .into_iter()
            .filter(|(_, marker)| matches!(marker.kind, MarkerKind::SignalEmitter(_)))
            .map(|(_, marker)| marker.id)
            .collect();
        if emitters.is_empty() {
            return "no signal emitter selected".into();
        }

        let state = &mut self.state;
        let mut inspector = SignalEmitterInspector::new(&state.project, state.edit_sequence, emitters);
        inspector.create_new_signal_asset(&mut state.project, &mut state.undo, name);
        format!("signal '{}' assigned to {} emitters", name, inspector.targets().len())
    }

    fn drag(&mut self, button: Button, modifiers: Modifiers, from: (f32, f32), to: (f32, f32)) -> bool {
        let button = PointerButton::from(button);
        let events = [
            TimelineEvent::PointerDown {
                pos: pos2(from.0, from.1),
                button,
                modifiers,
            },
            TimelineEvent::PointerMove { pos: pos2(to.0, to.1) },
            TimelineEvent::PointerUp {
                pos: pos2(to.0, to.1),
                button,
            },
        ];
        let mut handled = false;
        for event in &events {
            handled |= self.manipulators.handle(&mut self.state, event);
        }
        handled
    }

    /// Run one step; returns a description of what happened
    pub fn run_step(&mut self, index: usize, step: &Step) -> Result<String> {
        let registry = ActionRegistry::shared();
        let outcome = match step {
            Step::Select(selector) => self.select(index, selector)?,
            Step::Invoke(id) => {
                let kind = Self::action(index, id)?;
                format!("handled: {}", registry.invoke(kind, &mut self.state))
            }
            Step::Key(text) => {
                let shortcut = Shortcut::parse(text).ok_or_else(|| ReplayError::InvalidKey {
                    step: index,
                    text: text.clone(),
                })?;
                let handled = self
                    .manipulators
                    .handle(&mut self.state, &TimelineEvent::Key(shortcut));
                format!("handled: {}", handled)
            }
            Step::Menu(id, (x, y)) => {
                let kind = Self::action(index, id)?;
                let pointer = pos2(*x, *y);
                let enabled = registry
                    .build_menu_entries(&self.state, Some(pointer))
                    .iter()
                    .any(|e| matches!(e, MenuEntry::Action { kind: k, .. } if *k == kind));
                if enabled {
                    format!("handled: {}", registry.execute_from_menu(kind, &mut self.state, pointer))
                } else {
                    "menu item not available".into()
                }
            }
            Step::Wheel((x, y), dy) => {
                let event = TimelineEvent::Wheel {
                    pos: pos2(*x, *y),
                    delta: vec2(0.0, *dy),
                    modifiers: Modifiers::NONE,
                };
                format!("handled: {}", self.manipulators.handle(&mut self.state, &event))
            }
            Step::Drag(button, modifiers, from, to) => {
                let modifiers = parse_modifiers(modifiers).ok_or_else(|| ReplayError::InvalidKey {
                    step: index,
                    text: modifiers.clone(),
                })?;
                format!("handled: {}", self.drag(*button, modifiers, *from, *to))
            }
            Step::SetTime(time) => {
                self.state.set_time(*time);
                format!("playhead at {:.3}s", self.state.time)
            }
            Step::AddMarker(track_name, time) => {
                let track = self.track_named(index, track_name)?;
                let kind = MarkerKind::SignalEmitter(SignalEmitter::default());
                match create_marker_at_time(&mut self.state, track, kind, *time) {
                    Some(_) => format!("marker added at {:.3}s", time),
                    None => "track does not accept markers".into(),
                }
            }
            Step::CreateSignal(name) => self.create_signal(name),
        };
        self.state.refresh();
        Ok(outcome)
    }
}
