// SPDX-License-Identifier: MIT OR Apache-2.0
//! Signal assets, emitters and receivers, and the inspector for emitter markers.
//!
//! A signal emitter marker fires a [`SignalAsset`] when the playhead crosses
//! it. Receivers are components on the object bound to the marker's track;
//! each receiver maps signal assets to a named reaction.

use crate::binding::{Component, ComponentId, ComponentKind, ObjectId};
use crate::history::UndoHistory;
use crate::item::ItemId;
use crate::timeline::{Project, TimelineId};
use crate::track::TrackId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Signal asset ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SignalAssetId(pub Uuid);

impl SignalAssetId {
    /// Create a new random signal asset ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SignalAssetId {
    fn default() -> Self {
        Self::new()
    }
}

/// A named signal that emitters fire and receivers react to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalAsset {
    /// Asset ID
    pub id: SignalAssetId,
    /// Asset name
    pub name: String,
}

impl SignalAsset {
    /// Create a signal asset
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: SignalAssetId::new(),
            name: name.into(),
        }
    }
}

/// Payload of a signal emitter marker
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalEmitter {
    /// Signal fired by this marker
    pub asset: Option<SignalAssetId>,
    /// Fire when playback starts past the marker
    pub retroactive: bool,
    /// Fire only once per playback
    pub emit_once: bool,
}

/// A reaction registered on a receiver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reaction {
    /// Signal this reaction handles; unset for a reaction not yet assigned
    pub asset: Option<SignalAssetId>,
    /// Name of the callback to run
    pub callback: String,
}

/// Component data of a signal receiver
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalReceiver {
    /// Reactions, in creation order
    pub reactions: Vec<Reaction>,
}

impl SignalReceiver {
    /// Add an empty reaction for `asset`
    pub fn add_new_reaction(&mut self, asset: Option<SignalAssetId>) {
        self.reactions.push(Reaction {
            asset,
            callback: String::new(),
        });
    }

    /// Whether a reaction for `asset` exists
    pub fn is_signal_asset_handled(&self, asset: SignalAssetId) -> bool {
        self.reactions.iter().any(|r| r.asset == Some(asset))
    }
}

/// Resolve the scene object a track is bound to in a timeline's director.
///
/// The timeline's marker track without a binding belongs to the director's
/// own object. Component bindings resolve to the component's owner.
pub fn bound_object(project: &Project, timeline: TimelineId, track: TrackId) -> Option<ObjectId> {
    let asset = project.timeline(timeline)?;
    if !asset.contains_track(track) {
        return None;
    }
    let director = project.directors.get(&timeline)?;
    let binding = director.binding(track);

    if asset.marker_track == Some(track) && binding.is_none() {
        return Some(director.object);
    }

    let binding = binding?;
    let object = project.scene.object(binding.object)?;
    match binding.component {
        Some(component) => object.component(component).map(|_| object.id),
        None => Some(object.id),
    }
}

/// Per-receiver editor state cached by the inspector
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiverEditor {
    /// Receiver component being edited
    pub component: ComponentId,
    /// Signal highlighted in the receiver's reaction list
    pub asset_context: Option<SignalAssetId>,
}

/// What the receivers section of the inspector shows
#[derive(Debug, Clone, PartialEq)]
pub enum PanelState {
    /// Targets live on tracks bound to different objects
    DifferentBindings,
    /// Targets emit different signals
    DifferentSignals,
    /// The targets' track is not bound to anything
    NoBoundObject,
    /// Receivers of the bound object
    Receivers {
        /// Bound object
        object: ObjectId,
        /// Notification receiver components
        receivers: Vec<ComponentId>,
        /// Whether one of them is a signal receiver; if not, offer to add one
        has_signal_receiver: bool,
    },
}

/// Inspector model for one or more signal emitter markers
#[derive(Debug)]
pub struct SignalEmitterInspector {
    timeline: TimelineId,
    targets: Vec<ItemId>,
    bound_object: Option<ObjectId>,
    receivers: Vec<ComponentId>,
    targets_have_same_binding: bool,
    editors: HashMap<ComponentId, ReceiverEditor>,
    foldouts: HashMap<ComponentId, bool>,
}

impl SignalEmitterInspector {
    /// Inspect the given emitter markers of a timeline
    pub fn new(project: &Project, timeline: TimelineId, targets: Vec<ItemId>) -> Self {
        let mut inspector = Self {
            timeline,
            targets,
            bound_object: None,
            receivers: Vec::new(),
            targets_have_same_binding: true,
            editors: HashMap::new(),
            foldouts: HashMap::new(),
        };
        inspector.update_state(project);
        inspector
    }

    /// Inspected markers
    pub fn targets(&self) -> &[ItemId] {
        &self.targets
    }

    fn target_track(&self, project: &Project, target: ItemId) -> Option<TrackId> {
        project.timeline(self.timeline)?.item_parent(target)
    }

    fn emitters<'a>(&'a self, project: &'a Project) -> impl Iterator<Item = &'a SignalEmitter> + 'a {
        self.targets.iter().filter_map(move |id| {
            let track = self.target_track(project, *id)?;
            project.track(track)?.marker(*id)?.as_signal_emitter()
        })
    }

    /// Recompute the bound object, receivers and binding agreement
    pub fn update_state(&mut self, project: &Project) {
        let bindings: Vec<Option<ObjectId>> = self
            .targets
            .iter()
            .map(|target| {
                self.target_track(project, *target)
                    .and_then(|track| bound_object(project, self.timeline, track))
            })
            .collect();

        self.bound_object = bindings.first().copied().flatten();
        self.targets_have_same_binding = !bindings.is_empty() && bindings.iter().all(|b| *b == bindings[0]);
        self.receivers = self
            .bound_object
            .and_then(|id| project.scene.object(id))
            .map(|object| {
                object
                    .components
                    .iter()
                    .filter(|c| c.is_notification_receiver())
                    .map(|c| c.id)
                    .collect()
            })
            .unwrap_or_default();
    }

    /// Object the inspected markers are bound to
    pub fn bound_object(&self) -> Option<ObjectId> {
        self.bound_object
    }

    /// Notification receivers of the bound object
    pub fn receivers(&self) -> &[ComponentId] {
        &self.receivers
    }

    /// Whether every target resolves to the same bound object
    pub fn targets_have_same_binding(&self) -> bool {
        self.targets_have_same_binding
    }

    fn signal_asset_same_value(&self, project: &Project) -> bool {
        let mut assets = self.emitters(project).map(|e| e.asset);
        match assets.next() {
            Some(first) => assets.all(|a| a == first),
            None => false,
        }
    }

    /// Signal shared by all targets, if they agree
    pub fn signal_asset(&self, project: &Project) -> Option<SignalAssetId> {
        if !self.signal_asset_same_value(project) {
            return None;
        }
        self.emitters(project).next().and_then(|e| e.asset)
    }

    /// Set the signal of every target, recording undo on their tracks
    pub fn assign_signal_asset(
        &mut self,
        project: &mut Project,
        history: &mut UndoHistory,
        asset: Option<SignalAssetId>,
    ) {
        let targets: Vec<(TrackId, ItemId)> = self
            .targets
            .iter()
            .filter_map(|id| self.target_track(project, *id).map(|track| (track, *id)))
            .collect();

        for (track, item) in targets {
            if let Err(err) = history.push_undo(project, track, "Set Signal Asset") {
                tracing::warn!("Could not record undo for signal emitter: {}", err);
            }
            if let Some(emitter) = project
                .track_mut(track)
                .and_then(|t| t.marker_mut(item))
                .and_then(|m| m.as_signal_emitter_mut())
            {
                emitter.asset = asset;
            }
        }
        history.end_group();
        self.apply_changes_and_refresh_receivers(project);
    }

    /// Register a new signal asset and assign it to the targets.
    ///
    /// When the bound object has exactly one signal receiver that does not
    /// handle the new signal yet, a reaction for it is added.
    pub fn create_new_signal_asset(
        &mut self,
        project: &mut Project,
        history: &mut UndoHistory,
        name: &str,
    ) -> SignalAssetId {
        let asset = project.add_signal_asset(SignalAsset::new(name));
        self.assign_signal_asset(project, history, Some(asset));

        let signal_receivers = self.signal_receivers(project);
        if self.signal_asset(project).is_some() && signal_receivers.len() == 1 {
            if let Some(receiver) = self
                .component_mut(project, signal_receivers[0])
                .and_then(Component::as_signal_receiver_mut)
            {
                if !receiver.is_signal_asset_handled(asset) {
                    receiver.add_new_reaction(Some(asset));
                    self.apply_changes_and_refresh_receivers(project);
                }
            }
        }

        tracing::info!("Created signal asset '{}'", name);
        asset
    }

    /// Add a signal receiver to the bound object, reacting to the current signal
    pub fn add_receiver_component(&mut self, project: &mut Project) -> Option<ComponentId> {
        let object = self.bound_object?;
        let mut receiver = SignalReceiver::default();
        receiver.add_new_reaction(self.signal_asset(project));

        let id = project
            .scene
            .object_mut(object)?
            .add_component(Component::new(ComponentKind::SignalReceiver(receiver)));
        self.update_state(project);
        Some(id)
    }

    fn signal_receivers(&self, project: &Project) -> Vec<ComponentId> {
        self.receivers
            .iter()
            .copied()
            .filter(|id| {
                self.component(project, *id)
                    .is_some_and(|c| c.as_signal_receiver().is_some())
            })
            .collect()
    }

    fn component<'a>(&self, project: &'a Project, id: ComponentId) -> Option<&'a Component> {
        project.scene.object(self.bound_object?)?.component(id)
    }

    fn component_mut<'a>(&self, project: &'a mut Project, id: ComponentId) -> Option<&'a mut Component> {
        project.scene.object_mut(self.bound_object?)?.component_mut(id)
    }

    /// Cached editor for a receiver, created on first use with its foldout open
    pub fn receiver_editor(&mut self, component: ComponentId) -> &mut ReceiverEditor {
        self.foldouts.entry(component).or_insert(true);
        self.editors.entry(component).or_insert_with(|| ReceiverEditor {
            component,
            asset_context: None,
        })
    }

    /// Whether the receiver's section is expanded
    pub fn foldout(&self, component: ComponentId) -> bool {
        self.foldouts.get(&component).copied().unwrap_or(true)
    }

    /// Expand or collapse a receiver's section
    pub fn set_foldout(&mut self, component: ComponentId, open: bool) {
        self.foldouts.insert(component, open);
    }

    /// Push the current signal into every cached receiver editor
    pub fn apply_changes_and_refresh_receivers(&mut self, project: &Project) {
        let asset = self.signal_asset(project);
        for editor in self.editors.values_mut() {
            editor.asset_context = asset;
        }
    }

    /// Call after an undo or redo touched the project
    pub fn on_undo_redo(&mut self, project: &Project) {
        self.update_state(project);
        self.apply_changes_and_refresh_receivers(project);
    }

    /// What the receivers section shows
    pub fn panel_state(&self, project: &Project) -> PanelState {
        if !self.targets_have_same_binding {
            return PanelState::DifferentBindings;
        }

        if self.emitters(project).next().is_some() && !self.signal_asset_same_value(project) {
            return PanelState::DifferentSignals;
        }

        match self.bound_object {
            Some(object) => PanelState::Receivers {
                object,
                receivers: self.receivers.clone(),
                has_signal_receiver: !self.signal_receivers(project).is_empty(),
            },
            None => PanelState::NoBoundObject,
        }
    }

    /// Render the inspector
    pub fn ui(&mut self, ui: &mut egui::Ui, project: &mut Project, history: &mut UndoHistory) {
        self.update_state(project);
        self.signal_flags(ui, project, history);
        self.signal_picker(ui, project, history);
        ui.separator();
        self.receivers_ui(ui, project);
    }

    fn signal_flags(&mut self, ui: &mut egui::Ui, project: &mut Project, history: &mut UndoHistory) {
        let Some(first) = self.emitters(project).next().cloned() else {
            return;
        };
        let mut retroactive = first.retroactive;
        let mut emit_once = first.emit_once;

        let retroactive_changed = ui.checkbox(&mut retroactive, "Retroactive").changed();
        let emit_once_changed = ui.checkbox(&mut emit_once, "Emit Once").changed();
        if !retroactive_changed && !emit_once_changed {
            return;
        }

        let targets: Vec<(TrackId, ItemId)> = self
            .targets
            .iter()
            .filter_map(|id| self.target_track(project, *id).map(|track| (track, *id)))
            .collect();
        for (track, item) in targets {
            if let Err(err) = history.push_undo(project, track, "Change Signal Emitter") {
                tracing::warn!("Could not record undo for signal emitter: {}", err);
            }
            if let Some(emitter) = project
                .track_mut(track)
                .and_then(|t| t.marker_mut(item))
                .and_then(|m| m.as_signal_emitter_mut())
            {
                if retroactive_changed {
                    emitter.retroactive = retroactive;
                }
                if emit_once_changed {
                    emitter.emit_once = emit_once;
                }
            }
        }
        history.end_group();
    }

    fn signal_picker(&mut self, ui: &mut egui::Ui, project: &mut Project, history: &mut UndoHistory) {
        if project.signal_assets.is_empty() {
            ui.add_enabled_ui(false, |ui| {
                egui::ComboBox::from_label("Emit Signal")
                    .selected_text("None")
                    .show_ui(ui, |_| {});
            });
            ui.vertical_centered(|ui| {
                ui.label("Project has no signal assets");
                if ui.button("Create Signal...").clicked() {
                    self.create_new_signal_asset(project, history, "New Signal");
                }
            });
            return;
        }

        let current = self.signal_asset(project);
        let selected_text = if self.signal_asset_same_value(project) {
            current
                .and_then(|id| project.signal_assets.get(&id))
                .map_or_else(|| "None".to_string(), |a| a.name.clone())
        } else {
            "Mixed".to_string()
        };

        let mut picked = current;
        egui::ComboBox::from_label("Emit Signal")
            .selected_text(selected_text)
            .show_ui(ui, |ui| {
                ui.selectable_value(&mut picked, None, "None");
                for asset in project.signal_assets.values() {
                    ui.selectable_value(&mut picked, Some(asset.id), asset.name.as_str());
                }
            });
        if picked != current {
            self.assign_signal_asset(project, history, picked);
        }
    }

    fn receivers_ui(&mut self, ui: &mut egui::Ui, project: &mut Project) {
        match self.panel_state(project) {
            PanelState::DifferentBindings => {
                ui.label("Multi-edit not supported for emitters on tracks bound to different objects");
            }
            PanelState::DifferentSignals => {
                ui.label("Multi-edit not supported for emitters with different signals");
            }
            PanelState::NoBoundObject => {
                ui.label("Track has no bound object");
            }
            PanelState::Receivers {
                object,
                receivers,
                has_signal_receiver,
            } => {
                let object_name = project
                    .scene
                    .object(object)
                    .map(|o| o.name.clone())
                    .unwrap_or_default();

                if !has_signal_receiver {
                    ui.vertical_centered(|ui| {
                        ui.label(format!("{} has no Signal Receiver", object_name));
                        if ui.button("Add Signal Receiver").clicked() {
                            self.add_receiver_component(project);
                        }
                    });
                }

                for component in receivers {
                    let asset_context = self.receiver_editor(component).asset_context;
                    let open = self.foldout(component);
                    let Some(type_name) = self.component(project, component).map(|c| c.type_name().to_string())
                    else {
                        continue;
                    };

                    let response = egui::CollapsingHeader::new(egui::RichText::new(type_name).strong())
                        .id_salt(component.0)
                        .open(Some(open))
                        .show(ui, |ui| {
                            ui.horizontal(|ui| {
                                ui.label("Object");
                                ui.add_enabled(false, egui::Label::new(object_name.as_str()));
                            });
                            if let Some(receiver) = self.component(project, component).and_then(|c| c.as_signal_receiver()) {
                                for reaction in &receiver.reactions {
                                    let name = reaction
                                        .asset
                                        .and_then(|id| project.signal_assets.get(&id))
                                        .map_or("None", |a| a.name.as_str());
                                    let text = egui::RichText::new(format!("{} \u{2192} {}", name, reaction.callback));
                                    let text = if reaction.asset.is_some() && reaction.asset == asset_context {
                                        text.strong()
                                    } else {
                                        text
                                    };
                                    ui.label(text);
                                }
                            }
                        });
                    if response.header_response.clicked() {
                        self.set_foldout(component, !open);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::{Director, SceneObject, TrackBinding};
    use crate::item::{Marker, MarkerKind};
    use crate::timeline::TimelineAsset;
    use crate::track::{Track, TrackKind};

    struct Fixture {
        project: Project,
        timeline: TimelineId,
        director_object: ObjectId,
        bound: ObjectId,
        anim_track: TrackId,
        marker_track: TrackId,
    }

    fn fixture() -> Fixture {
        let mut project = Project::new();
        let director_object = project.scene.add_object(SceneObject::new("Director"));
        let bound = project.scene.add_object(SceneObject::new("Hero"));

        let mut timeline = TimelineAsset::new("T");
        let anim_track = timeline.add_track(Track::new("Anim", TrackKind::Animation));
        let marker_track = timeline.ensure_marker_track();
        let timeline_id = project.add_timeline(timeline);

        let mut director = Director::new(director_object);
        director.bind(anim_track, TrackBinding::object(bound));
        project.directors.insert(timeline_id, director);

        Fixture {
            project,
            timeline: timeline_id,
            director_object,
            bound,
            anim_track,
            marker_track,
        }
    }

    fn add_emitter(project: &mut Project, track: TrackId, time: f64) -> ItemId {
        project
            .track_mut(track)
            .unwrap()
            .add_marker(Marker::new(time, MarkerKind::SignalEmitter(SignalEmitter::default())))
    }

    #[test]
    fn test_unbound_marker_track_resolves_to_director() {
        let f = fixture();
        assert_eq!(bound_object(&f.project, f.timeline, f.marker_track), Some(f.director_object));
        assert_eq!(bound_object(&f.project, f.timeline, f.anim_track), Some(f.bound));
    }

    #[test]
    fn test_component_binding_resolves_to_owner() {
        let mut f = fixture();
        let component = f
            .project
            .scene
            .object_mut(f.bound)
            .unwrap()
            .add_component(Component::new(ComponentKind::SignalReceiver(SignalReceiver::default())));
        f.project
            .directors
            .get_mut(&f.timeline)
            .unwrap()
            .bind(f.marker_track, TrackBinding::component(f.bound, component));
        assert_eq!(bound_object(&f.project, f.timeline, f.marker_track), Some(f.bound));
    }

    #[test]
    fn test_different_bindings_detected() {
        let mut f = fixture();
        let a = add_emitter(&mut f.project, f.anim_track, 1.0);
        let b = add_emitter(&mut f.project, f.marker_track, 2.0);
        let inspector = SignalEmitterInspector::new(&f.project, f.timeline, vec![a, b]);
        assert!(!inspector.targets_have_same_binding());
        assert_eq!(inspector.panel_state(&f.project), PanelState::DifferentBindings);
    }

    #[test]
    fn test_signal_asset_requires_agreement() {
        let mut f = fixture();
        let a = add_emitter(&mut f.project, f.anim_track, 1.0);
        let b = add_emitter(&mut f.project, f.anim_track, 2.0);
        let asset = f.project.add_signal_asset(SignalAsset::new("Boom"));
        f.project
            .track_mut(f.anim_track)
            .unwrap()
            .marker_mut(a)
            .unwrap()
            .as_signal_emitter_mut()
            .unwrap()
            .asset = Some(asset);

        let mut inspector = SignalEmitterInspector::new(&f.project, f.timeline, vec![a, b]);
        assert_eq!(inspector.signal_asset(&f.project), None);
        assert_eq!(inspector.panel_state(&f.project), PanelState::DifferentSignals);

        let mut history = UndoHistory::new();
        inspector.assign_signal_asset(&mut f.project, &mut history, Some(asset));
        assert_eq!(inspector.signal_asset(&f.project), Some(asset));

        history.undo(&mut f.project).unwrap();
        assert_eq!(inspector.signal_asset(&f.project), None);
    }

    #[test]
    fn test_create_signal_adds_reaction_to_single_receiver() {
        let mut f = fixture();
        f.project
            .scene
            .object_mut(f.bound)
            .unwrap()
            .add_component(Component::new(ComponentKind::SignalReceiver(SignalReceiver::default())));
        let a = add_emitter(&mut f.project, f.anim_track, 1.0);

        let mut inspector = SignalEmitterInspector::new(&f.project, f.timeline, vec![a]);
        let mut history = UndoHistory::new();
        let asset = inspector.create_new_signal_asset(&mut f.project, &mut history, "Boom");

        let receiver_id = inspector.receivers()[0];
        let object = f.project.scene.object(f.bound).unwrap();
        let receiver = object.component(receiver_id).unwrap().as_signal_receiver().unwrap();
        assert!(receiver.is_signal_asset_handled(asset));
        assert_eq!(inspector.signal_asset(&f.project), Some(asset));
    }

    #[test]
    fn test_missing_receiver_offers_to_add_one() {
        let mut f = fixture();
        let a = add_emitter(&mut f.project, f.anim_track, 1.0);
        let mut inspector = SignalEmitterInspector::new(&f.project, f.timeline, vec![a]);

        match inspector.panel_state(&f.project) {
            PanelState::Receivers { has_signal_receiver, .. } => assert!(!has_signal_receiver),
            other => panic!("unexpected state {:?}", other),
        }

        let added = inspector.add_receiver_component(&mut f.project).unwrap();
        assert_eq!(inspector.receivers(), &[added]);
        assert!(inspector.foldout(added));
    }

    #[test]
    fn test_unbound_track_has_no_object() {
        let mut f = fixture();
        let audio = f
            .project
            .timeline_mut(f.timeline)
            .unwrap()
            .add_track(Track::new("Audio", TrackKind::Audio));
        let a = add_emitter(&mut f.project, audio, 1.0);
        let inspector = SignalEmitterInspector::new(&f.project, f.timeline, vec![a]);
        assert_eq!(inspector.panel_state(&f.project), PanelState::NoBoundObject);
    }
}
