// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scene objects and the director bindings that connect tracks to them.

use crate::signals::SignalReceiver;
use crate::track::TrackId;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Scene object ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectId(pub Uuid);

impl ObjectId {
    /// Create a new random object ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

/// Component ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComponentId(pub Uuid);

impl ComponentId {
    /// Create a new random component ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ComponentId {
    fn default() -> Self {
        Self::new()
    }
}

/// What a component does, as far as the timeline cares
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ComponentKind {
    /// Reacts to signals emitted by markers
    SignalReceiver(SignalReceiver),
    /// Any other component
    Other {
        /// Type name shown in the inspector
        type_name: String,
        /// Whether the component listens to timeline notifications
        notification_receiver: bool,
    },
}

/// A component attached to a scene object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    /// Component ID
    pub id: ComponentId,
    /// Component data
    pub kind: ComponentKind,
}

impl Component {
    /// Create a component
    pub fn new(kind: ComponentKind) -> Self {
        Self {
            id: ComponentId::new(),
            kind,
        }
    }

    /// Type name shown in headers
    pub fn type_name(&self) -> &str {
        match &self.kind {
            ComponentKind::SignalReceiver(_) => "Signal Receiver",
            ComponentKind::Other { type_name, .. } => type_name,
        }
    }

    /// Whether the component receives timeline notifications
    pub fn is_notification_receiver(&self) -> bool {
        match &self.kind {
            ComponentKind::SignalReceiver(_) => true,
            ComponentKind::Other {
                notification_receiver,
                ..
            } => *notification_receiver,
        }
    }

    /// Signal receiver data, if this component is one
    pub fn as_signal_receiver(&self) -> Option<&SignalReceiver> {
        match &self.kind {
            ComponentKind::SignalReceiver(r) => Some(r),
            ComponentKind::Other { .. } => None,
        }
    }

    /// Mutable signal receiver data
    pub fn as_signal_receiver_mut(&mut self) -> Option<&mut SignalReceiver> {
        match &mut self.kind {
            ComponentKind::SignalReceiver(r) => Some(r),
            ComponentKind::Other { .. } => None,
        }
    }
}

/// An object in the scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    /// Object ID
    pub id: ObjectId,
    /// Object name
    pub name: String,
    /// Attached components
    pub components: Vec<Component>,
}

impl SceneObject {
    /// Create an object without components
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ObjectId::new(),
            name: name.into(),
            components: Vec::new(),
        }
    }

    /// Attach a component
    pub fn add_component(&mut self, component: Component) -> ComponentId {
        let id = component.id;
        self.components.push(component);
        id
    }

    /// Get a component
    pub fn component(&self, id: ComponentId) -> Option<&Component> {
        self.components.iter().find(|c| c.id == id)
    }

    /// Get a mutable component
    pub fn component_mut(&mut self, id: ComponentId) -> Option<&mut Component> {
        self.components.iter_mut().find(|c| c.id == id)
    }
}

/// Objects the timelines can bind to
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scene {
    /// Objects by ID
    pub objects: IndexMap<ObjectId, SceneObject>,
}

impl Scene {
    /// Add an object
    pub fn add_object(&mut self, object: SceneObject) -> ObjectId {
        let id = object.id;
        self.objects.insert(id, object);
        id
    }

    /// Get an object
    pub fn object(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.get(&id)
    }

    /// Get a mutable object
    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.get_mut(&id)
    }
}

/// Binding of a track to an object or one of its components
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackBinding {
    /// Target object
    pub object: ObjectId,
    /// Target component (optional)
    pub component: Option<ComponentId>,
}

impl TrackBinding {
    /// Create a binding to an object
    pub fn object(object: ObjectId) -> Self {
        Self {
            object,
            component: None,
        }
    }

    /// Create a binding to a component
    pub fn component(object: ObjectId, component: ComponentId) -> Self {
        Self {
            object,
            component: Some(component),
        }
    }
}

/// Plays a timeline in the scene and owns its track bindings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Director {
    /// Object the director lives on
    pub object: ObjectId,
    /// Track bindings
    pub bindings: IndexMap<TrackId, TrackBinding>,
}

impl Director {
    /// Create a director living on `object`
    pub fn new(object: ObjectId) -> Self {
        Self {
            object,
            bindings: IndexMap::new(),
        }
    }

    /// Bind a track
    pub fn bind(&mut self, track: TrackId, binding: TrackBinding) {
        self.bindings.insert(track, binding);
    }

    /// Get the binding of a track
    pub fn binding(&self, track: TrackId) -> Option<TrackBinding> {
        self.bindings.get(&track).copied()
    }
}
