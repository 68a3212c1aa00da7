use crate::{
    animation::{ease::Ease, lerp::Animatable},
    flow::thread::Thread,
    foundation::{
        color::Color,
        core::Vec2,
        error::{FlowError, FlowResult},
    },
    signal::signal::Signal,
};
use std::collections::BTreeMap;

/// An animatable property slot of a [`Node`].
#[derive(Debug, Clone)]
pub enum Property {
    /// Number.
    Scalar(Signal<f64>),
    /// 2D vector such as a position.
    Vector(Signal<Vec2>),
    /// RGBA color.
    Color(Signal<Color>),
    /// Text, stepped when tweened.
    Text(Signal<String>),
    /// Boolean, stepped when tweened.
    Flag(Signal<bool>),
}

impl Property {
    /// Name of the value type held by this slot.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Scalar(_) => f64::TYPE_NAME,
            Self::Vector(_) => Vec2::TYPE_NAME,
            Self::Color(_) => Color::TYPE_NAME,
            Self::Text(_) => String::TYPE_NAME,
            Self::Flag(_) => bool::TYPE_NAME,
        }
    }

    /// Current value as JSON.
    pub fn sample(&self) -> FlowResult<serde_json::Value> {
        Ok(match self {
            Self::Scalar(s) => serde_json::to_value(s.read()?)?,
            Self::Vector(s) => {
                let v = s.read()?;
                serde_json::json!([v.x, v.y])
            }
            Self::Color(s) => serde_json::to_value(s.read()?)?,
            Self::Text(s) => serde_json::to_value(s.read()?)?,
            Self::Flag(s) => serde_json::to_value(s.read()?)?,
        })
    }

    /// Fresh signal cell holding the current value.
    fn snapshot(&self) -> FlowResult<Self> {
        Ok(match self {
            Self::Scalar(s) => Self::Scalar(s.snapshot()?),
            Self::Vector(s) => Self::Vector(s.snapshot()?),
            Self::Color(s) => Self::Color(s.snapshot()?),
            Self::Text(s) => Self::Text(s.snapshot()?),
            Self::Flag(s) => Self::Flag(s.snapshot()?),
        })
    }
}

/// Value types that can live in a [`Property`] slot.
pub trait PropertyValue: Animatable + Sized {
    /// Name reported in type mismatch errors.
    const TYPE_NAME: &'static str;

    /// Wrap a signal into its slot variant.
    fn into_property(signal: Signal<Self>) -> Property;

    /// Signal held by `prop`, when it has this type.
    fn from_property(prop: &Property) -> Option<&Signal<Self>>;
}

impl PropertyValue for f64 {
    const TYPE_NAME: &'static str = "f64";

    fn into_property(signal: Signal<Self>) -> Property {
        Property::Scalar(signal)
    }

    fn from_property(prop: &Property) -> Option<&Signal<Self>> {
        match prop {
            Property::Scalar(s) => Some(s),
            _ => None,
        }
    }
}

impl PropertyValue for Vec2 {
    const TYPE_NAME: &'static str = "vec2";

    fn into_property(signal: Signal<Self>) -> Property {
        Property::Vector(signal)
    }

    fn from_property(prop: &Property) -> Option<&Signal<Self>> {
        match prop {
            Property::Vector(s) => Some(s),
            _ => None,
        }
    }
}

impl PropertyValue for Color {
    const TYPE_NAME: &'static str = "color";

    fn into_property(signal: Signal<Self>) -> Property {
        Property::Color(signal)
    }

    fn from_property(prop: &Property) -> Option<&Signal<Self>> {
        match prop {
            Property::Color(s) => Some(s),
            _ => None,
        }
    }
}

impl PropertyValue for String {
    const TYPE_NAME: &'static str = "string";

    fn into_property(signal: Signal<Self>) -> Property {
        Property::Text(signal)
    }

    fn from_property(prop: &Property) -> Option<&Signal<Self>> {
        match prop {
            Property::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl PropertyValue for bool {
    const TYPE_NAME: &'static str = "bool";

    fn into_property(signal: Signal<Self>) -> Property {
        Property::Flag(signal)
    }

    fn from_property(prop: &Property) -> Option<&Signal<Self>> {
        match prop {
            Property::Flag(s) => Some(s),
            _ => None,
        }
    }
}

/// A scene node: static properties, animatable properties and exclusively owned children.
///
/// Not `Clone`: sharing signal handles between two nodes goes through [`Node::signal`], and
/// [`Node::deep_clone`] makes an independent copy.
#[derive(Debug)]
pub struct Node {
    kind: String,
    key: Option<String>,
    statics: BTreeMap<String, serde_json::Value>,
    props: BTreeMap<String, Property>,
    children: Vec<Node>,
}

impl Node {
    /// Node of `kind` with no key, properties or children.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            key: None,
            statics: BTreeMap::new(),
            props: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    /// Set the key used by [`Node::find`] and [`Node::remove_child`].
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Add a non-animatable property, copied by value on clone.
    pub fn with_static(mut self, name: &str, value: impl serde::Serialize) -> FlowResult<Self> {
        self.statics
            .insert(name.to_owned(), serde_json::to_value(value)?);
        Ok(self)
    }

    /// Add an animatable property backed by a new signal.
    pub fn with_prop<T: PropertyValue>(mut self, name: &str, value: T) -> Self {
        self.insert_prop(name, Signal::new(value));
        self
    }

    /// Add an animatable property backed by an existing signal, e.g. a computed one.
    pub fn with_signal<T: PropertyValue>(mut self, name: &str, signal: Signal<T>) -> Self {
        self.insert_prop(name, signal);
        self
    }

    fn insert_prop<T: PropertyValue>(&mut self, name: &str, signal: Signal<T>) {
        let label = match &self.key {
            Some(key) => format!("{key}.{name}"),
            None => format!("{}.{name}", self.kind),
        };
        let signal = if signal.label() == "signal" {
            signal.named(&label)
        } else {
            signal
        };
        self.props.insert(name.to_owned(), T::into_property(signal));
    }

    /// Node kind, e.g. `rect`.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Key set with [`Node::with_key`].
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Static property `name`.
    pub fn static_value(&self, name: &str) -> Option<&serde_json::Value> {
        self.statics.get(name)
    }

    /// Insert or replace static property `name`.
    pub fn set_static(&mut self, name: &str, value: impl serde::Serialize) -> FlowResult<()> {
        self.statics
            .insert(name.to_owned(), serde_json::to_value(value)?);
        Ok(())
    }

    /// Animatable property slot `name`.
    pub fn prop(&self, name: &str) -> Option<&Property> {
        self.props.get(name)
    }

    /// Names of the animatable properties, sorted.
    pub fn prop_names(&self) -> impl Iterator<Item = &str> {
        self.props.keys().map(String::as_str)
    }

    /// Handle to the signal behind property `name`.
    ///
    /// Fails with a validation error when the property is missing or holds another type.
    pub fn signal<T: PropertyValue>(&self, name: &str) -> FlowResult<Signal<T>> {
        let prop = self.props.get(name).ok_or_else(|| {
            FlowError::validation(format!("node `{}` has no property `{name}`", self.describe()))
        })?;
        T::from_property(prop).cloned().ok_or_else(|| {
            FlowError::validation(format!(
                "property `{name}` of node `{}` holds {}, not {}",
                self.describe(),
                prop.type_name(),
                T::TYPE_NAME
            ))
        })
    }

    /// Read property `name`.
    pub fn get<T: PropertyValue>(&self, name: &str) -> FlowResult<T> {
        self.signal::<T>(name)?.read()
    }

    /// Write property `name`.
    pub fn set<T: PropertyValue>(&self, name: &str, value: T) -> FlowResult<()> {
        self.signal::<T>(name)?.write(value);
        Ok(())
    }

    /// Coroutine tweening property `name` to `target`.
    pub fn animate<T: PropertyValue>(
        &self,
        name: &str,
        target: T,
        duration: f64,
        ease: Ease,
    ) -> FlowResult<Thread> {
        self.signal::<T>(name)?.animate_to(target, duration, ease)
    }

    /// Current values of every animatable property, by name.
    pub fn values(&self) -> FlowResult<BTreeMap<String, serde_json::Value>> {
        self.props
            .iter()
            .map(|(k, p)| Ok((k.clone(), p.sample()?)))
            .collect()
    }

    /// Append a child.
    pub fn add(&mut self, child: Node) {
        self.children.push(child);
    }

    /// Builder form of [`Node::add`].
    pub fn with_child(mut self, child: Node) -> Self {
        self.add(child);
        self
    }

    /// Direct children in insertion order.
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Mutable direct children.
    pub fn children_mut(&mut self) -> &mut [Node] {
        &mut self.children
    }

    /// Detach and return the first direct child with `key`.
    pub fn remove_child(&mut self, key: &str) -> Option<Node> {
        let idx = self
            .children
            .iter()
            .position(|c| c.key.as_deref() == Some(key))?;
        Some(self.children.remove(idx))
    }

    /// Detach and return every child.
    pub fn remove_children(&mut self) -> Vec<Node> {
        std::mem::take(&mut self.children)
    }

    /// Depth-first search of this node and its descendants by key.
    pub fn find(&self, key: &str) -> Option<&Node> {
        if self.key.as_deref() == Some(key) {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(key))
    }

    /// Mutable form of [`Node::find`].
    pub fn find_mut(&mut self, key: &str) -> Option<&mut Node> {
        if self.key.as_deref() == Some(key) {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.find_mut(key))
    }

    /// Structural copy of this subtree with a fresh signal for every animatable property.
    ///
    /// Each new signal holds the source's value at the time of the call; computed properties
    /// become plain values. Statics are copied by value. Running tweens on the source keep
    /// writing to the source only.
    pub fn deep_clone(&self) -> FlowResult<Node> {
        let props = self
            .props
            .iter()
            .map(|(k, p)| Ok((k.clone(), p.snapshot()?)))
            .collect::<FlowResult<BTreeMap<_, _>>>()?;
        let children = self
            .children
            .iter()
            .map(Node::deep_clone)
            .collect::<FlowResult<Vec<_>>>()?;
        Ok(Node {
            kind: self.kind.clone(),
            key: self.key.clone(),
            statics: self.statics.clone(),
            props,
            children,
        })
    }

    fn describe(&self) -> &str {
        self.key.as_deref().unwrap_or(&self.kind)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/node.rs"]
mod tests;
