//! Namespaces and their normalization.
//!
//! A [`Namespace`] is an ordered mapping from binding name to [`Value`].
//! Inputs arrive either as a mapping already or as something module-like
//! that can enumerate its bindings through [`NamespaceSource`];
//! [`normalize`] turns both into a plain `Namespace` so that nothing
//! downstream cares where the bindings came from.

use std::collections::btree_map;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::value::{Docstring, ModuleRef, ObjectRef, Value};

/// Errors raised while normalizing namespace inputs.
#[derive(Debug, Error)]
pub enum NamespaceError {
    #[error("unknown module format: {description}")]
    UnsupportedNamespaceFormat { description: String },
}

/// Ordered mapping from binding name to value, sorted by name.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Namespace {
    entries: BTreeMap<String, Value>,
}

impl Namespace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a binding, returning the value it replaced.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(name.into(), value.into())
    }

    /// Builder-style [`Namespace::insert`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.entries.iter()
    }

    /// The namespace's self-declared name: the text of its `__name__` binding.
    pub fn declared_name(&self) -> Option<&str> {
        self.get("__name__").and_then(Value::as_text)
    }
}

impl FromIterator<(String, Value)> for Namespace {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Namespace {
    type Item = (String, Value);
    type IntoIter = btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a Namespace {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Something module-like whose bindings can be enumerated.
///
/// One implementation exists per reflection mechanism; the rest of the crate
/// only ever sees the [`Namespace`] produced from it.
pub trait NamespaceSource {
    /// Names of all visible bindings. Order is not significant.
    fn list_names(&self) -> Vec<String>;

    /// Value bound to `name`, if it is still bound.
    fn get(&self, name: &str) -> Option<Value>;
}

impl NamespaceSource for Namespace {
    fn list_names(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    fn get(&self, name: &str) -> Option<Value> {
        self.entries.get(name).cloned()
    }
}

/// A shallow module reference exposes the attributes captured for it.
impl NamespaceSource for ModuleRef {
    fn list_names(&self) -> Vec<String> {
        if let Some(members) = &self.members {
            return members.list_names();
        }
        let mut names = vec!["__doc__".to_string()];
        if self.name.is_some() {
            names.push("__name__".to_string());
        }
        names
    }

    fn get(&self, name: &str) -> Option<Value> {
        if let Some(members) = &self.members {
            return NamespaceSource::get(members, name);
        }
        match name {
            "__name__" => self.name.clone().map(|n| ObjectRef::string(n).into()),
            "__doc__" => Some(match &self.doc {
                Docstring::Text(text) => ObjectRef::string(text.clone()).into(),
                Docstring::Raw(_) | Docstring::Missing => ObjectRef::of_type("NoneType").into(),
            }),
            _ => None,
        }
    }
}

/// An input to [`normalize`].
pub enum NamespaceLike<'a> {
    /// Already a mapping.
    Mapping(&'a Namespace),
    /// A module-like object to enumerate.
    Source(&'a dyn NamespaceSource),
    /// An arbitrary value, which is only acceptable when module-like.
    Value(&'a Value),
}

impl<'a> From<&'a Namespace> for NamespaceLike<'a> {
    fn from(namespace: &'a Namespace) -> Self {
        NamespaceLike::Mapping(namespace)
    }
}

impl<'a> From<&'a Value> for NamespaceLike<'a> {
    fn from(value: &'a Value) -> Self {
        NamespaceLike::Value(value)
    }
}

/// Convert a namespace-like input into a plain [`Namespace`].
///
/// Mappings come back unchanged. Module-like inputs are enumerated once;
/// names that disappear between listing and lookup are skipped.
pub fn normalize(input: NamespaceLike<'_>) -> Result<Namespace, NamespaceError> {
    match input {
        NamespaceLike::Mapping(namespace) => Ok(namespace.clone()),
        NamespaceLike::Source(source) => Ok(from_source(source)),
        NamespaceLike::Value(Value::Module(module)) => Ok(from_source(module)),
        NamespaceLike::Value(other) => Err(NamespaceError::UnsupportedNamespaceFormat {
            description: describe(other),
        }),
    }
}

fn from_source(source: &dyn NamespaceSource) -> Namespace {
    source
        .list_names()
        .into_iter()
        .filter_map(|name| {
            let value = source.get(&name)?;
            Some((name, value))
        })
        .collect()
}

fn describe(value: &Value) -> String {
    match value {
        Value::Module(m) => format!("<module {}>", m.name.as_deref().unwrap_or("?")),
        Value::Callable(c) => format!("<{} {}>", c.type_name, c.name),
        Value::Type(t) => format!("<class {}>", t.name),
        Value::Other(o) => match &o.text {
            Some(text) => format!("{text:?}"),
            None => format!("<{} object>", o.type_name),
        },
    }
}
