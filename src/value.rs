//! Runtime value model.
//!
//! Values bound in a namespace are reduced to a closed set of variants at the
//! boundary where they are captured (see [`crate::interpreter`]), so the
//! classifier dispatches over a tag instead of inspecting live objects.

use serde::{Deserialize, Serialize};

use crate::namespace::Namespace;

/// Documentation attached to a value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Docstring {
    /// The value has no documentation.
    #[default]
    Missing,
    /// Documentation text.
    Text(String),
    /// A documentation attribute that is not text, in printable form.
    Raw(String),
}

impl Docstring {
    pub fn text(text: impl Into<String>) -> Self {
        Docstring::Text(text.into())
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Docstring::Missing)
    }
}

// Wire form: `null`, a string, or `{"raw": "..."}`.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum DocstringRepr {
    Text(String),
    Raw { raw: String },
}

impl Serialize for Docstring {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let repr = match self {
            Docstring::Missing => None,
            Docstring::Text(text) => Some(DocstringRepr::Text(text.clone())),
            Docstring::Raw(raw) => Some(DocstringRepr::Raw { raw: raw.clone() }),
        };
        repr.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Docstring {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<DocstringRepr>::deserialize(deserializer)? {
            None => Docstring::Missing,
            Some(DocstringRepr::Text(text)) => Docstring::Text(text),
            Some(DocstringRepr::Raw { raw }) => Docstring::Raw(raw),
        })
    }
}

/// A module-like value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ModuleRef {
    /// Self-declared qualified name (`pkg.sub`).
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub doc: Docstring,
    /// The module's own bindings, when they were captured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub members: Option<Namespace>,
}

impl ModuleRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn with_doc(mut self, doc: Docstring) -> Self {
        self.doc = doc;
        self
    }

    pub fn with_members(mut self, members: Namespace) -> Self {
        self.members = Some(members);
        self
    }
}

/// A callable value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallableRef {
    /// Declared name, which may differ from the binding name.
    pub name: String,
    /// Defining module.
    #[serde(default)]
    pub module: Option<String>,
    /// Plain function, as opposed to a builtin, bound method or callable object.
    #[serde(default)]
    pub function: bool,
    pub type_name: String,
    #[serde(default)]
    pub doc: Docstring,
}

impl CallableRef {
    /// A plain function declared as `name` in `module`.
    pub fn function(name: impl Into<String>, module: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            module: Some(module.into()),
            function: true,
            type_name: "function".to_string(),
            doc: Docstring::Missing,
        }
    }

    /// A callable that is not a plain function.
    pub fn builtin(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            module: None,
            function: false,
            type_name: "builtin_function_or_method".to_string(),
            doc: Docstring::Missing,
        }
    }

    pub fn with_doc(mut self, doc: Docstring) -> Self {
        self.doc = doc;
        self
    }
}

/// A class or other type object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeRef {
    pub name: String,
    #[serde(default)]
    pub module: Option<String>,
    /// Subtype of the universal exception base.
    #[serde(default)]
    pub exception: bool,
    /// Name of the metaclass.
    pub type_name: String,
    #[serde(default)]
    pub doc: Docstring,
}

impl TypeRef {
    pub fn class(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            module: None,
            exception: false,
            type_name: "type".to_string(),
            doc: Docstring::Missing,
        }
    }

    pub fn exception(name: impl Into<String>) -> Self {
        Self {
            exception: true,
            ..Self::class(name)
        }
    }

    pub fn with_doc(mut self, doc: Docstring) -> Self {
        self.doc = doc;
        self
    }
}

/// Any other value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRef {
    pub type_name: String,
    /// Content of string objects.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl ObjectRef {
    pub fn of_type(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            text: None,
        }
    }

    pub fn string(text: impl Into<String>) -> Self {
        Self {
            type_name: "str".to_string(),
            text: Some(text.into()),
        }
    }
}

/// A value bound in a namespace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Value {
    Module(ModuleRef),
    Callable(CallableRef),
    Type(TypeRef),
    Other(ObjectRef),
}

impl Value {
    /// Runtime type descriptor, as shown for dunder and other entries.
    pub fn type_descriptor(&self) -> &str {
        match self {
            Value::Module(_) => "module",
            Value::Callable(c) => &c.type_name,
            Value::Type(t) => &t.type_name,
            Value::Other(o) => &o.type_name,
        }
    }

    /// Documentation of the value. Plain objects report none.
    pub fn doc(&self) -> &Docstring {
        static NONE: Docstring = Docstring::Missing;
        match self {
            Value::Module(m) => &m.doc,
            Value::Callable(c) => &c.doc,
            Value::Type(t) => &t.doc,
            Value::Other(_) => &NONE,
        }
    }

    /// String content, for string objects.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Other(o) => o.text.as_deref(),
            _ => None,
        }
    }

    /// Plain function (not a builtin, method object or class).
    pub fn is_function(&self) -> bool {
        matches!(self, Value::Callable(c) if c.function)
    }
}

impl From<ModuleRef> for Value {
    fn from(m: ModuleRef) -> Self {
        Value::Module(m)
    }
}

impl From<CallableRef> for Value {
    fn from(c: CallableRef) -> Self {
        Value::Callable(c)
    }
}

impl From<TypeRef> for Value {
    fn from(t: TypeRef) -> Self {
        Value::Type(t)
    }
}

impl From<ObjectRef> for Value {
    fn from(o: ObjectRef) -> Self {
        Value::Other(o)
    }
}
