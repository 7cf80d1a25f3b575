//! tooldev - CLI tools for python development.
//!
//! The core is a namespace summarizer: given the bindings of a loaded module,
//! it sorts every name into one of seven categories (internal modules,
//! external modules, functions, classes, exceptions, dunder names, other)
//! and renders a tabular report.
//!
//! # Quick Start
//!
//! ```
//! use tooldev::classify::{classify, Category};
//! use tooldev::namespace::Namespace;
//! use tooldev::value::{CallableRef, ModuleRef, ObjectRef};
//!
//! let ns = Namespace::new()
//!     .with("__name__", ObjectRef::string("pkg"))
//!     .with("sub", ModuleRef::named("pkg.sub"))
//!     .with("helper", CallableRef::function("helper", "pkg.util"));
//!
//! let classification = classify(&ns);
//! assert_eq!(classification.category_of("sub"), Some(Category::InternalModules));
//! assert_eq!(classification.category_of("helper"), Some(Category::Functions));
//! ```
//!
//! # Modules
//!
//! - [`value`] - Closed model of runtime values
//! - [`namespace`] - Namespaces and normalization
//! - [`classify`] - Partitioning and merging namespaces
//! - [`summary`] - Report building and rendering
//! - [`table`] - Table and box layout
//! - [`theme`] - Styles and color modes
//! - [`interpreter`] - Python subprocess bridge
//! - [`resolver`] - Directory to module name
//! - [`config`] - TOML configuration

pub mod value;
pub mod namespace;
pub mod classify;
pub mod theme;
pub mod table;
pub mod summary;
pub mod interpreter;
pub mod resolver;
pub mod config;
pub mod shell;
pub mod errors;

// Re-export key types at crate root for convenience
pub use classify::{classify, combine, Category, Classification, MergeResult};
pub use config::{Config, ConfigError};
pub use errors::TooldevError;
pub use interpreter::{Interpreter, InterpreterError, ModuleSnapshot};
pub use namespace::{normalize, Namespace, NamespaceError, NamespaceLike, NamespaceSource};
pub use summary::{render_summary, Report, Section, SummaryError, SummaryOptions};
pub use theme::{ColorMode, Style, Theme};
pub use value::{CallableRef, Docstring, ModuleRef, ObjectRef, TypeRef, Value};
