//! Namespace classification and merging.
//!
//! [`classify`] partitions a namespace into seven disjoint buckets by running
//! each binding through a fixed predicate chain:
//!
//! 1. module-like value (internal or external to the enclosing namespace)
//! 2. plain function
//! 3. dunder binding name
//! 4. exception type
//! 5. any other type
//! 6. everything else
//!
//! The order is significant: a function bound under a dunder name is a
//! function, while a class bound under a dunder name is dunder.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use tracing::debug;

use crate::namespace::{normalize, Namespace, NamespaceError, NamespaceLike};
use crate::value::Value;

/// A classification bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    InternalModules,
    ExternalModules,
    Functions,
    Classes,
    Exceptions,
    Dunder,
    Other,
}

impl Category {
    /// All categories in canonical order.
    pub const ALL: [Category; 7] = [
        Category::InternalModules,
        Category::ExternalModules,
        Category::Functions,
        Category::Classes,
        Category::Exceptions,
        Category::Dunder,
        Category::Other,
    ];

    /// Snake-case identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::InternalModules => "internal_modules",
            Category::ExternalModules => "external_modules",
            Category::Functions => "functions",
            Category::Classes => "classes",
            Category::Exceptions => "exceptions",
            Category::Dunder => "dunder",
            Category::Other => "other",
        }
    }

    /// Heading used for the category's report section.
    pub fn title(&self) -> &'static str {
        match self {
            Category::InternalModules => "Internal Modules",
            Category::ExternalModules => "External Modules",
            Category::Functions => "Functions",
            Category::Classes => "Classes",
            Category::Exceptions => "Exceptions",
            Category::Dunder => "Dunder",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown category: {s}"))
    }
}

/// Whether `name` is reserved (`__like_this__`).
pub fn is_dunder(name: &str) -> bool {
    name.starts_with("__") && name.ends_with("__")
}

/// A namespace partitioned into category buckets.
///
/// Buckets are keyed by binding name, so every binding of the source
/// namespace lands in exactly one bucket even when several bindings share a
/// declared name. [`Classification::label`] gives the declared name used for
/// display.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    name: Option<String>,
    buckets: BTreeMap<Category, Namespace>,
}

impl Classification {
    /// Declared name of the classified namespace.
    pub fn namespace_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Members of one bucket. Every bucket exists, possibly empty.
    pub fn bucket(&self, category: Category) -> &Namespace {
        static EMPTY: std::sync::OnceLock<Namespace> = std::sync::OnceLock::new();
        self.buckets
            .get(&category)
            .unwrap_or_else(|| EMPTY.get_or_init(Namespace::new))
    }

    /// Buckets in canonical order.
    pub fn buckets(&self) -> impl Iterator<Item = (Category, &Namespace)> {
        Category::ALL.into_iter().map(move |c| (c, self.bucket(c)))
    }

    /// Number of members per bucket, in canonical order.
    pub fn counts(&self) -> Vec<(Category, usize)> {
        self.buckets().map(|(c, ns)| (c, ns.len())).collect()
    }

    /// Total number of classified bindings.
    pub fn total(&self) -> usize {
        self.buckets.values().map(Namespace::len).sum()
    }

    /// Category a binding was assigned to.
    pub fn category_of(&self, binding: &str) -> Option<Category> {
        self.buckets()
            .find(|(_, ns)| ns.contains(binding))
            .map(|(c, _)| c)
    }

    /// Display key for a member: the qualified name of modules (falling back
    /// to the binding name), the declared name of functions, and the binding
    /// name otherwise.
    pub fn label<'a>(category: Category, binding: &'a str, value: &'a Value) -> &'a str {
        match (category, value) {
            (Category::InternalModules | Category::ExternalModules, Value::Module(m)) => {
                m.name.as_deref().unwrap_or(binding)
            }
            (Category::Functions, Value::Callable(c)) => &c.name,
            _ => binding,
        }
    }
}

/// Decide the bucket of one binding.
///
/// `enclosing` is the declared name of the namespace the binding lives in.
pub fn categorize(enclosing: Option<&str>, binding: &str, value: &Value) -> Category {
    if let Value::Module(module) = value {
        let qualified = module.name.as_deref().unwrap_or(binding);
        return match enclosing {
            Some(parent) if !parent.is_empty() && qualified.starts_with(parent) => {
                Category::InternalModules
            }
            _ => Category::ExternalModules,
        };
    }
    if value.is_function() {
        return Category::Functions;
    }
    if is_dunder(binding) {
        return Category::Dunder;
    }
    match value {
        Value::Type(t) if t.exception => Category::Exceptions,
        Value::Type(_) => Category::Classes,
        _ => Category::Other,
    }
}

/// Partition a namespace into category buckets.
pub fn classify(namespace: &Namespace) -> Classification {
    let enclosing = namespace.declared_name();

    let mut buckets: BTreeMap<Category, Namespace> =
        Category::ALL.into_iter().map(|c| (c, Namespace::new())).collect();

    for (binding, value) in namespace {
        let category = categorize(enclosing, binding, value);
        buckets
            .entry(category)
            .or_default()
            .insert(binding.clone(), value.clone());
    }

    let classification = Classification {
        name: enclosing.map(str::to_string),
        buckets,
    };
    debug!(
        namespace = enclosing.unwrap_or("<unnamed>"),
        total = classification.total(),
        "classified namespace"
    );
    classification
}

/// Outcome of [`combine`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MergeResult {
    /// Bindings whose name occurs in exactly one input.
    pub unique: Namespace,
    /// Per input, in input order, the bindings whose name collides.
    pub nonunique: Vec<Namespace>,
}

/// Merge namespaces, separating colliding names from unique ones.
///
/// A name collides when it is bound in two or more inputs. Passing the same
/// namespace twice makes all of its names collide.
pub fn combine(inputs: Vec<NamespaceLike<'_>>) -> Result<MergeResult, NamespaceError> {
    let namespaces = inputs
        .into_iter()
        .map(normalize)
        .collect::<Result<Vec<_>, _>>()?;

    let mut occurrences: HashMap<&str, usize> = HashMap::new();
    for ns in &namespaces {
        for name in ns.names() {
            *occurrences.entry(name).or_default() += 1;
        }
    }
    let is_unique = |name: &str| occurrences.get(name) == Some(&1);

    let unique = namespaces
        .iter()
        .flat_map(|ns| ns.iter())
        .filter(|(name, _)| is_unique(name))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();

    let nonunique = namespaces
        .iter()
        .map(|ns| {
            ns.iter()
                .filter(|(name, _)| !is_unique(name))
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect()
        })
        .collect();

    Ok(MergeResult { unique, nonunique })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{CallableRef, ModuleRef, ObjectRef, TypeRef};
    use pretty_assertions::assert_eq;

    fn int() -> Value {
        ObjectRef::of_type("int").into()
    }

    fn pkg() -> Namespace {
        Namespace::new()
            .with("__name__", ObjectRef::string("pkg"))
            .with("__doc__", ObjectRef::string("Package docs."))
            .with("sub", ModuleRef::named("pkg.sub"))
            .with("np", ModuleRef::named("numpy"))
            .with("helper", CallableRef::function("helper", "pkg.util"))
            .with("__getattr__", CallableRef::function("__getattr__", "pkg"))
            .with("__loader__", TypeRef::class("SourceFileLoader"))
            .with("len", CallableRef::builtin("len"))
            .with("Widget", TypeRef::class("Widget"))
            .with("WidgetError", TypeRef::exception("WidgetError"))
            .with("VERSION", ObjectRef::string("1.0"))
    }

    #[test]
    fn test_classify_buckets() {
        let c = classify(&pkg());

        assert_eq!(c.namespace_name(), Some("pkg"));
        assert_eq!(c.category_of("sub"), Some(Category::InternalModules));
        assert_eq!(c.category_of("np"), Some(Category::ExternalModules));
        assert_eq!(c.category_of("helper"), Some(Category::Functions));
        assert_eq!(c.category_of("Widget"), Some(Category::Classes));
        assert_eq!(c.category_of("WidgetError"), Some(Category::Exceptions));
        assert_eq!(c.category_of("__name__"), Some(Category::Dunder));
        assert_eq!(c.category_of("len"), Some(Category::Other));
        assert_eq!(c.category_of("VERSION"), Some(Category::Other));
        assert_eq!(c.total(), 11);
    }

    #[test]
    fn test_function_precedes_dunder() {
        let c = classify(&pkg());
        assert_eq!(c.category_of("__getattr__"), Some(Category::Functions));
        // Types are checked after the dunder pattern.
        assert_eq!(c.category_of("__loader__"), Some(Category::Dunder));
    }

    #[test]
    fn test_every_bucket_present() {
        let c = classify(&Namespace::new());
        assert_eq!(c.counts().len(), 7);
        assert!(c.buckets().all(|(_, ns)| ns.is_empty()));
    }

    #[test]
    fn test_unnamed_namespace_has_no_internal_modules() {
        let ns = Namespace::new().with("sub", ModuleRef::named("pkg.sub"));
        assert_eq!(classify(&ns).category_of("sub"), Some(Category::ExternalModules));

        let ns = ns.with("__name__", ObjectRef::string(""));
        assert_eq!(classify(&ns).category_of("sub"), Some(Category::ExternalModules));
    }

    #[test]
    fn test_module_without_name_uses_binding() {
        let ns = Namespace::new()
            .with("__name__", ObjectRef::string("pkg"))
            .with("pkgish", ModuleRef::default());
        let c = classify(&ns);
        assert_eq!(c.category_of("pkgish"), Some(Category::InternalModules));
        let value = c.bucket(Category::InternalModules).get("pkgish").unwrap();
        assert_eq!(Classification::label(Category::InternalModules, "pkgish", value), "pkgish");
    }

    #[test]
    fn test_internal_boundary_is_a_prefix_test() {
        let ns = Namespace::new()
            .with("__name__", ObjectRef::string("pkg"))
            .with("sub", ModuleRef::named("pkg.sub"))
            .with("other", ModuleRef::named("otherlib"))
            .with("sibling", ModuleRef::named("pkgtools"));
        let c = classify(&ns);
        assert_eq!(c.category_of("sub"), Some(Category::InternalModules));
        assert_eq!(c.category_of("other"), Some(Category::ExternalModules));
        assert_eq!(c.category_of("sibling"), Some(Category::InternalModules));
    }

    #[test]
    fn test_aliases_are_kept() {
        let f = CallableRef::function("helper", "pkg.util");
        let ns = Namespace::new()
            .with("helper", f.clone())
            .with("alias", f);
        let c = classify(&ns);
        let functions = c.bucket(Category::Functions);
        assert_eq!(functions.len(), 2);
        for (binding, value) in functions {
            assert_eq!(Classification::label(Category::Functions, binding, value), "helper");
        }
    }

    #[test]
    fn test_category_round_trips_through_str() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>().unwrap(), category);
        }
        assert!("modules".parse::<Category>().is_err());
    }

    #[test]
    fn test_combine_disjoint_and_colliding() {
        let a = Namespace::new().with("x", int()).with("y", ObjectRef::string("2"));
        let b = Namespace::new().with("y", ObjectRef::string("3")).with("z", int());

        let merged = combine(vec![(&a).into(), (&b).into()]).unwrap();

        assert_eq!(merged.unique, Namespace::new().with("x", int()).with("z", int()));
        assert_eq!(
            merged.nonunique,
            vec![
                Namespace::new().with("y", ObjectRef::string("2")),
                Namespace::new().with("y", ObjectRef::string("3")),
            ]
        );
    }

    #[test]
    fn test_combine_self_collides() {
        let a = Namespace::new().with("x", int()).with("y", int());
        let merged = combine(vec![(&a).into(), (&a).into()]).unwrap();
        assert!(merged.unique.is_empty());
        assert_eq!(merged.nonunique, vec![a.clone(), a]);
    }

    #[test]
    fn test_combine_rejects_non_namespace() {
        let a = Namespace::new().with("x", int());
        let bad = int();
        let err = combine(vec![(&a).into(), (&bad).into()]).unwrap_err();
        assert!(matches!(err, NamespaceError::UnsupportedNamespaceFormat { .. }));
    }

    #[test]
    fn test_combine_empty_input() {
        let merged = combine(Vec::new()).unwrap();
        assert!(merged.unique.is_empty());
        assert!(merged.nonunique.is_empty());
    }
}
