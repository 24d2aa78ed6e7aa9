//! Registry of every class produced in one run

use indexmap::IndexMap;
use std::collections::{BTreeMap, BTreeSet};

use super::errors::GenerationError;
use super::types::{GeneratedClass, Namespace};

/// Module index for one namespace directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceIndex {
    pub namespace: Namespace,
    /// Child namespace segments, sorted
    pub children: Vec<String>,
    /// Short names of the classes declared directly in this namespace, sorted
    pub classes: Vec<String>,
}

/// Classes keyed by fully-qualified name, in insertion order
#[derive(Debug, Clone)]
pub struct NamespaceCollection {
    base: Namespace,
    classes: IndexMap<String, GeneratedClass>,
}

impl NamespaceCollection {
    pub fn new(base: Namespace) -> Self {
        Self {
            base,
            classes: IndexMap::new(),
        }
    }

    pub fn base(&self) -> &Namespace {
        &self.base
    }

    /// Adds a class. A second class with the same fully-qualified name is
    /// rejected and the first one is kept.
    pub fn insert(&mut self, class: GeneratedClass) -> Result<(), GenerationError> {
        if class.name.namespace.relative_to(&self.base).is_none() {
            return Err(GenerationError::generator(format!(
                "class `{}` is outside the base namespace `{}`",
                class.name, self.base
            )));
        }

        let key = class.qualified_name();
        if let Some(existing) = self.classes.get(&key) {
            return Err(GenerationError::generator(format!(
                "class `{key}` from `{}` collides with the class from `{}`",
                class.source, existing.source
            )));
        }

        self.classes.insert(key, class);
        Ok(())
    }

    pub fn contains(&self, qualified_name: &str) -> bool {
        self.classes.contains_key(qualified_name)
    }

    pub fn get(&self, qualified_name: &str) -> Option<&GeneratedClass> {
        self.classes.get(qualified_name)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Classes in the order they were inserted
    pub fn classes(&self) -> impl Iterator<Item = &GeneratedClass> {
        self.classes.values()
    }

    /// One index per namespace that holds classes, plus every ancestor up
    /// to the base, sorted by namespace.
    pub fn namespaces(&self) -> Vec<NamespaceIndex> {
        let mut tree: BTreeMap<Namespace, (BTreeSet<String>, BTreeSet<String>)> = BTreeMap::new();
        tree.entry(self.base.clone()).or_default();

        for class in self.classes.values() {
            let ns = &class.name.namespace;
            tree.entry(ns.clone())
                .or_default()
                .1
                .insert(class.name.short_name.clone());

            let mut current = ns.clone();
            while current != self.base {
                let Some(parent) = current.parent() else {
                    break;
                };
                if let Some(segment) = current.segments().last() {
                    tree.entry(parent.clone())
                        .or_default()
                        .0
                        .insert(segment.clone());
                }
                current = parent;
            }
        }

        tree.into_iter()
            .map(|(namespace, (children, classes))| NamespaceIndex {
                namespace,
                children: children.into_iter().collect(),
                classes: classes.into_iter().collect(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::types::{ClassKind, ClassName, ModelShape};

    fn class(ns: &str, name: &str, source: &str) -> GeneratedClass {
        GeneratedClass::new(
            ClassName::new(Namespace::parse(ns), name),
            ClassKind::Endpoint {
                url: source.to_string(),
            },
            source,
        )
    }

    #[test]
    fn test_insert_and_lookup() {
        let mut collection = NamespaceCollection::new(Namespace::parse("api"));
        collection.insert(class("api", "Pets", "/pets")).unwrap();
        collection.insert(class("api::pets", "Toys", "/pets/{id}/toys")).unwrap();

        assert_eq!(collection.len(), 2);
        assert!(collection.contains("api::pets::Toys"));
        assert_eq!(collection.get("api::Pets").unwrap().source, "/pets");

        let names: Vec<_> = collection.classes().map(|c| c.qualified_name()).collect();
        assert_eq!(names, ["api::Pets", "api::pets::Toys"]);
    }

    #[test]
    fn test_duplicate_is_rejected_and_first_kept() {
        let mut collection = NamespaceCollection::new(Namespace::parse("api"));
        collection.insert(class("api", "Pets", "/pets")).unwrap();
        let err = collection
            .insert(class("api", "Pets", "/pets/{id}"))
            .unwrap_err();

        assert!(matches!(err, GenerationError::GeneratorError(_)));
        assert!(err.to_string().contains("collides"));
        assert_eq!(collection.len(), 1);
        assert_eq!(collection.get("api::Pets").unwrap().source, "/pets");
    }

    #[test]
    fn test_class_outside_base_is_rejected() {
        let mut collection = NamespaceCollection::new(Namespace::parse("api"));
        let err = collection.insert(class("other", "Pets", "/pets")).unwrap_err();
        assert!(err.to_string().contains("outside the base namespace"));
    }

    #[test]
    fn test_namespace_tree() {
        let mut collection = NamespaceCollection::new(Namespace::parse("api"));
        collection.insert(class("api", "Pets", "/pets")).unwrap();
        collection
            .insert(class("api::school::v1", "Students", "/school/v1/students"))
            .unwrap();
        collection
            .insert(GeneratedClass::new(
                ClassName::new(Namespace::parse("api::models"), "Widget"),
                ClassKind::Model(ModelShape::Struct),
                "#/components/schemas/Widget",
            ))
            .unwrap();

        let indexes = collection.namespaces();
        let names: Vec<_> = indexes.iter().map(|i| i.namespace.to_string()).collect();
        assert_eq!(names, ["api", "api::models", "api::school", "api::school::v1"]);

        assert_eq!(indexes[0].children, ["models", "school"]);
        assert_eq!(indexes[0].classes, ["Pets"]);
        assert_eq!(indexes[2].children, ["v1"]);
        assert!(indexes[2].classes.is_empty());
        assert_eq!(indexes[3].classes, ["Students"]);
    }

    #[test]
    fn test_empty_collection_still_indexes_base() {
        let collection = NamespaceCollection::new(Namespace::parse("api"));
        let indexes = collection.namespaces();
        assert_eq!(indexes.len(), 1);
        assert!(indexes[0].children.is_empty());
    }
}
