//! Root route registry.
//!
//! # Responsibilities
//! - Hold the set of root routes in an immutable, atomically swapped table
//! - Reject structurally duplicate templates
//! - Find root routes whose template matches a path
//! - Order matches by specificity
//!
//! # Design Decisions
//! - Readers take a lock-free snapshot; writers rebuild the table and swap it
//! - Writers serialise on a mutex so concurrent registrations cannot lose updates
//! - The specificity sort is stable: equal keys keep registration order

use std::sync::{Arc, Mutex, PoisonError};

use arc_swap::ArcSwap;

use crate::routing::descriptor::{ResourceType, RootRoute};
use crate::routing::error::RegistryError;
use crate::template::{compile_with, PathTemplate, RemainingPath, TemplateOptions};

/// An immutable view of the registered root routes, in registration order.
#[derive(Debug, Default)]
pub struct RouteTable {
    roots: Vec<Arc<RootRoute>>,
}

impl RouteTable {
    pub fn roots(&self) -> &[Arc<RootRoute>] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    fn contains(&self, template: &PathTemplate) -> bool {
        self.roots.iter().any(|r| &r.template == template)
    }
}

/// Registry of root routes shared by all request workers.
#[derive(Debug)]
pub struct RouteRegistry {
    table: ArcSwap<RouteTable>,
    writer: Mutex<()>,
    options: TemplateOptions,
}

impl Default for RouteRegistry {
    fn default() -> Self {
        Self::new(TemplateOptions::default())
    }
}

impl RouteRegistry {
    pub fn new(options: TemplateOptions) -> Self {
        Self {
            table: ArcSwap::from_pointee(RouteTable::default()),
            writer: Mutex::new(()),
            options,
        }
    }

    /// Build a registry from a complete set of roots.
    pub fn with_roots(
        roots: impl IntoIterator<Item = RootRoute>,
        options: TemplateOptions,
    ) -> Result<Self, RegistryError> {
        let registry = Self::new(options);
        registry.register_all(roots)?;
        Ok(registry)
    }

    /// Register one root route.
    pub fn register(&self, root: RootRoute) -> Result<(), RegistryError> {
        self.register_all([root])
    }

    /// Compile `template` and register `resource_type` under it.
    pub fn register_template(
        &self,
        template: &str,
        resource_type: Arc<ResourceType>,
    ) -> Result<(), RegistryError> {
        let template = compile_with(template, self.options)?;
        self.register(RootRoute::new(template, resource_type))
    }

    /// Register several roots; either all are added or none.
    pub fn register_all(&self, roots: impl IntoIterator<Item = RootRoute>) -> Result<(), RegistryError> {
        let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let current = self.table.load_full();
        let mut next = RouteTable {
            roots: current.roots.clone(),
        };

        for root in roots {
            if next.contains(&root.template) {
                return Err(RegistryError::DuplicateRoute {
                    template: root.template.to_string(),
                });
            }
            tracing::debug!(
                template = %root.template,
                resource = root.resource_type.name(),
                "Root route registered"
            );
            next.roots.push(Arc::new(root));
        }

        self.table.store(Arc::new(next));
        Ok(())
    }

    /// Swap in a completely new set of roots.
    pub fn replace_all(&self, roots: impl IntoIterator<Item = RootRoute>) -> Result<(), RegistryError> {
        let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let mut next = RouteTable::default();
        for root in roots {
            if next.contains(&root.template) {
                return Err(RegistryError::DuplicateRoute {
                    template: root.template.to_string(),
                });
            }
            next.roots.push(Arc::new(root));
        }
        tracing::info!(roots = next.len(), "Route table replaced");
        self.table.store(Arc::new(next));
        Ok(())
    }

    /// The current table. Later registrations do not affect it.
    pub fn snapshot(&self) -> Arc<RouteTable> {
        self.table.load_full()
    }

    /// Roots whose template matches `path`, most specific first.
    ///
    /// An empty result means nothing matches.
    pub fn candidates_matching(&self, path: &RemainingPath) -> Vec<Arc<RootRoute>> {
        let snapshot = self.snapshot();
        let mut matching: Vec<Arc<RootRoute>> = snapshot
            .roots
            .iter()
            .filter(|r| r.template.match_path(path).is_some())
            .cloned()
            .collect();
        sort_by_specificity(&mut matching, |r| &r.template);
        matching
    }

    /// Normalised templates of every root, in registration order.
    pub fn root_templates(&self) -> Vec<String> {
        self.snapshot()
            .roots
            .iter()
            .map(|r| r.template.to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    pub fn options(&self) -> TemplateOptions {
        self.options
    }
}

/// Stable sort, most specific template first.
pub fn sort_by_specificity<T>(items: &mut [T], template: impl Fn(&T) -> &PathTemplate) {
    items.sort_by(|a, b| template(b).specificity().cmp(&template(a).specificity()));
}

/// The most specific item; the earliest wins among equals.
pub fn select_most_specific<T>(
    items: impl IntoIterator<Item = T>,
    template: impl Fn(&T) -> &PathTemplate,
) -> Option<T> {
    let mut best: Option<T> = None;
    for item in items {
        let better = match &best {
            Some(current) => template(&item).specificity() > template(current).specificity(),
            None => true,
        };
        if better {
            best = Some(item);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::descriptor::ResourceType;
    use crate::template::compile;

    fn resource(name: &str) -> Arc<ResourceType> {
        Arc::new(ResourceType::new(name, Vec::new()))
    }

    #[test]
    fn test_literal_beats_variable() {
        let registry = RouteRegistry::default();
        registry.register_template("/a/{x}", resource("var")).unwrap();
        registry.register_template("/a/b", resource("literal")).unwrap();

        let candidates = registry.candidates_matching(&RemainingPath::new("/a/b"));
        let names: Vec<&str> = candidates.iter().map(|r| r.resource_type.name()).collect();
        assert_eq!(names, ["literal", "var"]);
    }

    #[test]
    fn test_more_groups_break_literal_ties() {
        let registry = RouteRegistry::default();
        registry.register_template("/ab", resource("one")).unwrap();
        registry.register_template("/{x}/c", resource("two")).unwrap();

        let candidates = registry.candidates_matching(&RemainingPath::new("/ab/c"));
        assert_eq!(candidates[0].resource_type.name(), "two");
    }

    #[test]
    fn test_equal_keys_keep_registration_order() {
        let registry = RouteRegistry::default();
        registry.register_template("/{a}/x", resource("first")).unwrap();
        registry.register_template("/x/{b}", resource("second")).unwrap();

        let candidates = registry.candidates_matching(&RemainingPath::new("/x/x"));
        let names: Vec<&str> = candidates.iter().map(|r| r.resource_type.name()).collect();
        assert_eq!(names, ["first", "second"]);
    }

    #[test]
    fn test_duplicate_rejected() {
        let registry = RouteRegistry::default();
        registry.register_template("/users/{id}", resource("a")).unwrap();
        let err = registry.register_template("/users/{name}", resource("b")).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateRoute { .. }));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_register_all_is_atomic() {
        let registry = RouteRegistry::default();
        let roots = vec![
            RootRoute::new(compile("/a").unwrap(), resource("a")),
            RootRoute::new(compile("/a").unwrap(), resource("dup")),
        ];
        assert!(registry.register_all(roots).is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_no_match_is_empty() {
        let registry = RouteRegistry::default();
        registry.register_template("/a", resource("a")).unwrap();
        assert!(registry.candidates_matching(&RemainingPath::new("/z")).is_empty());
    }

    #[test]
    fn test_snapshot_isolated_from_later_writes() {
        let registry = RouteRegistry::default();
        registry.register_template("/a", resource("a")).unwrap();
        let snapshot = registry.snapshot();
        registry.register_template("/b", resource("b")).unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(registry.root_templates(), ["/a", "/b"]);
    }

    #[test]
    fn test_replace_all() {
        let registry = RouteRegistry::default();
        registry.register_template("/a", resource("a")).unwrap();
        registry
            .replace_all([RootRoute::new(compile("/b").unwrap(), resource("b"))])
            .unwrap();
        assert_eq!(registry.root_templates(), ["/b"]);
    }

    #[test]
    fn test_select_most_specific_first_wins() {
        let templates = [compile("/{a}/x").unwrap(), compile("/x/{b}").unwrap(), compile("/x").unwrap()];
        let best = select_most_specific(templates.iter(), |t| *t).unwrap();
        assert_eq!(best.as_str(), "/{a}/x");
    }
}
