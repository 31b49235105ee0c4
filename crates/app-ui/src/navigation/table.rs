//! Route table
//!
//! The closed registry of destinations. Each [`RouteDescriptor`] is built and
//! validated once at startup; resolving a path never allocates descriptors.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::error::{NavigationError, Result};
use super::pattern::{parse_query, split_path, RoutePattern};
use super::route::{Route, RouteKind, RouteParams};
use super::screen::ScreenFactory;
use super::transition::{RouteCategory, TransitionSet};

/// Immutable description of one destination
#[derive(Debug, Clone, PartialEq)]
pub struct RouteDescriptor {
    kind: RouteKind,
    pattern: RoutePattern,
    param_names: Vec<String>,
    category: RouteCategory,
    transitions: TransitionSet,
    required_payload: Option<&'static str>,
}

impl RouteDescriptor {
    /// Create a descriptor, checking the pattern against the declared names
    pub fn new(
        kind: RouteKind,
        pattern: &str,
        param_names: &[&str],
        category: RouteCategory,
    ) -> Result<Self> {
        let pattern = RoutePattern::parse(pattern)?;
        pattern.validate(param_names)?;
        Ok(Self {
            kind,
            pattern,
            param_names: param_names.iter().map(|name| name.to_string()).collect(),
            category,
            transitions: category.transitions(),
            required_payload: None,
        })
    }

    /// Descriptor with the registered pattern, category and payload of `kind`
    pub fn for_kind(kind: RouteKind) -> Result<Self> {
        let mut descriptor =
            Self::new(kind, kind.pattern(), kind.param_names(), kind.category())?;
        descriptor.required_payload = kind.required_payload();
        Ok(descriptor)
    }

    /// Replace the category's default animations
    pub fn with_transitions(mut self, transitions: TransitionSet) -> Self {
        self.transitions = transitions;
        self
    }

    /// Require a transient payload on first render
    pub fn with_payload(mut self, key: &'static str) -> Self {
        self.required_payload = Some(key);
        self
    }

    /// Destination key
    pub fn kind(&self) -> RouteKind {
        self.kind
    }

    /// Parsed pattern
    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    /// Declared parameter names
    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    /// Animation category
    pub fn category(&self) -> RouteCategory {
        self.category
    }

    /// Directional animations
    pub fn transitions(&self) -> TransitionSet {
        self.transitions
    }

    /// Payload slot the screen reads on first render
    pub fn required_payload(&self) -> Option<&'static str> {
        self.required_payload
    }

    /// Build a path for this descriptor from parameter values
    pub fn path_with(&self, params: &RouteParams) -> Result<String> {
        self.pattern.fill(self.kind, params)
    }

    /// A concrete path this descriptor should resolve
    ///
    /// Path parameters get placeholder values; query parameters keep their
    /// defaults.
    pub fn sample_path(&self) -> String {
        let params: RouteParams = self
            .pattern
            .param_names()
            .into_iter()
            .filter(|name| !self.pattern.query().iter().any(|q| q.name == *name))
            .map(|name| (name.to_string(), format!("sample-{name}")))
            .collect();
        // Every path parameter has a value, so filling cannot fail.
        self.pattern
            .fill(self.kind, &params)
            .unwrap_or_else(|_| self.pattern.as_str().to_string())
    }
}

/// A path resolved against the table
#[derive(Debug, Clone)]
pub struct Resolved {
    /// Matching descriptor
    pub descriptor: Arc<RouteDescriptor>,
    /// Decoded parameter values, with query defaults applied
    pub params: RouteParams,
    /// Typed route
    pub route: Route,
}

/// Registry of destinations and their screen factories
#[derive(Default)]
pub struct RouteTable {
    descriptors: Vec<Arc<RouteDescriptor>>,
    by_kind: HashMap<RouteKind, Arc<RouteDescriptor>>,
    factories: HashMap<RouteKind, Arc<dyn ScreenFactory>>,
}

impl RouteTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Table with every shop destination registered
    pub fn shop() -> Result<Self> {
        let mut table = Self::new();
        for kind in RouteKind::ALL {
            table.register(RouteDescriptor::for_kind(kind)?)?;
        }
        Ok(table)
    }

    /// Register a descriptor
    pub fn register(&mut self, descriptor: RouteDescriptor) -> Result<()> {
        if self.by_kind.contains_key(&descriptor.kind) {
            tracing::error!(kind = ?descriptor.kind, "route registered twice");
            return Err(NavigationError::DuplicateRoute(descriptor.kind));
        }
        if self
            .descriptors
            .iter()
            .any(|existing| existing.pattern.has_same_shape(&descriptor.pattern))
        {
            tracing::error!(pattern = descriptor.pattern.as_str(), "pattern registered twice");
            return Err(NavigationError::DuplicatePattern(
                descriptor.pattern.as_str().to_string(),
            ));
        }

        let descriptor = Arc::new(descriptor);
        self.by_kind.insert(descriptor.kind, Arc::clone(&descriptor));
        self.descriptors.push(descriptor);
        Ok(())
    }

    /// Attach the screen factory for a destination
    pub fn set_factory(&mut self, kind: RouteKind, factory: Arc<dyn ScreenFactory>) {
        self.factories.insert(kind, factory);
    }

    /// Screen factory for a destination
    pub fn factory(&self, kind: RouteKind) -> Option<&Arc<dyn ScreenFactory>> {
        self.factories.get(&kind)
    }

    /// Descriptor for a destination
    pub fn descriptor(&self, kind: RouteKind) -> Result<&Arc<RouteDescriptor>> {
        self.by_kind
            .get(&kind)
            .ok_or(NavigationError::UnregisteredRoute(kind))
    }

    /// All descriptors in registration order
    pub fn descriptors(&self) -> impl Iterator<Item = &RouteDescriptor> {
        self.descriptors.iter().map(|d| d.as_ref())
    }

    /// Number of registered destinations
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Check if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Resolve a path to its descriptor, parameters and typed route
    pub fn resolve(&self, path: &str) -> Result<Resolved> {
        let (segments, query) = split_path(path);
        let query = parse_query(query);

        let mut best: Option<(&Arc<RouteDescriptor>, RouteParams)> = None;
        for descriptor in &self.descriptors {
            let Some(params) = descriptor.pattern.match_path(&segments, &query) else {
                continue;
            };
            let better = match &best {
                None => true,
                Some((current, _)) => descriptor.pattern.is_more_specific_than(&current.pattern),
            };
            if better {
                best = Some((descriptor, params));
            }
        }

        let Some((descriptor, params)) = best else {
            tracing::error!(path, "navigation to unregistered path");
            return Err(NavigationError::UnknownRoute(path.to_string()));
        };
        let Some(route) = Route::from_params(descriptor.kind, &params) else {
            tracing::error!(path, kind = ?descriptor.kind, "path is missing route parameters");
            return Err(NavigationError::UnknownRoute(path.to_string()));
        };

        Ok(Resolved {
            descriptor: Arc::clone(descriptor),
            params,
            route,
        })
    }

    /// Canonical path of a typed route
    pub fn path_for(&self, route: &Route) -> Result<String> {
        self.descriptor(route.kind())?.path_with(&route.params())
    }
}

impl fmt::Debug for RouteTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteTable")
            .field("descriptors", &self.descriptors)
            .field("factories", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::route::Origin;

    #[test]
    fn test_every_route_resolves_its_own_path() {
        let table = RouteTable::shop().unwrap();
        assert_eq!(table.len(), RouteKind::ALL.len());
        for descriptor in table.descriptors() {
            let resolved = table.resolve(&descriptor.sample_path()).unwrap();
            assert_eq!(resolved.descriptor.as_ref(), descriptor);
        }
    }

    #[test]
    fn test_transition_override_replaces_category_defaults() {
        use crate::navigation::transition::{select_animation, AnimationKind, TransitionDirection};
        use std::time::Duration;

        let fades = TransitionSet::new(
            AnimationKind::CrossFade,
            AnimationKind::None,
            AnimationKind::SlideFromLeft,
            AnimationKind::SlideToBottom,
        );
        let descriptor = RouteDescriptor::for_kind(RouteKind::Checkout)
            .unwrap()
            .with_transitions(fades);
        assert_ne!(RouteKind::Checkout.category().transitions(), fades);

        let mut table = RouteTable::new();
        table.register(descriptor).unwrap();
        let registered = table.descriptor(RouteKind::Checkout).unwrap();
        let length = Duration::from_millis(300);

        let enter = select_animation(TransitionDirection::Enter, registered, length);
        assert_eq!(enter.kind, AnimationKind::CrossFade);
        assert_eq!(enter.duration, length);
        let exit = select_animation(TransitionDirection::Exit, registered, length);
        assert_eq!(exit.kind, AnimationKind::None);
        assert_eq!(
            select_animation(TransitionDirection::PopEnter, registered, length).kind,
            AnimationKind::SlideFromLeft
        );
        assert_eq!(
            select_animation(TransitionDirection::PopExit, registered, length).kind,
            AnimationKind::SlideToBottom
        );
    }

    #[test]
    fn test_typed_routes_round_trip() {
        let table = RouteTable::shop().unwrap();
        let routes = [
            Route::Shop,
            Route::ProductDetail { product_id: None },
            Route::ProductDetail {
                product_id: Some("sku 12".to_string()),
            },
            Route::item_details("42", Origin::Cart),
            Route::item_details("42", Origin::Other("promo".to_string())),
            Route::SetNewPassword,
        ];
        for route in routes {
            let path = table.path_for(&route).unwrap();
            assert_eq!(path, route.to_path());
            assert_eq!(table.resolve(&path).unwrap().route, route);
        }
    }

    #[test]
    fn test_query_default_applies() {
        let table = RouteTable::shop().unwrap();
        let resolved = table.resolve("details/42").unwrap();
        assert_eq!(resolved.route, Route::item_details("42", Origin::Shop));
        assert_eq!(resolved.params.get("from").map(String::as_str), Some("shop"));
    }

    #[test]
    fn test_leading_slash_is_tolerated() {
        let table = RouteTable::shop().unwrap();
        assert_eq!(table.resolve("/cart").unwrap().route, Route::Cart);
    }

    #[test]
    fn test_bare_and_parameterized_product_detail() {
        let table = RouteTable::shop().unwrap();
        assert_eq!(
            table.resolve("product_detail").unwrap().descriptor.kind(),
            RouteKind::ProductDetail
        );
        assert_eq!(
            table.resolve("product_detail/p-7").unwrap().descriptor.kind(),
            RouteKind::ProductDetailWithId
        );
    }

    #[test]
    fn test_literal_beats_parameter() {
        let mut table = RouteTable::new();
        // Parameterized first, so registration order alone would pick it.
        table
            .register(RouteDescriptor::for_kind(RouteKind::ProductDetailWithId).unwrap())
            .unwrap();
        table
            .register(
                RouteDescriptor::new(
                    RouteKind::AllProducts,
                    "product_detail/all",
                    &[],
                    RouteCategory::Detail,
                )
                .unwrap(),
            )
            .unwrap();

        assert_eq!(table.resolve("product_detail/all").unwrap().route, Route::AllProducts);
        assert_eq!(
            table.resolve("product_detail/alpha").unwrap().route,
            Route::ProductDetail {
                product_id: Some("alpha".to_string())
            }
        );
    }

    #[test]
    fn test_unknown_path() {
        let table = RouteTable::shop().unwrap();
        assert!(matches!(
            table.resolve("nonexistent/path"),
            Err(NavigationError::UnknownRoute(path)) if path == "nonexistent/path"
        ));
        assert!(matches!(table.resolve(""), Err(NavigationError::UnknownRoute(_))));
    }

    #[test]
    fn test_duplicate_registration() {
        let mut table = RouteTable::shop().unwrap();
        assert!(matches!(
            table.register(RouteDescriptor::for_kind(RouteKind::Cart).unwrap()),
            Err(NavigationError::DuplicateRoute(RouteKind::Cart))
        ));

        let mut table = RouteTable::new();
        table
            .register(RouteDescriptor::for_kind(RouteKind::ProductDetailWithId).unwrap())
            .unwrap();
        let clash = RouteDescriptor::new(
            RouteKind::Search,
            "product_detail/{query}",
            &["query"],
            RouteCategory::Primary,
        )
        .unwrap();
        assert!(matches!(
            table.register(clash),
            Err(NavigationError::DuplicatePattern(_))
        ));
    }

    #[test]
    fn test_mismatched_declaration_fails_at_construction() {
        assert!(matches!(
            RouteDescriptor::new(RouteKind::Cart, "cart/{id}", &[], RouteCategory::Primary),
            Err(NavigationError::UndeclaredParam { .. })
        ));
        assert!(matches!(
            RouteDescriptor::new(RouteKind::Cart, "cart", &["id"], RouteCategory::Primary),
            Err(NavigationError::PatternMismatch { .. })
        ));
    }

    #[test]
    fn test_unregistered_kind() {
        let table = RouteTable::new();
        assert!(matches!(
            table.descriptor(RouteKind::Cart),
            Err(NavigationError::UnregisteredRoute(RouteKind::Cart))
        ));
        assert!(table.path_for(&Route::Cart).is_err());
    }

    #[test]
    fn test_item_details_requires_payload() {
        let table = RouteTable::shop().unwrap();
        let details = table.descriptor(RouteKind::ItemDetails).unwrap();
        assert_eq!(details.required_payload(), Some("selected_item"));
        assert_eq!(table.descriptor(RouteKind::Cart).unwrap().required_payload(), None);
    }
}
