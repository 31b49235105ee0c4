//! Navigation framework
//!
//! Moves the user between the shop's screens and animates the handoff:
//!
//! - [`table`]: the closed set of destinations, resolved from paths
//! - [`stack`]: the back stack and its push options
//! - [`transition`]: enter and exit animations per route category
//! - [`shared_element`]: elements that morph across a navigation
//! - [`fallback`]: what to show when a destination lost its payload
//! - [`controller`]: the [`NavController`] tying them together
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use app_ui::config::NavigationConfig;
//! use app_ui::navigation::{NavController, Origin, Route, RouteTable};
//!
//! let table = Arc::new(RouteTable::shop().unwrap());
//! let config = NavigationConfig::default().with_start_route("shop");
//! let mut nav = NavController::new(config, table).unwrap();
//!
//! nav.navigate_primary(Route::Cart).unwrap();
//! // No item payload was handed over, so the cart stays on top.
//! nav.navigate_to(Route::item_details("42", Origin::Cart)).unwrap();
//! assert_eq!(nav.current_route(), &Route::Cart);
//! ```

pub mod controller;
pub mod error;
pub mod fallback;
pub mod pattern;
pub mod route;
pub mod screen;
pub mod shared_element;
pub mod snapshot;
pub mod stack;
pub mod table;
pub mod transition;

pub use controller::{NavController, NavFrame};
pub use error::{NavigationError, Result};
pub use fallback::{FallbackResolver, Resolution};
pub use pattern::RoutePattern;
pub use route::{Origin, Route, RouteKind, RouteParams, SelectedItem, PRIMARY_DESTINATIONS};
pub use screen::{BlankScreen, NavRequest, Navigator, Screen, ScreenFactory, ScreenScope};
pub use shared_element::{
    Bounds, BoundsProvider, ElementFrame, ElementKind, SharedElementCoordinator, SharedKey,
    SharedScope, TokenState, TransitionId,
};
pub use snapshot::NavigationSnapshot;
pub use stack::{BackStack, BackStackEntry, EntryId, NavOptions, PushOutcome, SavedViewState};
pub use table::{Resolved, RouteDescriptor, RouteTable};
pub use transition::{AnimationKind, AnimationSpec, RouteCategory, ScreenTransition, TransitionDirection};
