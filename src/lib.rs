//! Shopfront navigation core
//!
//! Route table, back stack, screen and shared-element transitions, and
//! payload handoff between screens for the Shopfront shopping app.
//!
//! # Crates
//!
//! - [`app_state`] - Transient payload store and animation driver
//! - [`app_ui`] - Navigation framework and motion tokens
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use shopfront::{NavController, NavigationConfig, Route, RouteTable, SelectedItem};
//!
//! let table = Arc::new(RouteTable::shop().unwrap());
//! let mut nav = NavController::new(NavigationConfig::default(), table).unwrap();
//! nav.reset_to("shop").unwrap();
//!
//! nav.payloads().put(SelectedItem {
//!     item_id: "42".to_string(),
//!     title: "Oak chair".to_string(),
//!     image_url: "https://cdn.example.com/42.png".to_string(),
//!     price_cents: 8900,
//! });
//! nav.navigate_to_path("details/42", Default::default()).unwrap();
//! assert_eq!(nav.current_route().to_path(), "details/42?from=shop");
//! ```

pub mod logging;

pub use app_state::{AnimationDriver, FrameStatus, FrameTarget, Payload, PayloadSlot, PayloadStore};
pub use app_ui::config::NavigationConfig;
pub use app_ui::navigation::{
    BackStack, BackStackEntry, NavController, NavOptions, NavigationError, NavigationSnapshot,
    Origin, Route, RouteKind, RouteTable, Screen, ScreenFactory, ScreenScope, SelectedItem,
    SharedKey, SharedScope,
};
pub use app_ui::tokens;
