//! Navigation and transitions for Shopfront
//!
//! This crate provides the navigation core of the shop app: the route table,
//! back stack, screen transitions, shared-element coordination, and recovery
//! from lost screen payloads.
//!
//! # Modules
//!
//! - [`navigation`] - Navigation framework
//! - [`tokens`] - Motion tokens (durations and easing curves)
//! - [`config`] - Navigation settings

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod navigation;
pub mod tokens;

pub use config::NavigationConfig;
pub use navigation::{
    BackStack, BackStackEntry, NavController, NavOptions, NavigationError, Origin, Route,
    RouteKind, RouteTable, Screen, ScreenFactory, SelectedItem,
};
