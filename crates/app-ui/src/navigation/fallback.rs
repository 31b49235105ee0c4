//! Recovery when a destination is missing its payload
//!
//! A destination that reads a transient payload cannot be rebuilt from its
//! path alone. When the payload is gone (process death, a deep link, a
//! restored saved stack) the resolver picks a safe route to show instead,
//! based on where the user came from.

use app_state::PayloadStore;

use super::error::{NavigationError, Result};
use super::route::{Origin, Route, RouteKind};
use super::table::{RouteDescriptor, RouteTable};

/// Outcome of checking a destination's payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The destination can render
    Render,
    /// The destination must be replaced by `route`
    Recover {
        /// Route to show instead
        route: Route,
    },
}

/// Maps origins to recovery routes
#[derive(Debug, Clone)]
pub struct FallbackResolver {
    _private: (),
}

impl FallbackResolver {
    /// Every route a recovery can land on
    pub const TARGETS: [RouteKind; 3] = [RouteKind::Shop, RouteKind::Cart, RouteKind::Wishlist];

    /// Create a resolver, checking that no recovery target needs a payload
    pub fn new(table: &RouteTable) -> Result<Self> {
        for kind in Self::TARGETS {
            let descriptor = table.descriptor(kind)?;
            if descriptor.required_payload().is_some() {
                tracing::error!(?kind, "recovery route depends on a transient payload");
                return Err(NavigationError::RecoveryRequiresPayload(kind));
            }
        }
        Ok(Self { _private: () })
    }

    /// Route to show for a failed destination opened from `origin`
    pub fn recovery_route(&self, origin: &Origin) -> Route {
        match origin {
            Origin::Cart => Route::Cart,
            Origin::Wishlist => Route::Wishlist,
            Origin::Shop => Route::Shop,
            Origin::Other(value) => {
                tracing::warn!(origin = %value, "unrecognized origin, recovering to shop");
                Route::Shop
            }
        }
    }

    /// Decide whether `route` can render with what `payloads` holds
    pub fn check(
        &self,
        descriptor: &RouteDescriptor,
        route: &Route,
        payloads: &PayloadStore,
    ) -> Resolution {
        let Some(key) = descriptor.required_payload() else {
            return Resolution::Render;
        };
        if payloads.is_pending(key) {
            return Resolution::Render;
        }

        let recovery = match route {
            Route::ItemDetails { from, .. } => self.recovery_route(from),
            _ => self.recovery_route(&Origin::default()),
        };
        tracing::warn!(
            route = %route,
            payload = key,
            recovery = %recovery,
            "payload missing, recovering"
        );
        Resolution::Recover { route: recovery }
    }
}
