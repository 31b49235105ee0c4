//! Screen contract
//!
//! The controller creates one [`Screen`] per back-stack entry through the
//! [`ScreenFactory`] registered for the entry's route. Screens never mutate
//! the stack directly; they queue requests on a [`Navigator`] which the
//! controller applies once the current transaction has finished.

use app_state::{Payload, PayloadStore};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use super::route::{Route, RouteKind, RouteParams};
use super::shared_element::SharedScope;
use super::stack::{BackStackEntry, EntryId, NavOptions, SavedViewState};

/// A navigation queued by a screen
#[derive(Debug, Clone, PartialEq)]
pub enum NavRequest {
    /// Push a route
    Navigate {
        /// Destination
        route: Route,
        /// Stack options
        options: NavOptions,
    },
    /// Pop the top entry
    Pop,
    /// Pop back to a destination
    PopUpTo {
        /// Destination to pop back to
        kind: RouteKind,
        /// Also remove the destination itself
        inclusive: bool,
    },
}

/// Cloneable handle for queueing navigation requests
#[derive(Clone, Default)]
pub struct Navigator {
    queue: Arc<Mutex<VecDeque<NavRequest>>>,
}

impl Navigator {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a request
    pub fn request(&self, request: NavRequest) {
        tracing::trace!(?request, "navigation request queued");
        self.queue.lock().push_back(request);
    }

    /// Queue a push with default options
    pub fn navigate(&self, route: Route) {
        self.navigate_with(route, NavOptions::new());
    }

    /// Queue a push with options
    pub fn navigate_with(&self, route: Route, options: NavOptions) {
        self.request(NavRequest::Navigate { route, options });
    }

    /// Queue a pop
    pub fn pop(&self) {
        self.request(NavRequest::Pop);
    }

    /// Queue a pop back to `kind`
    pub fn pop_up_to(&self, kind: RouteKind, inclusive: bool) {
        self.request(NavRequest::PopUpTo { kind, inclusive });
    }

    /// Number of queued requests
    pub fn pending(&self) -> usize {
        self.queue.lock().len()
    }

    /// Take every queued request
    pub fn drain(&self) -> Vec<NavRequest> {
        self.queue.lock().drain(..).collect()
    }

    /// Drop every queued request
    pub fn clear(&self) -> usize {
        let mut queue = self.queue.lock();
        let dropped = queue.len();
        queue.clear();
        dropped
    }
}

impl fmt::Debug for Navigator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Navigator")
            .field("pending", &self.pending())
            .finish()
    }
}

/// What a factory gets to work with while creating a screen
pub struct ScreenScope<'a> {
    entry: &'a BackStackEntry,
    payloads: &'a PayloadStore,
    navigator: &'a Navigator,
}

impl<'a> ScreenScope<'a> {
    /// Scope for creating the screen of `entry`
    pub fn new(
        entry: &'a BackStackEntry,
        payloads: &'a PayloadStore,
        navigator: &'a Navigator,
    ) -> Self {
        Self {
            entry,
            payloads,
            navigator,
        }
    }

    /// Entry being shown
    pub fn entry_id(&self) -> EntryId {
        self.entry.id
    }

    /// Typed route
    pub fn route(&self) -> &Route {
        &self.entry.route
    }

    /// Resolved parameter values
    pub fn params(&self) -> &RouteParams {
        &self.entry.params
    }

    /// View state saved the last time this entry left the screen
    pub fn saved_state(&self) -> Option<&SavedViewState> {
        self.entry.saved_state.as_ref()
    }

    /// Consume the pending payload of type `P`
    pub fn take_payload<P: Payload>(&self) -> Option<P> {
        self.payloads.take::<P>()
    }

    /// Shared payload store, for handing payloads onward
    pub fn payloads(&self) -> PayloadStore {
        self.payloads.clone()
    }

    /// Navigation handle the screen may keep
    pub fn navigator(&self) -> Navigator {
        self.navigator.clone()
    }
}

/// A live screen instance
pub trait Screen: Send {
    /// Declare shared elements for the transition in progress
    fn shared_elements(&self, _scope: &mut SharedScope<'_>) {}

    /// Opaque state to bring back when the entry is restored
    fn save_state(&self) -> Option<SavedViewState> {
        None
    }
}

/// Builds the screen of one destination
pub trait ScreenFactory: Send + Sync {
    /// Create the screen for `entry`
    fn create(&self, entry: &BackStackEntry, scope: &mut ScreenScope<'_>) -> Box<dyn Screen>;
}

impl<F> ScreenFactory for F
where
    F: Fn(&BackStackEntry, &mut ScreenScope<'_>) -> Box<dyn Screen> + Send + Sync,
{
    fn create(&self, entry: &BackStackEntry, scope: &mut ScreenScope<'_>) -> Box<dyn Screen> {
        self(entry, scope)
    }
}

/// Placeholder for destinations without a factory
#[derive(Debug, Clone, Copy, Default)]
pub struct BlankScreen;

impl Screen for BlankScreen {}
