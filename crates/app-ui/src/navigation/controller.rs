//! Navigation controller
//!
//! [`NavController`] is the navigation context passed to whoever needs to
//! navigate. Every call is one transaction: the back stack is mutated, a
//! destination missing its payload is swapped for a recovery route, the new
//! top gets a screen, and the enter/exit and shared-element animations are
//! set up. Requests that screens queue on their [`Navigator`] while this
//! happens are applied afterwards, in order.

use app_state::{AnimationDriver, FrameStatus, FrameTarget, PayloadStore};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::config::NavigationConfig;

use super::error::{NavigationError, Result};
use super::fallback::{FallbackResolver, Resolution};
use super::route::{Route, RouteKind};
use super::screen::{BlankScreen, NavRequest, Navigator, Screen, ScreenScope};
use super::shared_element::{ElementFrame, SharedElementCoordinator};
use super::snapshot::{EntrySnapshot, NavigationSnapshot, SavedStackSnapshot};
use super::stack::{BackStack, BackStackEntry, EntryId, NavOptions};
use super::table::RouteTable;
use super::transition::{select_animation, AnimationFrame, ScreenTransition, TransitionDirection};

/// Which way a transaction moved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Motion {
    Forward,
    Back,
}

struct LiveScreen {
    route: Route,
    screen: Box<dyn Screen>,
}

/// Placement of everything that moves, at one instant
#[derive(Debug, Clone, PartialEq)]
pub struct NavFrame {
    /// Screen becoming top
    pub incoming: AnimationFrame,
    /// Screen being covered or removed
    pub outgoing: Option<AnimationFrame>,
    /// Shared elements in flight
    pub shared: Vec<ElementFrame>,
}

/// Transactional navigation over one back stack
pub struct NavController {
    config: NavigationConfig,
    table: Arc<RouteTable>,
    stack: BackStack,
    payloads: PayloadStore,
    fallback: FallbackResolver,
    shared: SharedElementCoordinator,
    navigator: Navigator,
    screens: HashMap<EntryId, LiveScreen>,
    transition: Option<ScreenTransition>,
    recoveries: usize,
}

impl NavController {
    /// Create a controller with its own payload store
    pub fn new(config: NavigationConfig, table: Arc<RouteTable>) -> Result<Self> {
        Self::with_payloads(config, table, PayloadStore::new())
    }

    /// Create a controller reading payloads from `payloads`
    ///
    /// Fails when the start route does not resolve or a recovery route
    /// depends on a payload.
    pub fn with_payloads(
        config: NavigationConfig,
        table: Arc<RouteTable>,
        payloads: PayloadStore,
    ) -> Result<Self> {
        let fallback = FallbackResolver::new(&table)?;
        let start = table.resolve(&config.start_route)?;
        let shared = SharedElementCoordinator::new(config.shared_element());

        let mut controller = Self {
            stack: BackStack::new(start.route),
            config,
            table,
            payloads,
            fallback,
            shared,
            navigator: Navigator::new(),
            screens: HashMap::new(),
            transition: None,
            recoveries: 0,
        };
        controller.settle_top()?;
        controller.flush_requests()?;

        tracing::debug!(start = %controller.current_route(), "navigation controller ready");
        Ok(controller)
    }

    // =========================================================================
    // Transactions
    // =========================================================================

    /// Push `route` with `options`
    pub fn navigate(&mut self, route: Route, options: NavOptions) -> Result<()> {
        self.transact(NavRequest::Navigate { route, options })?;
        Ok(())
    }

    /// Push `route` with default options
    pub fn navigate_to(&mut self, route: Route) -> Result<()> {
        self.navigate(route, NavOptions::new())
    }

    /// Resolve `path` and push it
    pub fn navigate_to_path(&mut self, path: &str, options: NavOptions) -> Result<()> {
        let resolved = self.table.resolve(path)?;
        self.navigate(resolved.route, options)
    }

    /// Switch bottom-bar destination
    ///
    /// Keeps at most one entry per primary destination and brings back what
    /// the destination showed when the user last left it.
    pub fn navigate_primary(&mut self, route: Route) -> Result<()> {
        let start = self
            .stack
            .entries()
            .first()
            .map(BackStackEntry::kind)
            .unwrap_or_else(|| route.kind());
        self.navigate(route, NavOptions::primary(start))
    }

    /// Pop the top entry
    ///
    /// Returns `false` when only one entry remains.
    pub fn pop(&mut self) -> Result<bool> {
        self.transact(NavRequest::Pop)
    }

    /// Pop back to `kind`
    ///
    /// Returns `false` when `kind` is not on the stack. The bottom entry is
    /// never removed.
    pub fn pop_up_to(&mut self, kind: RouteKind, inclusive: bool) -> Result<bool> {
        self.transact(NavRequest::PopUpTo { kind, inclusive })
    }

    /// Replace the top entry
    pub fn replace_top(&mut self, route: Route) -> Result<()> {
        self.check_route(&route)?;
        let from = self.top();
        let replaced = self.stack.replace_top(route);
        tracing::debug!(replaced = %replaced.route, "replace top");
        self.settle(from, Motion::Forward)?;
        self.flush_requests()?;
        Ok(())
    }

    /// Replace the whole stack with the route at `path`
    ///
    /// Used for deep links and sign-out.
    pub fn reset_to(&mut self, path: &str) -> Result<()> {
        let resolved = self.table.resolve(path)?;
        let from = self.top();
        tracing::debug!(path, "reset stack");
        self.stack.reset(resolved.route);
        self.settle(from, Motion::Forward)?;
        self.flush_requests()?;
        Ok(())
    }

    /// Apply navigations queued by screens
    ///
    /// At most `max_redirect_depth` requests are applied; the rest are dropped
    /// with a warning. Returns the number applied.
    pub fn flush_requests(&mut self) -> Result<usize> {
        let mut applied = 0;
        loop {
            let mut batch = self.navigator.drain().into_iter();
            if batch.as_slice().is_empty() {
                return Ok(applied);
            }
            while let Some(request) = batch.next() {
                if applied >= self.config.max_redirect_depth {
                    let dropped = 1 + batch.len() + self.navigator.clear();
                    tracing::warn!(
                        dropped,
                        limit = self.config.max_redirect_depth,
                        "redirect limit reached, dropping queued navigations"
                    );
                    return Ok(applied);
                }
                self.apply(request)?;
                applied += 1;
            }
        }
    }

    /// Reject routes that are unregistered or would not survive a snapshot
    fn check_route(&self, route: &Route) -> Result<()> {
        self.table.descriptor(route.kind())?;
        if let Some(name) = route.empty_param() {
            tracing::error!(kind = ?route.kind(), param = name, "empty route parameter");
            return Err(NavigationError::MissingParam {
                kind: route.kind(),
                name: name.to_string(),
            });
        }
        Ok(())
    }

    fn transact(&mut self, request: NavRequest) -> Result<bool> {
        let changed = self.apply(request)?;
        self.flush_requests()?;
        Ok(changed)
    }

    fn apply(&mut self, request: NavRequest) -> Result<bool> {
        let from = self.top();
        match request {
            NavRequest::Navigate { route, options } => {
                self.check_route(&route)?;
                tracing::debug!(route = %route, ?options, "navigate");
                let result = self.stack.push(route, options);
                tracing::trace!(
                    outcome = ?result.outcome,
                    discarded = result.discarded.len(),
                    saved = result.saved.len(),
                    "stack updated"
                );
                self.settle(from, Motion::Forward)?;
                Ok(true)
            }
            NavRequest::Pop => {
                let Some(popped) = self.stack.pop() else {
                    tracing::debug!("pop ignored, only one entry left");
                    return Ok(false);
                };
                tracing::debug!(popped = %popped.route, "pop");
                self.settle(from, Motion::Back)?;
                Ok(true)
            }
            NavRequest::PopUpTo { kind, inclusive } => {
                let removed = self.stack.pop_up_to(kind, inclusive);
                if removed.is_empty() {
                    return Ok(false);
                }
                tracing::debug!(?kind, inclusive, removed = removed.len(), "pop up to");
                self.settle(from, Motion::Back)?;
                Ok(true)
            }
        }
    }

    /// Finish a transaction that started with `from` on top
    fn settle(&mut self, from: (EntryId, RouteKind), motion: Motion) -> Result<()> {
        self.settle_top()?;
        if self.stack.current_entry().id != from.0 {
            self.begin_transition(from, motion)?;
        }
        self.release_detached();
        Ok(())
    }

    /// Give the top entry a screen, recovering when its payload is gone
    fn settle_top(&mut self) -> Result<()> {
        for _ in 0..=self.config.max_redirect_depth {
            let entry = self.stack.current_entry();
            if self.is_live(entry) {
                return Ok(());
            }
            let descriptor = self.table.descriptor(entry.kind())?;
            match self.fallback.check(descriptor, &entry.route, &self.payloads) {
                Resolution::Render => break,
                Resolution::Recover { route } => self.recover(route),
            }
        }
        self.attach_top()
    }

    /// One corrective navigation away from a top entry that cannot render
    fn recover(&mut self, route: Route) {
        self.recoveries += 1;
        if !self.stack.can_go_back() {
            let failed = self.stack.replace_top(route);
            tracing::debug!(failed = %failed.route, "replaced failed entry");
            return;
        }
        if let Some(failed) = self.stack.pop() {
            tracing::debug!(failed = %failed.route, "popped failed entry");
        }
        if *self.stack.current() != route {
            self.stack.push(route, NavOptions::new());
        }
    }

    fn is_live(&self, entry: &BackStackEntry) -> bool {
        self.screens
            .get(&entry.id)
            .is_some_and(|live| live.route == entry.route)
    }

    fn attach_top(&mut self) -> Result<()> {
        let entry = self.stack.current_entry().clone();
        if self.is_live(&entry) {
            return Ok(());
        }
        let required = self.table.descriptor(entry.kind())?.required_payload();
        let screen: Box<dyn Screen> = {
            let mut scope = ScreenScope::new(&entry, &self.payloads, &self.navigator);
            match self.table.factory(entry.kind()) {
                Some(factory) => factory.create(&entry, &mut scope),
                None => {
                    tracing::debug!(kind = ?entry.kind(), "no screen factory, showing a blank screen");
                    Box::new(BlankScreen)
                }
            }
        };
        // Read-once: a screen that ignored its payload still used it up.
        if let Some(key) = required {
            if self.payloads.discard(key) {
                tracing::debug!(key, kind = ?entry.kind(), "screen left its payload unread");
            }
        }
        self.screens.insert(
            entry.id,
            LiveScreen {
                route: entry.route,
                screen,
            },
        );
        Ok(())
    }

    fn begin_transition(&mut self, from: (EntryId, RouteKind), motion: Motion) -> Result<()> {
        let (from_id, from_kind) = from;
        let to = self.stack.current_entry();
        let (to_id, to_kind) = (to.id, to.kind());

        let (enter, exit) = match motion {
            Motion::Forward => (TransitionDirection::Enter, TransitionDirection::Exit),
            Motion::Back => (TransitionDirection::PopEnter, TransitionDirection::PopExit),
        };
        let length = self.config.screen_transition();
        let incoming = select_animation(enter, self.table.descriptor(to_kind)?, length);
        let outgoing = select_animation(exit, self.table.descriptor(from_kind)?, length);
        if self.transition.is_some() {
            tracing::debug!("interrupting in-flight transition");
        }
        self.transition = Some(ScreenTransition::new(incoming, Some(outgoing)));

        let id = self.shared.begin(from_id, to_id);
        for owner in [from_id, to_id] {
            let Some(live) = self.screens.get(&owner) else {
                continue;
            };
            if let Some(mut scope) = self.shared.scope(id, owner) {
                live.screen.shared_elements(&mut scope);
            }
        }
        let summary = self.shared.start(id);

        tracing::debug!(
            from = ?from_kind,
            to = ?to_kind,
            ?motion,
            matched = summary.matched.len(),
            unmatched = summary.unmatched.len(),
            "transition started"
        );
        Ok(())
    }

    /// Drop screens whose entries left the stack, keeping their view state
    fn release_detached(&mut self) {
        let attached: HashSet<EntryId> = self.stack.entries().iter().map(|e| e.id).collect();
        let detached: Vec<EntryId> = self
            .screens
            .keys()
            .filter(|id| !attached.contains(id))
            .copied()
            .collect();

        for id in detached {
            let Some(live) = self.screens.remove(&id) else {
                continue;
            };
            if let Some(state) = live.screen.save_state() {
                if self.stack.set_saved_state(id, state) {
                    tracing::trace!(%id, "view state saved");
                }
            }
        }
    }

    fn top(&self) -> (EntryId, RouteKind) {
        let entry = self.stack.current_entry();
        (entry.id, entry.kind())
    }

    // =========================================================================
    // Animation
    // =========================================================================

    /// Advance in-flight animations by `elapsed`
    pub fn advance(&mut self, elapsed: Duration) -> NavFrame {
        let shared = self.shared.advance(elapsed);
        let (incoming, outgoing) = match self.transition.as_mut() {
            Some(transition) => {
                transition.advance(elapsed);
                let frames = (transition.incoming_frame(), transition.outgoing_frame());
                if transition.is_finished() {
                    self.transition = None;
                    tracing::trace!("screen transition finished");
                }
                frames
            }
            None => (AnimationFrame::REST, None),
        };
        NavFrame {
            incoming,
            outgoing,
            shared,
        }
    }

    /// Check if anything is still moving
    pub fn is_animating(&self) -> bool {
        self.transition.is_some() || !self.shared.is_idle()
    }

    /// Screen transition in flight
    pub fn transition(&self) -> Option<&ScreenTransition> {
        self.transition.as_ref()
    }

    /// Shared-element state
    pub fn shared_elements(&self) -> &SharedElementCoordinator {
        &self.shared
    }

    // =========================================================================
    // State restoration
    // =========================================================================

    /// Capture the stack for OS state restoration
    pub fn snapshot(&self) -> NavigationSnapshot {
        let entry_snapshot = |entry: &BackStackEntry| EntrySnapshot {
            id: entry.id,
            path: entry.route.to_path(),
            saved_state: self
                .screens
                .get(&entry.id)
                .and_then(|live| live.screen.save_state())
                .or_else(|| entry.saved_state.clone()),
        };

        let mut saved_stacks: Vec<SavedStackSnapshot> = self
            .stack
            .saved_stacks()
            .iter()
            .map(|(kind, entries)| SavedStackSnapshot {
                kind: *kind,
                entries: entries.iter().map(&entry_snapshot).collect(),
            })
            .collect();
        saved_stacks.sort_by_key(|stack| stack.kind);

        NavigationSnapshot {
            entries: self.stack.entries().iter().map(&entry_snapshot).collect(),
            saved_stacks,
        }
    }

    /// Rebuild the stack from a snapshot
    ///
    /// Entries that no longer resolve are dropped; if none survive, the stack
    /// restarts at the start route. Returns the number of dropped entries.
    pub fn restore(&mut self, snapshot: NavigationSnapshot) -> Result<usize> {
        let (mut entries, mut dropped) = self.decode_entries(snapshot.entries);
        if entries.is_empty() {
            let start = self.table.resolve(&self.config.start_route)?;
            tracing::warn!("snapshot held no usable entries, starting over");
            entries.push(BackStackEntry::new(start.route));
        }

        let mut saved = HashMap::new();
        for stack in snapshot.saved_stacks {
            let (entries, lost) = self.decode_entries(stack.entries);
            dropped += lost;
            if !entries.is_empty() {
                saved.insert(stack.kind, entries);
            }
        }

        self.shared.cancel();
        self.transition = None;
        self.screens.clear();
        self.stack.restore(entries);
        self.stack.restore_saved_stacks(saved);
        tracing::debug!(depth = self.stack.depth(), dropped, "stack restored");

        self.settle_top()?;
        self.flush_requests()?;
        Ok(dropped)
    }

    fn decode_entries(&self, items: Vec<EntrySnapshot>) -> (Vec<BackStackEntry>, usize) {
        let mut dropped = 0;
        let entries = items
            .into_iter()
            .filter_map(|item| match self.table.resolve(&item.path) {
                Ok(resolved) => Some(BackStackEntry {
                    id: item.id,
                    route: resolved.route,
                    params: resolved.params,
                    saved_state: item.saved_state,
                }),
                Err(e) => {
                    tracing::warn!(path = %item.path, error = %e, "dropping snapshot entry");
                    dropped += 1;
                    None
                }
            })
            .collect();
        (entries, dropped)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Top entry
    pub fn current_entry(&self) -> &BackStackEntry {
        self.stack.current_entry()
    }

    /// Top route
    pub fn current_route(&self) -> &Route {
        self.stack.current()
    }

    /// The back stack
    pub fn back_stack(&self) -> &BackStack {
        &self.stack
    }

    /// Check if back navigation is possible
    pub fn can_go_back(&self) -> bool {
        self.stack.can_go_back()
    }

    /// Check if the bottom bar shows
    pub fn is_bottom_bar_visible(&self) -> bool {
        self.stack.current().is_primary()
    }

    /// Payload store screens hand payloads through
    pub fn payloads(&self) -> &PayloadStore {
        &self.payloads
    }

    /// Handle for queueing navigations
    pub fn navigator(&self) -> Navigator {
        self.navigator.clone()
    }

    /// Registered destinations
    pub fn table(&self) -> &Arc<RouteTable> {
        &self.table
    }

    /// Active configuration
    pub fn config(&self) -> &NavigationConfig {
        &self.config
    }

    /// Frame driver ticking at the configured frame interval
    pub fn animation_driver(&self) -> AnimationDriver {
        AnimationDriver::new(self.config.frame_interval())
    }

    /// Screen of a live entry
    pub fn screen(&self, id: EntryId) -> Option<&dyn Screen> {
        self.screens.get(&id).map(|live| live.screen.as_ref())
    }

    /// Number of live screens
    pub fn live_screens(&self) -> usize {
        self.screens.len()
    }

    /// Number of corrective navigations made so far
    pub fn recovery_count(&self) -> usize {
        self.recoveries
    }
}

impl FrameTarget for NavController {
    fn on_frame(&mut self, elapsed: Duration) -> FrameStatus {
        self.advance(elapsed);
        if self.is_animating() {
            FrameStatus::Running
        } else {
            FrameStatus::Finished
        }
    }
}

impl fmt::Debug for NavController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavController")
            .field("stack", &self.stack.routes())
            .field("live_screens", &self.screens.len())
            .field("transition", &self.transition)
            .field("recoveries", &self.recoveries)
            .finish()
    }
}
