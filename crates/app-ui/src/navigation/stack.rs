//! Back-stack management
//!
//! The back stack owns every [`BackStackEntry`]. Each mutation runs to
//! completion before returning, so callers never observe a half-applied
//! `pop_up_to` followed by a push.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use super::route::{Route, RouteKind, RouteParams};

/// Unique key of a back-stack entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(uuid::Uuid);

impl EntryId {
    /// Generate a fresh id
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque view state a screen asks to have restored
///
/// The navigation core never looks inside. Losing it only means the screen
/// starts fresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SavedViewState(pub serde_json::Value);

/// A navigation stack entry
#[derive(Debug, Clone, PartialEq)]
pub struct BackStackEntry {
    /// Unique key for this entry
    pub id: EntryId,
    /// The route
    pub route: Route,
    /// Resolved parameter values
    pub params: RouteParams,
    /// View state saved when the entry left the stack with `save_state`
    pub saved_state: Option<SavedViewState>,
}

impl BackStackEntry {
    /// Create a new stack entry
    pub fn new(route: Route) -> Self {
        Self {
            id: EntryId::new(),
            params: route.params(),
            route,
            saved_state: None,
        }
    }

    /// Destination key of this entry
    pub fn kind(&self) -> RouteKind {
        self.route.kind()
    }
}

/// `pop_up_to` part of a navigation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopUpTo {
    /// Destination to pop back to
    pub kind: RouteKind,
    /// Also remove that destination
    pub inclusive: bool,
    /// Keep removed entries so `restore_state` can bring them back
    pub save_state: bool,
}

/// Options of a push
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NavOptions {
    /// Entries to remove before pushing
    pub pop_up_to: Option<PopUpTo>,
    /// Reuse the top entry when it already shows the destination
    pub launch_single_top: bool,
    /// Reattach a saved stack for the destination
    pub restore_state: bool,
}

impl NavOptions {
    /// Plain push
    pub fn new() -> Self {
        Self::default()
    }

    /// Pop back to `kind` before pushing
    pub fn pop_up_to(mut self, kind: RouteKind, inclusive: bool) -> Self {
        self.pop_up_to = Some(PopUpTo {
            kind,
            inclusive,
            save_state: false,
        });
        self
    }

    /// Save the entries removed by `pop_up_to`
    pub fn save_state(mut self) -> Self {
        if let Some(pop) = self.pop_up_to.as_mut() {
            pop.save_state = true;
        }
        self
    }

    /// Do not duplicate the top entry
    pub fn single_top(mut self) -> Self {
        self.launch_single_top = true;
        self
    }

    /// Bring back a saved stack for the destination
    pub fn restore_state(mut self) -> Self {
        self.restore_state = true;
        self
    }

    /// Options used for bottom-bar destinations
    ///
    /// Pops to `start` saving the popped entries, reuses the top entry, and
    /// restores what the destination showed last time.
    pub fn primary(start: RouteKind) -> Self {
        Self::new()
            .pop_up_to(start, false)
            .save_state()
            .single_top()
            .restore_state()
    }
}

/// How a push changed the stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// A new entry was appended
    Pushed,
    /// The top entry already showed the destination and was updated in place
    SingleTop,
    /// A saved stack was reattached
    Restored {
        /// Number of entries brought back
        count: usize,
    },
}

/// Result of a push
#[derive(Debug, Clone, PartialEq)]
pub struct PushResult {
    /// What happened to the top
    pub outcome: PushOutcome,
    /// Entries removed for good
    pub discarded: Vec<BackStackEntry>,
    /// Entries moved into a saved stack
    pub saved: Vec<EntryId>,
}

/// Ordered history of entries, bottom to top
#[derive(Debug, Clone, PartialEq)]
pub struct BackStack {
    entries: Vec<BackStackEntry>,
    saved: HashMap<RouteKind, Vec<BackStackEntry>>,
}

impl BackStack {
    /// Create a stack holding only `start`
    pub fn new(start: Route) -> Self {
        Self {
            entries: vec![BackStackEntry::new(start)],
            saved: HashMap::new(),
        }
    }

    /// Push a route, applying `options`
    pub fn push(&mut self, route: Route, options: NavOptions) -> PushResult {
        let mut discarded = Vec::new();
        let mut saved = Vec::new();

        if let Some(pop) = options.pop_up_to {
            match self.position_of(pop.kind) {
                Some(position) => {
                    let cut = if pop.inclusive { position } else { position + 1 };
                    let removed = self.entries.split_off(cut);
                    if pop.save_state && !removed.is_empty() {
                        let key = removed[0].kind();
                        saved.extend(removed.iter().map(|entry| entry.id));
                        if let Some(replaced) = self.saved.insert(key, removed) {
                            discarded.extend(replaced);
                        }
                    } else {
                        discarded.extend(removed);
                    }
                }
                None => {
                    tracing::debug!(kind = ?pop.kind, "pop_up_to target not on the stack");
                }
            }
        }

        let kind = route.kind();
        if options.launch_single_top {
            if let Some(top) = self.entries.last_mut() {
                if top.kind() == kind {
                    top.params = route.params();
                    top.route = route;
                    return PushResult {
                        outcome: PushOutcome::SingleTop,
                        discarded,
                        saved,
                    };
                }
            }
        }

        if options.restore_state {
            if let Some(restored) = self.saved.remove(&kind) {
                let count = restored.len();
                self.entries.extend(restored);
                return PushResult {
                    outcome: PushOutcome::Restored { count },
                    discarded,
                    saved,
                };
            }
        }

        self.entries.push(BackStackEntry::new(route));
        PushResult {
            outcome: PushOutcome::Pushed,
            discarded,
            saved,
        }
    }

    /// Pop the top entry (returns `None` when only the root remains)
    pub fn pop(&mut self) -> Option<BackStackEntry> {
        if self.entries.len() > 1 {
            self.entries.pop()
        } else {
            None
        }
    }

    /// Remove entries above `kind`, and `kind` itself when `inclusive`
    ///
    /// The bottom entry is never removed.
    pub fn pop_up_to(&mut self, kind: RouteKind, inclusive: bool) -> Vec<BackStackEntry> {
        let Some(position) = self.position_of(kind) else {
            tracing::debug!(?kind, "pop_up_to target not on the stack");
            return Vec::new();
        };
        let mut cut = if inclusive { position } else { position + 1 };
        if cut == 0 {
            tracing::warn!(?kind, "refusing to pop the bottom entry");
            cut = 1;
        }
        self.entries.split_off(cut)
    }

    /// Replace the top entry with a fresh one
    pub fn replace_top(&mut self, route: Route) -> BackStackEntry {
        let fresh = BackStackEntry::new(route);
        let top = self.current_entry_mut();
        std::mem::replace(top, fresh)
    }

    /// Replace the whole stack
    ///
    /// Returns `false` and leaves the stack untouched when `entries` is empty.
    pub fn restore(&mut self, entries: Vec<BackStackEntry>) -> bool {
        if entries.is_empty() {
            return false;
        }
        self.entries = entries;
        true
    }

    /// Reset to a single entry, dropping saved stacks
    pub fn reset(&mut self, route: Route) -> Vec<BackStackEntry> {
        self.saved.clear();
        std::mem::replace(&mut self.entries, vec![BackStackEntry::new(route)])
    }

    /// Get the current (top) route
    pub fn current(&self) -> &Route {
        &self.current_entry().route
    }

    /// Get the current stack entry
    pub fn current_entry(&self) -> &BackStackEntry {
        self.entries.last().expect("Stack should never be empty")
    }

    /// Get mutable reference to current entry
    pub fn current_entry_mut(&mut self) -> &mut BackStackEntry {
        self.entries.last_mut().expect("Stack should never be empty")
    }

    /// Entry by id
    pub fn entry(&self, id: EntryId) -> Option<&BackStackEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Check if we can go back
    pub fn can_go_back(&self) -> bool {
        self.entries.len() > 1
    }

    /// Get stack depth
    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    /// Get all entries
    pub fn entries(&self) -> &[BackStackEntry] {
        &self.entries
    }

    /// Routes from bottom to top
    pub fn routes(&self) -> Vec<&Route> {
        self.entries.iter().map(|entry| &entry.route).collect()
    }

    /// Check if any entry shows `kind`
    pub fn contains(&self, kind: RouteKind) -> bool {
        self.position_of(kind).is_some()
    }

    /// Saved stack keyed by its bottom destination
    pub fn saved_stack(&self, kind: RouteKind) -> Option<&[BackStackEntry]> {
        self.saved.get(&kind).map(Vec::as_slice)
    }

    /// All saved stacks
    pub fn saved_stacks(&self) -> &HashMap<RouteKind, Vec<BackStackEntry>> {
        &self.saved
    }

    /// Replace all saved stacks
    pub fn restore_saved_stacks(&mut self, saved: HashMap<RouteKind, Vec<BackStackEntry>>) {
        self.saved = saved;
    }

    /// Attach view state to an entry, live or saved
    pub fn set_saved_state(&mut self, id: EntryId, state: SavedViewState) -> bool {
        let entry = self
            .entries
            .iter_mut()
            .chain(self.saved.values_mut().flatten())
            .find(|entry| entry.id == id);
        match entry {
            Some(entry) => {
                entry.saved_state = Some(state);
                true
            }
            None => false,
        }
    }

    /// Index of the topmost entry showing `kind`
    fn position_of(&self, kind: RouteKind) -> Option<usize> {
        self.entries.iter().rposition(|entry| entry.kind() == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::route::Origin;

    fn kinds(stack: &BackStack) -> Vec<RouteKind> {
        stack.entries().iter().map(BackStackEntry::kind).collect()
    }

    #[test]
    fn test_navigation_stack_push_pop() {
        let mut stack = BackStack::new(Route::Shop);
        assert_eq!(stack.depth(), 1);
        assert!(!stack.can_go_back());

        let result = stack.push(Route::Cart, NavOptions::new());
        assert_eq!(result.outcome, PushOutcome::Pushed);
        assert_eq!(stack.depth(), 2);
        assert!(stack.can_go_back());
        assert_eq!(*stack.current(), Route::Cart);

        assert!(stack.pop().is_some());
        assert_eq!(stack.depth(), 1);
        assert_eq!(*stack.current(), Route::Shop);

        // Can't pop past root
        assert!(stack.pop().is_none());
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn test_single_top_keeps_depth() {
        let mut stack = BackStack::new(Route::Shop);
        stack.push(Route::AllProducts, NavOptions::new());
        let top_id = stack.current_entry().id;

        let result = stack.push(Route::AllProducts, NavOptions::new().single_top());
        assert_eq!(result.outcome, PushOutcome::SingleTop);
        assert_eq!(stack.depth(), 2);
        assert_eq!(stack.current_entry().id, top_id);
    }

    #[test]
    fn test_single_top_updates_params() {
        let mut stack = BackStack::new(Route::Shop);
        stack.push(Route::item_details("1", Origin::Shop), NavOptions::new());
        stack.push(
            Route::item_details("2", Origin::Shop),
            NavOptions::new().single_top(),
        );
        assert_eq!(stack.depth(), 2);
        assert_eq!(*stack.current(), Route::item_details("2", Origin::Shop));
        assert_eq!(
            stack.current_entry().params.get("itemId").map(String::as_str),
            Some("2")
        );
    }

    #[test]
    fn test_pop_up_to_inclusive_then_push() {
        let mut stack = BackStack::new(Route::Onboarding);
        stack.push(Route::SignIn, NavOptions::new());
        stack.push(Route::Email, NavOptions::new());
        let above: Vec<EntryId> = stack.entries()[1..].iter().map(|e| e.id).collect();

        let result = stack.push(
            Route::SignIn,
            NavOptions::new().pop_up_to(RouteKind::SignIn, true),
        );
        assert_eq!(result.outcome, PushOutcome::Pushed);
        assert_eq!(result.discarded.len(), 2);
        assert_eq!(kinds(&stack), vec![RouteKind::Onboarding, RouteKind::SignIn]);
        assert!(stack.entries().iter().all(|entry| !above.contains(&entry.id)));
    }

    #[test]
    fn test_pop_up_to_clears_onboarding() {
        let mut stack = BackStack::new(Route::Onboarding);
        let result = stack.push(
            Route::Shop,
            NavOptions::new().pop_up_to(RouteKind::Onboarding, true),
        );
        assert_eq!(result.discarded.len(), 1);
        assert_eq!(kinds(&stack), vec![RouteKind::Shop]);
    }

    #[test]
    fn test_pop_up_to_missing_target_pops_nothing() {
        let mut stack = BackStack::new(Route::Shop);
        stack.push(Route::Cart, NavOptions::new());
        let result = stack.push(
            Route::Checkout,
            NavOptions::new().pop_up_to(RouteKind::Wishlist, true),
        );
        assert!(result.discarded.is_empty());
        assert_eq!(stack.depth(), 3);
    }

    #[test]
    fn test_standalone_pop_up_to_keeps_bottom() {
        let mut stack = BackStack::new(Route::Shop);
        stack.push(Route::Cart, NavOptions::new());
        stack.push(Route::Checkout, NavOptions::new());

        let removed = stack.pop_up_to(RouteKind::Cart, false);
        assert_eq!(removed.len(), 1);
        assert_eq!(kinds(&stack), vec![RouteKind::Shop, RouteKind::Cart]);

        let removed = stack.pop_up_to(RouteKind::Shop, true);
        assert_eq!(removed.len(), 1);
        assert_eq!(kinds(&stack), vec![RouteKind::Shop]);
    }

    #[test]
    fn test_save_and_restore_state() {
        let mut stack = BackStack::new(Route::Shop);
        stack.push(Route::Wishlist, NavOptions::new());
        stack.push(Route::item_details("9", Origin::Wishlist), NavOptions::new());
        let details_id = stack.current_entry().id;
        assert!(stack.set_saved_state(details_id, SavedViewState(serde_json::json!({"scroll": 120}))));

        let result = stack.push(Route::Cart, NavOptions::primary(RouteKind::Shop));
        assert_eq!(result.outcome, PushOutcome::Pushed);
        assert_eq!(result.saved.len(), 2);
        assert!(result.discarded.is_empty());
        assert_eq!(kinds(&stack), vec![RouteKind::Shop, RouteKind::Cart]);
        assert_eq!(stack.saved_stack(RouteKind::Wishlist).map(<[_]>::len), Some(2));

        let result = stack.push(Route::Wishlist, NavOptions::primary(RouteKind::Shop));
        assert_eq!(result.outcome, PushOutcome::Restored { count: 2 });
        assert_eq!(
            kinds(&stack),
            vec![RouteKind::Shop, RouteKind::Wishlist, RouteKind::ItemDetails]
        );
        assert_eq!(stack.current_entry().id, details_id);
        assert_eq!(
            stack.current_entry().saved_state,
            Some(SavedViewState(serde_json::json!({"scroll": 120})))
        );
        assert!(stack.saved_stack(RouteKind::Wishlist).is_none());
    }

    #[test]
    fn test_primary_navigation_never_duplicates() {
        let mut stack = BackStack::new(Route::Shop);
        let taps = [
            Route::Cart,
            Route::Cart,
            Route::Wishlist,
            Route::Shop,
            Route::Profile,
            Route::Cart,
            Route::Search,
            Route::Search,
            Route::Wishlist,
        ];
        for route in taps {
            stack.push(route, NavOptions::primary(RouteKind::Shop));
            for primary in crate::navigation::route::PRIMARY_DESTINATIONS {
                let count = stack.entries().iter().filter(|e| e.kind() == primary).count();
                assert!(count <= 1, "{primary:?} appears {count} times");
            }
            assert!(stack.depth() <= 2);
        }
    }

    #[test]
    fn test_replace_top() {
        let mut stack = BackStack::new(Route::Shop);
        stack.push(Route::item_details("3", Origin::Cart), NavOptions::new());
        let old = stack.replace_top(Route::Cart);
        assert_eq!(old.kind(), RouteKind::ItemDetails);
        assert_eq!(kinds(&stack), vec![RouteKind::Shop, RouteKind::Cart]);
        assert_ne!(stack.current_entry().id, old.id);
    }

    #[test]
    fn test_restore_rejects_empty() {
        let mut stack = BackStack::new(Route::Shop);
        assert!(!stack.restore(Vec::new()));
        assert_eq!(stack.depth(), 1);

        assert!(stack.restore(vec![
            BackStackEntry::new(Route::Shop),
            BackStackEntry::new(Route::Cart)
        ]));
        assert_eq!(kinds(&stack), vec![RouteKind::Shop, RouteKind::Cart]);
    }

    #[test]
    fn test_reset() {
        let mut stack = BackStack::new(Route::Onboarding);
        stack.push(Route::SignIn, NavOptions::new());
        let removed = stack.reset(Route::Shop);
        assert_eq!(removed.len(), 2);
        assert_eq!(kinds(&stack), vec![RouteKind::Shop]);
    }
}
