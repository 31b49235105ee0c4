//! Shared-element transitions
//!
//! During one navigation the outgoing and incoming screens each declare the
//! elements they show, keyed by `(kind, id)`. Keys present on both sides are
//! morphed from the outgoing bounds to the incoming bounds while their content
//! cross-fades. Keys present on one side only fall back to the ordinary
//! screen animation.
//!
//! Tokens belong to exactly one transition. Opening a new transition
//! disposes every token of the previous one, so a detail screen reached first
//! from the list and later from the cart never matches against leftovers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::tokens::{duration, easing, CubicBezier};

use super::stack::EntryId;

/// Default shared-element morph length
pub const DEFAULT_SHARED_DURATION: Duration = Duration::from_millis(duration::EXTRA_SLOW as u64);

// =============================================================================
// Keys and Geometry
// =============================================================================

/// What sort of element is shared
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    /// Product image
    Image,
    /// Title or other text block
    Text,
    /// Anything else, by name
    Custom(String),
}

/// Identity of a shared element
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SharedKey {
    /// Element sort
    pub kind: ElementKind,
    /// Id of the data behind the element
    pub id: String,
}

impl SharedKey {
    /// Create a key
    pub fn new(kind: ElementKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }

    /// Image key for an item
    pub fn image(id: impl Into<String>) -> Self {
        Self::new(ElementKind::Image, id)
    }

    /// Text key for an item
    pub fn text(id: impl Into<String>) -> Self {
        Self::new(ElementKind::Text, id)
    }
}

impl fmt::Display for SharedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ElementKind::Image => write!(f, "image-{}", self.id),
            ElementKind::Text => write!(f, "text-{}", self.id),
            ElementKind::Custom(kind) => write!(f, "{}-{}", kind, self.id),
        }
    }
}

/// Measured position and size
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl Bounds {
    /// Create bounds
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Interpolate towards `to` at progress `t`
    pub fn lerp(&self, to: &Bounds, t: f32) -> Bounds {
        let mix = |a: f32, b: f32| a + (b - a) * t;
        Bounds {
            x: mix(self.x, to.x),
            y: mix(self.y, to.y),
            width: mix(self.width, to.width),
            height: mix(self.height, to.height),
        }
    }
}

/// Source of an element's current bounds
pub trait BoundsProvider: Send {
    /// Measure the element
    fn bounds(&self) -> Bounds;
}

impl BoundsProvider for Bounds {
    fn bounds(&self) -> Bounds {
        *self
    }
}

impl<F> BoundsProvider for F
where
    F: Fn() -> Bounds + Send,
{
    fn bounds(&self) -> Bounds {
        self()
    }
}

// =============================================================================
// Tokens
// =============================================================================

/// Identifier of one navigation transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransitionId(u64);

/// Lifecycle of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenState {
    /// Declared, not yet matched
    Registered,
    /// The other side declared the same key
    Matched,
    /// Bounds are being interpolated
    Animating,
    /// The other side has no such key; the screen animation applies
    Unmatched,
    /// Done; the token is about to be disposed
    Resolved,
}

/// A participating element of one screen in one transition
pub struct SharedElementToken {
    key: SharedKey,
    owner: EntryId,
    transition: TransitionId,
    provider: Box<dyn BoundsProvider>,
    state: TokenState,
}

impl SharedElementToken {
    /// Element key
    pub fn key(&self) -> &SharedKey {
        &self.key
    }

    /// Entry whose screen declared the element
    pub fn owner(&self) -> EntryId {
        self.owner
    }

    /// Transition the token belongs to
    pub fn transition(&self) -> TransitionId {
        self.transition
    }

    /// Lifecycle state
    pub fn state(&self) -> TokenState {
        self.state
    }

    /// Current bounds
    pub fn bounds(&self) -> Bounds {
        self.provider.bounds()
    }
}

impl fmt::Debug for SharedElementToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedElementToken")
            .field("key", &self.key)
            .field("owner", &self.owner)
            .field("transition", &self.transition)
            .field("state", &self.state)
            .finish()
    }
}

// =============================================================================
// Frames
// =============================================================================

/// Placement of one shared element at one instant
#[derive(Debug, Clone, PartialEq)]
pub struct ElementFrame {
    /// Element key
    pub key: SharedKey,
    /// Interpolated bounds
    pub bounds: Bounds,
    /// Opacity of the outgoing screen's content
    pub outgoing_alpha: f32,
    /// Opacity of the incoming screen's content
    pub incoming_alpha: f32,
}

/// Outcome of matching one transition's tokens
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MatchSummary {
    /// Keys both sides declared
    pub matched: Vec<SharedKey>,
    /// Keys only one side declared
    pub unmatched: Vec<SharedKey>,
}

#[derive(Debug)]
struct Morph {
    key: SharedKey,
    from: Bounds,
    incoming: usize,
}

#[derive(Debug)]
struct ActiveTransition {
    id: TransitionId,
    from: EntryId,
    to: EntryId,
    tokens: Vec<SharedElementToken>,
    morphs: Vec<Morph>,
    started: bool,
    elapsed: Duration,
}

// =============================================================================
// Coordinator
// =============================================================================

/// Matches and animates shared elements for the current transition
#[derive(Debug)]
pub struct SharedElementCoordinator {
    duration: Duration,
    easing: CubicBezier,
    next_id: u64,
    active: Option<ActiveTransition>,
}

impl SharedElementCoordinator {
    /// Create a coordinator morphing over `duration`
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            easing: easing::EASE_IN_OUT,
            next_id: 0,
            active: None,
        }
    }

    /// Morph length
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Open a transition between two entries
    ///
    /// Any transition still open is cancelled first.
    pub fn begin(&mut self, from: EntryId, to: EntryId) -> TransitionId {
        self.cancel();
        self.next_id += 1;
        let id = TransitionId(self.next_id);
        tracing::debug!(transition = id.0, %from, %to, "shared transition opened");
        self.active = Some(ActiveTransition {
            id,
            from,
            to,
            tokens: Vec::new(),
            morphs: Vec::new(),
            started: false,
            elapsed: Duration::ZERO,
        });
        id
    }

    /// Registration scope for one screen of the open transition
    ///
    /// Returns `None` if `transition` is no longer open or `owner` is not one
    /// of its two entries.
    pub fn scope(&mut self, transition: TransitionId, owner: EntryId) -> Option<SharedScope<'_>> {
        let active = self.active.as_ref()?;
        if active.id != transition || (owner != active.from && owner != active.to) {
            return None;
        }
        Some(SharedScope {
            coordinator: self,
            transition,
            owner,
        })
    }

    /// Declare an element for one side of a transition
    ///
    /// Stale transitions, unknown owners, and registrations after matching
    /// are ignored and return `false`.
    pub fn register(
        &mut self,
        transition: TransitionId,
        owner: EntryId,
        key: SharedKey,
        provider: Box<dyn BoundsProvider>,
    ) -> bool {
        let Some(active) = self.active.as_mut() else {
            tracing::debug!(%key, "shared element registered with no open transition");
            return false;
        };
        if active.id != transition {
            tracing::debug!(%key, stale = transition.0, current = active.id.0, "stale shared element ignored");
            return false;
        }
        if owner != active.from && owner != active.to {
            tracing::debug!(%key, %owner, "shared element from an entry outside the transition");
            return false;
        }
        if active.started {
            tracing::debug!(%key, "shared element registered after matching");
            return false;
        }

        active
            .tokens
            .retain(|token| !(token.owner == owner && token.key == key));
        active.tokens.push(SharedElementToken {
            key,
            owner,
            transition,
            provider,
            state: TokenState::Registered,
        });
        true
    }

    /// Match keys across the two sides and start morphing
    pub fn start(&mut self, transition: TransitionId) -> MatchSummary {
        let Some(active) = self.active.as_mut() else {
            return MatchSummary::default();
        };
        if active.id != transition || active.started {
            return MatchSummary::default();
        }
        active.started = true;

        let mut summary = MatchSummary::default();
        let mut morphs = Vec::new();
        let (from, to) = (active.from, active.to);

        for index in 0..active.tokens.len() {
            let token = &active.tokens[index];
            let counterpart_owner = if token.owner == from { to } else { from };
            let counterpart = active
                .tokens
                .iter()
                .position(|other| other.owner == counterpart_owner && other.key == token.key);

            match counterpart {
                Some(other) => {
                    // Record each pair once, from the outgoing side.
                    if token.owner == from {
                        summary.matched.push(token.key.clone());
                        morphs.push(Morph {
                            key: token.key.clone(),
                            from: token.bounds(),
                            incoming: other,
                        });
                    }
                    active.tokens[index].state = TokenState::Matched;
                }
                None => {
                    summary.unmatched.push(token.key.clone());
                    active.tokens[index].state = TokenState::Unmatched;
                }
            }
        }

        for token in active.tokens.iter_mut() {
            if token.state == TokenState::Matched {
                token.state = TokenState::Animating;
            }
        }
        active.morphs = morphs;
        summary.matched.sort();
        summary.unmatched.sort();
        summary.unmatched.dedup();

        tracing::debug!(
            transition = transition.0,
            matched = summary.matched.len(),
            unmatched = summary.unmatched.len(),
            "shared elements matched"
        );
        summary
    }

    /// Advance the morph and return the element frames
    ///
    /// When the morph completes the tokens are resolved and disposed, and the
    /// returned frames sit at the incoming bounds. A transition with nothing
    /// matched completes on its first frame.
    pub fn advance(&mut self, elapsed: Duration) -> Vec<ElementFrame> {
        let Some(active) = self.active.as_mut() else {
            return Vec::new();
        };
        if !active.started {
            return Vec::new();
        }
        active.elapsed = active.elapsed.saturating_add(elapsed);
        let frames = Self::frames_of(active, self.duration, self.easing);
        if active.elapsed >= self.duration || active.morphs.is_empty() {
            self.finish();
        }
        frames
    }

    /// Element frames at the current position
    pub fn frames(&self) -> Vec<ElementFrame> {
        match &self.active {
            Some(active) if active.started => Self::frames_of(active, self.duration, self.easing),
            _ => Vec::new(),
        }
    }

    /// Stop the morph where it is and dispose the tokens
    ///
    /// Returns the frames at the halted position.
    pub fn cancel(&mut self) -> Vec<ElementFrame> {
        let Some(active) = self.active.take() else {
            return Vec::new();
        };
        let frames = if active.started {
            Self::frames_of(&active, self.duration, self.easing)
        } else {
            Vec::new()
        };
        tracing::debug!(
            transition = active.id.0,
            tokens = active.tokens.len(),
            "shared transition cancelled"
        );
        frames
    }

    /// Check if a transition is open
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Check if the open transition has nothing left to animate
    pub fn is_idle(&self) -> bool {
        match &self.active {
            None => true,
            Some(active) => active.started && active.morphs.is_empty(),
        }
    }

    /// Id of the open transition
    pub fn active_transition(&self) -> Option<TransitionId> {
        self.active.as_ref().map(|active| active.id)
    }

    /// Number of live tokens
    pub fn token_count(&self) -> usize {
        self.active
            .as_ref()
            .map(|active| active.tokens.len())
            .unwrap_or(0)
    }

    /// State of one live token
    pub fn token_state(&self, owner: EntryId, key: &SharedKey) -> Option<TokenState> {
        self.active.as_ref()?.tokens.iter().find_map(|token| {
            (token.owner == owner && token.key == *key).then_some(token.state)
        })
    }

    /// Live tokens of the open transition
    pub fn tokens(&self) -> &[SharedElementToken] {
        self.active
            .as_ref()
            .map(|active| active.tokens.as_slice())
            .unwrap_or(&[])
    }

    fn finish(&mut self) {
        if let Some(mut active) = self.active.take() {
            for token in active.tokens.iter_mut() {
                token.state = TokenState::Resolved;
            }
            tracing::debug!(transition = active.id.0, "shared transition resolved");
        }
    }

    fn frames_of(
        active: &ActiveTransition,
        duration: Duration,
        curve: CubicBezier,
    ) -> Vec<ElementFrame> {
        let t = if duration.is_zero() {
            1.0
        } else {
            (active.elapsed.as_secs_f32() / duration.as_secs_f32()).clamp(0.0, 1.0)
        };
        let p = curve.transform(t);
        active
            .morphs
            .iter()
            .map(|morph| {
                let target = active.tokens[morph.incoming].bounds();
                ElementFrame {
                    key: morph.key.clone(),
                    bounds: morph.from.lerp(&target, p),
                    outgoing_alpha: 1.0 - p,
                    incoming_alpha: p,
                }
            })
            .collect()
    }
}

impl Default for SharedElementCoordinator {
    fn default() -> Self {
        Self::new(DEFAULT_SHARED_DURATION)
    }
}

/// Participation handle given to one screen during one transition
pub struct SharedScope<'a> {
    coordinator: &'a mut SharedElementCoordinator,
    transition: TransitionId,
    owner: EntryId,
}

impl SharedScope<'_> {
    /// Transition this scope registers into
    pub fn transition(&self) -> TransitionId {
        self.transition
    }

    /// Entry whose screen owns this scope
    pub fn owner(&self) -> EntryId {
        self.owner
    }

    /// Declare an element with a bounds source
    pub fn register(&mut self, key: SharedKey, provider: impl BoundsProvider + 'static) -> bool {
        self.coordinator
            .register(self.transition, self.owner, key, Box::new(provider))
    }

    /// Declare an element at fixed bounds
    pub fn element(&mut self, key: SharedKey, bounds: Bounds) -> bool {
        self.register(key, bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIST_IMAGE: Bounds = Bounds::new(16.0, 200.0, 100.0, 100.0);
    const HERO_IMAGE: Bounds = Bounds::new(0.0, 0.0, 400.0, 300.0);

    fn open(
        coordinator: &mut SharedElementCoordinator,
        from: EntryId,
        to: EntryId,
        outgoing: &[(SharedKey, Bounds)],
        incoming: &[(SharedKey, Bounds)],
    ) -> (TransitionId, MatchSummary) {
        let id = coordinator.begin(from, to);
        {
            let mut scope = coordinator.scope(id, from).unwrap();
            for (key, bounds) in outgoing {
                assert!(scope.element(key.clone(), *bounds));
            }
        }
        {
            let mut scope = coordinator.scope(id, to).unwrap();
            for (key, bounds) in incoming {
                assert!(scope.element(key.clone(), *bounds));
            }
        }
        let summary = coordinator.start(id);
        (id, summary)
    }

    #[test]
    fn test_matching_keys_morph() {
        let mut coordinator = SharedElementCoordinator::default();
        let (list, details) = (EntryId::new(), EntryId::new());
        let (_, summary) = open(
            &mut coordinator,
            list,
            details,
            &[
                (SharedKey::image("42"), LIST_IMAGE),
                (SharedKey::text("42"), LIST_IMAGE),
                (SharedKey::image("43"), LIST_IMAGE),
            ],
            &[
                (SharedKey::image("42"), HERO_IMAGE),
                (SharedKey::text("42"), HERO_IMAGE),
            ],
        );

        assert_eq!(
            summary.matched,
            vec![SharedKey::image("42"), SharedKey::text("42")]
        );
        assert_eq!(summary.unmatched, vec![SharedKey::image("43")]);
        assert_eq!(
            coordinator.token_state(list, &SharedKey::image("42")),
            Some(TokenState::Animating)
        );
        assert_eq!(
            coordinator.token_state(details, &SharedKey::image("42")),
            Some(TokenState::Animating)
        );
        assert_eq!(
            coordinator.token_state(list, &SharedKey::image("43")),
            Some(TokenState::Unmatched)
        );
    }

    #[test]
    fn test_bounds_interpolate_over_duration() {
        let mut coordinator = SharedElementCoordinator::default();
        let (list, details) = (EntryId::new(), EntryId::new());
        open(
            &mut coordinator,
            list,
            details,
            &[(SharedKey::image("1"), LIST_IMAGE)],
            &[(SharedKey::image("1"), HERO_IMAGE)],
        );

        let frames = coordinator.advance(Duration::ZERO);
        assert_eq!(frames[0].bounds, LIST_IMAGE);
        assert_eq!(frames[0].outgoing_alpha, 1.0);

        let frames = coordinator.advance(Duration::from_millis(250));
        let mid = frames[0].bounds;
        assert!(mid.width > LIST_IMAGE.width && mid.width < HERO_IMAGE.width);
        assert!(frames[0].incoming_alpha > 0.0 && frames[0].incoming_alpha < 1.0);
        assert!(coordinator.is_active());

        let frames = coordinator.advance(Duration::from_millis(250));
        assert_eq!(frames[0].bounds, HERO_IMAGE);
        assert_eq!(frames[0].incoming_alpha, 1.0);
        assert!(!coordinator.is_active());
        assert_eq!(coordinator.token_count(), 0);
    }

    #[test]
    fn test_matching_is_symmetric() {
        let outgoing = [
            (SharedKey::image("7"), LIST_IMAGE),
            (SharedKey::text("7"), LIST_IMAGE),
            (SharedKey::image("8"), LIST_IMAGE),
        ];
        let incoming = [
            (SharedKey::image("7"), HERO_IMAGE),
            (SharedKey::text("9"), HERO_IMAGE),
        ];
        let (a, b) = (EntryId::new(), EntryId::new());

        let mut coordinator = SharedElementCoordinator::default();
        let (_, forward) = open(&mut coordinator, a, b, &outgoing, &incoming);
        let (_, backward) = open(&mut coordinator, b, a, &incoming, &outgoing);

        assert_eq!(forward.matched, backward.matched);
        assert_eq!(forward.unmatched, backward.unmatched);
    }

    #[test]
    fn test_stale_tokens_never_match() {
        let mut coordinator = SharedElementCoordinator::default();
        let (list, cart, details) = (EntryId::new(), EntryId::new(), EntryId::new());

        let (first, _) = open(
            &mut coordinator,
            list,
            details,
            &[(SharedKey::image("5"), LIST_IMAGE)],
            &[(SharedKey::image("5"), HERO_IMAGE)],
        );
        coordinator.advance(DEFAULT_SHARED_DURATION);
        assert!(!coordinator.is_active());

        // A second transition into the same key from another screen.
        let second = coordinator.begin(cart, details);
        assert_ne!(first, second);
        assert!(!coordinator.register(
            first,
            list,
            SharedKey::image("5"),
            Box::new(LIST_IMAGE)
        ));
        assert!(coordinator.scope(first, list).is_none());
        {
            let mut scope = coordinator.scope(second, details).unwrap();
            scope.element(SharedKey::image("5"), HERO_IMAGE);
        }
        let summary = coordinator.start(second);
        assert!(summary.matched.is_empty());
        assert_eq!(summary.unmatched, vec![SharedKey::image("5")]);
    }

    #[test]
    fn test_begin_cancels_open_transition() {
        let mut coordinator = SharedElementCoordinator::default();
        let (a, b, c) = (EntryId::new(), EntryId::new(), EntryId::new());
        open(
            &mut coordinator,
            a,
            b,
            &[(SharedKey::image("1"), LIST_IMAGE)],
            &[(SharedKey::image("1"), HERO_IMAGE)],
        );
        coordinator.advance(Duration::from_millis(100));
        assert_eq!(coordinator.token_count(), 2);

        coordinator.begin(b, c);
        assert_eq!(coordinator.token_count(), 0);
        assert_eq!(coordinator.token_state(a, &SharedKey::image("1")), None);
    }

    #[test]
    fn test_cancel_halts_in_place() {
        let mut coordinator = SharedElementCoordinator::default();
        let (a, b) = (EntryId::new(), EntryId::new());
        open(
            &mut coordinator,
            a,
            b,
            &[(SharedKey::image("1"), LIST_IMAGE)],
            &[(SharedKey::image("1"), HERO_IMAGE)],
        );
        let moving = coordinator.advance(Duration::from_millis(200));
        let halted = coordinator.cancel();

        assert_eq!(halted, moving);
        assert_ne!(halted[0].bounds, HERO_IMAGE);
        assert!(!coordinator.is_active());
        assert!(coordinator.advance(Duration::from_millis(300)).is_empty());
    }

    #[test]
    fn test_scope_rejects_outsiders() {
        let mut coordinator = SharedElementCoordinator::default();
        let (a, b) = (EntryId::new(), EntryId::new());
        let id = coordinator.begin(a, b);
        assert!(coordinator.scope(id, EntryId::new()).is_none());
        assert!(!coordinator.register(id, EntryId::new(), SharedKey::image("1"), Box::new(LIST_IMAGE)));
    }

    #[test]
    fn test_registration_closes_after_start() {
        let mut coordinator = SharedElementCoordinator::default();
        let (a, b) = (EntryId::new(), EntryId::new());
        let id = coordinator.begin(a, b);
        coordinator.start(id);
        assert!(!coordinator.register(id, a, SharedKey::image("1"), Box::new(LIST_IMAGE)));
        assert!(coordinator.is_idle());
    }

    #[test]
    fn test_provider_is_queried_each_frame() {
        use std::sync::atomic::{AtomicU32, Ordering};
        use std::sync::Arc;

        let width = Arc::new(AtomicU32::new(300));
        let measured = Arc::clone(&width);
        let mut coordinator = SharedElementCoordinator::default();
        let (a, b) = (EntryId::new(), EntryId::new());
        let id = coordinator.begin(a, b);
        coordinator
            .scope(id, a)
            .unwrap()
            .element(SharedKey::image("1"), LIST_IMAGE);
        coordinator.scope(id, b).unwrap().register(SharedKey::image("1"), move || {
            Bounds::new(0.0, 0.0, measured.load(Ordering::SeqCst) as f32, 300.0)
        });
        coordinator.start(id);

        width.store(400, Ordering::SeqCst);
        let frames = coordinator.advance(DEFAULT_SHARED_DURATION);
        assert_eq!(frames[0].bounds, HERO_IMAGE);
    }

    #[test]
    fn test_key_display() {
        assert_eq!(SharedKey::image("42").to_string(), "image-42");
        assert_eq!(SharedKey::text("42").to_string(), "text-42");
        assert_eq!(
            SharedKey::new(ElementKind::Custom("price".to_string()), "42").to_string(),
            "price-42"
        );
    }
}
