//! Screen enter/exit animations
//!
//! Every route descriptor carries four animation specs, fixed when the route
//! is registered. Selecting the animation for a navigation is a table lookup
//! with no dependence on runtime content.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::tokens::{duration, easing, CubicBezier};

use super::table::RouteDescriptor;

/// Animation kinds a screen can play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationKind {
    /// Enter from the left edge
    SlideFromLeft,
    /// Enter from the right edge
    SlideFromRight,
    /// Enter from the bottom edge
    SlideFromBottom,
    /// Leave through the left edge
    SlideToLeft,
    /// Leave through the right edge
    SlideToRight,
    /// Leave through the bottom edge
    SlideToBottom,
    /// Fade in or out in place
    CrossFade,
    /// No animation
    None,
}

/// Which of the four descriptor animations applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionDirection {
    /// Destination appearing on a forward navigation
    Enter,
    /// Previous top leaving on a forward navigation
    Exit,
    /// Revealed entry appearing on a pop
    PopEnter,
    /// Popped entry leaving
    PopExit,
}

impl TransitionDirection {
    /// Check if the screen playing this direction is appearing
    pub fn is_incoming(&self) -> bool {
        matches!(self, TransitionDirection::Enter | TransitionDirection::PopEnter)
    }
}

/// Route grouping that fixes the default animation set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteCategory {
    /// Bottom-bar destinations
    Primary,
    /// Drill-down screens
    Detail,
    /// Bottom sheets
    Sheet,
    /// Authentication flow
    Auth,
    /// First-run walkthrough
    Onboarding,
}

impl RouteCategory {
    /// Animation set registered for routes of this category
    pub fn transitions(&self) -> TransitionSet {
        use AnimationKind as K;
        match self {
            RouteCategory::Primary => {
                TransitionSet::new(K::CrossFade, K::CrossFade, K::CrossFade, K::CrossFade)
            }
            RouteCategory::Detail => TransitionSet::new(
                K::SlideFromRight,
                K::SlideToLeft,
                K::SlideFromLeft,
                K::SlideToRight,
            ),
            RouteCategory::Sheet => {
                TransitionSet::new(K::SlideFromBottom, K::None, K::None, K::SlideToBottom)
            }
            RouteCategory::Auth => {
                TransitionSet::new(K::SlideFromRight, K::CrossFade, K::CrossFade, K::SlideToRight)
            }
            RouteCategory::Onboarding => {
                TransitionSet::new(K::None, K::CrossFade, K::None, K::CrossFade)
            }
        }
    }
}

/// The four directional animations of one route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionSet {
    /// Played when the route is pushed
    pub enter: AnimationKind,
    /// Played when another route is pushed over it
    pub exit: AnimationKind,
    /// Played when it is revealed by a pop
    pub pop_enter: AnimationKind,
    /// Played when it is popped
    pub pop_exit: AnimationKind,
}

impl TransitionSet {
    /// Create a set from its four directions
    pub const fn new(
        enter: AnimationKind,
        exit: AnimationKind,
        pop_enter: AnimationKind,
        pop_exit: AnimationKind,
    ) -> Self {
        Self {
            enter,
            exit,
            pop_enter,
            pop_exit,
        }
    }

    /// Animation for one direction
    pub fn get(&self, direction: TransitionDirection) -> AnimationKind {
        match direction {
            TransitionDirection::Enter => self.enter,
            TransitionDirection::Exit => self.exit,
            TransitionDirection::PopEnter => self.pop_enter,
            TransitionDirection::PopExit => self.pop_exit,
        }
    }
}

/// A fully timed animation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationSpec {
    /// What moves
    pub kind: AnimationKind,
    /// How long it takes
    pub duration: Duration,
    /// Progress curve
    pub easing: CubicBezier,
    /// Whether the screen is appearing
    pub incoming: bool,
}

/// Position and opacity of a screen at one instant
///
/// Offsets are fractions of the viewport size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationFrame {
    /// Horizontal offset
    pub offset_x: f32,
    /// Vertical offset
    pub offset_y: f32,
    /// Opacity
    pub alpha: f32,
}

impl AnimationFrame {
    /// On screen, fully opaque
    pub const REST: AnimationFrame = AnimationFrame {
        offset_x: 0.0,
        offset_y: 0.0,
        alpha: 1.0,
    };
}

impl AnimationSpec {
    /// An animation that finishes immediately
    pub fn none(incoming: bool) -> Self {
        Self {
            kind: AnimationKind::None,
            duration: Duration::ZERO,
            easing: easing::LINEAR,
            incoming,
        }
    }

    /// Linear progress after `elapsed`, clamped to `[0, 1]`
    pub fn progress(&self, elapsed: Duration) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (elapsed.as_secs_f32() / self.duration.as_secs_f32()).clamp(0.0, 1.0)
    }

    /// Check if the animation is over after `elapsed`
    pub fn is_finished(&self, elapsed: Duration) -> bool {
        elapsed >= self.duration
    }

    /// Screen placement at linear progress `t`
    pub fn frame_at(&self, t: f32) -> AnimationFrame {
        let p = self.easing.transform(t.clamp(0.0, 1.0));
        // Incoming screens travel from the edge to rest; outgoing from rest to the edge.
        let travel = if self.incoming { 1.0 - p } else { p };
        let mut frame = AnimationFrame::REST;
        match self.kind {
            AnimationKind::SlideFromLeft | AnimationKind::SlideToLeft => frame.offset_x = -travel,
            AnimationKind::SlideFromRight | AnimationKind::SlideToRight => frame.offset_x = travel,
            AnimationKind::SlideFromBottom | AnimationKind::SlideToBottom => {
                frame.offset_y = travel
            }
            AnimationKind::CrossFade => frame.alpha = 1.0 - travel,
            AnimationKind::None => {
                if !self.incoming && t >= 1.0 {
                    frame.alpha = 0.0;
                }
            }
        }
        frame
    }
}

/// Pick the animation a route plays in one direction
pub fn select_animation(
    direction: TransitionDirection,
    route: &RouteDescriptor,
    screen_duration: Duration,
) -> AnimationSpec {
    let kind = route.transitions().get(direction);
    let incoming = direction.is_incoming();
    if kind == AnimationKind::None {
        return AnimationSpec::none(incoming);
    }
    AnimationSpec {
        kind,
        duration: screen_duration,
        easing: if incoming {
            easing::EASE_OUT
        } else {
            easing::EASE_IN
        },
        incoming,
    }
}

/// Default screen transition length
pub const DEFAULT_SCREEN_DURATION: Duration = Duration::from_millis(duration::SLOW as u64);

/// Enter and exit animations of one navigation, played together
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenTransition {
    /// Animation of the screen becoming top
    pub incoming: AnimationSpec,
    /// Animation of the screen being covered or removed
    pub outgoing: Option<AnimationSpec>,
    elapsed: Duration,
}

impl ScreenTransition {
    /// Pair the two sides of one navigation
    pub fn new(incoming: AnimationSpec, outgoing: Option<AnimationSpec>) -> Self {
        Self {
            incoming,
            outgoing,
            elapsed: Duration::ZERO,
        }
    }

    /// Advance both animations
    pub fn advance(&mut self, elapsed: Duration) {
        self.elapsed = self.elapsed.saturating_add(elapsed);
    }

    /// Time since the transition started
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Check if both sides have finished
    pub fn is_finished(&self) -> bool {
        self.incoming.is_finished(self.elapsed)
            && self
                .outgoing
                .as_ref()
                .map(|spec| spec.is_finished(self.elapsed))
                .unwrap_or(true)
    }

    /// Current placement of the incoming screen
    pub fn incoming_frame(&self) -> AnimationFrame {
        self.incoming.frame_at(self.incoming.progress(self.elapsed))
    }

    /// Current placement of the outgoing screen
    pub fn outgoing_frame(&self) -> Option<AnimationFrame> {
        self.outgoing
            .as_ref()
            .map(|spec| spec.frame_at(spec.progress(self.elapsed)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::route::RouteKind;
    use crate::navigation::table::RouteTable;

    #[test]
    fn test_selection_follows_descriptor_table() {
        let table = RouteTable::shop().unwrap();
        let duration = DEFAULT_SCREEN_DURATION;
        for descriptor in table.descriptors() {
            let set = descriptor.category().transitions();
            for direction in [
                TransitionDirection::Enter,
                TransitionDirection::Exit,
                TransitionDirection::PopEnter,
                TransitionDirection::PopExit,
            ] {
                let spec = select_animation(direction, descriptor, duration);
                assert_eq!(spec.kind, set.get(direction), "{:?}", descriptor.kind());
                assert_eq!(spec.incoming, direction.is_incoming());
            }
        }
    }

    #[test]
    fn test_detail_slides_and_primary_fades() {
        let table = RouteTable::shop().unwrap();
        let details = table.descriptor(RouteKind::ItemDetails).unwrap();
        let cart = table.descriptor(RouteKind::Cart).unwrap();
        let d = DEFAULT_SCREEN_DURATION;

        assert_eq!(
            select_animation(TransitionDirection::Enter, details, d).kind,
            AnimationKind::SlideFromRight
        );
        assert_eq!(
            select_animation(TransitionDirection::PopExit, details, d).kind,
            AnimationKind::SlideToRight
        );
        assert_eq!(
            select_animation(TransitionDirection::Exit, cart, d).kind,
            AnimationKind::CrossFade
        );
    }

    #[test]
    fn test_filter_sheet_uses_bottom_edge() {
        let table = RouteTable::shop().unwrap();
        let filter = table.descriptor(RouteKind::ProductFilter).unwrap();
        let d = DEFAULT_SCREEN_DURATION;
        assert_eq!(
            select_animation(TransitionDirection::Enter, filter, d).kind,
            AnimationKind::SlideFromBottom
        );
        assert_eq!(
            select_animation(TransitionDirection::PopExit, filter, d).kind,
            AnimationKind::SlideToBottom
        );
        let exit = select_animation(TransitionDirection::Exit, filter, d);
        assert_eq!(exit.kind, AnimationKind::None);
        assert_eq!(exit.duration, Duration::ZERO);
    }

    #[test]
    fn test_slide_frames() {
        let enter = AnimationSpec {
            kind: AnimationKind::SlideFromRight,
            duration: Duration::from_millis(300),
            easing: easing::LINEAR,
            incoming: true,
        };
        assert_eq!(enter.frame_at(0.0).offset_x, 1.0);
        assert!((enter.frame_at(0.5).offset_x - 0.5).abs() < 1e-3);
        assert_eq!(enter.frame_at(1.0), AnimationFrame::REST);

        let exit = AnimationSpec {
            kind: AnimationKind::SlideToLeft,
            incoming: false,
            ..enter
        };
        assert_eq!(exit.frame_at(0.0), AnimationFrame::REST);
        assert_eq!(exit.frame_at(1.0).offset_x, -1.0);
    }

    #[test]
    fn test_cross_fade_frames() {
        let fade_out = AnimationSpec {
            kind: AnimationKind::CrossFade,
            duration: Duration::from_millis(300),
            easing: easing::LINEAR,
            incoming: false,
        };
        assert_eq!(fade_out.frame_at(0.0).alpha, 1.0);
        assert_eq!(fade_out.frame_at(1.0).alpha, 0.0);
        assert_eq!(fade_out.frame_at(0.5).offset_x, 0.0);
    }

    #[test]
    fn test_screen_transition_completes() {
        let spec = AnimationSpec {
            kind: AnimationKind::SlideFromRight,
            duration: Duration::from_millis(300),
            easing: easing::EASE_OUT,
            incoming: true,
        };
        let mut transition = ScreenTransition::new(spec, Some(AnimationSpec::none(false)));
        assert!(!transition.is_finished());

        transition.advance(Duration::from_millis(150));
        let mid = transition.incoming_frame();
        assert!(mid.offset_x > 0.0 && mid.offset_x < 1.0);

        transition.advance(Duration::from_millis(150));
        assert!(transition.is_finished());
        assert_eq!(transition.incoming_frame(), AnimationFrame::REST);
        assert_eq!(transition.outgoing_frame().map(|f| f.alpha), Some(0.0));
    }
}
