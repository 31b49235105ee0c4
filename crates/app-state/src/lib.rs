//! Shared state for the Shopfront navigation core
//!
//! This crate holds the state that lives beside the back stack rather than
//! inside it: the transient payload handoff between screens and the frame
//! clock that advances in-flight transitions.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod animation;
pub mod payload;

pub use animation::{AnimationDriver, FrameStatus, FrameTarget, RunId, DEFAULT_FRAME_INTERVAL};
pub use payload::{Payload, PayloadSlot, PayloadStore};
