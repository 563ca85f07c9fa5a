//! Rotary on/off knob: value state, drag handling and on/off animation,
//! independent of any GUI toolkit.
//!
//! The host feeds size changes, pointer events and frame ticks into a
//! [`Knob`] and paints the [`KnobFrame`] it hands back.

pub mod angle;
pub mod geometry;
pub mod interpolation;
pub mod knob;
pub mod listener;
mod macros;

pub use geometry::{KnobGeometry, Point, Rect};
pub use interpolation::{Easing, Interpolation, Progress};
pub use knob::{ArcSpan, Knob, KnobFrame, PointerResponse, TickOutcome, Tint};
pub use listener::{KnobId, KnobListener};
