use derive_more::{AsRef, Deref, Display, From, Into};
use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct KnobId(String);

crate::impl_string_newtype!(KnobId);

/// Receives everything a knob reports to the outside.
///
/// A knob holds at most one listener. Callbacks run synchronously inside the
/// knob operation that caused them, so implementations must not block.
pub trait KnobListener {
    /// The integer value changed, either by a drag/animation (`from_user`) or
    /// by a programmatic call.
    fn on_value_changed(&mut self, knob: &KnobId, value: i32, from_user: bool);

    /// A tap asks to switch the knob to `on`. Returning `false` vetoes it.
    fn on_switch_changed(&mut self, knob: &KnobId, on: bool) -> bool;

    /// An on/off transition settled at `on`.
    fn on_animation_finished(&mut self, knob: &KnobId, on: bool);
}
