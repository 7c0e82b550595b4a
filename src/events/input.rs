//! Advance input events.
//!
//! [`AdvanceInputEvent`] is the generic "space bar" of the minigame. How it is
//! produced (keyboard, button, simulated player) is up to the driver; the
//! [`advance_input_observer`](crate::systems::roulette::advance_input_observer)
//! forwards it to [`Roulette::advance`](crate::components::roulette::Roulette::advance).

use bevy_ecs::prelude::*;

/// Event emitted when the player presses the advance input.
///
/// With `target: None` the press reaches every live roulette, the way a single
/// shared key does. With `Some(entity)` only that roulette reacts.
#[derive(Event, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdvanceInputEvent {
    pub target: Option<Entity>,
}

impl AdvanceInputEvent {
    pub fn broadcast() -> Self {
        Self { target: None }
    }

    pub fn to(entity: Entity) -> Self {
        Self {
            target: Some(entity),
        }
    }
}
