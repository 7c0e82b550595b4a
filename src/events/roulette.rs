//! Roulette state-change messages and teardown events.
//!
//! Every non-ignored [`Transition`] a roulette goes through is written as a
//! [`RouletteMessage`]. Systems later in the same frame (summon spawning,
//! session tally) read them, and the driver drains them once per tick for the
//! presentation layer.

use bevy_ecs::message::Message;
use bevy_ecs::prelude::*;

use crate::components::roulette::Transition;

/// A transition produced by one roulette.
#[derive(Message, Debug, Clone, PartialEq)]
pub struct RouletteMessage {
    pub entity: Entity,
    pub transition: Transition,
}

/// Request to remove roulettes. Any in-flight catch-up is abandoned.
///
/// `entity: None` tears down every roulette.
#[derive(Event, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TeardownEvent {
    pub entity: Option<Entity>,
}
