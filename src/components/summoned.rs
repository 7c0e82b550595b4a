//! Summoned roulette marker component.
//!
//! Roulettes spawned by a summon result carry [`Summoned`]. When the session
//! has `despawn_summoned_when_done` set, a summoned roulette is removed after
//! a reset that produced no further summon.

use bevy_ecs::prelude::{Component, Entity};

/// Tag component for roulettes created by a summon.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Summoned {
    /// Roulette whose reset requested this one.
    pub origin: Entity,
}
