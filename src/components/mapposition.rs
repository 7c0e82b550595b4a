use bevy_ecs::prelude::Component;
use serde::Serialize;

use crate::components::roulette::SpawnOffset;

/// Opaque presentation position of a roulette. The engine only adds spawn
/// offsets to it.
#[derive(Component, Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct MapPosition {
    pub x: f32,
    pub y: f32,
}

impl MapPosition {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, offset: SpawnOffset) -> Self {
        Self {
            x: self.x + offset.x,
            y: self.y + offset.y,
        }
    }
}
