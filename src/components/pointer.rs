use bevy_ecs::prelude::Component;

/// Rotation of the pointer hand in degrees, kept in sync with the roulette
/// value by [`pointer_system`](crate::systems::piechart::pointer_system).
#[derive(Component, Clone, Debug, Copy, Default, PartialEq)]
pub struct Pointer {
    pub degrees: f32,
}
