use bevy_ecs::prelude::*;

/// Set (`Some((start, end))`, degrees) or clear (`None`) the visible window
/// of a roulette's pie chart.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct VisibleRangeEvent {
    pub entity: Entity,
    pub range: Option<(f32, f32)>,
}
