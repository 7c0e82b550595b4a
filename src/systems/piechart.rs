//! Pie-chart systems.
//!
//! - [`piechart_layout_system`] rebuilds a [`PieChart`] when its roulette's
//!   table or `max_value` changed.
//! - [`pointer_system`] turns the pointer with the roulette value.
//! - [`visible_range_observer`] applies [`VisibleRangeEvent`]s.

use bevy_ecs::prelude::*;
use log::debug;

use crate::components::piechart::{PieChart, pointer_angle};
use crate::components::pointer::Pointer;
use crate::components::roulette::Roulette;
use crate::events::piechart::VisibleRangeEvent;

pub fn piechart_layout_system(mut query: Query<(&Roulette, &mut PieChart)>) {
    for (roulette, mut chart) in query.iter_mut() {
        if chart.is_stale(roulette.table(), roulette.max_value) {
            chart.rebuild(roulette.table(), roulette.max_value);
        }
    }
}

pub fn pointer_system(mut query: Query<(&Roulette, &mut Pointer)>) {
    for (roulette, mut pointer) in query.iter_mut() {
        let degrees = pointer_angle(roulette.current_value(), roulette.max_value);
        if pointer.degrees != degrees {
            pointer.degrees = degrees;
        }
    }
}

pub fn visible_range_observer(trigger: On<VisibleRangeEvent>, mut charts: Query<&mut PieChart>) {
    let event = trigger.event();
    match charts.get_mut(event.entity) {
        Ok(mut chart) => chart.set_visible_range(event.range),
        Err(_) => debug!("visible range for unknown roulette {}", event.entity),
    }
}
