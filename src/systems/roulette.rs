//! Roulette systems and observers.
//!
//! - [`roulette_tick_system`] advances every roulette by the world delta and
//!   writes the resulting [`RouletteMessage`]s.
//! - [`advance_input_observer`] reacts to [`AdvanceInputEvent`].
//! - [`teardown_observer`] removes roulettes on [`TeardownEvent`].
//! - [`display_text_system`] keeps [`DisplayText`] in sync with the state.
//! - [`update_roulette_messages`] advances the message queue; run it last.

use bevy_ecs::prelude::*;
use log::{debug, info};

use crate::components::dynamictext::DisplayText;
use crate::components::mapposition::MapPosition;
use crate::components::piechart::{PieChart, pointer_angle};
use crate::components::pointer::Pointer;
use crate::components::roulette::{Roulette, Transition};
use crate::events::input::AdvanceInputEvent;
use crate::events::roulette::{RouletteMessage, TeardownEvent};
use crate::resources::worldtime::WorldTime;

/// Everything a live roulette entity carries.
pub fn roulette_bundle(roulette: Roulette, position: MapPosition) -> impl Bundle {
    let text = DisplayText::new(roulette.display_text());
    let pointer = Pointer {
        degrees: pointer_angle(roulette.current_value(), roulette.max_value),
    };
    let chart = PieChart::for_roulette(&roulette);
    (roulette, text, pointer, chart, position)
}

fn log_transition(entity: Entity, transition: &Transition) {
    match transition {
        Transition::Started => debug!("{entity}: started"),
        Transition::Stopped(resolution) => info!("{entity}: {}", resolution.message()),
        Transition::Missed => info!("{entity}: Miss!"),
        Transition::Reset { summon: Some(request) } => info!(
            "{entity}: reset, summoning `{}` at speed {}",
            request
                .template
                .as_ref()
                .map(|t| t.as_str())
                .unwrap_or("<none>"),
            request.speed
        ),
        Transition::Reset { summon: None } => debug!("{entity}: reset"),
        Transition::Ignored => {}
    }
}

/// Advance every roulette by the scaled world delta.
pub fn roulette_tick_system(
    world_time: Res<WorldTime>,
    mut query: Query<(Entity, &mut Roulette)>,
    mut writer: MessageWriter<RouletteMessage>,
) {
    let dt = world_time.delta;
    if dt <= 0.0 {
        return;
    }
    for (entity, mut roulette) in query.iter_mut() {
        for transition in roulette.tick(dt) {
            log_transition(entity, &transition);
            writer.write(RouletteMessage { entity, transition });
        }
    }
}

/// Forward an advance press to its target roulette, or to all of them.
///
/// Display text is refreshed right away so the press is visible before the
/// next tick.
pub fn advance_input_observer(
    trigger: On<AdvanceInputEvent>,
    mut query: Query<(Entity, &mut Roulette, &mut DisplayText)>,
    mut writer: MessageWriter<RouletteMessage>,
) {
    let mut apply = |entity: Entity, roulette: &mut Roulette, text: &mut DisplayText| {
        let transition = roulette.advance();
        if transition == Transition::Ignored {
            debug!("{entity}: advance ignored in {:?}", roulette.run_state());
            return;
        }
        log_transition(entity, &transition);
        text.set_content(&roulette.display_text());
        writer.write(RouletteMessage { entity, transition });
    };

    match trigger.event().target {
        Some(target) => match query.get_mut(target) {
            Ok((entity, mut roulette, mut text)) => apply(entity, &mut *roulette, &mut *text),
            Err(_) => debug!("advance input for unknown roulette {target}"),
        },
        None => {
            for (entity, mut roulette, mut text) in query.iter_mut() {
                apply(entity, &mut *roulette, &mut *text);
            }
        }
    }
}

/// Despawn one roulette, or every roulette when no entity is given.
pub fn teardown_observer(
    trigger: On<TeardownEvent>,
    query: Query<Entity, With<Roulette>>,
    mut commands: Commands,
) {
    match trigger.event().entity {
        Some(entity) if query.contains(entity) => {
            info!("{entity}: torn down");
            commands.entity(entity).try_despawn();
        }
        Some(entity) => debug!("teardown for unknown roulette {entity}"),
        None => {
            let mut count = 0;
            for entity in query.iter() {
                commands.entity(entity).try_despawn();
                count += 1;
            }
            info!("tore down {count} roulette(s)");
        }
    }
}

/// Copy each roulette's display text into its [`DisplayText`].
pub fn display_text_system(mut query: Query<(&Roulette, &mut DisplayText)>) {
    for (roulette, mut text) in query.iter_mut() {
        let content = roulette.display_text();
        if text.content != content {
            text.set_content(&content);
        }
    }
}

/// Advance the ECS message queue for [`RouletteMessage`].
///
/// `update()` must run once per tick; schedule it after every reader.
pub fn update_roulette_messages(mut messages: ResMut<Messages<RouletteMessage>>) {
    messages.update();
}
