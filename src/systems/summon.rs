//! Summon chaining systems.
//!
//! A summon result is handed out by the reset that follows it as
//! `Transition::Reset { summon: Some(..) }`. [`summon_spawn_system`] turns
//! those into new roulette entities, placed at the origin's position plus the
//! origin's spawn offset. New roulettes are ticked from the next tick on.
//!
//! Requests from roulettes torn down before the tick are dropped.
//!
//! [`summoned_lifecycle_system`] removes summoned roulettes once a reset
//! spawns nothing, when the session asks for it.

use bevy_ecs::prelude::*;
use log::{debug, info};

use crate::components::mapposition::MapPosition;
use crate::components::roulette::Transition;
use crate::components::summoned::Summoned;
use crate::events::roulette::RouletteMessage;
use crate::resources::session::Session;
use crate::resources::templatestore::TemplateStore;
use crate::systems::roulette::roulette_bundle;

/// Spawn the roulettes requested by this tick's resets.
pub fn summon_spawn_system(
    mut reader: MessageReader<RouletteMessage>,
    templates: Res<TemplateStore>,
    positions: Query<&MapPosition>,
    mut commands: Commands,
) {
    for message in reader.read() {
        let Transition::Reset {
            summon: Some(request),
        } = &message.transition
        else {
            continue;
        };
        let Ok(origin) = positions.get(message.entity).copied() else {
            debug!("{}: summon dropped, origin is gone", message.entity);
            continue;
        };
        // Missing templates are logged by the store.
        let Some(roulette) = templates.summon(request) else {
            continue;
        };
        let position = origin.offset(request.offset);
        let entity = commands
            .spawn((
                roulette_bundle(roulette, position),
                Summoned {
                    origin: message.entity,
                },
            ))
            .id();
        info!(
            "{}: summoned {entity} at ({}, {})",
            message.entity, position.x, position.y
        );
    }
}

/// Despawn summoned roulettes after a reset that spawns no further roulette.
pub fn summoned_lifecycle_system(
    session: Res<Session>,
    templates: Res<TemplateStore>,
    mut reader: MessageReader<RouletteMessage>,
    summoned: Query<(), With<Summoned>>,
    mut commands: Commands,
) {
    for message in reader.read() {
        if !session.despawn_summoned_when_done {
            continue;
        }
        let Transition::Reset { summon } = &message.transition else {
            continue;
        };
        let spawns_child = summon
            .as_ref()
            .is_some_and(|request| templates.can_summon(request));
        if !spawns_child && summoned.contains(message.entity) {
            debug!("{}: summoned roulette done", message.entity);
            commands.entity(message.entity).try_despawn();
        }
    }
}
