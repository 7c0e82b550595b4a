//! Session driver.
//!
//! [`Game`] owns the ECS world and the per-tick schedule. It is the only thing
//! a front end talks to: it feeds ticks, advance presses, teardown requests
//! and visible ranges in, and hands [`RouletteMessage`]s and
//! [`RouletteView`]s out.
//!
//! # Tick order
//!
//! 1. [`update_world_time`] applies the delta.
//! 2. [`roulette_tick_system`] advances every roulette.
//! 3. Summon spawning, summoned lifecycle and session tally read the messages.
//! 4. Display text, pointer and pie-chart layout follow the new state.
//! 5. [`update_roulette_messages`] advances the message queue.
//!
//! Advance input, teardown and visible-range changes are observers, delivered
//! synchronously between ticks.

use bevy_ecs::message::Messages;
use bevy_ecs::observer::Observer;
use bevy_ecs::prelude::*;
use log::info;
use rustc_hash::FxHashSet;

use crate::components::dynamictext::DisplayText;
use crate::components::mapposition::MapPosition;
use crate::components::piechart::PieChart;
use crate::components::pointer::Pointer;
use crate::components::roulette::{Roulette, Transition};
use crate::components::summoned::Summoned;
use crate::events::input::AdvanceInputEvent;
use crate::events::piechart::VisibleRangeEvent;
use crate::events::roulette::{RouletteMessage, TeardownEvent};
use crate::presentation::{PresentationSink, RouletteView, SegmentView};
use crate::resources::rouletteconfig::{ConfigError, RouletteConfig};
use crate::resources::session::Session;
use crate::resources::templatestore::TemplateStore;
use crate::resources::worldtime::WorldTime;
use crate::systems::piechart::{piechart_layout_system, pointer_system, visible_range_observer};
use crate::systems::roulette::{
    advance_input_observer, display_text_system, roulette_bundle, roulette_tick_system,
    teardown_observer, update_roulette_messages,
};
use crate::systems::session::session_tally_system;
use crate::systems::summon::{summon_spawn_system, summoned_lifecycle_system};
use crate::systems::time::update_world_time;

pub struct Game {
    world: World,
    schedule: Schedule,
    root: Entity,
    presented: FxHashSet<Entity>,
}

impl Game {
    /// Build the world from `config` and spawn the root roulette at the
    /// origin.
    pub fn new(config: &RouletteConfig) -> Result<Self, ConfigError> {
        let templates = TemplateStore::from_config(config)?;
        let root_template = templates
            .get(&config.session.root)
            .cloned()
            .ok_or_else(|| ConfigError::MissingRoot(config.session.root.clone()))?;

        let mut world = World::new();
        world.insert_resource(WorldTime::default());
        world.insert_resource(Session::new(config.session.despawn_summoned_when_done));
        world.insert_resource(config.clone());
        world.insert_resource(templates);
        world.insert_resource(Messages::<RouletteMessage>::default());

        world.spawn(Observer::new(advance_input_observer));
        world.spawn(Observer::new(teardown_observer));
        world.spawn(Observer::new(visible_range_observer));
        // Observers must be registered before anything triggers.
        world.flush();

        let mut schedule = Schedule::default();
        schedule.add_systems(roulette_tick_system);
        schedule.add_systems(
            (
                summon_spawn_system,
                summoned_lifecycle_system,
                session_tally_system,
            )
                .after(roulette_tick_system),
        );
        schedule.add_systems(
            (display_text_system, pointer_system, piechart_layout_system)
                .after(roulette_tick_system),
        );
        schedule.add_systems(
            update_roulette_messages
                .after(summon_spawn_system)
                .after(summoned_lifecycle_system)
                .after(session_tally_system),
        );

        let root = world
            .spawn(roulette_bundle(
                root_template.instantiate(None),
                MapPosition::default(),
            ))
            .id();
        info!("Session started with root roulette `{}` as {root}", root_template.name);

        Ok(Self {
            world,
            schedule,
            root,
            presented: FxHashSet::default(),
        })
    }

    /// The roulette spawned by [`Game::new`]. It may have been torn down.
    pub fn root(&self) -> Entity {
        self.root
    }

    /// Spawn an idle roulette from a named template.
    pub fn spawn(&mut self, template: &str, position: MapPosition) -> Option<Entity> {
        let roulette = self
            .world
            .resource::<TemplateStore>()
            .get(template)?
            .instantiate(None);
        Some(self.world.spawn(roulette_bundle(roulette, position)).id())
    }

    /// Run one tick of `dt` seconds and return the messages it produced,
    /// including those caused by input since the previous tick.
    pub fn tick(&mut self, dt: f32) -> Vec<RouletteMessage> {
        update_world_time(&mut self.world, dt);
        self.schedule.run(&mut self.world);
        self.world.clear_trackers();
        self.world.resource_mut::<Session>().drain_outbox()
    }

    /// Press the advance input for one roulette, or for all of them.
    pub fn advance_input(&mut self, target: Option<Entity>) {
        self.world.trigger(AdvanceInputEvent { target });
        self.world.flush();
    }

    /// Remove one roulette, or all of them.
    pub fn teardown(&mut self, entity: Option<Entity>) {
        self.world.trigger(TeardownEvent { entity });
        self.world.flush();
    }

    pub fn set_visible_range(&mut self, entity: Entity, range: Option<(f32, f32)>) {
        self.world.trigger(VisibleRangeEvent { entity, range });
        self.world.flush();
    }

    /// Live roulettes ordered by entity index, which is spawn order until
    /// despawned indices are reused.
    pub fn roulettes(&mut self) -> Vec<Entity> {
        let mut entities: Vec<Entity> = self
            .world
            .query_filtered::<Entity, With<Roulette>>()
            .iter(&self.world)
            .collect();
        entities.sort_by_key(|entity| entity.index());
        entities
    }

    pub fn roulette(&self, entity: Entity) -> Option<&Roulette> {
        self.world.get::<Roulette>(entity)
    }

    pub fn view(&self, entity: Entity) -> Option<RouletteView> {
        let roulette = self.world.get::<Roulette>(entity)?;
        let display_text = self
            .world
            .get::<DisplayText>(entity)
            .map(|text| text.content.clone())
            .unwrap_or_else(|| roulette.display_text());
        let pointer_angle = self
            .world
            .get::<Pointer>(entity)
            .map(|pointer| pointer.degrees)
            .unwrap_or_default();
        let segments: Vec<SegmentView> = self
            .world
            .get::<PieChart>(entity)
            .map(|chart| chart.slots().iter().map(SegmentView::from).collect())
            .unwrap_or_default();
        Some(RouletteView {
            id: entity.to_bits(),
            entity,
            run_state: roulette.run_state(),
            current_value: roulette.current_value(),
            max_value: roulette.max_value,
            display_text,
            pointer_angle,
            position: self
                .world
                .get::<MapPosition>(entity)
                .copied()
                .unwrap_or_default(),
            summoned: self.world.get::<Summoned>(entity).is_some(),
            segments,
        })
    }

    pub fn views(&mut self) -> Vec<RouletteView> {
        self.roulettes()
            .into_iter()
            .filter_map(|entity| self.view(entity))
            .collect()
    }

    /// Push the current state and this tick's summon requests to `sink`.
    pub fn present(&mut self, messages: &[RouletteMessage], sink: &mut impl PresentationSink) {
        for message in messages {
            if let Transition::Reset {
                summon: Some(request),
            } = &message.transition
            {
                sink.summon_requested(message.entity, request);
            }
        }

        let views = self.views();
        let live: FxHashSet<Entity> = views.iter().map(|view| view.entity).collect();
        for gone in self.presented.difference(&live) {
            sink.removed(*gone);
        }
        for view in &views {
            sink.display_text(view.entity, &view.display_text);
            sink.pointer_angle(view.entity, view.pointer_angle);
            sink.segments(view.entity, &view.segments);
            sink.segment_visibility(view.entity, &view.segment_visibility());
        }
        self.presented = live;
    }

    pub fn session(&self) -> &Session {
        self.world.resource::<Session>()
    }
}
