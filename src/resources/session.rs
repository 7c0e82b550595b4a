//! Session bookkeeping.
//!
//! [`Session`] is scoped to one world: it holds the session-wide settings, a
//! running tally of results, and the outbox of roulette messages the driver
//! drains once per tick.

use bevy_ecs::prelude::Resource;
use serde::Serialize;

use crate::components::roulette::{Outcome, Transition};
use crate::events::roulette::RouletteMessage;

/// Totals over every roulette of the session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SessionTally {
    pub runs_started: u32,
    pub stops: u32,
    pub misses: u32,
    pub attack_total: f32,
    pub heal_total: f32,
    pub summons_requested: u32,
    pub no_effects: u32,
}

impl SessionTally {
    pub fn record(&mut self, transition: &Transition) {
        match transition {
            Transition::Started => self.runs_started += 1,
            Transition::Stopped(resolution) => {
                self.stops += 1;
                match resolution.outcome {
                    Outcome::Attack(damage) => self.attack_total += damage,
                    Outcome::Heal(amount) => self.heal_total += amount,
                    Outcome::Summon => {}
                    Outcome::NoEffect => self.no_effects += 1,
                }
            }
            Transition::Missed => self.misses += 1,
            Transition::Reset { summon: Some(_) } => self.summons_requested += 1,
            Transition::Reset { summon: None } | Transition::Ignored => {}
        }
    }
}

#[derive(Resource, Debug, Default)]
pub struct Session {
    pub despawn_summoned_when_done: bool,
    pub tally: SessionTally,
    outbox: Vec<RouletteMessage>,
}

impl Session {
    pub fn new(despawn_summoned_when_done: bool) -> Self {
        Self {
            despawn_summoned_when_done,
            ..Self::default()
        }
    }

    /// Count `message` and queue it for the driver.
    pub fn record(&mut self, message: RouletteMessage) {
        self.tally.record(&message.transition);
        self.outbox.push(message);
    }

    pub fn drain_outbox(&mut self) -> Vec<RouletteMessage> {
        std::mem::take(&mut self.outbox)
    }
}
