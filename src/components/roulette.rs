//! Stopwatch roulette engine.
//!
//! A [`Roulette`] accumulates a value at `speed` units per second while it is
//! running. Stopping it rounds the value, looks it up in the shared
//! [`EffectTable`], and applies the matching effect. Reaching `max_value`
//! before a stop is a miss.
//!
//! # States
//!
//! ```text
//! Idle --start--> Running --stop--> Stopped --reset--> Idle
//!                    |
//!                    +--overflow--> Miss --reset--> Idle
//! ```
//!
//! Every transition method returns a [`Transition`] describing what happened.
//! Calls made in the wrong state return [`Transition::Ignored`] and leave the
//! roulette untouched, so racy input never panics.
//!
//! # Run modes
//!
//! - [`RunMode::Manual`] – the advance input cycles start, stop and reset.
//! - [`RunMode::TimedLoop`] – the roulette starts itself after
//!   `pre_run_delay`, accepts one advance input per run as the stop, carries
//!   the value up to `max_value` over `catch_up_duration`, then resets and
//!   repeats.
//!
//! A summon result is remembered and only handed out by the following
//! [`Roulette::reset`], so the result stays on screen for a full cycle before
//! the new roulette appears.

use std::sync::Arc;

use bevy_ecs::prelude::Component;
use log::debug;
use serde::Serialize;
use smallvec::SmallVec;
use strum::{Display as StrumDisplay, EnumString};

use crate::components::tween::{Easing, ease, lerp_f32};
use crate::resources::effecttable::{EffectTable, EffectType, TemplateRef};

pub const DEFAULT_PRE_RUN_DELAY: f32 = 0.5;
pub const DEFAULT_CATCH_UP_DURATION: f32 = 1.0;
pub const DEFAULT_SPAWN_OFFSET: SpawnOffset = SpawnOffset { x: 0.0, y: -200.0 };

/// Where the roulette is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum RunState {
    #[default]
    Idle,
    Running,
    Stopped,
    Miss,
}

/// Which driver moves the roulette through its states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, EnumString, StrumDisplay)]
#[strum(ascii_case_insensitive)]
pub enum RunMode {
    #[default]
    #[strum(to_string = "manual")]
    Manual,
    #[strum(to_string = "timed_loop", serialize = "timed", serialize = "loop")]
    TimedLoop,
}

/// Timing constants of the timed-loop mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouletteTiming {
    /// Seconds spent idle before a timed-loop run starts.
    pub pre_run_delay: f32,
    /// Seconds the value takes to travel from the stop point to `max_value`.
    pub catch_up_duration: f32,
    pub catch_up_easing: Easing,
}

impl Default for RouletteTiming {
    fn default() -> Self {
        Self {
            pre_run_delay: DEFAULT_PRE_RUN_DELAY,
            catch_up_duration: DEFAULT_CATCH_UP_DURATION,
            catch_up_easing: Easing::Linear,
        }
    }
}

/// Displacement of a summoned roulette from the one that summoned it.
///
/// Purely presentational; the engine passes it through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct SpawnOffset {
    pub x: f32,
    pub y: f32,
}

/// Externally observed effect of a stop.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Outcome {
    /// Damage dealt, always non-negative.
    Attack(f32),
    Heal(f32),
    Summon,
    NoEffect,
}

/// Result of resolving a stop value against the table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    pub stop_value: i64,
    pub outcome: Outcome,
    /// Partition position of the matched segment.
    pub segment: Option<usize>,
    /// Type of the matched segment, including types without a handler.
    pub effect_type: Option<EffectType>,
}

impl Resolution {
    /// Result line shown while the roulette sits in [`RunState::Stopped`].
    pub fn message(&self) -> String {
        let stop = self.stop_value;
        match (&self.outcome, self.effect_type) {
            (Outcome::Attack(damage), _) => format!("Stopped at {stop} → ATK {damage}"),
            (Outcome::Heal(amount), _) => format!("Stopped at {stop} → Heal {amount}"),
            (Outcome::Summon, _) => format!("Stopped at {stop} → Call new pointer!"),
            (Outcome::NoEffect, Some(effect_type)) => {
                format!("Stopped at {stop} → {effect_type} (not implemented)")
            }
            (Outcome::NoEffect, None) => format!("Stopped at {stop} → No Effect"),
        }
    }
}

/// Request to spawn a new roulette, emitted by the reset that follows a
/// summon result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummonRequest {
    pub speed: f32,
    pub template: Option<TemplateRef>,
    pub offset: SpawnOffset,
}

/// What a transition call or a tick did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Transition {
    Started,
    Stopped(Resolution),
    Missed,
    Reset { summon: Option<SummonRequest> },
    Ignored,
}

/// Transitions caused by a single tick. A timed-loop start can overflow
/// within the same tick, so up to two are produced.
pub type Transitions = SmallVec<[Transition; 2]>;

/// Round half up: ties go toward positive infinity.
pub fn round_half_up(value: f32) -> i64 {
    (f64::from(value) + 0.5).floor() as i64
}

/// The roulette engine attached to an entity.
#[derive(Component, Debug, Clone)]
pub struct Roulette {
    table: Arc<EffectTable>,
    /// Ceiling of the value. Should equal the table's total span.
    pub max_value: f32,
    /// Units per second added while running.
    pub speed: f32,
    pub mode: RunMode,
    pub timing: RouletteTiming,
    pub spawn_offset: SpawnOffset,
    current_value: f32,
    run_state: RunState,
    phase_elapsed: f32,
    catch_up_from: f32,
    /// Partition position of the summon segment awaiting the next reset.
    pending_summon: Option<usize>,
    last_resolution: Option<Resolution>,
}

impl Roulette {
    pub fn new(table: Arc<EffectTable>, max_value: f32, speed: f32) -> Self {
        Self {
            table,
            max_value,
            speed,
            mode: RunMode::Manual,
            timing: RouletteTiming::default(),
            spawn_offset: DEFAULT_SPAWN_OFFSET,
            current_value: 0.0,
            run_state: RunState::Idle,
            phase_elapsed: 0.0,
            catch_up_from: 0.0,
            pending_summon: None,
            last_resolution: None,
        }
    }

    pub fn with_mode(mut self, mode: RunMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_timing(mut self, timing: RouletteTiming) -> Self {
        self.timing = timing;
        self
    }

    pub fn with_spawn_offset(mut self, offset: SpawnOffset) -> Self {
        self.spawn_offset = offset;
        self
    }

    pub fn table(&self) -> &Arc<EffectTable> {
        &self.table
    }

    pub fn current_value(&self) -> f32 {
        self.current_value
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    /// Seconds spent in the current state.
    pub fn phase_elapsed(&self) -> f32 {
        self.phase_elapsed
    }

    pub fn pending_summon(&self) -> bool {
        self.pending_summon.is_some()
    }

    pub fn last_resolution(&self) -> Option<&Resolution> {
        self.last_resolution.as_ref()
    }

    /// True while a timed-loop roulette carries its value up after a run.
    pub fn is_catching_up(&self) -> bool {
        self.mode == RunMode::TimedLoop
            && matches!(self.run_state, RunState::Stopped | RunState::Miss)
    }

    /// Idle -> Running.
    ///
    /// A non-positive or non-finite speed could never reach a stoppable
    /// value, so the roulette stays idle.
    pub fn start(&mut self) -> Transition {
        if self.run_state != RunState::Idle {
            return Transition::Ignored;
        }
        if !(self.speed.is_finite() && self.speed > 0.0) {
            debug!("start ignored: speed {} is not positive", self.speed);
            return Transition::Ignored;
        }
        self.current_value = 0.0;
        self.phase_elapsed = 0.0;
        self.last_resolution = None;
        self.run_state = RunState::Running;
        Transition::Started
    }

    /// Running -> Stopped, resolving the rounded value.
    pub fn stop(&mut self) -> Transition {
        if self.run_state != RunState::Running {
            return Transition::Ignored;
        }
        let resolution = self.resolve_value(round_half_up(self.current_value));
        if resolution.outcome == Outcome::Summon {
            self.pending_summon = resolution.segment;
        }
        self.run_state = RunState::Stopped;
        self.enter_settle_phase();
        self.last_resolution = Some(resolution.clone());
        Transition::Stopped(resolution)
    }

    /// Stopped or Miss -> Idle, handing out a pending summon first.
    pub fn reset(&mut self) -> Transition {
        if !matches!(self.run_state, RunState::Stopped | RunState::Miss) {
            return Transition::Ignored;
        }
        let summon = self
            .pending_summon
            .take()
            .and_then(|segment| self.summon_request(segment));
        self.current_value = 0.0;
        self.phase_elapsed = 0.0;
        self.catch_up_from = 0.0;
        self.run_state = RunState::Idle;
        Transition::Reset { summon }
    }

    /// React to the generic advance input according to the run mode.
    pub fn advance(&mut self) -> Transition {
        match (self.mode, self.run_state) {
            (RunMode::Manual, RunState::Idle) => self.start(),
            (_, RunState::Running) => self.stop(),
            (RunMode::Manual, RunState::Stopped | RunState::Miss) => self.reset(),
            (RunMode::TimedLoop, state) => {
                debug!("advance ignored: timed loop is {state:?}");
                Transition::Ignored
            }
        }
    }

    /// Advance time by `dt` seconds.
    pub fn tick(&mut self, dt: f32) -> Transitions {
        let mut transitions = Transitions::new();
        if !(dt > 0.0) {
            return transitions;
        }
        match (self.mode, self.run_state) {
            (_, RunState::Running) => self.accumulate(dt, &mut transitions),
            (RunMode::TimedLoop, RunState::Idle) => {
                self.phase_elapsed += dt;
                let delay = self.timing.pre_run_delay.max(0.0);
                if self.phase_elapsed >= delay {
                    let leftover = self.phase_elapsed - delay;
                    match self.start() {
                        Transition::Started => {
                            transitions.push(Transition::Started);
                            if leftover > 0.0 {
                                self.accumulate(leftover, &mut transitions);
                            }
                        }
                        _ => self.phase_elapsed = 0.0,
                    }
                }
            }
            (RunMode::TimedLoop, RunState::Stopped | RunState::Miss) => {
                self.phase_elapsed += dt;
                let duration = self.timing.catch_up_duration;
                if duration <= 0.0 || self.phase_elapsed >= duration {
                    transitions.push(self.reset());
                } else {
                    let t = ease(self.timing.catch_up_easing, self.phase_elapsed / duration);
                    self.current_value = lerp_f32(self.catch_up_from, self.max_value, t);
                }
            }
            (RunMode::Manual, _) => {}
        }
        transitions
    }

    /// Resolve a stop value without changing any state.
    pub fn resolve_value(&self, stop_value: i64) -> Resolution {
        let Some(segment) = self.table.resolve_index(stop_value) else {
            return Resolution {
                stop_value,
                outcome: Outcome::NoEffect,
                segment: None,
                effect_type: None,
            };
        };
        let Some(definition) = self.table.definition_at(segment) else {
            return Resolution {
                stop_value,
                outcome: Outcome::NoEffect,
                segment: None,
                effect_type: None,
            };
        };
        let outcome = match definition.effect_type {
            EffectType::Attack => Outcome::Attack(definition.magnitude.abs()),
            EffectType::Heal => Outcome::Heal(definition.magnitude),
            EffectType::Summon => Outcome::Summon,
            _ => Outcome::NoEffect,
        };
        Resolution {
            stop_value,
            outcome,
            segment: Some(segment),
            effect_type: Some(definition.effect_type),
        }
    }

    /// Text the presentation layer shows for the current state.
    pub fn display_text(&self) -> String {
        match self.run_state {
            RunState::Idle => match self.mode {
                RunMode::Manual => "Press Space to Start".to_string(),
                RunMode::TimedLoop => "Get Ready...".to_string(),
            },
            RunState::Running if self.phase_elapsed <= 0.0 => "Start!".to_string(),
            RunState::Running => round_half_up(self.current_value).to_string(),
            RunState::Stopped => self
                .last_resolution
                .as_ref()
                .map(Resolution::message)
                .unwrap_or_default(),
            RunState::Miss => "Miss!".to_string(),
        }
    }

    fn accumulate(&mut self, dt: f32, transitions: &mut Transitions) {
        self.phase_elapsed += dt;
        self.current_value += self.speed * dt;
        if self.current_value >= self.max_value {
            self.current_value = self.max_value;
            self.run_state = RunState::Miss;
            self.last_resolution = None;
            self.enter_settle_phase();
            transitions.push(Transition::Missed);
        }
    }

    fn enter_settle_phase(&mut self) {
        self.phase_elapsed = 0.0;
        self.catch_up_from = self.current_value;
    }

    fn summon_request(&self, segment: usize) -> Option<SummonRequest> {
        let definition = self
            .table
            .definition_at(segment)
            .filter(|definition| definition.effect_type == EffectType::Summon)?;
        Some(SummonRequest {
            speed: definition.summon_speed,
            template: definition.summon_template.clone(),
            offset: self.spawn_offset,
        })
    }
}
