//! Gear roulette library.
//!
//! A stopwatch roulette minigame engine: a value climbs while the roulette
//! runs, a press stops it, and the stop value picks a weighted effect segment
//! (attack, heal, or summon). Summons chain by spawning new roulettes.
//!
//! This module exposes the ECS components, resources, systems, and events for
//! use in integration tests and by front ends, plus the [`game::Game`]
//! driver that ties them together.

pub mod components;
pub mod events;
pub mod game;
pub mod presentation;
pub mod resources;
pub mod systems;
