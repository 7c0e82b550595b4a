//! ECS resources made available to systems.
//!
//! Overview
//! - `effecttable` – effect definitions and their weighted partition
//! - `rouletteconfig` – INI configuration of the session and its templates
//! - `session` – session settings, result tally and message outbox
//! - `templatestore` – roulette templates keyed by name
//! - `worldtime` – simulation time and delta
pub mod effecttable;
pub mod rouletteconfig;
pub mod session;
pub mod templatestore;
pub mod worldtime;
