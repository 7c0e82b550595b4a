//! Roulette systems.
//!
//! Submodules overview
//! - [`piechart`] – pie-chart layout, pointer rotation, visible range
//! - [`roulette`] – ticking, advance input, teardown, display text
//! - [`session`] – result tally and driver outbox
//! - [`summon`] – summon spawning and summoned roulette lifecycle
//! - [`time`] – update simulation time and delta

pub mod piechart;
pub mod roulette;
pub mod session;
pub mod summon;
pub mod time;
