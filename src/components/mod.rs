//! ECS components for roulette entities.
//!
//! Submodules overview:
//! - [`dynamictext`] – status line shown next to a roulette
//! - [`mapposition`] – opaque presentation position
//! - [`piechart`] – segment geometry and the fixed-capacity segment arena
//! - [`pointer`] – rotation of the pointer hand
//! - [`roulette`] – the roulette engine and its state machine
//! - [`summoned`] – marker for roulettes spawned by a summon
//! - [`tween`] – easing curves for the catch-up animation

pub mod dynamictext;
pub mod mapposition;
pub mod piechart;
pub mod pointer;
pub mod roulette;
pub mod summoned;
pub mod tween;
