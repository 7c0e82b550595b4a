//! Event and message types exchanged with the roulette systems.
//!
//! Submodules:
//! - [`input`] – the generic advance press
//! - [`piechart`] – visible-window changes for a pie chart
//! - [`roulette`] – per-roulette transition messages and teardown requests
pub mod input;
pub mod piechart;
pub mod roulette;
