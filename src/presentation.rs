//! Outward surface of the roulette session.
//!
//! A renderer either polls [`RouletteView`] snapshots from the
//! [`Game`](crate::game::Game) driver, or implements [`PresentationSink`] and
//! lets [`Game::present`](crate::game::Game::present) push the same data once
//! per tick.

use bevy_ecs::prelude::Entity;
use serde::Serialize;

use crate::components::mapposition::MapPosition;
use crate::components::piechart::SegmentSlot;
use crate::components::roulette::{RunState, SummonRequest};

/// One pie-chart segment as drawn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SegmentView {
    pub start_angle: f32,
    pub end_angle: f32,
    pub rotation: f32,
    pub fill_ratio: f32,
    pub color_key: &'static str,
    pub visible: bool,
}

impl From<&SegmentSlot> for SegmentView {
    fn from(slot: &SegmentSlot) -> Self {
        Self {
            start_angle: slot.span.start_angle,
            end_angle: slot.span.end_angle,
            rotation: slot.span.rotation,
            fill_ratio: slot.span.fill_ratio,
            color_key: slot.span.color_key,
            visible: slot.visible,
        }
    }
}

/// Snapshot of one roulette.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouletteView {
    /// Stable numeric form of `entity`.
    pub id: u64,
    #[serde(skip)]
    pub entity: Entity,
    pub run_state: RunState,
    pub current_value: f32,
    pub max_value: f32,
    pub display_text: String,
    pub pointer_angle: f32,
    pub position: MapPosition,
    pub summoned: bool,
    pub segments: Vec<SegmentView>,
}

impl RouletteView {
    pub fn segment_visibility(&self) -> Vec<bool> {
        self.segments.iter().map(|segment| segment.visible).collect()
    }
}

/// Receiver of presentation updates.
///
/// Only `display_text` and `pointer_angle` are required; a text-only front
/// end can ignore the geometry.
pub trait PresentationSink {
    fn display_text(&mut self, entity: Entity, text: &str);

    fn pointer_angle(&mut self, entity: Entity, degrees: f32);

    fn segments(&mut self, _entity: Entity, _segments: &[SegmentView]) {}

    fn segment_visibility(&mut self, _entity: Entity, _visible: &[bool]) {}

    fn summon_requested(&mut self, _origin: Entity, _request: &SummonRequest) {}

    /// A roulette present in the previous update is gone.
    fn removed(&mut self, _entity: Entity) {}
}
