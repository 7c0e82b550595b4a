//! Pie-chart geometry for a roulette's effect table.
//!
//! Each partition entry becomes an angular span whose size is its share of
//! `max_value` mapped onto 360 degrees, laid out clockwise from 0. The pointer
//! turns the other way, so a segment's rotation offset and the pointer angle
//! are both negative.
//!
//! The [`PieChart`] component keeps the spans in a fixed-capacity arena of
//! [`MAX_SEGMENTS`] slots indexed by partition position. It is rebuilt only
//! when the table or `max_value` changes.

use std::sync::Arc;

use arrayvec::ArrayVec;
use bevy_ecs::prelude::Component;
use log::{debug, warn};
use serde::Serialize;

use crate::components::roulette::Roulette;
use crate::resources::effecttable::EffectTable;

/// Slots in the segment arena.
pub const MAX_SEGMENTS: usize = 32;

/// Angular layout of one partition entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SegmentSpan {
    pub start_angle: f32,
    pub end_angle: f32,
    /// Rotation applied to the filled sector so it starts at `start_angle`.
    pub rotation: f32,
    /// Share of the full circle, in `[0, 1]` when `max_value` covers the table.
    pub fill_ratio: f32,
    pub color_key: &'static str,
}

impl SegmentSpan {
    pub fn sweep(&self) -> f32 {
        self.end_angle - self.start_angle
    }
}

/// Wrap any angle into `[0, 360)`.
pub fn normalize_angle(angle: f32) -> f32 {
    if !angle.is_finite() {
        return 0.0;
    }
    let wrapped = angle.rem_euclid(360.0);
    // Tiny negative inputs round up to exactly 360.
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Lay out the spans of `table` against `max_value`.
///
/// A non-positive `max_value` yields zero-width spans.
pub fn compute_spans(table: &EffectTable, max_value: f32) -> Vec<SegmentSpan> {
    let mut cumulative = 0.0_f32;
    table
        .entries()
        .map(|(entry, definition)| {
            let fill_ratio = if max_value > 0.0 {
                entry.len() as f32 / max_value
            } else {
                0.0
            };
            let sweep = fill_ratio * 360.0;
            let span = SegmentSpan {
                start_angle: cumulative,
                end_angle: cumulative + sweep,
                rotation: -cumulative,
                fill_ratio,
                color_key: definition.effect_type.color_key(),
            };
            cumulative += sweep;
            span
        })
        .collect()
}

/// Pointer rotation for a value: `-(current / max) * 360`.
pub fn pointer_angle(current_value: f32, max_value: f32) -> f32 {
    if max_value > 0.0 {
        -(current_value / max_value) * 360.0
    } else {
        0.0
    }
}

/// Does either endpoint of `segment` fall inside `range`?
///
/// All angles are normalized first. A range whose start is past its end wraps
/// through 0. Only the endpoints are tested, so a segment that fully contains
/// a narrow range is reported invisible.
pub fn is_segment_visible(segment: (f32, f32), range: (f32, f32)) -> bool {
    let seg_start = normalize_angle(segment.0);
    let seg_end = normalize_angle(segment.1);
    let range_start = normalize_angle(range.0);
    let range_end = normalize_angle(range.1);

    let inside = |angle: f32| {
        if range_start <= range_end {
            range_start <= angle && angle <= range_end
        } else {
            angle >= range_start || angle <= range_end
        }
    };
    inside(seg_start) || inside(seg_end)
}

/// One renderable segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SegmentSlot {
    pub span: SegmentSpan,
    pub visible: bool,
}

/// Segment arena of a roulette's pie chart.
#[derive(Component, Debug, Clone, Default)]
pub struct PieChart {
    slots: ArrayVec<SegmentSlot, MAX_SEGMENTS>,
    source: Option<(Arc<EffectTable>, f32)>,
    visible_range: Option<(f32, f32)>,
}

impl PieChart {
    pub fn for_roulette(roulette: &Roulette) -> Self {
        let mut chart = Self::default();
        chart.rebuild(roulette.table(), roulette.max_value);
        chart
    }

    pub fn slots(&self) -> &[SegmentSlot] {
        &self.slots
    }

    pub fn visible_range(&self) -> Option<(f32, f32)> {
        self.visible_range
    }

    pub fn visibility(&self) -> impl Iterator<Item = bool> + '_ {
        self.slots.iter().map(|slot| slot.visible)
    }

    /// True when the slots were built from another table or `max_value`.
    pub fn is_stale(&self, table: &Arc<EffectTable>, max_value: f32) -> bool {
        match &self.source {
            Some((built_from, built_max)) => {
                !Arc::ptr_eq(built_from, table) || *built_max != max_value
            }
            None => true,
        }
    }

    /// Refill the arena from `table`. Entries past [`MAX_SEGMENTS`] are
    /// dropped with a warning.
    pub fn rebuild(&mut self, table: &Arc<EffectTable>, max_value: f32) {
        let spans = compute_spans(table, max_value);
        if spans.len() > MAX_SEGMENTS {
            warn!(
                "pie chart holds {} segments, dropping {}",
                MAX_SEGMENTS,
                spans.len() - MAX_SEGMENTS
            );
        }
        self.slots.clear();
        self.slots.extend(spans.into_iter().take(MAX_SEGMENTS).map(|span| SegmentSlot {
            span,
            visible: true,
        }));
        self.source = Some((Arc::clone(table), max_value));
        self.apply_visibility();
        debug!("pie chart rebuilt with {} segments", self.slots.len());
    }

    /// Set or clear the visible window and refresh every slot's flag.
    pub fn set_visible_range(&mut self, range: Option<(f32, f32)>) {
        self.visible_range = range;
        self.apply_visibility();
    }

    fn apply_visibility(&mut self) {
        let range = self.visible_range;
        for slot in self.slots.iter_mut() {
            slot.visible = match range {
                Some(range) => {
                    is_segment_visible((slot.span.start_angle, slot.span.end_angle), range)
                }
                None => true,
            };
        }
    }
}
