//! Effect definitions and the weighted partition that maps stop values to them.
//!
//! An [`EffectTable`] is built once from an ordered list of
//! [`EffectDefinition`]s and never changes afterwards. Building walks the list
//! with a cursor starting at `1`, giving each definition the closed range
//! `[cursor, cursor + weight * weight_scale - 1]`. The ranges are contiguous
//! and cover `[1, total_span]` exactly once.
//!
//! Tables are shared between roulettes through an `Arc`; every roulette spawned
//! from the same template reads the same partition.
//!
//! # Example
//!
//! ```
//! use gearroulette::resources::effecttable::{EffectDefinition, EffectTable};
//!
//! let table = EffectTable::build(vec![
//!     EffectDefinition::attack(5, -3.0),
//!     EffectDefinition::heal(3, 2.0),
//!     EffectDefinition::summon(2, 6.0, None),
//! ])
//! .unwrap();
//!
//! assert_eq!(table.total_span(), 10);
//! assert_eq!(table.resolve(7).map(|d| d.weight), Some(3));
//! assert!(table.resolve(11).is_none());
//! ```

use derive_more::{AsRef, Deref, Display, From};
use serde::{Deserialize, Serialize};
use strum::{Display as StrumDisplay, EnumIter, EnumString};
use thiserror::Error;

/// Range length multiplier applied to every weight unless configured otherwise.
pub const DEFAULT_WEIGHT_SCALE: u32 = 1;

/// Kind of effect a segment applies when the pointer stops inside it.
///
/// `Defense` and `Poison` are recognised by the parser but have no handler
/// yet; they resolve to no effect.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    EnumIter,
    StrumDisplay,
)]
#[strum(ascii_case_insensitive)]
pub enum EffectType {
    #[strum(to_string = "Attack", serialize = "atk")]
    Attack,
    #[strum(to_string = "Heal")]
    Heal,
    #[strum(to_string = "Summon", serialize = "call")]
    Summon,
    #[strum(to_string = "Defense")]
    Defense,
    #[strum(to_string = "Poison")]
    Poison,
}

impl EffectType {
    /// Fill colour key used by the pie chart for this effect.
    pub fn color_key(&self) -> &'static str {
        match self {
            EffectType::Attack => "red",
            EffectType::Heal => "green",
            EffectType::Summon => "blue",
            _ => "white",
        }
    }
}

/// Opaque name of a spawnable roulette configuration.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Deref, AsRef,
)]
pub struct TemplateRef(String);

impl From<&str> for TemplateRef {
    fn from(name: &str) -> Self {
        TemplateRef(name.to_string())
    }
}

/// One configured effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectDefinition {
    pub effect_type: EffectType,
    /// Number of slots this effect occupies in the partition.
    pub weight: u32,
    /// Negative is damage for attacks, positive is restoration for heals.
    pub magnitude: f32,
    /// Speed given to the spawned roulette. Summon only.
    pub summon_speed: f32,
    /// Template the spawned roulette is built from. Summon only.
    pub summon_template: Option<TemplateRef>,
}

impl EffectDefinition {
    pub fn new(effect_type: EffectType, weight: u32) -> Self {
        Self {
            effect_type,
            weight,
            magnitude: 0.0,
            summon_speed: 0.0,
            summon_template: None,
        }
    }

    pub fn attack(weight: u32, magnitude: f32) -> Self {
        Self::new(EffectType::Attack, weight).with_magnitude(magnitude)
    }

    pub fn heal(weight: u32, magnitude: f32) -> Self {
        Self::new(EffectType::Heal, weight).with_magnitude(magnitude)
    }

    pub fn summon(weight: u32, summon_speed: f32, template: Option<TemplateRef>) -> Self {
        Self {
            summon_speed,
            summon_template: template,
            ..Self::new(EffectType::Summon, weight)
        }
    }

    pub fn with_magnitude(mut self, magnitude: f32) -> Self {
        self.magnitude = magnitude;
        self
    }
}

/// A closed `[start, end]` range of the partition, pointing at the definition
/// with the same position in the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PartitionEntry {
    pub start: u32,
    pub end: u32,
    pub index: usize,
}

impl PartitionEntry {
    /// Number of integer values covered by this entry.
    pub fn len(&self) -> u32 {
        self.end - self.start + 1
    }

    pub fn contains(&self, value: i64) -> bool {
        value >= i64::from(self.start) && value <= i64::from(self.end)
    }
}

/// Reasons a definition list cannot be partitioned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error("effect #{index} ({effect_type}) has zero weight")]
    ZeroWeight { index: usize, effect_type: EffectType },
    #[error("weight scale must be at least 1")]
    ZeroScale,
    #[error("partition span exceeds {} at effect #{index}", u32::MAX)]
    Overflow { index: usize },
}

/// Immutable effect list plus its cached partition.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EffectTable {
    definitions: Vec<EffectDefinition>,
    partition: Vec<PartitionEntry>,
    weight_scale: u32,
}

impl EffectTable {
    /// Partition `definitions` with the default weight scale.
    pub fn build(definitions: Vec<EffectDefinition>) -> Result<Self, TableError> {
        Self::build_scaled(definitions, DEFAULT_WEIGHT_SCALE)
    }

    /// Partition `definitions`, giving each one `weight * weight_scale` slots.
    pub fn build_scaled(
        definitions: Vec<EffectDefinition>,
        weight_scale: u32,
    ) -> Result<Self, TableError> {
        if weight_scale == 0 {
            return Err(TableError::ZeroScale);
        }

        let mut partition = Vec::with_capacity(definitions.len());
        let mut cursor: u64 = 1;
        for (index, definition) in definitions.iter().enumerate() {
            if definition.weight == 0 {
                return Err(TableError::ZeroWeight {
                    index,
                    effect_type: definition.effect_type,
                });
            }
            let length = u64::from(definition.weight) * u64::from(weight_scale);
            let end = cursor + length - 1;
            if end > u64::from(u32::MAX) {
                return Err(TableError::Overflow { index });
            }
            partition.push(PartitionEntry {
                start: cursor as u32,
                end: end as u32,
                index,
            });
            cursor = end + 1;
        }

        Ok(Self {
            definitions,
            partition,
            weight_scale,
        })
    }

    /// A table without definitions. Every stop resolves to no effect.
    pub fn empty() -> Self {
        Self {
            weight_scale: DEFAULT_WEIGHT_SCALE,
            ..Self::default()
        }
    }

    pub fn definitions(&self) -> &[EffectDefinition] {
        &self.definitions
    }

    pub fn partition(&self) -> &[PartitionEntry] {
        &self.partition
    }

    pub fn weight_scale(&self) -> u32 {
        self.weight_scale
    }

    pub fn len(&self) -> usize {
        self.partition.len()
    }

    pub fn is_empty(&self) -> bool {
        self.partition.is_empty()
    }

    /// Highest value covered by the partition, `0` when empty.
    pub fn total_span(&self) -> u32 {
        self.partition.last().map_or(0, |entry| entry.end)
    }

    /// Definition referenced by the partition entry at `position`.
    pub fn definition_at(&self, position: usize) -> Option<&EffectDefinition> {
        self.partition
            .get(position)
            .and_then(|entry| self.definitions.get(entry.index))
    }

    /// Iterate partition entries together with their definitions.
    pub fn entries(&self) -> impl Iterator<Item = (&PartitionEntry, &EffectDefinition)> {
        self.partition
            .iter()
            .map(|entry| (entry, &self.definitions[entry.index]))
    }

    /// Partition position of the entry containing `stopped_value`.
    ///
    /// Returns `None` for values outside `[1, total_span]`.
    pub fn resolve_index(&self, stopped_value: i64) -> Option<usize> {
        if stopped_value < 1 {
            return None;
        }
        let position = self
            .partition
            .partition_point(|entry| i64::from(entry.end) < stopped_value);
        self.partition
            .get(position)
            .filter(|entry| entry.contains(stopped_value))
            .map(|_| position)
    }

    /// Definition whose range contains `stopped_value`.
    pub fn resolve(&self, stopped_value: i64) -> Option<&EffectDefinition> {
        self.resolve_index(stopped_value)
            .and_then(|position| self.definition_at(position))
    }
}
