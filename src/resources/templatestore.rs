//! Roulette template registry.
//!
//! Every `[roulette.NAME]` section becomes a [`RouletteTemplate`] holding its
//! built [`EffectTable`]. Roulettes spawned from the same template share that
//! table through an `Arc`. Summon results name the template of the roulette
//! they spawn.

use std::sync::Arc;

use bevy_ecs::prelude::Resource;
use log::warn;
use rustc_hash::FxHashMap;

use crate::components::roulette::{Roulette, RouletteTiming, RunMode, SpawnOffset, SummonRequest};
use crate::resources::effecttable::EffectTable;
use crate::resources::rouletteconfig::{ConfigError, RouletteConfig, RouletteSection};

/// Immutable recipe for a roulette.
#[derive(Debug, Clone, PartialEq)]
pub struct RouletteTemplate {
    pub name: Arc<str>,
    pub table: Arc<EffectTable>,
    pub max_value: f32,
    pub speed: f32,
    pub mode: RunMode,
    pub timing: RouletteTiming,
    pub spawn_offset: SpawnOffset,
}

impl RouletteTemplate {
    /// Build the effect table of `section`.
    ///
    /// A `max_value` that disagrees with the table's span is allowed but
    /// logged: stops past the span resolve to no effect, and the pie chart no
    /// longer closes.
    pub fn from_section(section: &RouletteSection) -> Result<Self, ConfigError> {
        let table = EffectTable::build_scaled(section.definitions(), section.weight_scale)
            .map_err(|source| ConfigError::Table {
                roulette: section.name.clone(),
                source,
            })?;
        let max_value = section.resolved_max_value(table.total_span());
        if table.total_span() as f32 != max_value {
            warn!(
                "roulette `{}`: max_value {} differs from partition span {}",
                section.name,
                max_value,
                table.total_span()
            );
        }
        Ok(Self {
            name: Arc::from(section.name.as_str()),
            table: Arc::new(table),
            max_value,
            speed: section.speed,
            mode: section.mode,
            timing: section.timing,
            spawn_offset: section.spawn_offset,
        })
    }

    /// A fresh, idle roulette. `speed` overrides the template's own.
    pub fn instantiate(&self, speed: Option<f32>) -> Roulette {
        Roulette::new(
            Arc::clone(&self.table),
            self.max_value,
            speed.unwrap_or(self.speed),
        )
        .with_mode(self.mode)
        .with_timing(self.timing)
        .with_spawn_offset(self.spawn_offset)
    }
}

/// Central registry of roulette templates keyed by lowercase name.
#[derive(Resource, Debug, Default)]
pub struct TemplateStore {
    pub templates: FxHashMap<String, RouletteTemplate>,
}

impl TemplateStore {
    pub fn from_config(config: &RouletteConfig) -> Result<Self, ConfigError> {
        let mut store = Self::default();
        for section in &config.roulettes {
            store.insert(RouletteTemplate::from_section(section)?);
        }
        Ok(store)
    }

    pub fn insert(&mut self, template: RouletteTemplate) {
        self.templates
            .insert(template.name.to_lowercase(), template);
    }

    pub fn get(&self, name: &str) -> Option<&RouletteTemplate> {
        self.templates.get(&name.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Whether `request` names a known template.
    pub fn can_summon(&self, request: &SummonRequest) -> bool {
        request
            .template
            .as_ref()
            .is_some_and(|name| self.get(name).is_some())
    }

    /// Build the roulette a summon asks for.
    ///
    /// A missing or unknown template is a configuration warning: it is logged
    /// and nothing is spawned.
    pub fn summon(&self, request: &SummonRequest) -> Option<Roulette> {
        let Some(name) = &request.template else {
            warn!("Summon triggered but no summon_template is assigned");
            return None;
        };
        let Some(template) = self.get(name) else {
            warn!("Summon triggered but template `{name}` is not defined");
            return None;
        };
        Some(template.instantiate(Some(request.speed)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::roulette::{DEFAULT_SPAWN_OFFSET, RunState};
    use crate::resources::effecttable::TemplateRef;

    fn store() -> TemplateStore {
        TemplateStore::from_config(&RouletteConfig::builtin()).unwrap()
    }

    #[test]
    fn test_builds_every_section() {
        let store = store();
        assert_eq!(store.len(), 2);
        let main = store.get("Main").unwrap();
        assert_eq!(main.table.total_span(), 10);
        assert_eq!(main.max_value, 10.0);
    }

    #[test]
    fn test_instantiate_is_idle_and_shares_table() {
        let store = store();
        let template = store.get("main").unwrap();
        let a = template.instantiate(None);
        let b = template.instantiate(Some(9.0));
        assert_eq!(a.run_state(), RunState::Idle);
        assert_eq!(a.speed, template.speed);
        assert_eq!(b.speed, 9.0);
        assert!(Arc::ptr_eq(a.table(), b.table()));
    }

    #[test]
    fn test_summon_uses_request_speed() {
        let store = store();
        let request = SummonRequest {
            speed: 7.5,
            template: Some(TemplateRef::from("minion")),
            offset: DEFAULT_SPAWN_OFFSET,
        };
        let roulette = store.summon(&request).unwrap();
        assert_eq!(roulette.speed, 7.5);
        assert_eq!(roulette.mode, RunMode::TimedLoop);
    }

    #[test]
    fn test_summon_without_template_spawns_nothing() {
        let store = store();
        let mut request = SummonRequest {
            speed: 1.0,
            template: None,
            offset: DEFAULT_SPAWN_OFFSET,
        };
        assert!(store.summon(&request).is_none());
        assert!(!store.can_summon(&request));
        request.template = Some(TemplateRef::from("nowhere"));
        assert!(store.summon(&request).is_none());
        assert!(!store.can_summon(&request));
        request.template = Some(TemplateRef::from("Minion"));
        assert!(store.can_summon(&request));
    }

    #[test]
    fn test_max_value_defaults_to_span() {
        let config = RouletteConfig::from_ini_str(
            "[roulette.main]\nweight_scale = 3\neffects = a\n\n[effect.a]\ntype = heal\nweight = 4\n",
        )
        .unwrap();
        let store = TemplateStore::from_config(&config).unwrap();
        let main = store.get("main").unwrap();
        assert_eq!(main.table.total_span(), 12);
        assert_eq!(main.max_value, 12.0);
    }

    #[test]
    fn test_zero_weight_is_a_config_error() {
        let config = RouletteConfig::from_ini_str(
            "[roulette.main]\neffects = a\n\n[effect.a]\ntype = heal\nweight = 0\n",
        )
        .unwrap();
        assert!(matches!(
            TemplateStore::from_config(&config),
            Err(ConfigError::Table { .. })
        ));
    }
}
