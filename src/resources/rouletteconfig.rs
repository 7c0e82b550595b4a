//! Roulette configuration resource.
//!
//! Session settings, roulette templates, and effect definitions loaded from an
//! INI file. Every key except `type` has a default, so a minimal file only
//! names its effects.
//!
//! # Configuration File Format
//!
//! ```ini
//! [session]
//! root = main
//! despawn_summoned_when_done = true
//!
//! [roulette.main]
//! max_value = 10
//! speed = 4
//! mode = manual
//! pre_run_delay = 0.5
//! catch_up_duration = 1.0
//! catch_up_easing = linear
//! weight_scale = 1
//! spawn_offset_x = 0
//! spawn_offset_y = -200
//! effects = slash, mend, call
//!
//! [effect.slash]
//! type = attack
//! weight = 5
//! magnitude = -3
//!
//! [effect.call]
//! type = summon
//! weight = 2
//! summon_speed = 6
//! summon_template = minion
//! ```
//!
//! Section names, keys, and template names are case-insensitive. `mode`
//! accepts `manual` or `timed_loop`; `type` accepts `attack`/`atk`, `heal`,
//! `summon`/`call`, `defense`, and `poison`.

use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use log::{info, warn};
use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::components::piechart::MAX_SEGMENTS;
use crate::components::roulette::{
    DEFAULT_CATCH_UP_DURATION, DEFAULT_PRE_RUN_DELAY, DEFAULT_SPAWN_OFFSET, RouletteTiming,
    RunMode, SpawnOffset,
};
use crate::components::tween::Easing;
use crate::resources::effecttable::{
    DEFAULT_WEIGHT_SCALE, EffectDefinition, EffectType, TableError, TemplateRef,
};

pub const DEFAULT_CONFIG_PATH: &str = "./roulette.ini";
const DEFAULT_ROOT: &str = "main";
const DEFAULT_DESPAWN_SUMMONED: bool = true;
const DEFAULT_SPEED: f32 = 3.0;
/// `max_value` used when neither the file nor the table gives one.
const FALLBACK_MAX_VALUE: f32 = 360.0;
const DEFAULT_WEIGHT: u32 = 1;

const SESSION_SECTION: &str = "session";
const ROULETTE_PREFIX: &str = "roulette.";
const EFFECT_PREFIX: &str = "effect.";

/// Errors raised while loading, validating, or saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config file {path:?}: {message}")]
    Load { path: PathBuf, message: String },
    #[error("failed to parse config: {0}")]
    Parse(String),
    #[error("failed to save config file {path:?}: {source}")]
    Save {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("[{section}] {key}: {message}")]
    InvalidValue {
        section: String,
        key: String,
        message: String,
    },
    #[error("[{section}] is missing required key `{key}`")]
    MissingKey { section: String, key: String },
    #[error("roulette `{roulette}` references unknown effect `{effect}`")]
    UnknownEffect { roulette: String, effect: String },
    #[error("root roulette `{0}` is not defined")]
    MissingRoot(String),
    #[error("roulette `{roulette}` has max_value {value}, must be positive")]
    NonPositiveMaxValue { roulette: String, value: f32 },
    #[error("roulette `{roulette}` lists {count} effects, at most {max} fit", max = MAX_SEGMENTS)]
    TooManyEffects { roulette: String, count: usize },
    #[error("roulette `{roulette}`: {source}")]
    Table {
        roulette: String,
        #[source]
        source: TableError,
    },
}

/// `[session]` settings.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Roulette template spawned when the session starts.
    pub root: String,
    /// Remove summoned roulettes after a reset that summons nothing.
    pub despawn_summoned_when_done: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            root: DEFAULT_ROOT.to_string(),
            despawn_summoned_when_done: DEFAULT_DESPAWN_SUMMONED,
        }
    }
}

/// An `[effect.NAME]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedEffect {
    pub name: String,
    pub definition: EffectDefinition,
}

/// A `[roulette.NAME]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct RouletteSection {
    pub name: String,
    /// `None` means "use the partition's total span".
    pub max_value: Option<f32>,
    pub speed: f32,
    pub mode: RunMode,
    pub timing: RouletteTiming,
    pub weight_scale: u32,
    pub spawn_offset: SpawnOffset,
    pub effects: Vec<NamedEffect>,
}

impl RouletteSection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into().to_lowercase(),
            max_value: None,
            speed: DEFAULT_SPEED,
            mode: RunMode::Manual,
            timing: RouletteTiming::default(),
            weight_scale: DEFAULT_WEIGHT_SCALE,
            spawn_offset: DEFAULT_SPAWN_OFFSET,
            effects: Vec::new(),
        }
    }

    /// `max_value` to use for a table covering `total_span`.
    pub fn resolved_max_value(&self, total_span: u32) -> f32 {
        match self.max_value {
            Some(value) => value,
            None if total_span > 0 => total_span as f32,
            None => FALLBACK_MAX_VALUE,
        }
    }

    pub fn definitions(&self) -> Vec<EffectDefinition> {
        self.effects
            .iter()
            .map(|effect| effect.definition.clone())
            .collect()
    }
}

/// Loaded configuration.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct RouletteConfig {
    pub session: SessionConfig,
    /// Sorted by name.
    pub roulettes: Vec<RouletteSection>,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl RouletteConfig {
    /// The configuration used when no file is given: a manual `main`
    /// roulette whose summon segment calls a timed-loop `minion`.
    pub fn builtin() -> Self {
        let slash = NamedEffect {
            name: "slash".to_string(),
            definition: EffectDefinition::attack(5, -3.0),
        };
        let mend = NamedEffect {
            name: "mend".to_string(),
            definition: EffectDefinition::heal(3, 2.0),
        };
        let call = NamedEffect {
            name: "call".to_string(),
            definition: EffectDefinition::summon(2, 6.0, Some(TemplateRef::from("minion"))),
        };

        let mut main = RouletteSection::new("main");
        main.max_value = Some(10.0);
        main.speed = 4.0;
        main.effects = vec![slash.clone(), mend.clone(), call.clone()];

        let mut minion = RouletteSection::new("minion");
        minion.max_value = Some(10.0);
        minion.speed = 6.0;
        minion.mode = RunMode::TimedLoop;
        minion.timing = RouletteTiming {
            pre_run_delay: DEFAULT_PRE_RUN_DELAY,
            catch_up_duration: DEFAULT_CATCH_UP_DURATION,
            catch_up_easing: Easing::QuadOut,
        };
        minion.effects = vec![slash, mend, call];

        Self {
            session: SessionConfig::default(),
            roulettes: vec![main, minion],
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Load and validate the INI file at `path`.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let mut ini = Ini::new();
        ini.load(path).map_err(|message| ConfigError::Load {
            path: path.to_path_buf(),
            message,
        })?;
        let mut config = Self::from_ini(&ini)?;
        config.config_path = path.to_path_buf();
        info!(
            "Loaded config {:?}: root `{}`, {} roulette(s)",
            config.config_path,
            config.session.root,
            config.roulettes.len()
        );
        Ok(config)
    }

    /// Parse and validate INI text.
    pub fn from_ini_str(text: &str) -> Result<Self, ConfigError> {
        let mut ini = Ini::new();
        ini.read(text.to_string()).map_err(ConfigError::Parse)?;
        Self::from_ini(&ini)
    }

    fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let mut session = SessionConfig::default();
        if let Some(root) = ini.get(SESSION_SECTION, "root") {
            session.root = root.trim().to_lowercase();
        }
        if let Some(despawn) = ini
            .getbool(SESSION_SECTION, "despawn_summoned_when_done")
            .map_err(|message| invalid(SESSION_SECTION, "despawn_summoned_when_done", message))?
        {
            session.despawn_summoned_when_done = despawn;
        }

        let mut names: Vec<String> = ini
            .sections()
            .into_iter()
            .filter(|section| section.starts_with(ROULETTE_PREFIX))
            .collect();
        names.sort();

        let roulettes = names
            .iter()
            .map(|section| parse_roulette(ini, section))
            .collect::<Result<Vec<_>, _>>()?;

        let config = Self {
            session,
            roulettes,
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        };
        config.validate()?;
        Ok(config)
    }

    /// Check cross-section constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.roulette(&self.session.root).is_none() {
            return Err(ConfigError::MissingRoot(self.session.root.clone()));
        }
        for roulette in &self.roulettes {
            if roulette.effects.len() > MAX_SEGMENTS {
                return Err(ConfigError::TooManyEffects {
                    roulette: roulette.name.clone(),
                    count: roulette.effects.len(),
                });
            }
            match roulette.max_value {
                Some(value) if !(value > 0.0) => {
                    return Err(ConfigError::NonPositiveMaxValue {
                        roulette: roulette.name.clone(),
                        value,
                    });
                }
                _ => {}
            }
            if !(roulette.speed > 0.0) {
                warn!(
                    "roulette `{}` has speed {}, it will never start",
                    roulette.name, roulette.speed
                );
            }
        }
        Ok(())
    }

    pub fn roulette(&self, name: &str) -> Option<&RouletteSection> {
        let name = name.to_lowercase();
        self.roulettes.iter().find(|section| section.name == name)
    }

    /// Write this configuration to `config_path`.
    ///
    /// Creates the file if it doesn't exist.
    pub fn save_to_file(&self) -> Result<(), ConfigError> {
        let mut ini = Ini::new();

        ini.set(SESSION_SECTION, "root", Some(self.session.root.clone()));
        ini.set(
            SESSION_SECTION,
            "despawn_summoned_when_done",
            Some(self.session.despawn_summoned_when_done.to_string()),
        );

        let mut written = FxHashSet::default();
        for roulette in &self.roulettes {
            let section = format!("{ROULETTE_PREFIX}{}", roulette.name);
            if let Some(max_value) = roulette.max_value {
                ini.set(&section, "max_value", Some(max_value.to_string()));
            }
            ini.set(&section, "speed", Some(roulette.speed.to_string()));
            ini.set(&section, "mode", Some(roulette.mode.to_string()));
            let timing = &roulette.timing;
            ini.set(&section, "pre_run_delay", Some(timing.pre_run_delay.to_string()));
            ini.set(
                &section,
                "catch_up_duration",
                Some(timing.catch_up_duration.to_string()),
            );
            ini.set(
                &section,
                "catch_up_easing",
                Some(timing.catch_up_easing.to_string()),
            );
            ini.set(&section, "weight_scale", Some(roulette.weight_scale.to_string()));
            ini.set(&section, "spawn_offset_x", Some(roulette.spawn_offset.x.to_string()));
            ini.set(&section, "spawn_offset_y", Some(roulette.spawn_offset.y.to_string()));
            let effect_names: Vec<&str> =
                roulette.effects.iter().map(|e| e.name.as_str()).collect();
            ini.set(&section, "effects", Some(effect_names.join(", ")));

            for effect in &roulette.effects {
                if written.insert(effect.name.as_str()) {
                    write_effect(&mut ini, effect);
                }
            }
        }

        ini.write(&self.config_path)
            .map_err(|source| ConfigError::Save {
                path: self.config_path.clone(),
                source,
            })?;

        info!("Saved config to {:?}", self.config_path);

        Ok(())
    }
}

impl Default for RouletteConfig {
    fn default() -> Self {
        Self::builtin()
    }
}

fn write_effect(ini: &mut Ini, effect: &NamedEffect) {
    let section = format!("{EFFECT_PREFIX}{}", effect.name);
    let definition = &effect.definition;
    ini.set(
        &section,
        "type",
        Some(definition.effect_type.to_string().to_lowercase()),
    );
    ini.set(&section, "weight", Some(definition.weight.to_string()));
    ini.set(&section, "magnitude", Some(definition.magnitude.to_string()));
    if definition.effect_type == EffectType::Summon {
        ini.set(
            &section,
            "summon_speed",
            Some(definition.summon_speed.to_string()),
        );
        if let Some(template) = &definition.summon_template {
            ini.set(&section, "summon_template", Some(template.to_string()));
        }
    }
}

fn parse_roulette(ini: &Ini, section: &str) -> Result<RouletteSection, ConfigError> {
    let name = section.trim_start_matches(ROULETTE_PREFIX);
    let mut roulette = RouletteSection::new(name);

    roulette.max_value = float_key(ini, section, "max_value")?;
    if let Some(speed) = float_key(ini, section, "speed")? {
        roulette.speed = speed;
    }
    if let Some(mode) = parsed_key::<RunMode>(ini, section, "mode")? {
        roulette.mode = mode;
    }
    if let Some(delay) = float_key(ini, section, "pre_run_delay")? {
        roulette.timing.pre_run_delay = delay;
    }
    if let Some(duration) = float_key(ini, section, "catch_up_duration")? {
        roulette.timing.catch_up_duration = duration;
    }
    if let Some(easing) = parsed_key::<Easing>(ini, section, "catch_up_easing")? {
        roulette.timing.catch_up_easing = easing;
    }
    if let Some(scale) = uint_key(ini, section, "weight_scale")? {
        roulette.weight_scale = scale;
    }
    if let Some(x) = float_key(ini, section, "spawn_offset_x")? {
        roulette.spawn_offset.x = x;
    }
    if let Some(y) = float_key(ini, section, "spawn_offset_y")? {
        roulette.spawn_offset.y = y;
    }

    let listed = ini.get(section, "effects").unwrap_or_default();
    for effect_name in listed
        .split(',')
        .map(|name| name.trim().to_lowercase())
        .filter(|name| !name.is_empty())
    {
        let effect_section = format!("{EFFECT_PREFIX}{effect_name}");
        if !ini.sections().contains(&effect_section) {
            return Err(ConfigError::UnknownEffect {
                roulette: roulette.name.clone(),
                effect: effect_name,
            });
        }
        let definition = parse_effect(ini, &effect_section)?;
        roulette.effects.push(NamedEffect {
            name: effect_name,
            definition,
        });
    }

    Ok(roulette)
}

fn parse_effect(ini: &Ini, section: &str) -> Result<EffectDefinition, ConfigError> {
    let effect_type =
        parsed_key::<EffectType>(ini, section, "type")?.ok_or_else(|| ConfigError::MissingKey {
            section: section.to_string(),
            key: "type".to_string(),
        })?;
    let weight = uint_key(ini, section, "weight")?.unwrap_or(DEFAULT_WEIGHT);
    let mut definition = EffectDefinition::new(effect_type, weight);
    if let Some(magnitude) = float_key(ini, section, "magnitude")? {
        definition.magnitude = magnitude;
    }
    if let Some(speed) = float_key(ini, section, "summon_speed")? {
        definition.summon_speed = speed;
    }
    definition.summon_template = ini
        .get(section, "summon_template")
        .map(|name| name.trim().to_lowercase())
        .filter(|name| !name.is_empty())
        .map(TemplateRef::from);
    Ok(definition)
}

fn invalid(section: &str, key: &str, message: impl Display) -> ConfigError {
    ConfigError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        message: message.to_string(),
    }
}

fn float_key(ini: &Ini, section: &str, key: &str) -> Result<Option<f32>, ConfigError> {
    ini.getfloat(section, key)
        .map(|value| value.map(|v| v as f32))
        .map_err(|message| invalid(section, key, message))
}

fn uint_key(ini: &Ini, section: &str, key: &str) -> Result<Option<u32>, ConfigError> {
    match ini
        .getuint(section, key)
        .map_err(|message| invalid(section, key, message))?
    {
        Some(value) => u32::try_from(value)
            .map(Some)
            .map_err(|e| invalid(section, key, e)),
        None => Ok(None),
    }
}

fn parsed_key<T>(ini: &Ini, section: &str, key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    ini.get(section, key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| invalid(section, key, format!("`{}`: {e}", raw.trim())))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = "
[roulette.main]
effects = hit

[effect.hit]
type = ATK
weight = 4
";

    #[test]
    fn test_minimal_file_uses_defaults() {
        let config = RouletteConfig::from_ini_str(MINIMAL).unwrap();
        assert_eq!(config.session, SessionConfig::default());
        let main = config.roulette("main").unwrap();
        assert_eq!(main.max_value, None);
        assert_eq!(main.resolved_max_value(4), 4.0);
        assert_eq!(main.speed, DEFAULT_SPEED);
        assert_eq!(main.mode, RunMode::Manual);
        assert_eq!(main.timing, RouletteTiming::default());
        assert_eq!(main.spawn_offset, DEFAULT_SPAWN_OFFSET);
        assert_eq!(main.effects.len(), 1);
        assert_eq!(main.effects[0].definition.effect_type, EffectType::Attack);
        assert_eq!(main.effects[0].definition.weight, 4);
    }

    #[test]
    fn test_full_roulette_section() {
        let text = "
[session]
root = Arena
despawn_summoned_when_done = false

[roulette.arena]
max_value = 30
speed = 12.5
mode = Timed_Loop
pre_run_delay = 0.25
catch_up_duration = 2
catch_up_easing = cubic_out
weight_scale = 3
spawn_offset_x = 40
spawn_offset_y = -120
effects = Bite , call

[effect.bite]
type = attack
weight = 6
magnitude = -4

[effect.call]
type = call
weight = 4
summon_speed = 9
summon_template = Arena
";
        let config = RouletteConfig::from_ini_str(text).unwrap();
        assert_eq!(config.session.root, "arena");
        assert!(!config.session.despawn_summoned_when_done);

        let arena = config.roulette("ARENA").unwrap();
        assert_eq!(arena.max_value, Some(30.0));
        assert_eq!(arena.speed, 12.5);
        assert_eq!(arena.mode, RunMode::TimedLoop);
        assert_eq!(arena.timing.pre_run_delay, 0.25);
        assert_eq!(arena.timing.catch_up_duration, 2.0);
        assert_eq!(arena.timing.catch_up_easing, Easing::CubicOut);
        assert_eq!(arena.weight_scale, 3);
        assert_eq!(arena.spawn_offset, SpawnOffset { x: 40.0, y: -120.0 });

        let names: Vec<_> = arena.effects.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["bite", "call"]);
        let call = &arena.effects[1].definition;
        assert_eq!(call.effect_type, EffectType::Summon);
        assert_eq!(call.summon_speed, 9.0);
        assert_eq!(call.summon_template, Some(TemplateRef::from("arena")));
    }

    #[test]
    fn test_missing_root_is_rejected() {
        let err = RouletteConfig::from_ini_str("[session]\nroot = nowhere\n").unwrap_err();
        assert!(matches!(err, ConfigError::MissingRoot(name) if name == "nowhere"));
    }

    #[test]
    fn test_unknown_effect_is_rejected() {
        let err = RouletteConfig::from_ini_str("[roulette.main]\neffects = ghost\n").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownEffect { effect, .. } if effect == "ghost"));
    }

    #[test]
    fn test_effect_without_type_is_rejected() {
        let text = "[roulette.main]\neffects = x\n\n[effect.x]\nweight = 2\n";
        let err = RouletteConfig::from_ini_str(text).unwrap_err();
        assert!(matches!(err, ConfigError::MissingKey { key, .. } if key == "type"));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let bad_mode = "[roulette.main]\nmode = sometimes\n";
        assert!(matches!(
            RouletteConfig::from_ini_str(bad_mode).unwrap_err(),
            ConfigError::InvalidValue { key, .. } if key == "mode"
        ));

        let bad_speed = "[roulette.main]\nspeed = fast\n";
        assert!(matches!(
            RouletteConfig::from_ini_str(bad_speed).unwrap_err(),
            ConfigError::InvalidValue { key, .. } if key == "speed"
        ));

        let bad_max = "[roulette.main]\nmax_value = 0\n";
        assert!(matches!(
            RouletteConfig::from_ini_str(bad_max).unwrap_err(),
            ConfigError::NonPositiveMaxValue { .. }
        ));
    }

    #[test]
    fn test_too_many_effects_are_rejected() {
        let mut text = String::from("[effect.one]\ntype = heal\n\n[roulette.main]\neffects = ");
        text.push_str(&vec!["one"; MAX_SEGMENTS + 1].join(", "));
        text.push('\n');
        assert!(matches!(
            RouletteConfig::from_ini_str(&text).unwrap_err(),
            ConfigError::TooManyEffects { count, .. } if count == MAX_SEGMENTS + 1
        ));
    }

    #[test]
    fn test_builtin_is_valid() {
        let config = RouletteConfig::builtin();
        config.validate().unwrap();
        assert!(config.roulette("minion").is_some());
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let path = std::env::temp_dir().join(format!(
            "gearroulette-config-{}.ini",
            std::process::id()
        ));
        let mut config = RouletteConfig::builtin();
        config.config_path = path.clone();
        config.save_to_file().unwrap();

        let loaded = RouletteConfig::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, config);
    }
}
