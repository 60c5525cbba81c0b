// src/config.rs
//! Runtime settings: defaults, then an optional JSON file (`--config=path`), then
//! `--key=value` flags from the command line.

use lazy_static::lazy_static;
use log::LevelFilter;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::str::FromStr;

use crate::ai::PickerKind;
use crate::error::ConfigError;
use crate::types::RuleKind;

lazy_static! {
    static ref OPTION: Regex = Regex::new(r"^--([a-z][a-z_-]*)(?:=(.*))?$").unwrap();
}

/// Which rule a freshly started server plays under.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StartingRule {
    Fixed(RuleKind),
    /// One of the three special rules, drawn at startup.
    Random,
}

impl StartingRule {
    pub fn resolve(&self, rng: &mut StdRng) -> RuleKind {
        match self {
            StartingRule::Fixed(rule) => *rule,
            StartingRule::Random => RuleKind::SPECIAL.choose(rng).copied().unwrap_or_default(),
        }
    }
}

impl FromStr for StartingRule {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("random") {
            return Ok(StartingRule::Random);
        }
        s.parse::<RuleKind>().map(StartingRule::Fixed).map_err(|_| ())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: LevelFilter,
    pub starting_rule: StartingRule,
    pub ai: PickerKind,
    pub seed: Option<u64>,
    pub shuffle_back_rank: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: "127.0.0.1".to_string(),
            port: 8080,
            log_level: LevelFilter::Info,
            starting_rule: StartingRule::Random,
            ai: PickerKind::Greedy,
            seed: None,
            shuffle_back_rank: false,
        }
    }
}

impl Config {
    /// Builds the config from process arguments (without the program name).
    /// Returns `Ok(None)` when `--help` was requested.
    pub fn from_args<I, S>(args: I) -> Result<Option<Config>, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut overrides = Vec::new();
        let mut config_path = None;
        for arg in args {
            let arg = arg.as_ref();
            if arg == "--help" || arg == "-h" {
                return Ok(None);
            }
            let caps = OPTION.captures(arg).ok_or_else(|| ConfigError::UnknownOption(arg.to_string()))?;
            let key = caps[1].replace('-', "_");
            // A bare flag is shorthand for `=true`.
            let value = caps.get(2).map_or("true", |m| m.as_str()).to_string();
            if key == "config" {
                config_path = Some(value);
            } else {
                overrides.push((key, value));
            }
        }

        let mut config = match config_path {
            Some(path) => Config::from_file(&path)?,
            None => Config::default(),
        };
        for (key, value) in overrides {
            config.apply_option(&key, &value)?;
        }
        Ok(Some(config))
    }

    pub fn from_file(path: &str) -> Result<Config, ConfigError> {
        let text = fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_string(), e))?;
        Config::from_json(&text).map_err(|e| match e {
            ConfigError::Parse(_, source) => ConfigError::Parse(path.to_string(), source),
            other => other,
        })
    }

    /// Applies a JSON object of options on top of the defaults.
    pub fn from_json(text: &str) -> Result<Config, ConfigError> {
        let entries: HashMap<String, Value> =
            serde_json::from_str(text).map_err(|e| ConfigError::Parse("<inline>".to_string(), e))?;
        let mut config = Config::default();
        for (key, value) in entries {
            let value = match value {
                Value::String(s) => s,
                other => other.to_string(),
            };
            config.apply_option(&key, &value)?;
        }
        Ok(config)
    }

    pub fn apply_option(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = || ConfigError::InvalidValue { key: key.to_string(), value: value.to_string() };
        match key {
            "host" => self.host = value.to_string(),
            "port" => self.port = value.parse().map_err(|_| invalid())?,
            "log_level" => self.log_level = value.parse().map_err(|_| invalid())?,
            "starting_rule" => self.starting_rule = value.parse().map_err(|_| invalid())?,
            "ai" => self.ai = value.parse().map_err(|_| invalid())?,
            "seed" => {
                self.seed = if value == "null" { None } else { Some(value.parse().map_err(|_| invalid())?) }
            }
            "shuffle_back_rank" => self.shuffle_back_rank = value.parse().map_err(|_| invalid())?,
            _ => return Err(ConfigError::UnknownOption(key.to_string())),
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The seeded generator when `seed` is set, otherwise one seeded from the OS.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}
