//! Run configuration (spec §6): the CLI/config values an outer
//! collaborator passes in, deserializable so a config file can populate it
//! directly (`serde`/`serde_json`, mirroring the parser's JSON/TOML inputs
//! elsewhere in the stack).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::manager::RateManagerVariant;
use crate::rate::RateContainerVariant;
use crate::solver::SolverVariant;

/// Recognized configuration values (spec §6): `volume: positive real,
/// seed: integer, initial_time: real, final_time: real > initial_time,
/// output_dir: path, solver: naive|manual_dispatch, rates:
/// vector|tree|hybrid, manager: naive|dependency|graph`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    pub volume: f64,
    pub seed: u64,
    pub initial_time: f64,
    pub final_time: f64,
    pub output_dir: Option<PathBuf>,
    pub solver: SolverVariant,
    pub rates: RateContainerVariant,
    pub manager: RateManagerVariant,
    /// Resolves spec §9 Open Question 1: whether `set_chemical_number`
    /// notifies dependent reactions of the overwrite, or only records it
    /// as ignored variation. Both paths are implemented; this selects
    /// which one the façade uses by default.
    pub ignored_variation_visible: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            volume: 1.0,
            seed: 0,
            initial_time: 0.0,
            final_time: 1.0,
            output_dir: None,
            solver: SolverVariant::ManualDispatch,
            rates: RateContainerVariant::Hybrid,
            manager: RateManagerVariant::Dependency,
            ignored_variation_visible: true,
        }
    }
}

impl Config {
    /// Reads a config from JSON, the format the outer parser hands in
    /// (spec §6). `Format` errors surface synchronously, per spec §7.
    pub fn from_json(text: &str) -> crate::error::Result<Self> {
        serde_json::from_str(text).map_err(|e| crate::error::SimError::Format(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_a_valid_run() {
        let c = Config::default();
        assert!(c.volume > 0.0);
        assert!(c.final_time > c.initial_time);
    }

    #[test]
    fn round_trips_through_json() {
        let c = Config::default();
        let text = serde_json::to_string(&c).unwrap();
        let back = Config::from_json(&text).unwrap();
        assert_eq!(back.seed, c.seed);
        assert_eq!(back.rates, c.rates);
    }

    #[test]
    fn malformed_json_is_a_format_error() {
        let err = Config::from_json("{not json").unwrap_err();
        assert!(matches!(err, crate::error::SimError::Format(_)));
    }
}
