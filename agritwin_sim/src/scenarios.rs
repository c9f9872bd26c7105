//! Deterministic scenarios exercised by the harness.

use thiserror::Error;

/// Scenario identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioId {
    /// Uninterrupted sweep of the default field to 100% completion
    FullSweep,

    /// Field large enough that the battery forces a mid-mission
    /// return and recharge
    LowBattery,

    /// Complete a mission, reset, and run a second generation
    ResetCycle,
}

impl ScenarioId {
    /// Returns a list of all scenarios.
    pub fn all() -> Vec<ScenarioId> {
        vec![
            ScenarioId::FullSweep,
            ScenarioId::LowBattery,
            ScenarioId::ResetCycle,
        ]
    }

    /// Returns the scenario name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioId::FullSweep => "full_sweep",
            ScenarioId::LowBattery => "low_battery",
            ScenarioId::ResetCycle => "reset_cycle",
        }
    }

    /// Returns a description of the scenario.
    pub fn description(&self) -> &'static str {
        match self {
            ScenarioId::FullSweep => "Sweep the default 100x100 field, verify full coverage",
            ScenarioId::LowBattery => "200x200 field, verify forced return and recharge",
            ScenarioId::ResetCycle => "Complete, reset, verify a clean second generation",
        }
    }
}

impl std::fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// An unrecognized scenario name on the command line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown scenario: {0}")]
pub struct ParseScenarioError(String);

impl std::str::FromStr for ScenarioId {
    type Err = ParseScenarioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "full_sweep" | "fullsweep" => Ok(ScenarioId::FullSweep),
            "low_battery" | "lowbattery" => Ok(ScenarioId::LowBattery),
            "reset_cycle" | "resetcycle" => Ok(ScenarioId::ResetCycle),
            _ => Err(ParseScenarioError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_names_parse_back() {
        for scenario in ScenarioId::all() {
            assert_eq!(scenario.name().parse::<ScenarioId>(), Ok(scenario));
        }
    }

    #[test]
    fn test_unknown_name_is_rejected() {
        assert!("orbital_mechanics".parse::<ScenarioId>().is_err());
    }
}
