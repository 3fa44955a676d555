use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::validation::{validate_ruleset, RulesetError};

pub const DEFAULT_BASE_SCORE: f64 = 2.0;
pub const DEFAULT_NEW_LOCATION_MULTIPLIER: f64 = 2.0;
pub const DEFAULT_LOW_POWER_MULTIPLIER: f64 = 2.0;
/// Watts; power at or below this earns the low-power bonus
pub const DEFAULT_LOW_POWER_THRESHOLD: f64 = 5.0;
pub const DEFAULT_VALID_MODES: [&str; 7] = ["SSB", "CW", "FT8", "FT4", "RTTY", "PSK31", "FM"];

/// Ruleset configuration as written in the config file.
///
/// Every field is optional; missing fields fall back to the reference ruleset.
///
/// Example YAML:
/// ```yaml
/// ruleset:
///   base_score: 2
///   new_location_multiplier: 2
///   low_power_multiplier: 2
///   low_power_threshold: 5
///   valid_modes: [SSB, CW, FT8]
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RulesetConfig {
    /// Points for a valid contact before multipliers (default: 2)
    #[serde(default)]
    pub base_score: Option<f64>,

    /// Applied to every contact of a park's first activation (default: x2)
    #[serde(default)]
    pub new_location_multiplier: Option<f64>,

    /// Applied when transmit power is at or below the threshold (default: x2)
    #[serde(default)]
    pub low_power_multiplier: Option<f64>,

    /// Low-power threshold in watts (default: 5)
    #[serde(default)]
    pub low_power_threshold: Option<f64>,

    /// Modes that score. Matching ignores case.
    #[serde(default)]
    pub valid_modes: Option<Vec<String>>,
}

/// A validated ruleset. Only obtainable through [`Ruleset::from_config`] or
/// [`Ruleset::default`], so the engine never sees nonsensical parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Ruleset {
    base_score: f64,
    new_location_multiplier: f64,
    low_power_multiplier: f64,
    low_power_threshold: f64,
    valid_modes: BTreeSet<String>,
}

impl Default for Ruleset {
    fn default() -> Self {
        Self {
            base_score: DEFAULT_BASE_SCORE,
            new_location_multiplier: DEFAULT_NEW_LOCATION_MULTIPLIER,
            low_power_multiplier: DEFAULT_LOW_POWER_MULTIPLIER,
            low_power_threshold: DEFAULT_LOW_POWER_THRESHOLD,
            valid_modes: DEFAULT_VALID_MODES.iter().map(|m| m.to_string()).collect(),
        }
    }
}

impl Ruleset {
    pub fn from_config(config: &RulesetConfig) -> Result<Self, RulesetError> {
        validate_ruleset(config).map_err(RulesetError::new)?;

        let defaults = Self::default();
        Ok(Self {
            base_score: config.base_score.unwrap_or(defaults.base_score),
            new_location_multiplier: config
                .new_location_multiplier
                .unwrap_or(defaults.new_location_multiplier),
            low_power_multiplier: config
                .low_power_multiplier
                .unwrap_or(defaults.low_power_multiplier),
            low_power_threshold: config
                .low_power_threshold
                .unwrap_or(defaults.low_power_threshold),
            valid_modes: match &config.valid_modes {
                Some(modes) => modes.iter().map(|m| m.trim().to_ascii_uppercase()).collect(),
                None => defaults.valid_modes,
            },
        })
    }

    pub fn base_score(&self) -> f64 {
        self.base_score
    }

    pub fn new_location_multiplier(&self) -> f64 {
        self.new_location_multiplier
    }

    pub fn low_power_multiplier(&self) -> f64 {
        self.low_power_multiplier
    }

    pub fn low_power_threshold(&self) -> f64 {
        self.low_power_threshold
    }

    pub fn valid_modes(&self) -> &BTreeSet<String> {
        &self.valid_modes
    }

    pub fn is_valid_mode(&self, mode: &str) -> bool {
        self.valid_modes.contains(&mode.trim().to_ascii_uppercase())
    }

    pub fn qualifies_low_power(&self, watts: f64) -> bool {
        watts <= self.low_power_threshold
    }

    /// Highest score a single contact can earn under this ruleset
    pub fn max_contact_score(&self) -> f64 {
        self.base_score * self.new_location_multiplier * self.low_power_multiplier
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ruleset() {
        let ruleset = Ruleset::default();
        assert_eq!(ruleset.base_score(), 2.0);
        assert_eq!(ruleset.new_location_multiplier(), 2.0);
        assert_eq!(ruleset.low_power_multiplier(), 2.0);
        assert_eq!(ruleset.low_power_threshold(), 5.0);
        assert_eq!(ruleset.valid_modes().len(), 7);
        assert_eq!(ruleset.max_contact_score(), 8.0);
    }

    #[test]
    fn test_empty_config_matches_default() {
        let ruleset = Ruleset::from_config(&RulesetConfig::default()).unwrap();
        assert_eq!(ruleset, Ruleset::default());
    }

    #[test]
    fn test_partial_config_overrides() {
        let yaml = r#"
base_score: 3
low_power_threshold: 10
"#;
        let config: RulesetConfig = serde_saphyr::from_str(yaml).unwrap();
        let ruleset = Ruleset::from_config(&config).unwrap();
        assert_eq!(ruleset.base_score(), 3.0);
        assert_eq!(ruleset.low_power_threshold(), 10.0);
        assert_eq!(ruleset.new_location_multiplier(), 2.0);
    }

    #[test]
    fn test_full_config_parse() {
        let yaml = r#"
base_score: 1
new_location_multiplier: 3
low_power_multiplier: 1.5
low_power_threshold: 10
valid_modes: [ssb, " cw "]
"#;
        let config: RulesetConfig = serde_saphyr::from_str(yaml).unwrap();
        let ruleset = Ruleset::from_config(&config).unwrap();
        assert_eq!(ruleset.max_contact_score(), 4.5);
        assert!(ruleset.is_valid_mode("SSB"));
        assert!(ruleset.is_valid_mode("cw"));
        assert!(!ruleset.is_valid_mode("FT8"));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let yaml = "qrp_bonus: 3";
        let result: Result<RulesetConfig, _> = serde_saphyr::from_str(yaml);
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = RulesetConfig {
            low_power_multiplier: Some(-2.0),
            ..Default::default()
        };
        let err = Ruleset::from_config(&config).unwrap_err();
        assert!(err.to_string().contains("ruleset.low_power_multiplier"));
    }

    #[test]
    fn test_from_config_reports_every_error() {
        let config = RulesetConfig {
            base_score: Some(-1.0),
            low_power_threshold: Some(f64::NAN),
            valid_modes: Some(vec![]),
            ..Default::default()
        };
        let err = Ruleset::from_config(&config).unwrap_err();
        assert_eq!(err.errors.len(), 3);
        assert!(err.errors[0].starts_with("ruleset.base_score"));
    }

    #[test]
    fn test_mode_match_ignores_case() {
        let ruleset = Ruleset::default();
        assert!(ruleset.is_valid_mode("ft8"));
        assert!(ruleset.is_valid_mode(" Ssb"));
        assert!(!ruleset.is_valid_mode("UNKNOWN"));
        assert!(!ruleset.is_valid_mode(""));
    }

    #[test]
    fn test_low_power_threshold_inclusive() {
        let ruleset = Ruleset::default();
        assert!(ruleset.qualifies_low_power(5.0));
        assert!(ruleset.qualifies_low_power(0.5));
        assert!(!ruleset.qualifies_low_power(5.01));
    }
}
