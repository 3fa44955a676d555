use super::config::RulesetConfig;

/// Raised when a ruleset cannot be used for scoring. Carries every problem
/// found, not just the first.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid ruleset: {}", .errors.join("; "))]
pub struct RulesetError {
    pub errors: Vec<String>,
}

impl RulesetError {
    pub fn new(errors: Vec<String>) -> Self {
        Self { errors }
    }
}

/// Validate ruleset configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_ruleset(config: &RulesetConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if let Some(base) = config.base_score {
        if !base.is_finite() || base < 0.0 {
            errors.push("ruleset.base_score: must be a non-negative number".to_string());
        }
    }

    // Multipliers below 1 would make a bonus lower the score
    for (field, value) in [
        ("new_location_multiplier", config.new_location_multiplier),
        ("low_power_multiplier", config.low_power_multiplier),
    ] {
        if let Some(factor) = value {
            if !factor.is_finite() || factor < 1.0 {
                errors.push(format!(
                    "ruleset.{}: must be a number of at least 1, got {}",
                    field, factor
                ));
            }
        }
    }

    if let Some(threshold) = config.low_power_threshold {
        if !threshold.is_finite() || threshold < 0.0 {
            errors.push(format!(
                "ruleset.low_power_threshold: must be a non-negative number of watts, got {}",
                threshold
            ));
        }
    }

    if let Some(ref modes) = config.valid_modes {
        if modes.is_empty() {
            errors.push("ruleset.valid_modes: must list at least one mode".to_string());
        }
        for (i, mode) in modes.iter().enumerate() {
            if mode.trim().is_empty() {
                errors.push(format!("ruleset.valid_modes[{}]: mode must not be blank", i));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
