use serde::{Deserialize, Serialize};

use crate::scoring::RulesetConfig;

#[derive(Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub ruleset: Option<RulesetConfig>,

    /// Glob patterns for log files scored when none are given on the command line
    #[serde(default)]
    pub logs: Vec<String>,
}
