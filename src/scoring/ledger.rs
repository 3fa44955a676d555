use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// How a (date, location) bucket relates to the operator's activation history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    /// First location the operator ever activated; earns no bonus
    Starting,
    /// First activation of a location after the starting one
    New,
    /// Location already activated earlier in the run
    Repeat { first_seen: NaiveDate },
}

impl Activation {
    pub fn is_new(&self) -> bool {
        matches!(self, Activation::New)
    }
}

/// First-seen tracking for one scoring run. Built fresh per call and never
/// shared between operators.
#[derive(Debug, Default)]
pub struct ActivationLedger {
    first_seen: BTreeMap<String, NaiveDate>,
    starting: Option<String>,
}

impl ActivationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a sighting of `location` on `date`. Sightings must arrive in
    /// chronological order.
    pub fn observe(&mut self, location: &str, date: NaiveDate) -> Activation {
        if self.starting.is_none() {
            self.starting = Some(location.to_string());
            self.first_seen.insert(location.to_string(), date);
            return Activation::Starting;
        }

        match self.first_seen.get(location) {
            Some(&first_seen) => Activation::Repeat { first_seen },
            None => {
                self.first_seen.insert(location.to_string(), date);
                Activation::New
            }
        }
    }

    pub fn starting_location(&self) -> Option<&str> {
        self.starting.as_deref()
    }

    pub fn into_first_seen(self) -> BTreeMap<String, NaiveDate> {
        self.first_seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    #[test]
    fn test_first_location_is_starting() {
        let mut ledger = ActivationLedger::new();
        assert_eq!(ledger.observe("US-1", day(1)), Activation::Starting);
        assert_eq!(ledger.starting_location(), Some("US-1"));
        assert_eq!(ledger.into_first_seen()["US-1"], day(1));
    }

    #[test]
    fn test_second_location_is_new() {
        let mut ledger = ActivationLedger::new();
        ledger.observe("US-1", day(1));
        assert_eq!(ledger.observe("US-2", day(2)), Activation::New);
    }

    #[test]
    fn test_repeat_sightings() {
        let mut ledger = ActivationLedger::new();
        ledger.observe("US-1", day(1));
        ledger.observe("US-2", day(2));
        assert_eq!(
            ledger.observe("US-2", day(3)),
            Activation::Repeat { first_seen: day(2) }
        );
        // Starting location never becomes new later
        assert_eq!(
            ledger.observe("US-1", day(4)),
            Activation::Repeat { first_seen: day(1) }
        );
    }

    #[test]
    fn test_exact_match_only() {
        let mut ledger = ActivationLedger::new();
        ledger.observe("US-1", day(1));
        assert_eq!(ledger.observe("us-1", day(1)), Activation::New);
    }

    #[test]
    fn test_into_first_seen() {
        let mut ledger = ActivationLedger::new();
        ledger.observe("US-2", day(1));
        ledger.observe("US-1", day(3));
        ledger.observe("US-2", day(4));
        let first_seen = ledger.into_first_seen();
        assert_eq!(first_seen.len(), 2);
        assert_eq!(first_seen["US-2"], day(1));
        assert_eq!(first_seen["US-1"], day(3));
    }

    #[test]
    fn test_only_new_is_new() {
        assert!(Activation::New.is_new());
        assert!(!Activation::Starting.is_new());
        assert!(!Activation::Repeat { first_seen: day(1) }.is_new());
    }
}
