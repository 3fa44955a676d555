use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub type ContactId = u64;

/// Transmit power as logged. ADIF carries it as text, JSON exports may carry
/// a plain number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TxPower {
    Watts(f64),
    Raw(String),
}

impl TxPower {
    /// Power in watts, or None unless the value is a finite number
    pub fn watts(&self) -> Option<f64> {
        let watts = match self {
            TxPower::Watts(w) => *w,
            TxPower::Raw(s) => s.trim().parse::<f64>().ok()?,
        };
        watts.is_finite().then_some(watts)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub id: ContactId,
    pub operator: String,
    #[serde(default)]
    pub call: Option<String>,
    pub mode: String,
    #[serde(default)]
    pub tx_power: Option<TxPower>,
    #[serde(default)]
    pub timestamp: Option<NaiveDateTime>,
    #[serde(default)]
    pub locations: Vec<String>, // first entry is the activator's own park
}

impl Contact {
    /// The location this contact was made from, if any was resolved on import
    pub fn location(&self) -> Option<&str> {
        self.locations.first().map(String::as_str)
    }

    pub fn power_watts(&self) -> Option<f64> {
        self.tx_power.as_ref().and_then(TxPower::watts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_contact() -> Contact {
        Contact {
            id: 1,
            operator: "N0CALL".to_string(),
            call: Some("K1ABC".to_string()),
            mode: "SSB".to_string(),
            tx_power: None,
            timestamp: NaiveDate::from_ymd_opt(2024, 6, 1)
                .unwrap()
                .and_hms_opt(14, 30, 0),
            locations: vec!["US-1234".to_string(), "US-5678".to_string()],
        }
    }

    #[test]
    fn test_power_numeric() {
        assert_eq!(TxPower::Watts(5.0).watts(), Some(5.0));
    }

    #[test]
    fn test_power_numeric_string() {
        assert_eq!(TxPower::Raw(" 4.5 ".to_string()).watts(), Some(4.5));
    }

    #[test]
    fn test_power_unparseable() {
        assert_eq!(TxPower::Raw("QRP".to_string()).watts(), None);
        assert_eq!(TxPower::Raw(String::new()).watts(), None);
    }

    #[test]
    fn test_power_not_finite() {
        assert_eq!(TxPower::Raw("NaN".to_string()).watts(), None);
        assert_eq!(TxPower::Watts(f64::INFINITY).watts(), None);
    }

    #[test]
    fn test_power_negative() {
        assert_eq!(TxPower::Raw("-1".to_string()).watts(), Some(-1.0));
        assert_eq!(TxPower::Watts(0.0).watts(), Some(0.0));
    }

    #[test]
    fn test_first_location_wins() {
        let contact = sample_contact();
        assert_eq!(contact.location(), Some("US-1234"));
    }

    #[test]
    fn test_no_location() {
        let mut contact = sample_contact();
        contact.locations.clear();
        assert_eq!(contact.location(), None);
    }

    #[test]
    fn test_contact_json_power_forms() {
        let json = r#"{"id":7,"operator":"N0CALL","mode":"CW","tx_power":5,"timestamp":"2024-06-01T10:00:00","locations":["US-1"]}"#;
        let contact: Contact = serde_json::from_str(json).unwrap();
        assert_eq!(contact.power_watts(), Some(5.0));

        let json = r#"{"id":8,"operator":"N0CALL","mode":"CW","tx_power":"100"}"#;
        let contact: Contact = serde_json::from_str(json).unwrap();
        assert_eq!(contact.power_watts(), Some(100.0));
        assert!(contact.timestamp.is_none());
        assert!(contact.locations.is_empty());
    }
}
