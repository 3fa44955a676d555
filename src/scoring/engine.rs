use chrono::{NaiveDate, NaiveDateTime};
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::config::{Ruleset, RulesetConfig};
use super::ledger::{Activation, ActivationLedger};
use super::observer::{ExclusionReason, NoopObserver, ScoringEvent, ScoringObserver};
use super::validation::RulesetError;
use crate::logbook::{Contact, ContactId};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactorContribution {
    pub label: String,       // e.g. "New park", "QRP"
    pub description: String, // e.g. "x2 first activation", "x2 at 5W"
    pub before: f64,         // Score before this factor
    pub after: f64,          // Score after this factor
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub base_score: f64,
    pub factors: Vec<FactorContribution>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactStatus {
    Scored,
    InvalidMode,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactScore {
    pub score: f64,
    pub status: ContactStatus,
    pub breakdown: ScoreBreakdown,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BucketKey {
    pub date: NaiveDate,
    pub location: String,
}

/// Everything one operator logged from one park on one day
#[derive(Debug, Clone, Serialize)]
pub struct DayLocationResult<'a> {
    pub date: NaiveDate,
    pub location: String,
    pub contacts: Vec<&'a Contact>, // timestamp order, invalid modes included
    pub score: f64,
    pub contact_scores: BTreeMap<ContactId, ContactScore>,
    pub activation: Activation,
    pub is_new_location: bool,
    pub scored_contacts: usize,
}

/// Contacts that did not score, by cause
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Exclusions {
    pub missing_timestamp: usize,
    pub missing_location: usize,
    pub invalid_mode: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperatorSummary {
    pub total_score: f64,
    pub total_contacts: usize,
    pub days: usize,
    pub locations: BTreeSet<String>,
    pub starting_location: Option<String>,
    pub first_activations: BTreeMap<String, NaiveDate>,
    pub exclusions: Exclusions,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreReport<'a> {
    #[serde(serialize_with = "serialize_daily")]
    pub daily: BTreeMap<BucketKey, DayLocationResult<'a>>,
    pub summary: OperatorSummary,
}

impl<'a> ScoreReport<'a> {
    pub fn bucket(&self, date: NaiveDate, location: &str) -> Option<&DayLocationResult<'a>> {
        self.daily.get(&BucketKey {
            date,
            location: location.to_string(),
        })
    }

    /// Buckets ordered by date, then location
    pub fn buckets(&self) -> impl Iterator<Item = &DayLocationResult<'a>> {
        self.daily.values()
    }
}

fn serialize_daily<S: Serializer>(
    daily: &BTreeMap<BucketKey, DayLocationResult<'_>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(daily.values())
}

/// Validate `config` and score the contacts of one operator
pub fn score_contacts<'a>(
    contacts: &'a [Contact],
    config: &RulesetConfig,
) -> Result<ScoreReport<'a>, RulesetError> {
    let ruleset = Ruleset::from_config(config)?;
    Ok(score_operator(contacts, &ruleset))
}

pub fn score_operator<'a>(contacts: &'a [Contact], ruleset: &Ruleset) -> ScoreReport<'a> {
    score_operator_with(contacts, ruleset, &mut NoopObserver)
}

/// Score every contact of one operator in chronological order.
///
/// Contacts without a timestamp or without a location are skipped. The
/// remaining contacts are grouped by (date, location); the first location the
/// operator ever activated is the starting park and earns no bonus, every
/// other location earns the new-park multiplier on the bucket where it is
/// first seen.
pub fn score_operator_with<'a, O>(
    contacts: &'a [Contact],
    ruleset: &Ruleset,
    observer: &mut O,
) -> ScoreReport<'a>
where
    O: ScoringObserver + ?Sized,
{
    observer.on_event(&ScoringEvent::Started {
        contacts: contacts.len(),
    });

    let mut exclusions = Exclusions::default();

    let mut timed: Vec<(NaiveDateTime, &'a Contact)> = Vec::with_capacity(contacts.len());
    for contact in contacts {
        match contact.timestamp {
            Some(ts) => timed.push((ts, contact)),
            None => {
                exclusions.missing_timestamp += 1;
                observer.on_event(&ScoringEvent::ContactExcluded {
                    contact,
                    reason: ExclusionReason::MissingTimestamp,
                });
            }
        }
    }
    // Ties on timestamp fall back to id so input order never matters
    timed.sort_by_key(|(ts, contact)| (*ts, contact.id));

    // Buckets keep the order of their earliest contact: ascending date, and
    // within a date, the park worked first comes first.
    let mut buckets: Vec<(BucketKey, Vec<&'a Contact>)> = Vec::new();
    let mut slots: HashMap<BucketKey, usize> = HashMap::new();
    for (ts, contact) in timed {
        let Some(location) = contact.location() else {
            exclusions.missing_location += 1;
            observer.on_event(&ScoringEvent::ContactExcluded {
                contact,
                reason: ExclusionReason::MissingLocation,
            });
            continue;
        };

        let key = BucketKey {
            date: ts.date(),
            location: location.to_string(),
        };
        let slot = match slots.get(&key) {
            Some(&slot) => slot,
            None => {
                buckets.push((key.clone(), Vec::new()));
                slots.insert(key, buckets.len() - 1);
                buckets.len() - 1
            }
        };
        buckets[slot].1.push(contact);
    }

    let mut ledger = ActivationLedger::new();
    let mut daily = BTreeMap::new();
    let mut active_days = BTreeSet::new();
    let mut total_score = 0.0;
    let mut total_contacts = 0;

    for (key, bucket_contacts) in buckets {
        let activation = ledger.observe(&key.location, key.date);
        observer.on_event(&ScoringEvent::BucketOpened {
            date: key.date,
            location: &key.location,
            activation,
        });

        let mut contact_scores = BTreeMap::new();
        let mut bucket_score = 0.0;
        let mut scored_contacts = 0;

        for &contact in &bucket_contacts {
            let result = score_contact(contact, activation.is_new(), ruleset);
            match result.status {
                ContactStatus::Scored => {
                    scored_contacts += 1;
                    observer.on_event(&ScoringEvent::ContactScored {
                        contact,
                        score: &result,
                    });
                }
                ContactStatus::InvalidMode => {
                    exclusions.invalid_mode += 1;
                    observer.on_event(&ScoringEvent::InvalidMode { contact });
                }
            }
            bucket_score += result.score;
            contact_scores.insert(contact.id, result);
        }

        observer.on_event(&ScoringEvent::BucketClosed {
            date: key.date,
            location: &key.location,
            score: bucket_score,
            scored_contacts,
        });

        total_score += bucket_score;
        total_contacts += scored_contacts;
        active_days.insert(key.date);

        daily.insert(
            key.clone(),
            DayLocationResult {
                date: key.date,
                location: key.location,
                contacts: bucket_contacts,
                score: bucket_score,
                contact_scores,
                activation,
                is_new_location: activation.is_new(),
                scored_contacts,
            },
        );
    }

    let starting_location = ledger.starting_location().map(str::to_string);
    let first_activations = ledger.into_first_seen();
    let summary = OperatorSummary {
        total_score,
        total_contacts,
        days: active_days.len(),
        locations: first_activations.keys().cloned().collect(),
        starting_location,
        first_activations,
        exclusions,
    };
    observer.on_event(&ScoringEvent::Finished { summary: &summary });

    ScoreReport { daily, summary }
}

/// Score a single contact. Multipliers compound: base x new park x QRP.
pub fn score_contact(contact: &Contact, is_new_location: bool, ruleset: &Ruleset) -> ContactScore {
    let base_score = ruleset.base_score();

    if !ruleset.is_valid_mode(&contact.mode) {
        return ContactScore {
            score: 0.0,
            status: ContactStatus::InvalidMode,
            breakdown: ScoreBreakdown {
                base_score,
                factors: vec![FactorContribution {
                    label: "Mode".to_string(),
                    description: format!("'{}' is not a scoring mode", contact.mode),
                    before: base_score,
                    after: 0.0,
                }],
            },
        };
    }

    let mut score = base_score;
    let mut factors = Vec::new();

    if is_new_location {
        let before = score;
        let multiplier = ruleset.new_location_multiplier();
        score *= multiplier;
        factors.push(FactorContribution {
            label: "New park".to_string(),
            description: format!("x{} first activation", multiplier),
            before,
            after: score,
        });
    }

    // Missing or unparseable power simply earns no bonus
    if let Some(watts) = contact.power_watts() {
        if ruleset.qualifies_low_power(watts) {
            let before = score;
            let multiplier = ruleset.low_power_multiplier();
            score *= multiplier;
            factors.push(FactorContribution {
                label: "QRP".to_string(),
                description: format!("x{} at {}W", multiplier, watts),
                before,
                after: score,
            });
        }
    }

    ContactScore {
        score,
        status: ContactStatus::Scored,
        breakdown: ScoreBreakdown {
            base_score,
            factors,
        },
    }
}
