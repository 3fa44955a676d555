use chrono::NaiveDate;

use super::engine::{ContactScore, OperatorSummary};
use super::ledger::Activation;
use crate::logbook::Contact;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExclusionReason {
    MissingTimestamp,
    MissingLocation,
}

/// Progress of one scoring run, in the order it happens
#[derive(Debug)]
pub enum ScoringEvent<'a> {
    Started {
        contacts: usize,
    },
    ContactExcluded {
        contact: &'a Contact,
        reason: ExclusionReason,
    },
    BucketOpened {
        date: NaiveDate,
        location: &'a str,
        activation: Activation,
    },
    ContactScored {
        contact: &'a Contact,
        score: &'a ContactScore,
    },
    InvalidMode {
        contact: &'a Contact,
    },
    BucketClosed {
        date: NaiveDate,
        location: &'a str,
        score: f64,
        scored_contacts: usize,
    },
    Finished {
        summary: &'a OperatorSummary,
    },
}

/// Receives trace events from the engine. The engine itself never logs.
pub trait ScoringObserver {
    fn on_event(&mut self, event: &ScoringEvent<'_>);
}

/// Discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ScoringObserver for NoopObserver {
    fn on_event(&mut self, _event: &ScoringEvent<'_>) {}
}

/// Forwards events to `tracing`, tagged with the operator being scored
#[derive(Debug, Clone)]
pub struct TracingObserver {
    operator: String,
}

impl TracingObserver {
    pub fn new(operator: impl Into<String>) -> Self {
        Self {
            operator: operator.into(),
        }
    }
}

impl ScoringObserver for TracingObserver {
    fn on_event(&mut self, event: &ScoringEvent<'_>) {
        let operator = self.operator.as_str();
        match event {
            ScoringEvent::Started { contacts } => {
                tracing::debug!(operator, contacts, "scoring started");
            }
            ScoringEvent::ContactExcluded { contact, reason } => {
                tracing::debug!(operator, contact = contact.id, ?reason, "contact excluded");
            }
            ScoringEvent::BucketOpened {
                date,
                location,
                activation,
            } => match activation {
                Activation::Starting => {
                    tracing::info!(operator, %date, location, "starting park, no bonus");
                }
                Activation::New => {
                    tracing::info!(operator, %date, location, "new park activation");
                }
                Activation::Repeat { first_seen } => {
                    tracing::debug!(operator, %date, location, %first_seen, "repeat park");
                }
            },
            ScoringEvent::ContactScored { contact, score } => {
                let trail: Vec<&str> = score
                    .breakdown
                    .factors
                    .iter()
                    .map(|f| f.label.as_str())
                    .collect();
                tracing::debug!(
                    operator,
                    contact = contact.id,
                    call = contact.call.as_deref().unwrap_or("?"),
                    mode = %contact.mode,
                    score = score.score,
                    factors = ?trail,
                    "contact scored"
                );
            }
            ScoringEvent::InvalidMode { contact } => {
                tracing::debug!(
                    operator,
                    contact = contact.id,
                    mode = %contact.mode,
                    "invalid mode, zero points"
                );
            }
            ScoringEvent::BucketClosed {
                date,
                location,
                score,
                scored_contacts,
            } => {
                tracing::debug!(operator, %date, location, score, scored_contacts, "park subtotal");
            }
            ScoringEvent::Finished { summary } => {
                tracing::info!(
                    operator,
                    total_score = summary.total_score,
                    contacts = summary.total_contacts,
                    parks = summary.locations.len(),
                    days = summary.days,
                    "scoring finished"
                );
            }
        }
    }
}
