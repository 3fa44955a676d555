pub mod config;
pub mod engine;
pub mod ledger;
pub mod observer;
pub mod validation;

pub use config::*;
pub use engine::{
    score_contact, score_contacts, score_operator, score_operator_with, ContactScore,
    ContactStatus, DayLocationResult, OperatorSummary, ScoreReport,
};
pub use ledger::{Activation, ActivationLedger};
pub use observer::{NoopObserver, ScoringEvent, ScoringObserver, TracingObserver};
pub use validation::{validate_ruleset, RulesetError};
