use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::thread;

use crate::logbook::Contact;
use crate::scoring::{score_operator_with, Ruleset, ScoreReport, TracingObserver};

/// One operator's place in the standings
#[derive(Debug, Clone)]
pub struct Standing<'a> {
    pub operator: &'a str,
    pub report: ScoreReport<'a>,
}

/// Score every operator and rank them.
///
/// Operators are split into at most `available_parallelism()` chunks, one
/// scoped thread each. Every operator still gets its own ledger; the runs
/// share nothing but the read-only ruleset. Ranking is by total score
/// descending, then operator callsign ascending for ties.
pub fn score_operators<'a>(
    operators: &'a BTreeMap<String, Vec<Contact>>,
    ruleset: &Ruleset,
) -> Vec<Standing<'a>> {
    let entries: Vec<(&'a String, &'a Vec<Contact>)> = operators.iter().collect();
    let workers = thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1);
    let chunk_size = entries.len().div_ceil(workers).max(1);

    let mut standings: Vec<Standing<'a>> = thread::scope(|scope| {
        let handles: Vec<_> = entries
            .chunks(chunk_size)
            .map(|chunk| scope.spawn(move || score_chunk(chunk, ruleset)))
            .collect();

        handles
            .into_iter()
            .flat_map(|handle| handle.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
            .collect()
    });

    standings.sort_by(|a, b| {
        // Primary: score descending
        let score_cmp = b
            .report
            .summary
            .total_score
            .partial_cmp(&a.report.summary.total_score)
            .unwrap_or(Ordering::Equal);
        if score_cmp != Ordering::Equal {
            return score_cmp;
        }
        a.operator.cmp(b.operator)
    });

    standings
}

fn score_chunk<'a>(
    chunk: &[(&'a String, &'a Vec<Contact>)],
    ruleset: &Ruleset,
) -> Vec<Standing<'a>> {
    chunk
        .iter()
        .map(|&(operator, contacts)| {
            let mut observer = TracingObserver::new(operator.as_str());
            Standing {
                operator: operator.as_str(),
                report: score_operator_with(contacts, ruleset, &mut observer),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn contact(id: u64, operator: &str, day: u32, park: &str) -> Contact {
        Contact {
            id,
            operator: operator.to_string(),
            call: None,
            mode: "CW".to_string(),
            tx_power: None,
            timestamp: NaiveDate::from_ymd_opt(2024, 6, day)
                .unwrap()
                .and_hms_opt(12, 0, 0),
            locations: vec![park.to_string()],
        }
    }

    fn sample_operators() -> BTreeMap<String, Vec<Contact>> {
        let mut operators = BTreeMap::new();
        operators.insert(
            "AA1AA".to_string(),
            vec![contact(1, "AA1AA", 1, "P1")], // 2
        );
        operators.insert(
            "BB2BB".to_string(),
            vec![contact(2, "BB2BB", 1, "P1"), contact(3, "BB2BB", 2, "P2")], // 2 + 4
        );
        operators.insert(
            "CC3CC".to_string(),
            vec![contact(4, "CC3CC", 1, "P5")], // 2
        );
        operators
    }

    #[test]
    fn test_ranked_by_score_then_callsign() {
        let operators = sample_operators();
        let standings = score_operators(&operators, &Ruleset::default());
        let order: Vec<&str> = standings.iter().map(|s| s.operator).collect();
        assert_eq!(order, vec!["BB2BB", "AA1AA", "CC3CC"]);
        assert_eq!(standings[0].report.summary.total_score, 6.0);
    }

    #[test]
    fn test_operators_scored_independently() {
        // Both operators start at P1; neither run sees the other's ledger
        let operators = sample_operators();
        let standings = score_operators(&operators, &Ruleset::default());
        for standing in &standings {
            let first = standing.report.buckets().next().unwrap();
            assert!(!first.is_new_location);
        }
    }

    #[test]
    fn test_matches_sequential_scoring() {
        let operators = sample_operators();
        let ruleset = Ruleset::default();
        let standings = score_operators(&operators, &ruleset);
        for standing in standings {
            let sequential =
                crate::scoring::score_operator(&operators[standing.operator], &ruleset);
            assert_eq!(standing.report.summary, sequential.summary);
        }
    }

    #[test]
    fn test_more_operators_than_workers() {
        let operators: BTreeMap<String, Vec<Contact>> = (0..200u64)
            .map(|n| {
                let call = format!("OP{:03}", n);
                let contacts = vec![contact(n, &call, 1, "P1"), contact(1000 + n, &call, 2, "P2")];
                (call, contacts)
            })
            .collect();
        let standings = score_operators(&operators, &Ruleset::default());
        assert_eq!(standings.len(), 200);
        assert!(standings.iter().all(|s| s.report.summary.total_score == 6.0));
        assert_eq!(standings[0].operator, "OP000");
        assert_eq!(standings[199].operator, "OP199");
    }

    #[test]
    fn test_no_operators() {
        let operators = BTreeMap::new();
        assert!(score_operators(&operators, &Ruleset::default()).is_empty());
    }
}
