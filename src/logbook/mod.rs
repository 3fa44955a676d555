pub mod adif;
pub mod types;

pub use adif::{parse_adif, AdifRecord};
pub use types::{Contact, ContactId, TxPower};

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Fields naming the park the operator transmitted from, in precedence order.
/// The worked station's park is only used when none of these are present.
const MY_LOCATION_FIELDS: [&str; 2] = ["my_sig_info", "my_pota_ref"];
const THEIR_LOCATION_FIELDS: [&str; 2] = ["sig_info", "pota_ref"];

/// Contacts imported from one log file
#[derive(Debug, Clone)]
pub struct Logbook {
    pub operator: String,
    pub station_callsign: Option<String>,
    pub contacts: Vec<Contact>,
}

/// Build a logbook from ADIF text.
///
/// The operator comes from the first record's OPERATOR or STATION_CALLSIGN,
/// falling back to `fallback_operator`. Contact ids are taken from `next_id`,
/// which is advanced so ids stay unique across several files.
pub fn parse_logbook(
    text: &str,
    fallback_operator: &str,
    next_id: &mut ContactId,
) -> Result<Logbook> {
    let records = parse_adif(text)?;
    let Some(first) = records.first() else {
        bail!("No ADIF records found");
    };

    let operator = first
        .get("operator")
        .or_else(|| first.get("station_callsign"))
        .unwrap_or(fallback_operator)
        .to_ascii_uppercase();
    let station_callsign = first
        .get("station_callsign")
        .map(str::to_ascii_uppercase)
        .or_else(|| Some(operator.clone()));

    let contacts = records
        .iter()
        .map(|record| {
            let contact = contact_from_record(record, &operator, *next_id);
            *next_id += 1;
            contact
        })
        .collect();

    Ok(Logbook {
        operator,
        station_callsign,
        contacts,
    })
}

/// Read and parse one ADIF file. The file stem is the fallback operator.
pub fn load_logbook(path: &Path, next_id: &mut ContactId) -> Result<Logbook> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read log file at {}", path.display()))?;
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("UNKNOWN");
    let logbook = parse_logbook(&text, stem, next_id)
        .with_context(|| format!("Failed to import {}", path.display()))?;

    tracing::info!(
        operator = %logbook.operator,
        contacts = logbook.contacts.len(),
        "imported {}",
        path.display()
    );
    Ok(logbook)
}

pub fn load_logbooks(paths: &[PathBuf]) -> Result<Vec<Logbook>> {
    let mut next_id: ContactId = 1;
    paths
        .iter()
        .map(|path| load_logbook(path, &mut next_id))
        .collect()
}

/// Expand glob patterns into a sorted, de-duplicated list of files
pub fn expand_patterns(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for pattern in patterns {
        let matches =
            glob::glob(pattern).with_context(|| format!("Invalid log pattern '{}'", pattern))?;
        for entry in matches {
            let path = entry.with_context(|| format!("Failed to read match for '{}'", pattern))?;
            if path.is_file() {
                paths.push(path);
            }
        }
    }
    paths.sort();
    paths.dedup();
    Ok(paths)
}

/// Merge logbooks into one contact list per operator
pub fn group_by_operator(logbooks: Vec<Logbook>) -> BTreeMap<String, Vec<Contact>> {
    let mut grouped: BTreeMap<String, Vec<Contact>> = BTreeMap::new();
    for logbook in logbooks {
        grouped
            .entry(logbook.operator)
            .or_default()
            .extend(logbook.contacts);
    }
    grouped
}

fn contact_from_record(record: &AdifRecord, operator: &str, id: ContactId) -> Contact {
    Contact {
        id,
        operator: operator.to_string(),
        call: record.get("call").map(str::to_ascii_uppercase),
        mode: record.get("mode").unwrap_or_default().to_string(),
        tx_power: record.get("tx_pwr").map(|p| TxPower::Raw(p.to_string())),
        timestamp: parse_timestamp(record.get("qso_date"), record.get("time_on")),
        locations: resolve_locations(record),
    }
}

/// QSO_DATE is YYYYMMDD
fn parse_timestamp(date: Option<&str>, time: Option<&str>) -> Option<NaiveDateTime> {
    let date = NaiveDate::parse_from_str(date?, "%Y%m%d").ok()?;
    Some(date.and_time(parse_time_on(time?)?))
}

/// TIME_ON is HHMMSS, or HHMM with anything past the minutes ignored. A
/// single-digit hour ("930") is accepted.
fn parse_time_on(time: &str) -> Option<NaiveTime> {
    let digits: String = time.chars().filter(|c| !c.is_whitespace()).collect();
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if digits.len() == 6 {
        return NaiveTime::parse_from_str(&digits, "%H%M%S").ok();
    }

    let hhmm = digits.get(..4).unwrap_or(&digits);
    let (hour, minute) = match hhmm.len() {
        3 => hhmm.split_at(1),
        4 => hhmm.split_at(2),
        _ => return None,
    };
    NaiveTime::from_hms_opt(hour.parse().ok()?, minute.parse().ok()?, 0)
}

fn resolve_locations(record: &AdifRecord) -> Vec<String> {
    MY_LOCATION_FIELDS
        .iter()
        .chain(THEIR_LOCATION_FIELDS.iter())
        .find_map(|field| record.get(field))
        .map(|refs| {
            refs.split(',')
                .map(|r| r.trim().to_ascii_uppercase())
                .filter(|r| !r.is_empty())
                .collect()
        })
        .unwrap_or_default()
}
