use anyhow::{anyhow, bail, Context, Result};
use std::collections::HashMap;

/// One ADIF record. Field names are stored lowercase.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdifRecord {
    fields: HashMap<String, String>,
}

impl AdifRecord {
    pub fn insert(&mut self, name: &str, value: &str) {
        self.fields
            .insert(name.to_ascii_lowercase(), value.to_string());
    }

    /// Trimmed field value; blank values count as missing
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .get(&name.to_ascii_lowercase())
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Parse ADIF text into records.
///
/// Fields look like `<NAME:LEN>value` or `<NAME:LEN:TYPE>value`. Everything
/// before `<EOH>` is header and is dropped; each `<EOR>` closes a record.
/// Text between fields is ignored. Fields after the last `<EOR>` are dropped.
pub fn parse_adif(text: &str) -> Result<Vec<AdifRecord>> {
    let mut records = Vec::new();
    let mut current = AdifRecord::default();
    let mut rest = text;

    while let Some(open) = rest.find('<') {
        rest = &rest[open + 1..];
        let close = rest
            .find('>')
            .ok_or_else(|| anyhow!("Unterminated ADIF tag near '<{}'", preview(rest)))?;
        let tag = &rest[..close];
        rest = &rest[close + 1..];

        let mut parts = tag.split(':');
        let name = parts.next().unwrap_or_default().trim();

        match parts.next() {
            None => {
                if name.eq_ignore_ascii_case("eoh") {
                    current = AdifRecord::default();
                } else if name.eq_ignore_ascii_case("eor") && !current.is_empty() {
                    records.push(std::mem::take(&mut current));
                }
            }
            Some(len) => {
                let len: usize = len
                    .trim()
                    .parse()
                    .with_context(|| format!("Invalid length in ADIF tag <{}>", tag))?;
                let Some(end) = char_offset(rest, len) else {
                    bail!("Truncated value for ADIF field {}", name);
                };
                current.insert(name, &rest[..end]);
                rest = &rest[end..];
            }
        }
    }

    Ok(records)
}

/// Byte offset just past the first `n` chars of `s`
fn char_offset(s: &str, n: usize) -> Option<usize> {
    if n == 0 {
        return Some(0);
    }
    s.char_indices().map(|(i, c)| i + c.len_utf8()).nth(n - 1)
}

fn preview(s: &str) -> String {
    s.chars().take(20).collect()
}
