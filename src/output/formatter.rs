use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use serde::Serialize;
use std::io::IsTerminal;
use terminal_size::{terminal_size, Width};

use crate::scoring::{
    Activation, ContactScore, ContactStatus, DayLocationResult, OperatorSummary, ScoreReport,
};
use crate::standings::Standing;

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Format a score in compact notation (1.5k, 2.3M, 847)
pub fn format_score(score: f64) -> String {
    let formatted = if score >= 1_000_000.0 {
        format!("{:.1}M", score / 1_000_000.0)
    } else if score >= 1_000.0 {
        format!("{:.1}k", score / 1_000.0)
    } else if score.fract() == 0.0 {
        format!("{:.0}", score)
    } else {
        format!("{:.1}", score)
    };

    // Trim trailing .0 (e.g., "1.0k" -> "1k")
    formatted.replace(".0M", "M").replace(".0k", "k")
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate text to fit available width, accounting for Unicode
fn truncate_text(text: &str, max_width: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_width {
        text.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

fn join_parks(summary: &OperatorSummary) -> String {
    summary
        .locations
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Format standings as a ranked table: Rank, Score, Operator, QSOs, Days, Parks
/// Rank column: 3 chars (fits "99."), right-aligned
/// Score column is right-aligned, 7 chars wide (fits "9999.9M")
pub fn format_standings_table(standings: &[Standing], use_colors: bool) -> String {
    if standings.is_empty() {
        return "No scored logs found.".to_string();
    }

    let term_width = get_terminal_width();
    let score_width = 7;
    let operator_width = standings
        .iter()
        .map(|s| s.operator.chars().count())
        .max()
        .unwrap_or(0);
    let separator = "  ";

    standings
        .iter()
        .enumerate()
        .map(|(idx, standing)| {
            let summary = &standing.report.summary;
            let rank_str = format!("{:>2}.", idx + 1);
            let score_padded = format!(
                "{:>width$}",
                format_score(summary.total_score),
                width = score_width
            );
            let operator_padded = format!("{:<width$}", standing.operator, width = operator_width);
            let counts = format!("{:>4} QSOs {:>3}d", summary.total_contacts, summary.days);

            let fixed_width = rank_str.len()
                + 1
                + score_width
                + operator_width
                + counts.chars().count()
                + separator.len() * 3;
            let parks = join_parks(summary);
            let parks = match term_width {
                Some(width) if width > fixed_width + 10 => {
                    truncate_text(&parks, width - fixed_width)
                }
                Some(_) => truncate_text(&parks, 20),
                None => parks,
            };

            if use_colors {
                format!(
                    "{} {}{}{}{}{}{}{}",
                    rank_str.dimmed(),
                    score_padded.bold(),
                    separator,
                    operator_padded.cyan(),
                    separator,
                    counts,
                    separator,
                    parks
                )
            } else {
                format!(
                    "{} {}{}{}{}{}{}{}",
                    rank_str,
                    score_padded,
                    separator,
                    operator_padded,
                    separator,
                    counts,
                    separator,
                    parks
                )
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format standings as tab-separated values for scripting
/// Columns: score, operator, qsos, days, parks (no headers, no colors)
pub fn format_tsv(standings: &[Standing]) -> String {
    standings
        .iter()
        .map(|standing| {
            let summary = &standing.report.summary;
            format!(
                "{}\t{}\t{}\t{}\t{}",
                summary.total_score,
                standing.operator,
                summary.total_contacts,
                summary.days,
                summary
                    .locations
                    .iter()
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join(",")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn activation_label(activation: &Activation) -> &'static str {
    match activation {
        Activation::Starting => "START",
        Activation::New => "NEW",
        Activation::Repeat { .. } => "",
    }
}

/// Factor trail for one contact, e.g. "2 base x2 new park x2 QRP"
fn format_factor_trail(score: &ContactScore) -> String {
    match score.status {
        ContactStatus::InvalidMode => "invalid mode".to_string(),
        ContactStatus::Scored => {
            let mut parts = vec![format!("{} base", format_score(score.breakdown.base_score))];
            parts.extend(
                score
                    .breakdown
                    .factors
                    .iter()
                    .map(|f| format!("{} ({})", f.label, f.description)),
            );
            parts.join(", ")
        }
    }
}

fn format_bucket(bucket: &DayLocationResult, use_colors: bool) -> String {
    let label = activation_label(&bucket.activation);
    let header = format!(
        "{}  {:<10} {:>5}  {:>6} pts  ({}/{} QSOs)",
        bucket.date,
        bucket.location,
        label,
        format_score(bucket.score),
        bucket.scored_contacts,
        bucket.contacts.len()
    );
    let header = if use_colors && bucket.is_new_location {
        header.green().to_string()
    } else {
        header
    };

    let mut lines = vec![header];
    for contact in &bucket.contacts {
        let Some(score) = bucket.contact_scores.get(&contact.id) else {
            continue;
        };
        let time = contact
            .timestamp
            .map(|ts| ts.format("%H:%M").to_string())
            .unwrap_or_default();
        lines.push(format!(
            "    {} {:<10} {:<6} {:>4}  {}",
            time,
            contact.call.as_deref().unwrap_or("?"),
            contact.mode,
            format_score(score.score),
            format_factor_trail(score)
        ));
    }
    lines.join("\n")
}

/// Format one operator's full breakdown: a summary line, then every
/// (date, park) bucket with its contacts
pub fn format_breakdown(operator: &str, report: &ScoreReport, use_colors: bool) -> String {
    let summary = &report.summary;
    let title = format!(
        "{}: {} pts, {} QSOs, {} days, {} parks",
        operator,
        format_score(summary.total_score),
        summary.total_contacts,
        summary.days,
        summary.locations.len()
    );
    let mut sections = vec![if use_colors {
        title.bold().to_string()
    } else {
        title
    }];

    if let Some(start) = &summary.starting_location {
        sections.push(format!("Starting park: {}", start));
    }

    let excluded = &summary.exclusions;
    if excluded.missing_timestamp + excluded.missing_location + excluded.invalid_mode > 0 {
        sections.push(format!(
            "Not scored: {} without time, {} without park, {} invalid mode",
            excluded.missing_timestamp, excluded.missing_location, excluded.invalid_mode
        ));
    }

    sections.extend(report.buckets().map(|b| format_bucket(b, use_colors)));
    sections.join("\n")
}

/// One row per contact as tab-separated values
/// Columns: date, park, activation, call, mode, score (no headers, no colors)
pub fn format_breakdown_tsv(report: &ScoreReport) -> String {
    report
        .buckets()
        .flat_map(|bucket| {
            bucket.contacts.iter().filter_map(move |contact| {
                let score = bucket.contact_scores.get(&contact.id)?;
                Some(format!(
                    "{}\t{}\t{}\t{}\t{}\t{}",
                    bucket.date,
                    bucket.location,
                    activation_label(&bucket.activation).to_lowercase(),
                    contact.call.as_deref().unwrap_or(""),
                    contact.mode,
                    score.score
                ))
            })
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Serialize)]
struct StandingView<'a> {
    rank: usize,
    operator: &'a str,
    #[serde(flatten)]
    summary: &'a OperatorSummary,
}

/// Standings as pretty-printed JSON (summaries only)
pub fn format_standings_json(standings: &[Standing]) -> Result<String> {
    let views: Vec<StandingView> = standings
        .iter()
        .enumerate()
        .map(|(idx, standing)| StandingView {
            rank: idx + 1,
            operator: standing.operator,
            summary: &standing.report.summary,
        })
        .collect();
    serde_json::to_string_pretty(&views).context("Failed to serialize standings")
}

/// Full per-bucket report as pretty-printed JSON
pub fn format_report_json(report: &ScoreReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("Failed to serialize score report")
}
