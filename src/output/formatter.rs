use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use std::io::IsTerminal;
use terminal_size::{terminal_size, Width};

use crate::io::{output_rows, write_csv};
use crate::pipeline::ScoredRecord;
use crate::scoring::FactorContribution;

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Format a 0-100 score with one decimal ("57.4")
pub fn format_score(score: f64) -> String {
    format!("{:.1}", score)
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate a name to fit available width, accounting for Unicode
fn truncate_name(name: &str, max_width: usize) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= max_width {
        name.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

fn level_of(record: &ScoredRecord) -> &str {
    record.tier.as_ref().map(|t| t.as_str()).unwrap_or("-")
}

/// Ranked table: Index, Composite, Perf, Use, Level, Player, Team.
/// No headers; the index column fits "999."
pub fn format_ranked_table(ranked: &[ScoredRecord], use_colors: bool) -> String {
    if ranked.is_empty() {
        return "No players found.".to_string();
    }

    let term_width = get_terminal_width();
    let index_width = 4;
    let score_width = 5;
    let level_width = 6;
    let separator = "  ";

    ranked
        .iter()
        .enumerate()
        .map(|(idx, r)| {
            let index_str = format!("{:>3}.", idx + 1);
            let composite = format!("{:>width$}", format_score(r.composite), width = score_width);
            let perf = format!("{:>width$}", format_score(r.performance), width = score_width);
            let usage = format!("{:>width$}", format_score(r.usage), width = score_width);
            let level = format!("{:<width$}", level_of(r), width = level_width);
            let team = r.record.team().unwrap_or("");

            let fixed_width = index_width
                + 1
                + score_width * 3
                + level_width
                + separator.len() * 5
                + team.chars().count();
            let name = match term_width {
                Some(width) if width > fixed_width + 10 => {
                    truncate_name(r.name(), width - fixed_width)
                }
                // Very narrow terminal, show truncated
                Some(_) => truncate_name(r.name(), 20),
                // No terminal (pipe), don't truncate
                None => r.name().to_string(),
            };

            if use_colors {
                format!(
                    "{} {}{}{}{}{}{}{}{}{}{}{}",
                    index_str.dimmed(),
                    composite.bold(),
                    separator,
                    perf.green(),
                    separator,
                    usage.cyan(),
                    separator,
                    level.yellow(),
                    separator,
                    name,
                    separator,
                    team.dimmed()
                )
            } else {
                format!(
                    "{} {}{}{}{}{}{}{}{}{}{}{}",
                    index_str,
                    composite,
                    separator,
                    perf,
                    separator,
                    usage,
                    separator,
                    level,
                    separator,
                    name,
                    separator,
                    team
                )
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format ranked players as tab-separated values for scripting
/// Columns: rank, combined, perf, use, level, player, team (no headers, no colors)
pub fn format_tsv(ranked: &[ScoredRecord]) -> String {
    ranked
        .iter()
        .enumerate()
        .map(|(idx, r)| {
            format!(
                "{}\t{}\t{}\t{}\t{}\t{}\t{}",
                idx + 1,
                r.composite,
                r.performance,
                r.usage,
                level_of(r),
                r.name(),
                r.record.team().unwrap_or("")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// CSV with a header row, the same columns as `--output`.
pub fn format_csv(ranked: &[ScoredRecord]) -> Result<String> {
    let mut buf = Vec::new();
    write_csv(&mut buf, ranked)?;
    String::from_utf8(buf).context("CSV output is not valid UTF-8")
}

/// Pretty-printed JSON array of output rows.
pub fn format_json(ranked: &[ScoredRecord]) -> Result<String> {
    serde_json::to_string_pretty(&output_rows(ranked)).context("Failed to serialize JSON output")
}

fn format_contributions(title: &str, parts: &[FactorContribution], use_colors: bool) -> String {
    let mut lines = vec![format!("  {}:", title)];
    if parts.is_empty() {
        lines.push("    (no weighted factors)".to_string());
    }
    for part in parts {
        let line = format!(
            "    {:<18} {:>10.4} x {:>7.3} = {:>9.4}",
            part.label, part.input, part.weight, part.contribution
        );
        if use_colors && part.contribution < 0.0 {
            lines.push(line.red().to_string());
        } else {
            lines.push(line);
        }
    }
    lines.join("\n")
}

/// Multi-line explanation of how one player's score was built.
pub fn format_explain(r: &ScoredRecord, use_colors: bool) -> String {
    let name = if use_colors {
        r.name().bold().to_string()
    } else {
        r.name().to_string()
    };
    let composite = format_score(r.composite);
    let composite = if use_colors {
        composite.bold().to_string()
    } else {
        composite
    };

    let age = r
        .record
        .age()
        .map(|a| format!("{}", a))
        .unwrap_or_else(|| "-".to_string());
    let at_bats = r
        .record
        .line
        .at_bats_reported()
        .map(|ab| format!("{}", ab))
        .unwrap_or_else(|| "-".to_string());
    let adj = &r.adjustments;

    let sections = [
        format!(
            "{}\n  Level: {}  Team: {}  Source: {}\n  Age: {}  AB: {}",
            name,
            level_of(r),
            r.record.team().unwrap_or("-"),
            r.record.source.as_deref().unwrap_or("-"),
            age,
            at_bats
        ),
        format!(
            "  Rates: AVG {:.3}  OBP {:.3}  SLG {:.3}",
            r.rates.hit_rate, r.rates.on_base_rate, r.rates.power_rate
        ),
        format!(
            "  Adjustments: age x{:.3}  age-to-level x{:.3}  at-bats x{:.3}  combined x{:.3}",
            adj.age, adj.age_fit, adj.opportunity, adj.combined
        ),
        format_contributions("Performance", &r.breakdown.performance, use_colors),
        format_contributions("Usage", &r.breakdown.usage, use_colors),
        format!(
            "  Raw: perf {:.4}  use {:.4}",
            r.performance_raw, r.usage_raw
        ),
        format!(
            "  Scaled: perf {}  use {}  level x{:.2}  combined {}",
            format_score(r.performance),
            format_score(r.usage),
            r.level_weight,
            composite
        ),
    ];
    sections.join("\n")
}
