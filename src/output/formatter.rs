use std::io::IsTerminal;
use owo_colors::OwoColorize;
use terminal_size::{Width, terminal_size};

use crate::model::ElementCounts;
use crate::rules::{CountLimit, RuleTables};
use crate::scoring::{compose_base, ScoreSheet, SlotScore};

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Points always carry two decimals ("10.10", "-0.42")
pub fn format_points(points: f64) -> String {
    format!("{:.2}", points)
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate a label to fit available width, accounting for Unicode
fn truncate_label(label: &str, max_width: usize) -> String {
    let chars: Vec<char> = label.chars().collect();
    if chars.len() <= max_width {
        label.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

// Index: 3 chars ("12."), points columns: 7 chars each ("-10.00")
const INDEX_WIDTH: usize = 3;
const POINTS_WIDTH: usize = 7;

/// Per-kind element counts ("Jumps 3  Spins 2  Steps 1")
pub fn format_counts(counts: &ElementCounts) -> String {
    format!(
        "Jumps {}  Spins {}  Steps {}",
        counts.jumps, counts.spins, counts.steps
    )
}

/// Format a score sheet as a table: Index, Element, Base, GOE, Total
/// followed by a totals row and the element counts. Empty slots are skipped;
/// the index is the 1-based slot number.
pub fn format_score_sheet(sheet: &ScoreSheet, use_colors: bool) -> String {
    if sheet.slots.is_empty() {
        return "No elements entered.".to_string();
    }

    let widest = sheet
        .slots
        .iter()
        .map(|s| s.label.chars().count())
        .max()
        .unwrap_or(0)
        .max("Total".len());

    // index + space + label + three points columns
    let fixed_width = INDEX_WIDTH + 1 + POINTS_WIDTH * 3;
    let label_width = match get_terminal_width() {
        Some(width) if width > fixed_width + 10 => widest.min(width - fixed_width),
        Some(_) => widest.min(20),
        None => widest,
    };

    let mut lines: Vec<String> = sheet
        .slots
        .iter()
        .map(|slot| format_slot_line(slot, label_width, use_colors))
        .collect();

    let totals = format!(
        "{:>index$} {:<label$}{:>points$}{:>points$}{:>points$}",
        "",
        "Total",
        format_points(sheet.base_total),
        format_points(sheet.goe_total),
        format_points(sheet.total_score),
        index = INDEX_WIDTH,
        label = label_width,
        points = POINTS_WIDTH,
    );
    lines.push(if use_colors {
        totals.bold().to_string()
    } else {
        totals
    });

    let counts = format_counts(&sheet.counts);
    lines.push(if use_colors {
        counts.dimmed().to_string()
    } else {
        counts
    });

    lines.join("\n")
}

fn format_slot_line(slot: &SlotScore, label_width: usize, use_colors: bool) -> String {
    let index_str = format!("{:>2}.", slot.slot);
    let label = format!(
        "{:<width$}",
        truncate_label(&slot.label, label_width),
        width = label_width
    );
    let base = format!("{:>w$}", format_points(slot.result.base_value), w = POINTS_WIDTH);
    let goe = format!("{:>w$}", format_points(slot.result.goe_value), w = POINTS_WIDTH);
    let total = format!("{:>w$}", format_points(slot.result.total_score), w = POINTS_WIDTH);

    if use_colors {
        let goe = if slot.result.goe_value < 0.0 {
            goe.red().to_string()
        } else if slot.result.goe_value > 0.0 {
            goe.green().to_string()
        } else {
            goe
        };
        format!(
            "{} {}{}{}{}",
            index_str.dimmed(),
            label.cyan(),
            base,
            goe,
            total.bold()
        )
    } else {
        format!("{} {}{}{}{}", index_str, label, base, goe, total)
    }
}

/// Format a score sheet as tab-separated values for scripting
/// Columns: slot, label, base, goe, total (no headers, no colors)
pub fn format_sheet_tsv(sheet: &ScoreSheet) -> String {
    sheet
        .slots
        .iter()
        .map(|slot| {
            format!(
                "{}\t{}\t{}\t{}\t{}",
                slot.slot,
                slot.label,
                format_points(slot.result.base_value),
                format_points(slot.result.goe_value),
                format_points(slot.result.total_score)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Advisory violations as a bulleted block; empty when there are none
pub fn format_violations(errors: &[String], use_colors: bool) -> String {
    if errors.is_empty() {
        return String::new();
    }

    let heading = if use_colors {
        "Program violations:".yellow().bold().to_string()
    } else {
        "Program violations:".to_string()
    };

    std::iter::once(heading)
        .chain(errors.iter().map(|e| format!("  - {}", e)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_limit(limit: &CountLimit) -> String {
    if limit.min == limit.max {
        limit.max.to_string()
    } else {
        format!("{}-{}", limit.min, limit.max)
    }
}

/// One block per class, one line per discipline with slot count and limits
pub fn format_classes(rules: &RuleTables, use_colors: bool) -> String {
    rules
        .classes()
        .iter()
        .map(|class| {
            let heading = if use_colors {
                format!("{} ({})", class.label.bold(), class.id.cyan())
            } else {
                format!("{} ({})", class.label, class.id)
            };
            let disciplines = class.disciplines.iter().map(|d| {
                let mut line = format!(
                    "  {}  {} slots  jumps {}  spins {}  steps {}",
                    d.id,
                    d.max_elements,
                    format_limit(&d.limits.jumps),
                    format_limit(&d.limits.spins),
                    format_limit(&d.limits.steps)
                );
                if let Some(notes) = &d.notes {
                    line.push_str(&format!("  ({})", notes));
                }
                line
            });
            std::iter::once(heading)
                .chain(disciplines)
                .collect::<Vec<_>>()
                .join("\n")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Combination templates with their base value as a combination
pub fn format_templates(rules: &RuleTables, use_colors: bool) -> String {
    let templates = &rules.combo.templates;
    if templates.is_empty() {
        return "No combination templates configured.".to_string();
    }

    let width = templates
        .iter()
        .map(|t| t.label.chars().count())
        .max()
        .unwrap_or(0);

    templates
        .iter()
        .map(|template| {
            let base = format!(
                "{:>w$}",
                format_points(compose_base(&template.atoms, false, rules)),
                w = POINTS_WIDTH
            );
            let label = format!("{:<width$}", template.label, width = width);
            if use_colors {
                format!("{}{}", label.cyan(), base)
            } else {
                format!("{}{}", label, base)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
