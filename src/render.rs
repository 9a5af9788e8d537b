//! Plain-text rendering of the subject table.

use crate::subject::Subject;
use crate::subjects::Totals;

const HEADERS: [&str; 5] = ["Id", "Subject", "Credits", "Estimated", "Logged"];

/// Marker appended to rows whose logged hours exceed the estimate
pub const OVERRUN_MARKER: &str = "!";

/// Render one row per subject plus a totals footer
pub fn format_table(subjects: &[Subject], totals: &Totals, highlight_overrun: bool) -> String {
    let mut rows: Vec<[String; 5]> = Vec::with_capacity(subjects.len() + 1);
    for s in subjects {
        let mut logged = s.logged_hours().to_string();
        if highlight_overrun && s.is_over_estimate() {
            logged.push(' ');
            logged.push_str(OVERRUN_MARKER);
        }
        rows.push([
            s.id().to_string(),
            s.name().to_string(),
            s.credit_points().to_string(),
            s.estimated_hours().to_string(),
            logged,
        ]);
    }
    let footer = [
        String::new(),
        "Total".to_string(),
        totals.credit_points.to_string(),
        totals.estimated_hours.to_string(),
        totals.logged_hours.to_string(),
    ];

    let mut widths = HEADERS.map(str::len);
    for row in rows.iter().chain(std::iter::once(&footer)) {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_row(&mut out, &HEADERS.map(String::from), &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(rule.join("-+-").as_str());
    out.push('\n');
    for row in &rows {
        push_row(&mut out, row, &widths);
    }
    out.push_str(rule.join("-+-").as_str());
    out.push('\n');
    push_row(&mut out, &footer, &widths);
    out
}

fn push_row(out: &mut String, cells: &[String; 5], widths: &[usize; 5]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(i, (cell, w))| {
            // name column left-aligned, numbers right-aligned
            if i == 1 {
                format!("{:<w$}", cell, w = *w)
            } else {
                format!("{:>w$}", cell, w = *w)
            }
        })
        .collect();
    out.push_str(line.join(" | ").trim_end());
    out.push('\n');
}
