use anyhow::Result;
use colored::Colorize;
use reconcile::{ConfirmCallback, Reporter};

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg);
}

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a warning message
pub fn warn(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a dim/muted message
pub fn dim(msg: &str) {
    println!("  {}", msg.dimmed());
}

// ============================================================================
// Reporting
// ============================================================================

/// Ensure a report ends with exactly the newline it was given, or one
fn terminated(report: &str) -> String {
    if report.ends_with('\n') {
        report.to_string()
    } else {
        format!("{report}\n")
    }
}

/// Colour a diff line by its sign
fn paint(line: &str) -> String {
    if line.starts_with('+') {
        line.green().to_string()
    } else if line.starts_with('-') {
        line.red().to_string()
    } else {
        line.to_string()
    }
}

/// Reporter printing to stdout, colouring diff lines
pub struct StdoutReporter;

impl Reporter for StdoutReporter {
    fn print_report(&self, report: &str) {
        let text: String = terminated(report)
            .split_inclusive('\n')
            .map(|line| match line.strip_suffix('\n') {
                Some(body) => format!("{}\n", paint(body)),
                None => paint(line),
            })
            .collect();
        print!("{text}");
    }
}

/// Confirmation through an interactive prompt
///
/// Blocks until the operator answers. Fails when stdin is not a terminal.
pub struct DialoguerConfirm;

impl ConfirmCallback for DialoguerConfirm {
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()?;
        Ok(confirmed)
    }
}

// ============================================================================
// Tables
// ============================================================================

/// Render rows as left-aligned columns separated by two spaces
pub fn table(rows: &[Vec<String>]) -> String {
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut widths = vec![0; columns];
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let mut out = String::new();
    for row in rows {
        let last = row.len().saturating_sub(1);
        for (i, cell) in row.iter().enumerate() {
            if i == last {
                out.push_str(cell);
            } else {
                out.push_str(&format!("{cell:<width$}  ", width = widths[i]));
            }
        }
        out.push('\n');
    }
    out
}

// ============================================================================
// Tests
// ============================================================================
