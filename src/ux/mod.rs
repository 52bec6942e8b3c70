use colored::Colorize;
use humansize::{format_size, DECIMAL};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::time::Duration;

use crate::export::ExportSummary;
use crate::stack::{Applicability, StackSelection};

pub fn success(msg: &str) {
    println!("{} {}", "✔".green().bold(), msg);
}

pub fn warn(msg: &str) {
    println!("{} {}", "!".yellow().bold(), msg.yellow());
}

pub fn error(msg: &str) {
    eprintln!("{} {}", "✘".red().bold(), msg.red());
}

/// One line of free text; `None` on EOF or an empty line.
pub fn ask(prompt: &str) -> Option<String> {
    print!("{} ", prompt.bold());
    let _ = io::stdout().flush();
    let mut s = String::new();
    match io::stdin().read_line(&mut s) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
    }
}

/// Spinner while a provider call is in flight.
pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.magenta} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

pub fn print_stack_check(sel: &StackSelection, check: &Applicability, rules: &str) {
    let tags = sel
        .tags
        .iter()
        .map(|t| format!("{t:?}"))
        .collect::<Vec<_>>()
        .join(", ");
    println!("\n{} {}", "Stack:".bold(), if tags.is_empty() { "(none)".dimmed().to_string() } else { tags });
    if check.applicable {
        println!("{} {}", "[APPLICABLE]".green().bold(), check.reason);
    } else {
        println!("{} {}", "[NOT APPLICABLE]".red().bold(), check.reason);
    }
    if rules.is_empty() {
        println!("{}", "(no stack rules added to the prompt)".dimmed());
    } else {
        println!("{}\n{}", "Rules:".bold(), rules);
    }
    println!();
}

pub fn print_export_dashboard(sum: &ExportSummary) {
    println!(
        "\n{}",
        "┏━━━━━━━━━━━━━━━━━━━━━━━━ Export ━━━━━━━━━━━━━━━━━━━━━━━━━┓".bold()
    );
    println!(
        "  {}: {}   {}: {}",
        "Files".green().bold(),
        sum.files.len(),
        "Size".bold(),
        format_size(sum.bytes_written, DECIMAL)
    );
    println!("{}", "┗━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━┛".bold());
    for w in &sum.files {
        println!(
            "  {}  {}  {}",
            w.path.display().to_string().bold(),
            w.mime.cyan(),
            format_size(w.bytes, DECIMAL).dimmed()
        );
    }
    println!();
}

/// Unified diff between two documents, colored and cut at `max_lines`.
pub fn revision_diff(old: &str, new: &str, max_lines: usize) -> String {
    if old == new {
        return String::new();
    }
    let old_lines: Vec<&str> = old.lines().collect();
    let new_lines: Vec<&str> = new.lines().collect();
    let diff = difflib::unified_diff(&old_lines, &new_lines, "before", "after", "", "", 2);

    let mut out: Vec<String> = Vec::new();
    for line in diff.iter().map(|l| l.trim_end_matches('\n')) {
        if out.len() >= max_lines {
            out.push("... (diff truncated)".dimmed().to_string());
            break;
        }
        let colored = if line.starts_with("+++") || line.starts_with("---") {
            line.bold().to_string()
        } else if line.starts_with('+') {
            line.green().to_string()
        } else if line.starts_with('-') {
            line.red().to_string()
        } else if line.starts_with("@@") {
            line.cyan().to_string()
        } else {
            line.to_string()
        };
        out.push(colored);
    }
    out.join("\n")
}

pub fn print_revision_diff(old: &str, new: &str) {
    let diff = revision_diff(old, new, 80);
    if diff.is_empty() {
        return;
    }
    println!("\n{}\n{}\n", "=== CHANGES ===".bold(), diff);
}
