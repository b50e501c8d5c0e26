use owo_colors::OwoColorize;
use wpimport_core::ImportReport;

use crate::VERSION;

/// Kind of status line written to stderr
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Info,
    Done,
    Warn,
    Fail,
}

/// One-line banner for verbose mode
pub fn print_banner() {
    eprintln!(
        "{} {} {}\n",
        "wp-import".bold().magenta(),
        VERSION.dimmed(),
        "· WordPress to Write.as / WriteFreely".dimmed()
    );
}

/// `[n/total] message`
pub fn print_step(step: usize, total: usize, message: &str) {
    eprintln!("{} {}", format!("[{}/{}]", step, total).cyan().bold(), message);
}

pub fn status(kind: Status, message: &str) {
    match kind {
        Status::Info => eprintln!("{} {}", "info".blue().bold(), message),
        Status::Done => eprintln!("{} {}", "done".green().bold(), message),
        Status::Warn => eprintln!("{} {}", "warn".yellow().bold(), message),
        Status::Fail => eprintln!("{} {}", "fail".red().bold(), message.red()),
    }
}

/// Counts, created blogs, and every skipped channel or failed post.
pub fn print_summary(report: &ImportReport) {
    eprintln!("\n{}", "Import summary".bold().underline());
    summary_row("channels", report.channels);
    summary_row("created", report.posts_created);
    summary_row("skipped", report.skipped);
    summary_row("failed", report.failures.len());

    for alias in &report.collections {
        eprintln!("  {} new blog {}", "+".green(), alias.bold());
    }
    for channel in &report.skipped_channels {
        eprintln!("  {} channel {} ({})", "-".yellow(), channel.channel, channel.error.dimmed());
    }
    for failure in &report.failures {
        eprintln!("  {} {} ({})", "x".red(), failure.title, failure.error.dimmed());
    }
    eprintln!();
}

fn summary_row(label: &str, value: usize) {
    eprintln!("  {} {}", format!("{:<9}", label).dimmed(), value.to_string().bold());
}
