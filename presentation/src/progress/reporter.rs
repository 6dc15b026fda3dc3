//! Progress reporting for investigations
//!
//! Both reporters write to stderr so stdout carries only the result.

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use sherlock_application::SwarmProgressNotifier;
use sherlock_domain::AgentName;
use std::time::Duration;

/// Reports progress with a spinner; events scroll above it
pub struct ProgressReporter {
    spinner: ProgressBar,
}

impl ProgressReporter {
    pub fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(Self::spinner_style());
        spinner.set_prefix("sherlock");
        spinner.set_message("Starting tool servers...");
        spinner.enable_steady_tick(Duration::from_millis(120));
        Self { spinner }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold.cyan} [{elapsed}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        if !self.spinner.is_finished() {
            self.spinner.finish_and_clear();
        }
    }
}

impl SwarmProgressNotifier for ProgressReporter {
    fn on_session_opened(&self, session: &str, operations: usize) {
        self.spinner.println(format!(
            "  {} {} ({} operations)",
            "v".green(),
            session,
            operations
        ));
    }

    fn on_sessions_released(&self, count: usize) {
        self.spinner
            .finish_with_message(format!("{} ({} tool servers stopped)", "done".green(), count));
    }

    fn on_agent_start(&self, agent: &AgentName, hop: usize) {
        self.spinner
            .set_message(format!("{} investigating (hop {})", agent.title().bold(), hop));
    }

    fn on_handoff(&self, from: &AgentName, to: &AgentName, rationale: &str) {
        self.spinner.println(format!(
            "  {} {} -> {}: {}",
            "->".cyan(),
            from,
            to,
            first_line(rationale)
        ));
    }

    fn on_agent_complete(&self, agent: &AgentName) {
        self.spinner
            .set_message(format!("{} answered", agent.title().bold()));
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl SwarmProgressNotifier for SimpleProgress {
    fn on_session_opened(&self, session: &str, operations: usize) {
        eprintln!("{} {} ({} operations)", "v".green(), session, operations);
    }

    fn on_agent_start(&self, agent: &AgentName, hop: usize) {
        eprintln!("{} {} (hop {})", "->".cyan(), agent.title().bold(), hop);
    }

    fn on_handoff(&self, from: &AgentName, to: &AgentName, rationale: &str) {
        eprintln!("   {} -> {}: {}", from, to, first_line(rationale));
    }

    fn on_sessions_released(&self, count: usize) {
        eprintln!("{} {} tool servers stopped", "v".green(), count);
    }
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or("").trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_line() {
        assert_eq!(first_line("  Throttling on orders table\nmore detail"), "Throttling on orders table");
        assert_eq!(first_line(""), "");
    }

    #[test]
    fn test_reporter_handles_full_run() {
        let reporter = ProgressReporter::new();
        let diagnostic = AgentName::new("diagnostic_agent");
        let persistence = AgentName::new("persistence_agent");
        reporter.on_session_opened("k8sgpt", 12);
        reporter.on_agent_start(&diagnostic, 0);
        reporter.on_handoff(&diagnostic, &persistence, "Throttling suspected");
        reporter.on_agent_start(&persistence, 1);
        reporter.on_agent_complete(&persistence);
        reporter.on_sessions_released(3);
        assert!(reporter.spinner.is_finished());
    }
}
