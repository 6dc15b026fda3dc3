//! Console output formatter for investigation results

use crate::cli::commands::OutputFormat;
use colored::Colorize;
use sherlock_application::{InvestigationError, InvestigationOutput};

/// Advice appended to every failure message
pub const FAILURE_HINT: &str =
    "Please check your AWS credentials, Kubernetes access, and MCP server connections.";

/// Formats investigation results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    pub fn render(output: &InvestigationOutput, format: OutputFormat) -> String {
        match format {
            OutputFormat::Report => Self::format_report(output),
            OutputFormat::Full => Self::format(output),
            OutputFormat::Json => Self::format_json(output),
        }
    }

    /// The Markdown report alone
    pub fn format_report(output: &InvestigationOutput) -> String {
        output.report.clone()
    }

    /// Report followed by summary metrics
    pub fn format(output: &InvestigationOutput) -> String {
        let result = &output.result;
        let mut out = String::new();

        out.push_str(&Self::header("SRE Investigation"));
        out.push('\n');
        out.push_str(&format!(
            "{} {}\n\n",
            "Diagnostic backend:".cyan().bold(),
            output.backend.display_name()
        ));

        out.push_str(&output.report);

        out.push_str(&Self::section_header("Summary"));
        let status = result.status.as_str();
        let status = if result.budget_exhausted {
            status.yellow()
        } else {
            status.green()
        };
        out.push_str(&format!("{} {}\n", "Swarm status:".bold(), status));
        out.push_str(&format!(
            "{} {:.2}s\n",
            "Execution time:".bold(),
            result.execution_time.as_secs_f64()
        ));
        out.push_str(&format!(
            "{} {}\n",
            "Agents visited:".bold(),
            result
                .agents_visited
                .iter()
                .map(|a| a.as_str())
                .collect::<Vec<_>>()
                .join(" -> ")
        ));
        out.push_str(&format!("{} {}\n", "Hand-offs:".bold(), result.hop_count));
        if result.budget_exhausted {
            out.push_str(&format!(
                "{}\n",
                "Hand-off budget exhausted; findings may be incomplete.".yellow()
            ));
        }

        out.push_str(&Self::footer());
        out
    }

    /// Format as JSON
    pub fn format_json(output: &InvestigationOutput) -> String {
        let value = serde_json::json!({
            "diagnostic_agent": output.backend,
            "report": output.report,
            "result": output.result,
        });
        serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string())
    }

    /// Plain-text failure message
    pub fn format_failure(error: &InvestigationError) -> String {
        format!("SRE investigation failed: {}\n\n{}", error, FAILURE_HINT)
    }

    /// Failure message for the terminal, with the failing stage
    pub fn format_failure_colored(error: &InvestigationError) -> String {
        let mut out = format!(
            "{} {}\n",
            "SRE investigation failed:".red().bold(),
            error
        );
        out.push_str(&format!("{} {}", "Stage:".dimmed(), error.stage()));
        if let Some(agent) = error.agent() {
            out.push_str(&format!(" {} {}", "agent:".dimmed(), agent));
        }
        out.push_str(&format!("\n\n{}\n", FAILURE_HINT));
        out
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}
