//! Report rendering

use super::result::InvestigationResult;

/// Heading of every investigation report
pub const REPORT_HEADER: &str = "## SRE Investigation Results\n\n";

/// Render a result as Markdown.
///
/// Pure: the same result always renders to the same bytes. Section order is
/// the result's first-visit order and content is copied verbatim.
pub fn format_report(result: &InvestigationResult) -> String {
    let mut out = String::from(REPORT_HEADER);
    for section in &result.sections {
        out.push_str(&format!("### {}\n{}\n\n", section.title(), section.content));
    }
    if result.budget_exhausted {
        out.push_str(&format!(
            "_Hand-off budget exhausted after {} hops; findings above may be incomplete._\n",
            result.hop_count
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::entities::AgentName;
    use crate::swarm::result::AgentSection;
    use crate::swarm::state::SwarmStatus;
    use std::time::Duration;

    fn result(sections: &[(&str, &str)], budget_exhausted: bool) -> InvestigationResult {
        InvestigationResult {
            status: SwarmStatus::Completed,
            sections: sections
                .iter()
                .map(|(agent, content)| AgentSection {
                    agent: AgentName::new(*agent),
                    content: content.to_string(),
                })
                .collect(),
            agents_visited: sections.iter().map(|(a, _)| AgentName::new(*a)).collect(),
            execution_time: Duration::from_secs(3),
            hop_count: sections.len().saturating_sub(1),
            budget_exhausted,
        }
    }

    #[test]
    fn test_single_section_report() {
        let report = format_report(&result(&[("diagnostic_agent", "no pod issues found")], false));
        assert_eq!(
            report,
            "## SRE Investigation Results\n\n### Diagnostic Agent\nno pod issues found\n\n"
        );
    }

    #[test]
    fn test_sections_keep_order_and_are_idempotent() {
        let r = result(
            &[
                ("diagnostic_agent", "pods healthy, check metrics"),
                ("observability_agent", "CPU at 95%, alarm firing"),
            ],
            false,
        );
        let first = format_report(&r);
        assert_eq!(first, format_report(&r));
        let diag = first.find("### Diagnostic Agent").unwrap();
        let obs = first.find("### Observability Agent").unwrap();
        assert!(diag < obs);
    }

    #[test]
    fn test_budget_note() {
        let r = result(&[("diagnostic_agent", "a"), ("observability_agent", "b")], true);
        assert!(format_report(&r).ends_with("after 1 hops; findings above may be incomplete._\n"));
    }
}
