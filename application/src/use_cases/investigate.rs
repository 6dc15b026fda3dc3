//! Investigate use case
//!
//! The investigation envelope: resolves the diagnostic backend, acquires
//! every tool session, runs the swarm, and always releases the sessions
//! and finalises the trace span before returning.

use super::coordinate_swarm::{SwarmCoordinator, SwarmError, SwarmRun};
use super::session_scope::{AcquisitionError, SessionScope};
use crate::config::SwarmParams;
use crate::ports::progress::{NoProgress, SwarmProgressNotifier};
use crate::ports::session_factory::ToolSessionFactory;
use crate::ports::swarm_agent::AgentFactory;
use crate::ports::trace_sink::{TraceSink, TraceSpan};
use chrono::{DateTime, Utc};
use sherlock_domain::{
    AgentDescriptor, AgentDomain, AgentName, DiagnosticBackend, FormattingError,
    InvestigationQuery, InvestigationResult, SessionError, SharedContext, aggregate, format_report,
};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{info, warn};

/// Name of the span every investigation is traced under
pub const INVESTIGATION_SPAN: &str = "sherlock-investigation";

/// Errors that can occur during an investigation
#[derive(Error, Debug)]
pub enum InvestigationError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Failed to connect to tool session '{session}': {source}")]
    Connection {
        session: String,
        #[source]
        source: SessionError,
    },

    #[error("Investigation failed: {0}")]
    Execution(#[from] SwarmError),

    #[error("Failed to format results: {0}")]
    Formatting(#[from] FormattingError),

    #[error("Investigation cancelled after {0:?}")]
    Cancelled(Duration),
}

impl InvestigationError {
    /// Stage of the investigation the error happened in
    pub fn stage(&self) -> &'static str {
        match self {
            InvestigationError::Configuration(_) => "configuration",
            InvestigationError::Connection { .. } => "acquisition",
            InvestigationError::Execution(_) => "coordination",
            InvestigationError::Formatting(_) => "aggregation",
            InvestigationError::Cancelled(_) => "cancelled",
        }
    }

    /// Agent the error is attributed to, if any
    pub fn agent(&self) -> Option<&AgentName> {
        match self {
            InvestigationError::Execution(e) => e.agent(),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, InvestigationError::Cancelled(_))
    }
}

/// Input for the Investigate use case
#[derive(Debug, Clone)]
pub struct InvestigationInput {
    pub query: String,
    /// Diagnostic backend selector; `None` selects the default
    pub backend: Option<String>,
}

impl InvestigationInput {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            backend: None,
        }
    }

    pub fn with_backend(mut self, backend: impl Into<String>) -> Self {
        self.backend = Some(backend.into());
        self
    }
}

/// Output of a completed investigation
#[derive(Debug, Clone)]
pub struct InvestigationOutput {
    pub backend: DiagnosticBackend,
    pub result: InvestigationResult,
    pub report: String,
}

/// Prefix a query with the current time in UTC
pub fn augment_query(query: &InvestigationQuery, now: DateTime<Utc>) -> String {
    query.augmented(&now.format("%A, %Y-%m-%d %H:%M:%S").to_string())
}

/// Use case for running a full investigation
pub struct InvestigateUseCase {
    sessions: Arc<dyn ToolSessionFactory>,
    agents: Arc<dyn AgentFactory>,
    trace: Arc<dyn TraceSink>,
    params: SwarmParams,
}

impl InvestigateUseCase {
    pub fn new(
        sessions: Arc<dyn ToolSessionFactory>,
        agents: Arc<dyn AgentFactory>,
        trace: Arc<dyn TraceSink>,
    ) -> Self {
        Self {
            sessions,
            agents,
            trace,
            params: SwarmParams::default(),
        }
    }

    pub fn with_params(mut self, params: SwarmParams) -> Self {
        self.params = params;
        self
    }

    pub fn params(&self) -> &SwarmParams {
        &self.params
    }

    /// Execute the use case with default (no-op) progress
    ///
    /// Bound the run with [`SwarmParams::timeout`] rather than an outer
    /// `tokio::time::timeout`: dropping the future skips session release.
    pub async fn execute(
        &self,
        input: InvestigationInput,
    ) -> Result<InvestigationOutput, InvestigationError> {
        self.execute_with_progress(input, &NoProgress).await
    }

    /// Execute the use case with progress callbacks
    pub async fn execute_with_progress(
        &self,
        input: InvestigationInput,
        progress: &dyn SwarmProgressNotifier,
    ) -> Result<InvestigationOutput, InvestigationError> {
        let selector = input
            .backend
            .clone()
            .unwrap_or_else(|| DiagnosticBackend::default().as_str().to_string());
        let span = self.trace.start_span(
            INVESTIGATION_SPAN,
            serde_json::json!({
                "query": input.query,
                "diagnostic_agent": selector,
            }),
        );

        let outcome = self.run(input, span.as_ref(), progress).await;
        match &outcome {
            Ok(output) => {
                info!(
                    "Investigation completed in {:.2}s across {} activations",
                    output.result.execution_time.as_secs_f64(),
                    output.result.agents_visited.len()
                );
                span.update(&output.report);
            }
            Err(e) => {
                warn!(stage = e.stage(), "Investigation failed: {}", e);
                span.update(&format!("Error: {}", e));
            }
        }
        self.trace.flush();
        outcome
    }

    async fn run(
        &self,
        input: InvestigationInput,
        span: &dyn TraceSpan,
        progress: &dyn SwarmProgressNotifier,
    ) -> Result<InvestigationOutput, InvestigationError> {
        // Everything that can be rejected is rejected before any session starts
        let backend = DiagnosticBackend::resolve(input.backend.as_deref())
            .map_err(|e| InvestigationError::Configuration(e.to_string()))?;
        let query = InvestigationQuery::try_new(input.query)
            .map_err(|e| InvestigationError::Configuration(e.to_string()))?;
        let descriptors = AgentDescriptor::roster(backend);
        let sessions = descriptors
            .iter()
            .map(|d| self.sessions.create(d.domain, backend))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| InvestigationError::Configuration(e.to_string()))?;

        let deadline = self.params.timeout.map(|t| Instant::now() + t);
        info!(
            "Investigating with {} diagnostics ({} sessions)",
            backend.display_name(),
            sessions.len()
        );

        let scope = SessionScope::acquire(sessions, deadline, progress)
            .await
            .map_err(|e| self.acquisition_error(e))?;

        let context = SharedContext::new(augment_query(&query, Utc::now()));
        let coordination = self.coordinate(&scope, descriptors, context, progress);
        let outcome = match deadline {
            Some(deadline) => tokio::time::timeout_at(deadline, coordination)
                .await
                .unwrap_or_else(|_| Err(self.cancelled())),
            None => coordination.await,
        };

        let released = scope.len();
        let failures = scope.release().await;
        if !failures.is_empty() {
            warn!("{} tool sessions failed to close cleanly", failures.len());
        }
        progress.on_sessions_released(released);

        let run = outcome?;
        for entry in run.history.entries() {
            span.event(
                "agent_activation",
                serde_json::json!({
                    "agent": entry.agent,
                    "outcome": entry.outcome.kind(),
                    "duration_ms": entry.duration().as_millis() as u64,
                }),
            );
        }

        let result = aggregate(
            &run.history,
            run.state.hop_count(),
            run.state.budget_exhausted(),
            self.params.repeat_visits,
        )?;
        let report = format_report(&result);
        Ok(InvestigationOutput {
            backend,
            result,
            report,
        })
    }

    async fn coordinate(
        &self,
        scope: &SessionScope,
        descriptors: Vec<AgentDescriptor>,
        context: SharedContext,
        progress: &dyn SwarmProgressNotifier,
    ) -> Result<SwarmRun, InvestigationError> {
        let names: Vec<AgentName> = descriptors.iter().map(|d| d.name.clone()).collect();
        let agent_count = descriptors.len();

        let agents = descriptors
            .into_iter()
            .zip(scope.sessions())
            .map(|(descriptor, acquired)| {
                let peers = names
                    .iter()
                    .filter(|n| **n != descriptor.name)
                    .cloned()
                    .collect();
                self.agents.build(
                    descriptor,
                    acquired.session.clone(),
                    acquired.catalog.clone(),
                    peers,
                )
            })
            .collect();

        let coordinator =
            SwarmCoordinator::new(agents)?.with_max_hops(self.params.hop_budget(agent_count));
        let entry = AgentDomain::Diagnostic.agent_name();
        Ok(coordinator.run(&entry, context, progress).await?)
    }

    fn acquisition_error(&self, error: AcquisitionError) -> InvestigationError {
        match error {
            AcquisitionError::Open { session, source } => {
                InvestigationError::Connection { session, source }
            }
            AcquisitionError::DeadlineExceeded { .. } => self.cancelled(),
        }
    }

    fn cancelled(&self) -> InvestigationError {
        InvestigationError::Cancelled(self.params.timeout.unwrap_or_default())
    }
}
