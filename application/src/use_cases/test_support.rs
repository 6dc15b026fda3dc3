//! Deterministic agents and spy sessions shared by the use case tests.

use crate::ports::session_factory::{SessionFactoryError, ToolSessionFactory};
use crate::ports::swarm_agent::{AgentError, AgentFactory, SwarmAgent};
use async_trait::async_trait;
use sherlock_domain::{
    AgentDescriptor, AgentDomain, AgentName, AgentOutcome, DiagnosticBackend, OperationDescriptor,
    SessionError, SharedContext, ToolCall, ToolCatalog, ToolResult, ToolSession,
};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ==================== Agents ====================

pub(crate) struct ScriptedAgent {
    name: AgentName,
    domain: AgentDomain,
    script: Mutex<VecDeque<Result<AgentOutcome, String>>>,
    repeat: Option<AgentOutcome>,
    delay: Option<Duration>,
    calls: Arc<AtomicUsize>,
    seen: Arc<Mutex<Vec<SharedContext>>>,
}

impl ScriptedAgent {
    pub(crate) fn new(name: &str, domain: AgentDomain) -> Self {
        Self {
            name: AgentName::new(name),
            domain,
            script: Mutex::new(VecDeque::new()),
            repeat: None,
            delay: None,
            calls: Arc::new(AtomicUsize::new(0)),
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub(crate) fn then_answer(self, content: &str) -> Self {
        self.push(Ok(AgentOutcome::answer(content)))
    }

    pub(crate) fn then_hand_off(self, target: &str, rationale: &str) -> Self {
        self.push(Ok(AgentOutcome::hand_off(target, rationale)))
    }

    pub(crate) fn then_fail(self, message: &str) -> Self {
        self.push(Err(message.to_string()))
    }

    /// Hand off on every activation once the script runs out
    pub(crate) fn always_hand_off(mut self, target: &str, rationale: &str) -> Self {
        self.repeat = Some(AgentOutcome::hand_off(target, rationale));
        self
    }

    /// Sleep before every activation
    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn call_counter(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }

    pub(crate) fn seen_contexts(&self) -> Arc<Mutex<Vec<SharedContext>>> {
        self.seen.clone()
    }

    fn push(self, step: Result<AgentOutcome, String>) -> Self {
        self.script.lock().unwrap().push_back(step);
        self
    }
}

#[async_trait]
impl SwarmAgent for ScriptedAgent {
    fn name(&self) -> &AgentName {
        &self.name
    }

    fn domain(&self) -> AgentDomain {
        self.domain
    }

    async fn act(&self, context: &SharedContext) -> Result<AgentOutcome, AgentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.seen.lock().unwrap().push(context.clone());
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(step) => step.map_err(AgentError::Other),
            None => self
                .repeat
                .clone()
                .ok_or_else(|| AgentError::Other(format!("{} has no scripted step", self.name))),
        }
    }
}

/// Hands out pre-scripted agents and records which session each was bound to
#[derive(Default)]
pub(crate) struct ScriptedAgentFactory {
    prepared: Mutex<HashMap<String, ScriptedAgent>>,
    pub(crate) bindings: Mutex<Vec<(String, String)>>,
}

impl ScriptedAgentFactory {
    pub(crate) fn with(self, agent: ScriptedAgent) -> Self {
        self.prepared
            .lock()
            .unwrap()
            .insert(agent.name.as_str().to_string(), agent);
        self
    }
}

impl AgentFactory for ScriptedAgentFactory {
    fn build(
        &self,
        descriptor: AgentDescriptor,
        session: Arc<dyn ToolSession>,
        _catalog: ToolCatalog,
        _peers: Vec<AgentName>,
    ) -> Arc<dyn SwarmAgent> {
        self.bindings.lock().unwrap().push((
            descriptor.name.as_str().to_string(),
            session.id().to_string(),
        ));
        let agent = self
            .prepared
            .lock()
            .unwrap()
            .remove(descriptor.name.as_str())
            .unwrap_or_else(|| ScriptedAgent::new(descriptor.name.as_str(), descriptor.domain));
        Arc::new(agent)
    }
}

// ==================== Sessions ====================

/// Shared, ordered log of successful opens and releases: "open:id", "close:id"
pub(crate) type SessionLog = Arc<Mutex<Vec<String>>>;

#[derive(Debug, Clone, Copy, PartialEq)]
enum SpyState {
    Idle,
    Open,
    Closed,
}

pub(crate) struct SpySession {
    id: String,
    operations: Vec<String>,
    open_error: Option<SessionError>,
    open_delay: Option<Duration>,
    state: Mutex<SpyState>,
    log: SessionLog,
}

impl SpySession {
    pub(crate) fn new(id: &str, log: SessionLog) -> Self {
        Self {
            id: id.to_string(),
            operations: vec![format!("{}_query", id)],
            open_error: None,
            open_delay: None,
            state: Mutex::new(SpyState::Idle),
            log,
        }
    }

    pub(crate) fn failing(mut self, error: SessionError) -> Self {
        self.open_error = Some(error);
        self
    }

    pub(crate) fn slow(mut self, delay: Duration) -> Self {
        self.open_delay = Some(delay);
        self
    }

    pub(crate) fn without_operations(mut self) -> Self {
        self.operations.clear();
        self
    }

    fn catalog(&self) -> ToolCatalog {
        ToolCatalog::new(
            self.operations
                .iter()
                .map(|op| OperationDescriptor::new(op, "spy operation"))
                .collect(),
        )
    }
}

#[async_trait]
impl ToolSession for SpySession {
    fn id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.id
    }

    fn startup_timeout(&self) -> Duration {
        Duration::from_millis(200)
    }

    async fn open(&self) -> Result<ToolCatalog, SessionError> {
        if let Some(delay) = self.open_delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(err) = &self.open_error {
            return Err(err.clone());
        }
        *self.state.lock().unwrap() = SpyState::Open;
        self.log.lock().unwrap().push(format!("open:{}", self.id));
        Ok(self.catalog())
    }

    fn list_operations(&self) -> Result<ToolCatalog, SessionError> {
        match *self.state.lock().unwrap() {
            SpyState::Idle => Err(SessionError::NotOpen),
            SpyState::Closed => Err(SessionError::Closed),
            SpyState::Open => Ok(self.catalog()),
        }
    }

    async fn invoke(&self, call: &ToolCall) -> Result<ToolResult, SessionError> {
        self.list_operations()?;
        Ok(ToolResult::success(
            &call.tool_name,
            format!("{}:{}", self.id, call.tool_name),
        ))
    }

    async fn close(&self) -> Result<(), SessionError> {
        let mut state = self.state.lock().unwrap();
        if *state == SpyState::Open {
            *state = SpyState::Closed;
            self.log.lock().unwrap().push(format!("close:{}", self.id));
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        *self.state.lock().unwrap() == SpyState::Open
    }
}

/// Session id used for each domain
pub(crate) fn session_id(domain: AgentDomain, backend: DiagnosticBackend) -> &'static str {
    match domain {
        AgentDomain::Diagnostic => backend.as_str(),
        AgentDomain::Observability => "cloudwatch",
        AgentDomain::Persistence => "dynamodb",
    }
}

/// Builds spy sessions, optionally breaking one domain
#[derive(Default)]
pub(crate) struct SpySessionFactory {
    pub(crate) log: SessionLog,
    pub(crate) created: AtomicUsize,
    failing: Option<(AgentDomain, SessionError)>,
    slow: Option<(AgentDomain, Duration)>,
    empty: Option<AgentDomain>,
}

impl SpySessionFactory {
    pub(crate) fn failing(mut self, domain: AgentDomain, error: SessionError) -> Self {
        self.failing = Some((domain, error));
        self
    }

    pub(crate) fn slow(mut self, domain: AgentDomain, delay: Duration) -> Self {
        self.slow = Some((domain, delay));
        self
    }

    pub(crate) fn empty(mut self, domain: AgentDomain) -> Self {
        self.empty = Some(domain);
        self
    }

    pub(crate) fn events(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

impl ToolSessionFactory for SpySessionFactory {
    fn create(
        &self,
        domain: AgentDomain,
        backend: DiagnosticBackend,
    ) -> Result<Arc<dyn ToolSession>, SessionFactoryError> {
        self.created.fetch_add(1, Ordering::SeqCst);
        let mut session = SpySession::new(session_id(domain, backend), self.log.clone());
        if let Some((d, err)) = &self.failing
            && *d == domain
        {
            session = session.failing(err.clone());
        }
        if let Some((d, delay)) = &self.slow
            && *d == domain
        {
            session = session.slow(*delay);
        }
        if self.empty == Some(domain) {
            session = session.without_operations();
        }
        Ok(Arc::new(session))
    }
}
