//! Builds unopened MCP sessions from the `[backends]` configuration.
//!
//! | Domain | Backend | Server |
//! |--------|---------|--------|
//! | diagnostic | `k8sgpt` | `k8sgpt serve --mcp` |
//! | diagnostic | `eks-mcp` | `awslabs/eks-mcp-server` |
//! | observability | any | `awslabs/cloudwatch-mcp-server` |
//! | persistence | any | `awslabs/dynamodb-mcp-server` |
//!
//! Docker servers receive AWS credentials by *name* (`--env AWS_ACCESS_KEY_ID`)
//! so secrets never appear on a command line, and `~/.aws` read-only for
//! profile-based credentials.

use crate::config::{FileAwsConfig, FileBackendConfig, FileBackendsConfig};
use crate::mcp::{McpServerSpec, McpStdioSession};
use sherlock_application::{SessionFactoryError, ToolSessionFactory};
use sherlock_domain::{AgentDomain, DiagnosticBackend, ToolSession};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Credential variables forwarded from the host into docker servers
const FORWARDED_AWS_ENV: [&str; 4] = [
    "AWS_REGION",
    "AWS_ACCESS_KEY_ID",
    "AWS_SECRET_ACCESS_KEY",
    "AWS_SESSION_TOKEN",
];

/// Configuration key of the server serving `domain`
pub fn backend_id(domain: AgentDomain, backend: DiagnosticBackend) -> &'static str {
    match (domain, backend) {
        (AgentDomain::Diagnostic, DiagnosticBackend::K8sGpt) => "k8sgpt",
        (AgentDomain::Diagnostic, DiagnosticBackend::EksMcp) => "eks_mcp",
        (AgentDomain::Observability, _) => "cloudwatch",
        (AgentDomain::Persistence, _) => "dynamodb",
    }
}

pub fn display_name(id: &str) -> &'static str {
    match id {
        "k8sgpt" => "K8sGPT",
        "eks_mcp" => "EKS MCP",
        "cloudwatch" => "CloudWatch",
        "dynamodb" => "DynamoDB",
        _ => "MCP server",
    }
}

/// [`ToolSessionFactory`] producing [`McpStdioSession`]s.
pub struct McpSessionFactory {
    backends: FileBackendsConfig,
    aws: FileAwsConfig,
    home: Option<PathBuf>,
}

impl McpSessionFactory {
    pub fn new(backends: FileBackendsConfig, aws: FileAwsConfig) -> Self {
        Self {
            backends,
            aws,
            home: dirs::home_dir(),
        }
    }

    /// Override the directory whose `.aws` is mounted into docker servers
    pub fn with_home(mut self, home: Option<PathBuf>) -> Self {
        self.home = home;
        self
    }

    /// Describe how to start the server for `domain`.
    pub fn server_spec(
        &self,
        domain: AgentDomain,
        backend: DiagnosticBackend,
    ) -> Result<McpServerSpec, SessionFactoryError> {
        let id = backend_id(domain, backend);
        let config = self.backends.get(id).ok_or_else(|| SessionFactoryError {
            domain,
            reason: format!("backends.{} is not configured", id),
        })?;

        let spec = match (&config.image, &config.command) {
            (Some(image), _) => self.docker_spec(id, image, config),
            (None, Some(command)) => McpServerSpec::new(id, display_name(id), command)
                .with_args(config.args.iter().cloned()),
            (None, None) => {
                return Err(SessionFactoryError {
                    domain,
                    reason: format!("backends.{}: either command or image must be set", id),
                });
            }
        };

        let spec = self
            .aws_env()
            .chain(config.env.iter().map(|(k, v)| (k.clone(), v.clone())))
            .fold(spec, |spec, (key, value)| spec.with_env(key, value));

        Ok(spec
            .with_startup_timeout(Duration::from_secs(config.startup_timeout_seconds))
            .with_request_timeout(Duration::from_secs(config.request_timeout_seconds)))
    }

    fn aws_env(&self) -> impl Iterator<Item = (String, String)> + '_ {
        std::iter::once(("AWS_REGION".to_string(), self.aws.region.clone())).chain(
            self.aws
                .profile
                .iter()
                .map(|profile| ("AWS_PROFILE".to_string(), profile.clone())),
        )
    }

    fn docker_spec(&self, id: &str, image: &str, config: &FileBackendConfig) -> McpServerSpec {
        let mut args: Vec<String> = vec!["run".into(), "--rm".into(), "--interactive".into()];

        let forwarded = FORWARDED_AWS_ENV
            .iter()
            .map(|name| name.to_string())
            .chain(self.aws.profile.iter().map(|_| "AWS_PROFILE".to_string()))
            .chain(config.env.keys().cloned());
        for name in forwarded {
            args.push("--env".into());
            args.push(name);
        }
        args.push("--env".into());
        args.push("FASTMCP_LOG_LEVEL=ERROR".into());

        if let Some(home) = &self.home {
            args.push("--volume".into());
            args.push(format!("{}:/root/.aws:ro", home.join(".aws").display()));
        }

        args.push(image.to_string());
        args.extend(config.args.iter().cloned());

        McpServerSpec::new(id, display_name(id), "docker").with_args(args)
    }
}

impl ToolSessionFactory for McpSessionFactory {
    fn create(
        &self,
        domain: AgentDomain,
        backend: DiagnosticBackend,
    ) -> Result<Arc<dyn ToolSession>, SessionFactoryError> {
        let spec = self.server_spec(domain, backend)?;
        debug!(
            domain = domain.as_str(),
            session = %spec.id,
            command = %spec.command_line(),
            "Tool session described"
        );
        Ok(Arc::new(McpStdioSession::new(spec)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn factory() -> McpSessionFactory {
        McpSessionFactory::new(FileBackendsConfig::default(), FileAwsConfig::default())
            .with_home(Some(PathBuf::from("/home/sre")))
    }

    #[test]
    fn test_backend_ids() {
        assert_eq!(
            backend_id(AgentDomain::Diagnostic, DiagnosticBackend::K8sGpt),
            "k8sgpt"
        );
        assert_eq!(
            backend_id(AgentDomain::Diagnostic, DiagnosticBackend::EksMcp),
            "eks_mcp"
        );
        for backend in DiagnosticBackend::ALL {
            assert_eq!(backend_id(AgentDomain::Observability, backend), "cloudwatch");
            assert_eq!(backend_id(AgentDomain::Persistence, backend), "dynamodb");
        }
    }

    #[test]
    fn test_k8sgpt_runs_locally() {
        let spec = factory()
            .server_spec(AgentDomain::Diagnostic, DiagnosticBackend::K8sGpt)
            .unwrap();
        assert_eq!(spec.id, "k8sgpt");
        assert_eq!(spec.display_name, "K8sGPT");
        assert_eq!(spec.command_line(), "k8sgpt serve --mcp");
        assert_eq!(spec.startup_timeout, Duration::from_secs(30));
        assert!(spec.env.contains(&("AWS_REGION".into(), "us-east-1".into())));
    }

    #[test]
    fn test_eks_runs_in_docker() {
        let spec = factory()
            .server_spec(AgentDomain::Diagnostic, DiagnosticBackend::EksMcp)
            .unwrap();
        assert_eq!(spec.command, "docker");
        assert_eq!(spec.startup_timeout, Duration::from_secs(120));
        assert_eq!(&spec.args[..3], ["run", "--rm", "--interactive"]);
        assert!(spec.command_line().contains("--env AWS_SECRET_ACCESS_KEY --env"));
        assert!(spec.command_line().contains("--env FASTMCP_LOG_LEVEL=ERROR"));
        assert!(
            spec.command_line()
                .contains("--volume /home/sre/.aws:/root/.aws:ro")
        );
        // The image comes last, followed by its own arguments
        assert_eq!(
            &spec.args[spec.args.len() - 2..],
            ["awslabs/eks-mcp-server:latest", "--allow-sensitive-data-access"]
        );
    }

    #[test]
    fn test_secrets_stay_off_the_command_line() {
        let mut backends = FileBackendsConfig::default();
        backends.dynamodb.env = BTreeMap::from([("DDB_TOKEN".to_string(), "s3cr3t".to_string())]);
        let aws = FileAwsConfig {
            region: "eu-west-1".into(),
            profile: Some("sre".into()),
        };
        let spec = McpSessionFactory::new(backends, aws)
            .with_home(None)
            .server_spec(AgentDomain::Persistence, DiagnosticBackend::K8sGpt)
            .unwrap();

        let line = spec.command_line();
        assert!(line.contains("--env DDB_TOKEN "));
        assert!(line.contains("--env AWS_PROFILE "));
        assert!(!line.contains("s3cr3t"));
        assert!(!line.contains("--volume"));
        assert!(spec.env.contains(&("DDB_TOKEN".into(), "s3cr3t".into())));
        assert!(spec.env.contains(&("AWS_REGION".into(), "eu-west-1".into())));
        assert!(spec.env.contains(&("AWS_PROFILE".into(), "sre".into())));
    }

    #[test]
    fn test_missing_launcher() {
        let mut backends = FileBackendsConfig::default();
        backends.cloudwatch.image = None;
        let err = McpSessionFactory::new(backends, FileAwsConfig::default())
            .server_spec(AgentDomain::Observability, DiagnosticBackend::K8sGpt)
            .unwrap_err();
        assert_eq!(err.domain, AgentDomain::Observability);
        assert!(err.reason.contains("backends.cloudwatch"));
    }

    #[test]
    fn test_create_does_not_open() {
        let session = factory()
            .create(AgentDomain::Observability, DiagnosticBackend::K8sGpt)
            .unwrap();
        assert_eq!(session.id(), "cloudwatch");
        assert_eq!(session.display_name(), "CloudWatch");
        assert!(!session.is_open());
    }
}
