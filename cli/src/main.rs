//! CLI entrypoint for sherlock
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

mod logging;

use anyhow::{Result, bail};
use clap::Parser;
use sherlock_application::{
    AgentFactory, InvestigateUseCase, InvestigationInput, NoTraceSink, SwarmParams, TraceSink,
};
use sherlock_infrastructure::{ConfigLoader, FileConfig, JsonlTraceSink, McpSessionFactory};
use sherlock_presentation::{Cli, ConsoleFormatter, ProgressReporter, ToolServer};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::BufReader;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_deref());
        return Ok(ExitCode::SUCCESS);
    }

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())
            .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?
    };
    config.validate()?;

    let log_file = cli
        .log_file
        .clone()
        .or_else(|| config.logging.file.clone())
        .or_else(|| cli.serve.then(logging::default_server_log).flatten());
    let _log_guard = logging::init(cli.verbose, log_file.as_deref())?;

    info!("Starting sherlock");

    let mut params = config.swarm.to_params();
    if let Some(max) = cli.max_handoffs {
        params = params.with_max_handoffs(max);
    }
    if let Some(seconds) = cli.timeout {
        params = params.with_timeout(Some(Duration::from_secs(seconds)));
    }

    // === Dependency Injection ===
    let use_case = Arc::new(build_use_case(&config, params, cli.trace).await?);

    if cli.serve {
        let server = ToolServer::new(use_case);
        server
            .serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
            .await?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(query) = cli.query else {
        bail!("A query is required. Use --serve to run as a tool server.");
    };

    let mut input = InvestigationInput::new(query);
    if let Some(backend) = cli.diagnostic_agent {
        input = input.with_backend(backend);
    }

    let outcome = if cli.quiet {
        use_case.execute(input).await
    } else {
        let progress = ProgressReporter::new();
        use_case.execute_with_progress(input, &progress).await
    };

    match outcome {
        Ok(output) => {
            println!("{}", ConsoleFormatter::render(&output, cli.output));
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("{}", ConsoleFormatter::format_failure_colored(&e));
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn build_use_case(
    config: &FileConfig,
    params: SwarmParams,
    trace: bool,
) -> Result<InvestigateUseCase> {
    let sessions = Arc::new(McpSessionFactory::new(
        config.backends.clone(),
        config.aws.clone(),
    ));

    let trace_sink: Arc<dyn TraceSink> = if trace || config.trace.enabled {
        match config.trace.resolved_path().and_then(JsonlTraceSink::new) {
            Some(sink) => {
                info!(path = %sink.path().display(), "Tracing investigations");
                Arc::new(sink)
            }
            None => {
                warn!("Trace file unavailable; tracing disabled");
                Arc::new(NoTraceSink)
            }
        }
    } else {
        Arc::new(NoTraceSink)
    };

    let agents = build_agent_factory(config, params.max_tool_turns).await?;

    Ok(InvestigateUseCase::new(sessions, agents, trace_sink).with_params(params))
}

#[cfg(feature = "bedrock")]
async fn build_agent_factory(
    config: &FileConfig,
    max_tool_turns: usize,
) -> Result<Arc<dyn AgentFactory>> {
    use sherlock_application::LlmAgentFactory;
    use sherlock_infrastructure::{BedrockConfig, BedrockLlmGateway};

    let gateway = BedrockLlmGateway::new(&BedrockConfig {
        region: config.aws.region.clone(),
        profile: config.aws.profile.clone(),
        model_id: config.model.model_id.clone(),
        max_tokens: config.model.max_tokens,
    })
    .await?;

    Ok(Arc::new(LlmAgentFactory::new(
        Arc::new(gateway),
        max_tool_turns,
    )))
}

#[cfg(not(feature = "bedrock"))]
async fn build_agent_factory(
    _config: &FileConfig,
    _max_tool_turns: usize,
) -> Result<Arc<dyn AgentFactory>> {
    bail!("sherlock was built without a reasoning backend; rebuild with `--features bedrock`")
}
