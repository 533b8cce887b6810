//! `fxa` binary: serve the currency-exchange agent, or print the provisioning plan

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use fxa_agent::AgentRuntime;
use fxa_core::FxConfig;
use fxa_provision::{ProvisioningInputs, ResourceKind};
use fxa_telemetry::LogFormat;
use std::path::PathBuf;
use std::sync::Arc;

/// Currency-exchange agent service
#[derive(Parser, Debug)]
#[command(name = "fxa", author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP service (default)
    Serve(ServeArgs),

    /// Print the resource graph for an environment as JSON
    Plan(PlanArgs),
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Bind host; overrides BIND_HOST/HOST
    #[arg(long)]
    host: Option<String>,

    /// Bind port; overrides PORT
    #[arg(long)]
    port: Option<u16>,

    /// Configuration file (defaults to the nearest fxa.toml)
    #[arg(long, env = "FXA_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct PlanArgs {
    #[arg(long, env = "AZURE_ENV_NAME")]
    environment: String,

    #[arg(long, env = "AZURE_LOCATION", default_value = "eastus")]
    location: String,

    #[arg(long, env = "AZURE_SUBSCRIPTION_ID", default_value = "00000000-0000-0000-0000-000000000000")]
    subscription_id: String,

    /// Defaults to `rg-<environment>`
    #[arg(long, env = "AZURE_RESOURCE_GROUP")]
    resource_group: Option<String>,

    #[arg(long)]
    no_ai_project: bool,

    #[arg(long)]
    no_registry: bool,

    #[arg(long)]
    no_monitoring: bool,

    #[arg(long, env = "AZURE_EXISTING_AI_ACCOUNT_ID")]
    existing_ai_account_id: Option<String>,

    #[arg(long, env = "AZURE_EXISTING_REGISTRY_ID")]
    existing_registry_id: Option<String>,

    /// Name of the container app
    #[arg(long)]
    app_name: Option<String>,
}

fn main() {
    // A missing .env is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let result = match cli.command {
        Some(Command::Plan(args)) => run_plan(args),
        Some(Command::Serve(args)) => run_serve(args),
        None => run_serve(ServeArgs::default()),
    };

    if let Err(e) = result {
        eprintln!("fxa: {:#}", e);
        std::process::exit(1);
    }
}

fn run_plan(args: PlanArgs) -> Result<()> {
    let resource_group = args
        .resource_group
        .unwrap_or_else(|| format!("rg-{}", args.environment));
    let mut inputs = ProvisioningInputs::new(
        args.environment,
        args.location,
        args.subscription_id,
        resource_group,
    );
    inputs.create_ai_project = !args.no_ai_project;
    inputs.create_registry = !args.no_registry;
    inputs.enable_monitoring = !args.no_monitoring;
    inputs.existing_ai_account_id = args.existing_ai_account_id;
    inputs.existing_registry_id = args.existing_registry_id;
    if let Some(name) = args.app_name {
        inputs = inputs.with_override(ResourceKind::ContainerApp, name);
    }
    inputs.validate()?;

    let graph = fxa_provision::plan(&inputs);
    println!("{}", graph.to_json_pretty()?);
    Ok(())
}

fn run_serve(args: ServeArgs) -> Result<()> {
    let mut config =
        FxConfig::load_from(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start tokio runtime")?;
    runtime.block_on(serve(config))
}

async fn serve(config: FxConfig) -> Result<()> {
    // Telemetry first, so the logging layer can bridge into it
    let tracer = fxa_telemetry::attach(&config.telemetry);
    fxa_telemetry::init_logging(tracer.as_ref(), LogFormat::from_env())?;
    if let Some(status) = fxa_telemetry::status() {
        status.log();
    }

    let agent_runtime = Arc::new(AgentRuntime::from_config(&config, tracer)?);
    tracing::info!(
        agent = %agent_runtime.agent_name(),
        degraded = agent_runtime.is_degraded(),
        "Agent runtime ready"
    );

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(address = %addr, "Listening");

    let router = fxa_server::create_router(agent_runtime);
    let served = fxa_server::serve(listener, router, fxa_server::shutdown_signal()).await;

    // Flushing blocks on the batch processor
    if let Err(e) = tokio::task::spawn_blocking(fxa_telemetry::shutdown).await {
        tracing::warn!(error = %e, "Telemetry shutdown task failed");
    }

    served.context("Server error")?;
    tracing::info!("Server stopped");
    Ok(())
}
