//! cmem-query - run SPARQL queries against eccenca Corporate Memory.

mod cli;

use cli::Cli;
use cmem_query_runner::config::{CmemConfig, Config};
use cmem_query_runner::environment::{export_lines, ProcessEnvironment};
use cmem_query_runner::error::{Result, RunnerError};
use cmem_query_runner::logging;
use cmem_query_runner::registry::Registry;
use cmem_query_runner::result::TabularResult;
use cmem_query_runner::runner::{CorporateMemoryRunner, RUNNER_TYPE};
use cmem_query_runner::schema::configuration_schema;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse_args();
    logging::init_stderr_logging(cli.quiet);

    if let Err(e) = run(cli).await {
        error!("{}: {}", e.category(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    if cli.schema {
        println!("{}", to_pretty_json(&configuration_schema())?);
        return Ok(());
    }

    // Load configuration file
    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let config = Config::load_from_file(&config_path)?;

    let source = resolve_source(&cli, &config)?;

    if cli.export {
        for line in export_lines(&source, false) {
            println!("{line}");
        }
        return Ok(());
    }

    let mut options = config.runner.clone();
    if let Some(policy) = cli.parse_policy().map_err(RunnerError::config)? {
        options.policy = policy;
    }
    if cli.stage_environment {
        options.stage_environment = true;
    }

    info!("Connection: {}", source.display_string());
    let mut registry = Registry::new();
    registry.register(Box::new(CorporateMemoryRunner::new(source, options)));

    if cli.info {
        println!("{}", to_pretty_json(&registry.descriptors())?);
        return Ok(());
    }

    let runner = registry.get(RUNNER_TYPE).ok_or_else(|| {
        let reason = registry
            .disabled()
            .find(|(runner_type, _)| *runner_type == RUNNER_TYPE)
            .map(|(_, reason)| reason.to_string())
            .unwrap_or_else(|| "not registered".to_string());
        RunnerError::unavailable(reason)
    })?;

    if cli.test_connection {
        runner.test_connection().await?;
        println!("Connection OK");
        return Ok(());
    }

    let query = cli
        .read_query()?
        .ok_or_else(|| RunnerError::config("No query given. Pass QUERY or --file."))?;

    let (data, error) = runner.run_query(&query).await?;
    if let Some(message) = error {
        return Err(RunnerError::query(message));
    }

    if cli.pretty {
        let result: TabularResult = serde_json::from_str(&data)
            .map_err(|e| RunnerError::internal(format!("Invalid result JSON: {e}")))?;
        println!("{}", result.to_json_pretty()?);
    } else {
        println!("{data}");
    }

    Ok(())
}

/// Resolves the connection configuration from CLI args, config file, and environment.
///
/// Precedence: CLI arguments, then the named source, then the `default`
/// source from the config file, then environment variables.
fn resolve_source(cli: &Cli, config: &Config) -> Result<CmemConfig> {
    let mut source = config.resolve_source(cli.connection_name())?;

    if let Some(overrides) = cli.to_cmem_config() {
        source.merge(&overrides);
    }

    source.apply_env_defaults(&ProcessEnvironment);
    Ok(source)
}

fn to_pretty_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| RunnerError::internal(format!("Failed to serialize output: {e}")))
}
