use anyhow::{Context as AnyhowContext, Result};
use clap::{Args, Parser, Subcommand};
use config::AppConfig;
use console::{print_stdout, ConsoleSink};
use log::info;
use repolink_git::GitCliProvider;
use repolink_protocol::{parse_link_uri, serialize_json, FollowUp, LinkEvent};
use repolink_resolver::{Engine, Outcome, RepositoryProvider, Submission};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

mod config;
mod console;

#[derive(Parser)]
#[command(name = "repolink")]
#[command(about = "Resolve repository deep links against local clones", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (TOML or JSON); overrides REPOLINK_CONFIG
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Additional repository to consider (repeatable, listed before discovered ones)
    #[arg(long = "repo", global = true)]
    repos: Vec<PathBuf>,

    /// Additional directory to scan for repositories (repeatable)
    #[arg(long = "search-root", global = true)]
    search_roots: Vec<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a deep link and print the follow-up action
    Resolve(UriArgs),

    /// Parse a deep link and print it as JSON
    Parse(UriArgs),

    /// List the repositories deep links are matched against
    Repos,

    /// Print JSON schemas for link events and follow-up actions
    Schema,
}

#[derive(Args)]
struct UriArgs {
    /// Deep link, e.g. vscode://eamodio.gitlens/repolink/<repoId>/branch/<name>?url=<remote>
    uri: String,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    match &cli.command {
        Commands::Parse(args) => run_parse(args),
        Commands::Resolve(args) => run_resolve(&cli, args).await,
        Commands::Repos => run_repos(&cli).await,
        Commands::Schema => run_schema(),
    }
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = AppConfig::load(cli.config.as_deref())?;
    config.git.repositories.extend(cli.repos.iter().cloned());
    config.git.search_roots.extend(cli.search_roots.iter().cloned());
    Ok(config)
}

fn run_parse(args: &UriArgs) -> Result<ExitCode> {
    let event = parse_link_uri(&args.uri).context("Failed to parse deep link")?;
    print_stdout(&serialize_json(&event)?);
    Ok(ExitCode::SUCCESS)
}

async fn run_resolve(cli: &Cli, args: &UriArgs) -> Result<ExitCode> {
    let config = load_config(cli)?;
    let event = parse_link_uri(&args.uri).context("Failed to parse deep link")?;

    let provider = GitCliProvider::new(config.git).context("Invalid git provider config")?;
    let engine = Engine::with_config(Arc::new(provider), Arc::new(ConsoleSink), config.resolver)
        .context("Invalid resolver config")?;

    let submission = engine.submit(event).await;
    info!("resolution finished: {submission:?}");
    Ok(match submission {
        Submission::Completed(Outcome::Resolved) => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    })
}

async fn run_repos(cli: &Cli) -> Result<ExitCode> {
    let config = load_config(cli)?;
    let provider = GitCliProvider::new(config.git).context("Invalid git provider config")?;
    let repos = provider
        .repositories()
        .await
        .context("Failed to list repositories")?;
    print_stdout(&serde_json::to_string(&repos)?);
    Ok(ExitCode::SUCCESS)
}

fn run_schema() -> Result<ExitCode> {
    let schemas = serde_json::json!({
        "link_event": schemars::schema_for!(LinkEvent),
        "follow_up": schemars::schema_for!(FollowUp),
    });
    print_stdout(&serde_json::to_string_pretty(&schemas)?);
    Ok(ExitCode::SUCCESS)
}
