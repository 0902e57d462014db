mod render;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use cobot_agent::{Agent, AgentOptions, DEFAULT_MINIMUM_SCORE, DEFAULT_STORAGE_PATH};
use cobot_catalog::GitCatalog;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser)]
#[command(name = "cobot")]
#[command(about = "Match free-text requests to a catalog of named actions", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Storage directory (must be inside a git work tree)
    #[arg(
        long,
        short = 'd',
        global = true,
        env = "COBOT_STORAGE_PATH",
        default_value = DEFAULT_STORAGE_PATH
    )]
    storage_path: PathBuf,

    /// Stemming language (defaults to agent.language, then english)
    #[arg(long, short = 'g', global = true, env = "COBOT_LANGUAGE")]
    language: Option<String>,

    /// Minimum cosine similarity for a description match
    #[arg(
        long,
        short = 'r',
        global = true,
        env = "COBOT_MINIMUM_SCORE",
        default_value_t = DEFAULT_MINIMUM_SCORE
    )]
    minimum_score: f64,

    /// Index cache directory (defaults to <storage>/local/cache)
    #[arg(long, global = true, env = "COBOT_CACHE_DIR")]
    cache_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Append log output to this file instead of stderr
    #[arg(long, short = 'l', global = true)]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the storage layout inside an existing git work tree
    Init,

    /// Interactive prompt: one request per line, empty line or EOF to quit
    Console,

    /// Rank actions against a request
    Query(QueryArgs),

    /// Rebuild the index for the current catalog version
    Rebuild,

    /// Show agent, catalog and index state
    Status(StatusArgs),
}

#[derive(Args)]
struct QueryArgs {
    /// Free-text request
    text: String,

    /// Maximum number of results
    #[arg(long, short = 'n')]
    limit: Option<usize>,

    /// Output JSON format
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct StatusArgs {
    /// Output JSON format
    #[arg(long)]
    json: bool,
}

pub async fn main_entry() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet, cli.log_file.as_deref())?;

    let options = AgentOptions {
        storage_path: cli.storage_path,
        language: cli.language,
        minimum_score: cli.minimum_score,
        cache_dir: cli.cache_dir,
    };
    options.validate().context("Invalid options")?;

    match cli.command {
        Commands::Init => run_init(options.storage_path).await?,
        Commands::Console => run_console(options).await?,
        Commands::Query(args) => run_query(options, args).await?,
        Commands::Rebuild => run_rebuild(options).await?,
        Commands::Status(args) => run_status(options, args).await?,
    }
    Ok(())
}

fn init_logging(verbose: bool, quiet: bool, log_file: Option<&Path>) -> Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    match log_file {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create log directory {}", parent.display())
                })?;
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        None => {
            builder.target(env_logger::Target::Stderr);
        }
    }
    builder.init();
    Ok(())
}

async fn open_agent(options: AgentOptions) -> Result<Agent> {
    let storage = options.storage_path.clone();
    tokio::task::spawn_blocking(move || Agent::open(options))
        .await
        .context("Agent initialization task failed")?
        .with_context(|| format!("Failed to open agent storage {}", storage.display()))
}

async fn run_init(storage: PathBuf) -> Result<()> {
    let created = tokio::task::spawn_blocking(move || -> Result<(PathBuf, Vec<PathBuf>)> {
        std::fs::create_dir_all(&storage)
            .with_context(|| format!("Failed to create {}", storage.display()))?;
        let catalog = GitCatalog::open(&storage).with_context(|| {
            format!(
                "{} is not inside a git work tree (run `git init` first)",
                storage.display()
            )
        })?;
        let created = catalog.init_layout().context("Failed to create storage layout")?;
        Ok((storage, created))
    })
    .await
    .context("Init task failed")??;

    let (storage, paths) = created;
    for path in &paths {
        println!("created {}", path.display());
    }
    println!("Storage ready at {}", storage.display());
    Ok(())
}

async fn run_console(options: AgentOptions) -> Result<()> {
    let agent = open_agent(options).await?;
    println!("{}", agent.greeting());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        match agent.dispatch(line) {
            Ok(dispatch) => println!("{}", render::dispatch_line(line, &dispatch)),
            Err(err) => {
                log::error!("Dispatch failed for {line:?}: {err}");
                println!("Error: {err}");
            }
        }
    }

    println!("{}", agent.farewell());
    Ok(())
}

async fn run_query(options: AgentOptions, args: QueryArgs) -> Result<()> {
    let minimum_score = options.minimum_score;
    let agent = open_agent(options).await?;
    let mut matches = agent
        .snapshot()
        .ranked_actions(&args.text, minimum_score)
        .context("Query failed")?;
    if let Some(limit) = args.limit {
        matches.truncate(limit);
    }

    if args.json {
        let output = render::QueryOutput {
            query: &args.text,
            minimum_score,
            matches: &matches,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print!("{}", render::matches_table(&matches));
    }
    Ok(())
}

async fn run_rebuild(options: AgentOptions) -> Result<()> {
    let agent = open_agent(options).await?;
    let snapshot = tokio::task::spawn_blocking(move || agent.rebuild())
        .await
        .context("Rebuild task failed")?
        .context("Rebuild failed")?;
    println!(
        "Rebuilt {} ({} terms, {} actions)",
        snapshot.artifact_path().display(),
        snapshot.term_count(),
        snapshot.actions().len()
    );
    Ok(())
}

async fn run_status(options: AgentOptions, args: StatusArgs) -> Result<()> {
    let agent = open_agent(options).await?;
    let status = tokio::task::spawn_blocking(move || agent.status())
        .await
        .context("Status task failed")?
        .context("Failed to read catalog status")?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        print!("{}", render::status_text(&status));
    }
    Ok(())
}
