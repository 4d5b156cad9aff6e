//! Game Hunter entry point.

use std::path::PathBuf;

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use game_hunter::config::SourceToggles;
use game_hunter::{needs_research, Column};
use game_hunter_cli::config::{load_or_default, resolve_config_path, write_default};
use game_hunter_cli::runner::{build_orchestrator, open_store};
use game_hunter_cli::titles::{parse_sources, read_titles_file, unique_titles};

#[derive(Parser)]
#[command(
    name = "game-hunter",
    about = "Collect storefront, review and encyclopedia info for a list of games",
    version
)]
struct Cli {
    /// Path to the JSON config file.
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search every stale title and store the results.
    Run {
        /// Game titles to search.
        titles: Vec<String>,

        /// File with one title per line.
        #[arg(long)]
        titles_file: Option<PathBuf>,

        /// Comma-separated sources to use (steam, opencritic, wikipedia).
        #[arg(long)]
        only: Option<String>,

        /// Override the staleness threshold in days.
        #[arg(long)]
        staleness_days: Option<u32>,

        /// Print the run summary as JSON on stdout.
        #[arg(long)]
        json: bool,
    },

    /// List stored titles with their last update and stale flag.
    Status,

    /// Print one stored field.
    ///
    /// Examples:
    ///   game-hunter field "Hades" "Steam: All Reviews - Score"
    ///   game-hunter field "Hades" WikiReleaseDate
    Field {
        title: String,
        /// Column label or database column name.
        column: String,
    },

    /// Dump every (id, title) pair as JSON.
    Dump,

    /// List the available column labels.
    Columns,

    /// Write a config file with the default settings.
    InitConfig {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completion scripts.
    ///
    /// Examples:
    ///   game-hunter completions bash > ~/.local/share/bash-completion/completions/game-hunter
    ///   game-hunter completions zsh > ~/.zfunc/_game-hunter
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config_path = resolve_config_path(cli.config.as_deref());

    match cli.command {
        Commands::Run {
            titles,
            titles_file,
            only,
            staleness_days,
            json,
        } => {
            if !config_path.exists() {
                match write_default(&config_path, false) {
                    Ok(()) => tracing::info!("Wrote default config to {}", config_path.display()),
                    Err(e) => tracing::warn!("Could not write default config: {e:#}"),
                }
            }
            let mut config = load_or_default(&config_path)?;
            if let Some(list) = only {
                config.sources = SourceToggles::only(&parse_sources(&list)?);
            }
            if let Some(days) = staleness_days {
                config.staleness_days = days;
            }

            let mut all = titles;
            if let Some(path) = titles_file {
                all.extend(read_titles_file(&path)?);
            }
            let all = unique_titles(all);
            if all.is_empty() {
                anyhow::bail!("no titles given (pass titles or --titles-file)");
            }

            let mut orchestrator = build_orchestrator(&config)?;
            let summary = orchestrator.run(all.as_slice()).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                for outcome in &summary.searched {
                    let sources: Vec<String> = outcome
                        .found
                        .iter()
                        .map(|(source, found)| {
                            format!("{}={}", source.site(), if *found { "found" } else { "missing" })
                        })
                        .collect();
                    println!("{}: {}", outcome.title, sources.join(" "));
                }
                for title in &summary.skipped {
                    println!("{title}: skipped (fresh)");
                }
                if summary.store_errors > 0 {
                    eprintln!("{} store errors, see log", summary.store_errors);
                }
            }
        }

        Commands::Status => {
            let config = load_or_default(&config_path)?;
            let store = open_store(&config)?;
            let today = chrono::Local::now().date_naive();
            for (_, title) in store.all_titles()? {
                let game = store.game(&title)?;
                let last = game
                    .last_update
                    .map(|d| d.format(game_hunter::store::DATE_FORMAT).to_string())
                    .unwrap_or_else(|| "never".to_string());
                let stale = needs_research(game.last_update, config.staleness_days, today);
                println!(
                    "{:>4}  {}  last update: {last}{}",
                    game.id,
                    game.title,
                    if stale { "  (stale)" } else { "" }
                );
            }
        }

        Commands::Field { title, column } => {
            let config = load_or_default(&config_path)?;
            let store = open_store(&config)?;
            let value = store
                .get_field_by_label(&title, &column)
                .with_context(|| format!("cannot read '{column}' for '{title}'"))?;
            match value {
                Some(v) => println!("{v}"),
                None => {
                    eprintln!("'{column}' has not been collected for '{title}'");
                    std::process::exit(1);
                }
            }
        }

        Commands::Dump => {
            let config = load_or_default(&config_path)?;
            let store = open_store(&config)?;
            let rows: Vec<serde_json::Value> = store
                .all_titles()?
                .into_iter()
                .map(|(id, title)| serde_json::json!({ "id": id, "title": title }))
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }

        Commands::Columns => {
            for column in Column::ALL {
                println!("{:<32} {}", column.label(), column.db_name());
            }
        }

        Commands::InitConfig { force } => {
            write_default(&config_path, force)?;
            println!("Wrote default config to {}", config_path.display());
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "game-hunter", &mut std::io::stdout());
        }
    }

    Ok(())
}
