//! fca - Collect the text files of a directory tree into one prompt-ready document.
//!
//! Usage:
//!   fca tree [ROOT]            Print the filtered directory tree
//!   fca concat [ROOT] [PATHS]  Concatenate the selected files into fenced blocks
//!   fca --help                 Show help

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use file_content_aggregator::app::{commands, view_model, AppState, UserEvent};
use file_content_aggregator::config::AppConfig;
use file_content_aggregator::core::TreeGenerator;

#[derive(Parser)]
#[command(
    name = "fca",
    version,
    about = "Collect the text files of a directory tree into one document",
    long_about = "fca walks a directory, hides dependency and build folders, and \
                  concatenates the selected text files into labeled, fenced blocks \
                  ready to paste into a prompt.\n\n\
                  Without ROOT, the last opened directory is used (if remembered), \
                  otherwise the current directory."
)]
struct Cli {
    /// Increase log output on stderr (-v for info, -vv for debug). RUST_LOG overrides it.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the directory tree, optionally filtered by name
    Tree {
        /// Root directory
        root: Option<PathBuf>,

        /// Only show entries whose name contains this text (case-insensitive)
        #[arg(short, long)]
        filter: Option<String>,

        /// Expand every directory instead of only the top level
        #[arg(short = 'a', long)]
        expand_all: bool,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },

    /// Concatenate the text files under the selected paths
    Concat {
        /// Root directory; labels are relative to it
        root: Option<PathBuf>,

        /// Files or directories to include (defaults to the whole root)
        paths: Vec<PathBuf>,

        /// Text placed before the content (defaults to the saved prompt)
        #[arg(short, long)]
        start_prompt: Option<String>,

        /// Text placed after the content (defaults to the saved prompt)
        #[arg(short, long)]
        end_prompt: Option<String>,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = AppConfig::load().unwrap_or_else(|e| {
        tracing::warn!("Could not load config, using defaults: {}", e);
        AppConfig::default()
    });
    let state = Arc::new(Mutex::new(AppState::new(config, None)));
    let (proxy, events) = mpsc::unbounded_channel::<UserEvent>();

    match cli.command {
        Command::Tree {
            root,
            filter,
            expand_all,
            format,
        } => {
            open_root(root, &proxy, &state)?;
            if let Some(filter) = filter {
                commands::update_filter(filter, proxy.clone(), state.clone());
            }
            if expand_all {
                commands::expand_all(proxy.clone(), state.clone());
            }
            print_tree(&state, format)?;
        }
        Command::Concat {
            root,
            paths,
            start_prompt,
            end_prompt,
            output,
        } => {
            let root = open_root(root, &proxy, &state)?;
            select_paths(&root, paths, &proxy, &state);
            override_prompts(start_prompt, end_prompt, &state);

            let text = run_aggregation(&proxy, &state, events).await?;
            write_output(&text, output.as_deref())?;
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Loads the requested root, the remembered one, or the current directory.
fn open_root(
    root: Option<PathBuf>,
    proxy: &mpsc::UnboundedSender<UserEvent>,
    state: &Arc<Mutex<AppState>>,
) -> Result<PathBuf> {
    let requested = match root {
        Some(path) => Some(path),
        None if commands::load_last_directory(proxy.clone(), state.clone()) => None,
        None => Some(PathBuf::from(".")),
    };

    if let Some(path) = requested {
        let canonical = std::fs::canonicalize(&path)
            .with_context(|| format!("Cannot open {}", path.display()))?;
        commands::select_directory(canonical, proxy.clone(), state.clone())
            .with_context(|| format!("Cannot open {}", path.display()))?;
    }

    let state_guard = state
        .lock()
        .expect("Mutex was poisoned. This should not happen.");
    match &state_guard.current_path {
        Some(root) => Ok(root.clone()),
        None => bail!("No directory selected"),
    }
}

fn print_tree(state: &Arc<Mutex<AppState>>, format: OutputFormat) -> Result<()> {
    let state_guard = state
        .lock()
        .expect("Mutex was poisoned. This should not happen.");
    let Some(root) = &state_guard.current_path else {
        bail!("No directory selected");
    };

    match format {
        OutputFormat::Text => {
            print!(
                "{}",
                TreeGenerator::render_ascii(
                    root,
                    &state_guard.visible_paths,
                    &state_guard.expanded_dirs
                )
            );
            eprintln!("{}", view_model::generate_ui_state(&state_guard).status_message);
        }
        OutputFormat::Json => {
            let ui_state = view_model::generate_ui_state(&state_guard);
            println!("{}", serde_json::to_string_pretty(&ui_state)?);
        }
    }
    Ok(())
}

/// Selects `paths` (resolved against the current directory), or the whole root.
fn select_paths(
    root: &Path,
    paths: Vec<PathBuf>,
    proxy: &mpsc::UnboundedSender<UserEvent>,
    state: &Arc<Mutex<AppState>>,
) {
    if paths.is_empty() {
        commands::set_selected(root.to_path_buf(), true, proxy.clone(), state.clone());
        return;
    }

    for path in paths {
        match std::fs::canonicalize(&path) {
            Ok(canonical) => {
                commands::set_selected(canonical, true, proxy.clone(), state.clone());
            }
            Err(e) => tracing::warn!("Skipping {}: {}", path.display(), e),
        }
    }
}

/// Replaces the prompts for this run only; the saved defaults stay as they are.
fn override_prompts(
    start_prompt: Option<String>,
    end_prompt: Option<String>,
    state: &Arc<Mutex<AppState>>,
) {
    let mut state_guard = state
        .lock()
        .expect("Mutex was poisoned. This should not happen.");
    if let Some(start_prompt) = start_prompt {
        state_guard.start_prompt = start_prompt;
    }
    if let Some(end_prompt) = end_prompt {
        state_guard.end_prompt = end_prompt;
    }
}

/// Starts the background aggregation and waits for its outcome.
async fn run_aggregation(
    proxy: &mpsc::UnboundedSender<UserEvent>,
    state: &Arc<Mutex<AppState>>,
    mut events: mpsc::UnboundedReceiver<UserEvent>,
) -> Result<String> {
    commands::generate_content(proxy.clone(), state.clone())?;

    loop {
        match events.recv().await {
            Some(UserEvent::ShowGeneratedContent(result)) => {
                tracing::info!(
                    "{} files read, {} unreadable, {} directory errors",
                    result.files_read,
                    result.read_failures,
                    result.directory_errors
                );
                break;
            }
            Some(UserEvent::ShowError(message)) => bail!(message),
            Some(UserEvent::StateUpdate(_)) => continue,
            None => bail!("Aggregation stopped without a result"),
        }
    }

    let state_guard = state
        .lock()
        .expect("Mutex was poisoned. This should not happen.");
    state_guard
        .composed_output()
        .context("Aggregation finished without a stored result")
}

fn write_output(text: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, format!("{text}\n"))
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("Wrote {} bytes to {}", text.len() + 1, path.display());
        }
        None => println!("{text}"),
    }
    Ok(())
}
