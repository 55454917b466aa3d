//! `kgprompt`: terminal editor that compiles a knowledge-graph ontology into
//! an extraction prompt.
//!
//! # Usage
//!
//! ```text
//! kgprompt                          # interactive editor, state saved automatically
//! kgprompt --store ./state.db       # use a different state database
//! kgprompt compile ontology.json    # print the prompt for an exported file
//! kgprompt validate ontology.json   # report what needs fixing
//! ```

mod app;
mod clipboard;
mod command;
mod session;
mod settings;
mod view;

use std::{
  io::Write as _,
  path::{Path, PathBuf},
  time::Duration,
};

use anyhow::{Context, Result, bail};
use app::{App, Flow, Options};
use clap::{Parser, Subcommand};
use kgprompt_core::{
  Error, migrate, model::Ontology, persist::Persistence, validate::validate_state,
};
use kgprompt_store_sqlite::SqliteStore;
use settings::Settings;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "kgprompt", version, about = "Knowledge-graph extraction prompt editor")]
struct Args {
  /// Path to a TOML config file.
  #[arg(
    short,
    long,
    env = "KGPROMPT_CONFIG",
    value_name = "FILE",
    default_value = "kgprompt.toml"
  )]
  config: PathBuf,

  /// SQLite file holding the saved editor state.
  #[arg(long, env = "KGPROMPT_STORE", value_name = "PATH")]
  store: Option<PathBuf>,

  #[command(subcommand)]
  mode: Option<Mode>,
}

#[derive(Subcommand, Debug)]
enum Mode {
  /// Print the compiled prompt for an ontology JSON file.
  Compile { file: PathBuf },
  /// Check an ontology JSON file and print what needs fixing.
  Validate { file: PathBuf },
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  // Logs go to stderr so they never mix with prompts on stdout.
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();

  match args.mode {
    Some(Mode::Compile { file }) => compile(&file).await,
    Some(Mode::Validate { file }) => validate(&file).await,
    None => {
      let mut settings = Settings::load(&args.config)?;
      if let Some(store) = args.store {
        settings.store_path = settings::expand_tilde(&store);
      }
      run_editor(settings).await
    }
  }
}

// ─── One-shot modes ───────────────────────────────────────────────────────────

/// Load a file as written: no blank rows are added for empty lists.
async fn read_model(file: &Path) -> Result<Ontology> {
  let text = tokio::fs::read_to_string(file)
    .await
    .with_context(|| format!("reading {}", file.display()))?;
  migrate::parse_document(&text).with_context(|| format!("parsing {}", file.display()))
}

/// The compiled prompt, or the summary lines that block it.
fn compile_model(model: &Ontology) -> std::result::Result<String, Vec<String>> {
  match kgprompt_prompt::compile(model) {
    Ok(prompt) => Ok(prompt),
    Err(Error::ValidationFailed(errors)) => Err(errors.summary(model)),
    Err(e) => Err(vec![e.to_string()]),
  }
}

async fn compile(file: &Path) -> Result<()> {
  let model = read_model(file).await?;
  match compile_model(&model) {
    Ok(prompt) => {
      println!("{prompt}");
      Ok(())
    }
    Err(lines) => {
      for line in lines {
        eprintln!("{line}");
      }
      bail!("{} has validation errors", file.display())
    }
  }
}

async fn validate(file: &Path) -> Result<()> {
  let model = read_model(file).await?;
  let lines = validate_state(&model).summary(&model);
  if lines.is_empty() {
    println!("OK");
    return Ok(());
  }
  for line in lines {
    println!("{line}");
  }
  bail!("{} has validation errors", file.display())
}

// ─── Editor loop ──────────────────────────────────────────────────────────────

async fn run_editor(settings: Settings) -> Result<()> {
  if let Some(parent) = settings.store_path.parent()
    && !parent.as_os_str().is_empty()
  {
    tokio::fs::create_dir_all(parent)
      .await
      .with_context(|| format!("creating {}", parent.display()))?;
  }

  let store = SqliteStore::open(&settings.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", settings.store_path))?;
  info!(path = %settings.store_path.display(), "opened state store");

  let persistence = Persistence::new(store)
    .with_key(settings.storage_key.clone())
    .with_delay(Duration::from_millis(settings.save_debounce_ms));
  let options = Options {
    export_path:       settings.export_path.clone(),
    clipboard_command: settings.clipboard_command.clone(),
  };
  let mut app = App::start(persistence, options).await;

  println!("kgprompt: type `help` for commands, `show` to list the model.");
  let mut lines = BufReader::new(tokio::io::stdin()).lines();

  loop {
    print!("> ");
    std::io::stdout().flush().ok();

    let line = tokio::select! {
      line = lines.next_line() => line.context("reading input")?,
      _ = tokio::signal::ctrl_c() => None,
    };
    let Some(line) = line else { break };

    let flow = match command::parse(&line) {
      Ok(Some(command)) => app.execute(command).await,
      Ok(None) => Flow::Continue,
      Err(e) => {
        println!("Error: {e}");
        Flow::Continue
      }
    };
    for notice in app.take_notices() {
      println!("{notice}");
    }
    if flow == Flow::Quit {
      break;
    }
  }

  app.shutdown().await.context("saving editor state")?;
  Ok(())
}
