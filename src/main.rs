//! linebreak - line-ending analysis and normalization.
//!
//! # Usage
//!
//! ```bash
//! linebreak src/*.cs
//! linebreak --fix --target crlf README.md
//! linebreak --watch --lines notes.txt
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use linebreak::app::App;
use linebreak::config::{
    ConfigFlags, TargetKind, clear_config_flags, global_config_path, load_config_flags,
    local_override_path, parse_flag_tokens, save_config_flags,
};
use linebreak::logging;

/// Report and normalize line endings
#[derive(Parser, Debug)]
#[command(name = "linebreak", version, about, long_about = None)]
struct Cli {
    /// Files to analyze
    #[arg(value_name = "FILE", required_unless_present_any = ["save", "clear"])]
    files: Vec<PathBuf>,

    /// Watch files for changes and re-analyze
    #[arg(short, long)]
    watch: bool,

    /// Rewrite every line break to the target terminator
    #[arg(long)]
    fix: bool,

    /// Canonical terminator for --fix and highlighting [default: crlf]
    #[arg(short, long, value_enum)]
    target: Option<TargetKind>,

    /// Print one JSON object per file
    #[arg(long)]
    json: bool,

    /// List lines whose terminator differs from the target
    #[arg(long)]
    lines: bool,

    /// Write debug-level log events to a file
    #[arg(long, value_name = "PATH")]
    debug_log: Option<PathBuf>,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

fn main() -> Result<()> {
    let raw_args = std::env::args().collect::<Vec<_>>();
    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = parse_flag_tokens(&raw_args);

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);

    logging::init(effective.debug_log.as_deref())?;
    tracing::debug!(?effective, "effective configuration");

    if cli.files.is_empty() {
        return Ok(());
    }

    let app = App::new(cli.files)
        .with_target(effective.target_kind())
        .with_watch(effective.watch)
        .with_fix(effective.fix)
        .with_json(effective.json)
        .with_lines(effective.lines);

    app.run()
}
