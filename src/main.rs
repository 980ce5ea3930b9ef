//! cfgtree CLI
//!
//! Entry point for the `cfgtree` command-line tool.

use cfgtree::{CfgNode, EffectiveConfig, Entry};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use tracing::info;

#[derive(Parser)]
#[command(name = "cfgtree")]
#[command(about = "Inspect, format and merge hierarchical configuration files", version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a file in canonical form
    Fmt {
        /// Configuration file
        file: PathBuf,

        /// Exit with status 1 if the file is not already canonical
        #[arg(long)]
        check: bool,
    },

    /// Print an option value or a section
    Get {
        /// Configuration file
        file: PathBuf,

        /// Entry path, e.g. "System/Service/Port"
        path: String,

        /// Print list items one per line
        #[arg(long)]
        list: bool,
    },

    /// Merge files in order (later files win)
    Merge {
        /// Configuration files, lowest precedence first
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Override applied after all files (PATH=VALUE, repeatable)
        #[arg(long = "set", value_name = "PATH=VALUE")]
        overrides: Vec<String>,

        /// Output the effective config with provenance as JSON
        #[arg(long)]
        provenance: bool,
    },

    /// Print the modifications turning OLD into NEW as JSON
    Diff {
        old: PathBuf,
        new: PathBuf,
    },

    /// Print a file as a JSON object
    ToJson {
        /// Configuration file
        file: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Fmt { file, check } => run_fmt(&file, check),
        Commands::Get { file, path, list } => run_get(&file, &path, list),
        Commands::Merge {
            files,
            overrides,
            provenance,
        } => run_merge(files, &overrides, provenance),
        Commands::Diff { old, new } => run_diff(&old, &new),
        Commands::ToJson { file } => run_to_json(&file),
    }
}

fn init_tracing(verbose: u8) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    if let Err(e) = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init()
    {
        eprintln!("Failed to initialize logging: {}", e);
    }
}

fn load_or_exit(path: &Path) -> CfgNode {
    match CfgNode::from_file(path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            process::exit(1);
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            process::exit(1);
        }
    }
}

fn run_fmt(path: &Path, check: bool) {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error reading {}: {}", path.display(), e);
            process::exit(1);
        }
    };
    let cfg: CfgNode = match text.parse() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error parsing {}: {}", path.display(), e);
            process::exit(1);
        }
    };

    let canonical = cfg.serialize();
    if check {
        if canonical == text {
            info!(path = %path.display(), "already canonical");
        } else {
            println!("{}: not in canonical form", path.display());
            process::exit(1);
        }
    } else {
        print!("{}", canonical);
    }
}

fn run_get(path: &Path, entry_path: &str, list: bool) {
    let cfg = load_or_exit(path);

    if entry_path.trim_matches('/').is_empty() {
        print!("{}", cfg);
        return;
    }

    match cfg.get_path(entry_path) {
        Some(Entry::Option(value)) => {
            if list {
                for item in cfg.get_list(entry_path).unwrap_or_default() {
                    println!("{}", item);
                }
            } else {
                println!("{}", value);
            }
        }
        Some(Entry::Section(section)) => print!("{}", section),
        None => {
            eprintln!("'{}' not found in {}", entry_path, path.display());
            process::exit(1);
        }
    }
}

fn parse_overrides(overrides: &[String]) -> Result<Option<CfgNode>, String> {
    if overrides.is_empty() {
        return Ok(None);
    }

    let mut tree = CfgNode::new();
    for item in overrides {
        let (path, value) = item
            .split_once('=')
            .ok_or_else(|| format!("Override '{}' must be PATH=VALUE", item))?;
        tree.set_option_path(path.trim(), value.trim(), "")
            .map_err(|e| format!("Invalid override '{}': {}", item, e))?;
    }
    Ok(Some(tree))
}

fn run_merge(files: Vec<PathBuf>, overrides: &[String], provenance: bool) {
    let overrides = match parse_overrides(overrides) {
        Ok(tree) => tree,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    let effective = match EffectiveConfig::build(&files, overrides) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            process::exit(1);
        }
    };

    for skipped in &effective.skipped {
        eprintln!("Warning: {} not found, skipped", skipped);
    }

    if provenance {
        print_json(&effective);
    } else {
        print!("{}", effective.config);
    }
}

fn run_diff(old: &Path, new: &Path) {
    let old_cfg = load_or_exit(old);
    let new_cfg = load_or_exit(new);
    print_json(&old_cfg.get_modifications(&new_cfg));
}

fn run_to_json(path: &Path) {
    let cfg = load_or_exit(path);
    print_json(&cfg.to_json_value());
}
