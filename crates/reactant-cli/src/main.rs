//! Reactant CLI
//!
//! Applies the Reactant transform to source trees as a build-pipeline step.
//!
//! ## Usage
//!
//! ```bash
//! reactant transform src/
//! reactant transform src/ --check
//! reactant transform src/ --out-dir build/solid
//! reactant transform src/App.jsx --config reactant.toml -vv
//! ```
//!
//! Without `--config`, `reactant.toml` is looked up from the target path
//! upward. `RUST_LOG` overrides the level chosen by `-v`.

mod commands;
mod error;
mod files;
mod write;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use crate::commands::{TransformArgs, run_transform};

#[derive(Parser)]
#[command(name = "reactant")]
#[command(about = "Transform element-factory code into fine-grained reactive JSX", long_about = None)]
#[command(version)]
struct Cli {
	#[command(subcommand)]
	command: Commands,

	/// Verbosity level (can be repeated)
	#[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
	verbosity: u8,
}

#[derive(Subcommand)]
enum Commands {
	/// Transform a file or every source file under a directory
	Transform {
		/// File or directory to transform
		#[arg(value_name = "PATH")]
		path: PathBuf,

		/// Report files that would change without writing them
		#[arg(long, conflicts_with = "out_dir")]
		check: bool,

		/// Write output to a mirrored tree instead of in place
		#[arg(long, value_name = "DIR")]
		out_dir: Option<PathBuf>,

		/// Path to a reactant.toml configuration file
		#[arg(long, value_name = "FILE")]
		config: Option<PathBuf>,
	},
}

fn filter_for(verbosity: u8) -> &'static str {
	match verbosity {
		0 => "warn",
		1 => "info",
		2 => "debug",
		_ => "trace",
	}
}

fn init_tracing(verbosity: u8) {
	let default_level = filter_for(verbosity);
	let _ = tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
		.with_writer(std::io::stderr)
		.try_init();
}

fn main() {
	let cli = Cli::parse();
	init_tracing(cli.verbosity);

	let result = match cli.command {
		Commands::Transform {
			path,
			check,
			out_dir,
			config,
		} => run_transform(&TransformArgs {
			path,
			check,
			out_dir,
			config,
		}),
	};

	if let Err(e) = result {
		eprintln!("{} {}", "Error:".red(), e);
		process::exit(1);
	}
}
