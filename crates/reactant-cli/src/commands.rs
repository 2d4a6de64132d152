//! The `transform` command
//!
//! Every file is transformed in memory first. Nothing is written unless all
//! of them succeed, and an in-place write that fails part way rolls back the
//! files already written.

use std::path::{Path, PathBuf};

use colored::Colorize;
use reactant_transform::{TransformOptions, Transformer};

use crate::error::{CliError, CliResult};
use crate::files::{collect_source_files, find_config};
use crate::write::{WriteLog, report_rollback_errors};

#[derive(Debug, Clone)]
pub(crate) struct TransformArgs {
	pub path: PathBuf,
	pub check: bool,
	pub out_dir: Option<PathBuf>,
	pub config: Option<PathBuf>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Summary {
	pub rewritten: usize,
	pub unchanged: usize,
	pub failed: usize,
}

struct Unit {
	path: PathBuf,
	original: String,
	output: String,
}

impl Unit {
	fn changed(&self) -> bool {
		self.output != self.original
	}
}

fn load_options(args: &TransformArgs) -> CliResult<TransformOptions> {
	let Some(config) = args.config.clone().or_else(|| find_config(&args.path)) else {
		return Ok(TransformOptions::default());
	};
	tracing::info!(config = %config.display(), "using configuration");
	Ok(TransformOptions::from_file(&config)?)
}

/// Where `file` lands under `out_dir`, keeping its position relative to `root`
fn mirror_path(root: &Path, file: &Path, out_dir: &Path) -> PathBuf {
	let base = if root.is_file() {
		root.parent().unwrap_or(root)
	} else {
		root
	};
	let relative = file
		.strip_prefix(base)
		.map(Path::to_path_buf)
		.unwrap_or_else(|_| file.file_name().map(PathBuf::from).unwrap_or_default());
	out_dir.join(relative)
}

fn print_summary(summary: &Summary, check: bool) {
	let verb = if check { "would be rewritten" } else { "rewritten" };
	println!();
	println!(
		"{}: {} {verb}, {} unchanged, {} errors",
		"Summary".bright_cyan(),
		if summary.rewritten > 0 {
			summary.rewritten.to_string().green()
		} else {
			summary.rewritten.to_string().dimmed()
		},
		summary.unchanged,
		if summary.failed > 0 {
			summary.failed.to_string().red()
		} else {
			summary.failed.to_string().dimmed()
		}
	);
}

pub(crate) fn run_transform(args: &TransformArgs) -> CliResult<Summary> {
	let options = load_options(args)?;
	let files = collect_source_files(&args.path)?;
	if files.is_empty() {
		println!("No source files found in {}", args.path.display());
		return Ok(Summary::default());
	}

	let mut transformer = Transformer::new(options);
	let mut summary = Summary::default();
	let mut units = Vec::with_capacity(files.len());
	let total = files.len();

	for (index, path) in files.into_iter().enumerate() {
		let progress = format!("[{}/{}]", index + 1, total);
		let original = std::fs::read_to_string(&path).map_err(|e| CliError::io("read", &path, e))?;
		match transformer.transform_path(&path, &original) {
			Ok(output) => {
				let unit = Unit {
					path,
					original,
					output,
				};
				if unit.changed() {
					summary.rewritten += 1;
					if args.check {
						println!("{} Would rewrite: {}", progress.bright_blue(), unit.path.display());
					}
				} else {
					summary.unchanged += 1;
				}
				units.push(unit);
			}
			Err(e) => {
				eprintln!("{} {} {}", progress.bright_blue(), "Error".red(), e);
				summary.failed += 1;
			}
		}
	}

	if summary.failed > 0 {
		print_summary(&summary, args.check);
		return Err(CliError::Failed(summary.failed));
	}
	if args.check {
		print_summary(&summary, true);
		if summary.rewritten > 0 {
			return Err(CliError::WouldRewrite(summary.rewritten));
		}
		return Ok(summary);
	}

	match &args.out_dir {
		Some(out_dir) => write_mirror(&args.path, out_dir, &units)?,
		None => write_in_place(&units)?,
	}
	print_summary(&summary, false);
	Ok(summary)
}

/// Write every unit, changed or not, under `out_dir`
fn write_mirror(root: &Path, out_dir: &Path, units: &[Unit]) -> CliResult<()> {
	let total = units.len();
	for (index, unit) in units.iter().enumerate() {
		let destination = mirror_path(root, &unit.path, out_dir);
		if let Some(parent) = destination.parent() {
			std::fs::create_dir_all(parent).map_err(|e| CliError::io("create", parent, e))?;
		}
		std::fs::write(&destination, &unit.output).map_err(|e| CliError::io("write", &destination, e))?;
		println!(
			"{} {} {}",
			format!("[{}/{}]", index + 1, total).bright_blue(),
			if unit.changed() {
				"Rewritten:".green()
			} else {
				"Copied:".dimmed()
			},
			destination.display()
		);
	}
	Ok(())
}

fn write_in_place(units: &[Unit]) -> CliResult<()> {
	let mut log = WriteLog::new();
	let total = units.len();
	for (index, unit) in units.iter().enumerate() {
		let progress = format!("[{}/{}]", index + 1, total);
		if !unit.changed() {
			println!("{} {} {}", progress.bright_blue(), "Unchanged:".dimmed(), unit.path.display());
			continue;
		}
		if let Err(e) = log.write(&unit.path, &unit.original, &unit.output) {
			tracing::warn!(written = log.len(), "write failed, rolling back");
			report_rollback_errors(&log.rollback());
			return Err(CliError::io("write", &unit.path, e));
		}
		println!("{} {} {}", progress.bright_blue(), "Rewritten:".green(), unit.path.display());
	}
	Ok(())
}
