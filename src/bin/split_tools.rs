//! split_tools - split a tool manifest into per-category files
//!
//! Usage:
//!   split_tools [input_file] [output_dir]              Split on `# Category` markers
//!   split_tools -m keywords -t windows                  Categorize by built-in keyword table
//!   split_tools -m keywords --table-file cats.toml      Categorize by a custom table
//!   split_tools -m trailing                             Category is each record's last field
//!
//! Defaults: `tools.txt` into `tools/`. Category files are rewritten on each
//! run unless `--append` is given.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use toolkit_layout::split::{self, DEFAULT_INPUT, DEFAULT_OUTPUT_DIR};
use toolkit_layout::{KeywordTable, SplitOptions, Strategy, WriteMode, output};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// `# Category` lines open a section
    Markers,
    /// Look tool names up in a keyword table
    Keywords,
    /// The last field of each record is its category
    Trailing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Table {
    Linux,
    Windows,
}

#[derive(Parser)]
#[command(name = "split_tools")]
#[command(about = "Split a tool manifest into per-category files")]
#[command(version)]
struct Cli {
    /// Manifest to split
    #[arg(default_value = DEFAULT_INPUT)]
    input: PathBuf,

    /// Directory for the category files
    #[arg(default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    /// How records are assigned to categories
    #[arg(short, long, value_enum, default_value_t = Mode::Markers)]
    mode: Mode,

    /// Built-in keyword table (keywords mode)
    #[arg(short, long, value_enum, default_value_t = Table::Linux)]
    table: Table,

    /// TOML keyword table, overrides --table (keywords mode)
    #[arg(long)]
    table_file: Option<PathBuf>,

    /// Append to existing category files instead of rewriting them
    #[arg(long)]
    append: bool,

    /// Only print warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn options(&self) -> Result<SplitOptions> {
        let strategy = match self.mode {
            Mode::Markers => Strategy::Markers,
            Mode::Trailing => Strategy::Trailing,
            Mode::Keywords => Strategy::Keywords(match &self.table_file {
                Some(path) => KeywordTable::load(path)?,
                None => match self.table {
                    Table::Linux => KeywordTable::linux(),
                    Table::Windows => KeywordTable::windows(),
                },
            }),
        };

        Ok(SplitOptions {
            strategy,
            write_mode: if self.append { WriteMode::Append } else { WriteMode::Truncate },
        })
    }
}

fn main() {
    let cli = Cli::parse();
    output::set_quiet(cli.quiet);

    if let Err(e) = run(&cli) {
        output::error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let options = cli.options()?;

    output::action(&format!(
        "Splitting {} into {}",
        cli.input.display(),
        cli.output_dir.display()
    ));

    let report = split::split(&cli.input, &cli.output_dir, &options)
        .with_context(|| format!("Failed to split '{}'", cli.input.display()))?;

    for (file, count) in &report.written {
        output::list_item(file, &format!("{} entries", count));
    }
    if !report.warnings.is_empty() {
        output::info(&format!("{} line(s) skipped", report.warnings.len()));
    }

    output::success(&format!(
        "Successfully split '{}' into '{}'.",
        cli.input.display(),
        cli.output_dir.display()
    ));
    Ok(())
}
