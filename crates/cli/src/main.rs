mod option_file;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use optscan::{DEFAULT_MAX_COLUMN_WIDTH, OptionRegistry, Parameters, UsageConfig};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, fmt};

use crate::option_file::{DEFAULT_OPTION_FILE, OptionFile, load_option_file, write_sample};

#[derive(Parser)]
#[command(name = "optscan")]
#[command(version, about = "Scan argument tokens against options declared in a JSON file", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a sample option file
    Init(InitArgs),

    /// Declare every option of an option file and report the first error
    Check(CheckArgs),

    /// Print the usage text for an option file
    Usage(UsageArgs),

    /// Parse tokens given after `--` against an option file
    Parse(ParseArgs),
}

#[derive(Parser)]
struct InitArgs {
    /// Project directory (default: current directory)
    #[arg(value_name = "DIR")]
    dir: Option<PathBuf>,
}

#[derive(Parser)]
struct CheckArgs {
    /// Path to the option file
    #[arg(short, long, default_value = DEFAULT_OPTION_FILE, value_name = "FILE")]
    spec: PathBuf,
}

#[derive(Parser)]
struct UsageArgs {
    /// Path to the option file
    #[arg(short, long, default_value = DEFAULT_OPTION_FILE, value_name = "FILE")]
    spec: PathBuf,

    /// Maximum width of the long-name and default columns
    #[arg(short, long, default_value_t = DEFAULT_MAX_COLUMN_WIDTH)]
    width: usize,
}

#[derive(Parser)]
struct ParseArgs {
    /// Path to the option file
    #[arg(short, long, default_value = DEFAULT_OPTION_FILE, value_name = "FILE")]
    spec: PathBuf,

    /// Maximum width of the long-name and default columns
    #[arg(short, long, default_value_t = DEFAULT_MAX_COLUMN_WIDTH)]
    width: usize,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// Tokens to scan
    #[arg(last = true, value_name = "TOKENS")]
    tokens: Vec<String>,
}

#[derive(Serialize)]
struct ParseOutput<'a> {
    parameters: &'a Parameters,
    remainder: &'a [String],
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Init(args) => init(args),
        Commands::Check(args) => check(args),
        Commands::Usage(args) => usage(args),
        Commands::Parse(args) => parse(args),
    }
}

fn init(args: InitArgs) -> Result<()> {
    let dir = args.dir.unwrap_or_else(|| PathBuf::from("."));

    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create directory: {}", dir.display()))?;

    let dest = write_sample(&dir)?;

    eprintln!("Created: {}", dest.display());
    eprintln!("\nNext steps:");
    eprintln!("  1. Edit {DEFAULT_OPTION_FILE} to declare your options");
    eprintln!("  2. Run: optscan usage");
    eprintln!("  3. Run: optscan parse -- --file input.txt");

    Ok(())
}

fn load(path: &Path) -> Result<(OptionFile, OptionRegistry)> {
    let file = load_option_file(path)?;
    let reg = file
        .build_registry()
        .with_context(|| format!("invalid option file: {}", path.display()))?;
    Ok((file, reg))
}

fn usage_config(file: &OptionFile, width: usize) -> UsageConfig {
    let config = UsageConfig::default().width(width);
    match &file.program {
        Some(program) => config.program(program.clone()),
        None => config,
    }
}

fn check(args: CheckArgs) -> Result<()> {
    tracing::debug!("executing check command");

    let (_, reg) = load(&args.spec)?;
    eprintln!(
        "OK: {} option(s) declared in {}",
        reg.specs().len(),
        args.spec.display()
    );
    Ok(())
}

fn usage(args: UsageArgs) -> Result<()> {
    tracing::debug!("executing usage command");

    let (file, reg) = load(&args.spec)?;
    print!("{}", reg.usage_with(usage_config(&file, args.width)));
    Ok(())
}

fn parse(args: ParseArgs) -> Result<()> {
    tracing::debug!("executing parse command");

    let (file, mut reg) = load(&args.spec)?;
    let result = match reg.parse(&args.tokens) {
        Ok(result) => result,
        Err(err) => {
            // The usage text carries every collected problem, not just the first.
            eprint!("{}", reg.usage_with(usage_config(&file, args.width)));
            eprintln!();
            return Err(anyhow::Error::new(err).context("failed to parse tokens"));
        }
    };

    if args.json {
        let output = ParseOutput {
            parameters: &result.parameters,
            remainder: &result.remainder,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        for (name, value) in result.parameters.iter() {
            println!("{name} = {value}");
        }
        if !result.remainder.is_empty() {
            println!("-- {}", result.remainder.join(" "));
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
