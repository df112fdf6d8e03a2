use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use clap_verbosity_flag::Verbosity;
use nummatch_core::{
    BoardGenerator, GenerateConfig, OverMatchPolicy, RetryRepairGenerator, Value,
    format_solutions, parse_board, solve,
};

#[derive(Parser)]
#[command(name = "nummatch", version, about = "Number-match board tools")]
struct Cli {
    #[command(flatten)]
    verbosity: Verbosity,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Solve a board dump: find the shortest match sequences that leave at
    /// most one cell of the target value.
    Solve(SolveArgs),
    /// Generate a board with an exact number of matchable pairs.
    Generate(GenerateArgs),
}

#[derive(Args)]
struct SolveArgs {
    /// Board file: digit rows, whitespace ignored.
    #[arg(default_value = "input.txt")]
    input: PathBuf,
    /// Destination for the solution lines.
    #[arg(default_value = "output.txt")]
    output: PathBuf,
    #[arg(long, default_value_t = 9)]
    columns: usize,
    /// Digit whose count must drop to at most one.
    #[arg(long, default_value_t = '5')]
    target: char,
    /// How many solutions to collect.
    #[arg(long, default_value_t = 10)]
    top: usize,
}

#[derive(Args)]
struct GenerateArgs {
    #[arg(long, default_value_t = 5)]
    rows: usize,
    #[arg(long, default_value_t = 9)]
    columns: usize,
    /// Exact matchable pair count the board must expose.
    #[arg(long, default_value_t = 3)]
    pairs: usize,
    /// RNG seed; random when omitted.
    #[arg(long)]
    seed: Option<u64>,
    /// Fail attempts that cannot fill without an extra match instead of
    /// accepting and re-verifying.
    #[arg(long)]
    strict: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::new()
        .filter_level(cli.verbosity.log_level_filter())
        .init();

    match cli.command {
        Command::Solve(args) => run_solve(args),
        Command::Generate(args) => run_generate(args),
    }
}

fn run_solve(args: SolveArgs) -> Result<()> {
    let Some(target) = Value::from_digit(args.target) else {
        bail!("target must be a digit 1-9, got '{}'", args.target);
    };

    let text = fs::read_to_string(&args.input)
        .with_context(|| format!("reading board from {}", args.input.display()))?;
    let values = parse_board(&text, args.columns)?;
    let cells: Vec<Option<Value>> = values.into_iter().map(Some).collect();

    log::info!(
        "solving {} cells for target {}, keeping top {}",
        cells.len(),
        target.face(),
        args.top
    );
    let solutions = solve(&cells, args.columns, target, args.top);
    if solutions.is_empty() {
        log::warn!("no solution found");
    } else {
        log::info!(
            "found {} solutions, shortest has {} steps",
            solutions.len(),
            solutions[0].len()
        );
    }

    fs::write(&args.output, format_solutions(&solutions))
        .with_context(|| format!("writing solutions to {}", args.output.display()))?;
    Ok(())
}

fn run_generate(args: GenerateArgs) -> Result<()> {
    let seed = args.seed.unwrap_or_else(rand::random);
    log::info!("generating with seed {seed}");

    let mut config = GenerateConfig::new(args.rows * args.columns, args.columns, args.pairs);
    if args.strict {
        config.over_match_policy = OverMatchPolicy::Strict;
    }

    let mut generator = RetryRepairGenerator::new(seed);
    let values = generator.generate(&config)?;

    for row in values.chunks(args.columns) {
        let line: String = row.iter().map(|value| value.face().to_string()).collect();
        println!("{line}");
    }
    Ok(())
}
