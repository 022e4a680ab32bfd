use amortization::{generate, render, LoanTerms, ScheduleError};
use chrono::{Local, NaiveDate};
use clap::{ArgAction, Parser, ValueEnum};
use log::{debug, LevelFilter};
use simple_logger::SimpleLogger;
use std::{fs, path::PathBuf, process};

/// Print the level-payment amortization schedule of a loan
#[derive(Parser, Debug)]
#[command(name = "amortize", version)]
struct Cli {
    /// Amount financed
    #[arg(long, required_unless_present = "input")]
    principal: Option<f64>,

    /// Annual interest rate in percent (12 for 12%)
    #[arg(long, default_value_t = 0.)]
    rate: f64,

    /// Number of monthly installments
    #[arg(long, required_unless_present = "input")]
    term: Option<u32>,

    /// Start date (YYYY-MM-DD); the first installment falls due one month later. Defaults to today
    #[arg(long)]
    start: Option<NaiveDate>,

    /// JSON file holding the loan terms, used instead of --principal/--rate/--term
    #[arg(long, conflicts_with_all = ["principal", "term"])]
    input: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,

    /// Decimal places shown for amounts
    #[arg(long, default_value_t = 2)]
    decimals: u32,

    /// Raise the log level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Csv,
    Json,
}

fn log_level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn load_terms(cli: &Cli) -> Result<LoanTerms, ScheduleError> {
    if let Some(path) = &cli.input {
        debug!("Reading loan terms from {}", path.display());
        let contents = fs::read_to_string(path)?;
        return Ok(serde_json::from_str(&contents)?);
    }
    match (cli.principal, cli.term) {
        (Some(principal), Some(term)) => Ok(LoanTerms::new(principal, cli.rate, term)),
        (None, _) => Err(ScheduleError::invalid("principal", "--principal is required")),
        (_, None) => Err(ScheduleError::invalid("term_months", "--term is required")),
    }
}

fn run(cli: &Cli) -> Result<String, ScheduleError> {
    let terms = load_terms(cli)?;
    let start = cli.start.unwrap_or_else(|| Local::now().date_naive());
    let schedule = generate(&terms, start)?;

    match cli.output {
        OutputFormat::Table => Ok(render::table(&schedule, cli.decimals)),
        OutputFormat::Csv => render::csv(&schedule, cli.decimals),
        OutputFormat::Json => render::json(&schedule, cli.decimals),
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = SimpleLogger::new()
        .with_level(log_level(cli.verbose))
        .env()
        .init()
    {
        eprintln!("failed to initialise logging: {}", e);
    }

    match run(&cli) {
        Ok(out) => println!("{}", out.trim_end()),
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    }
}
