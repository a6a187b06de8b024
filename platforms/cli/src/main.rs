use clap::Parser;
use pda::{
    Automaton, Explorer, ExplorerConfig, Graph, Observer, Outcome, PdaError, Snapshot,
    TableLibrary, TableLoader, Verdict,
};
use serde::Serialize;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Explores every path of a nondeterministic pushdown automaton over an input string.
#[derive(Parser)]
#[clap(author, version, about, long_about = None, arg_required_else_help = true)]
#[clap(after_help = "EXAMPLES:
  pda-cli --table parens.csv --input '(())'
  pda-cli --program palindrome --input abba --trace
  echo aabb | pda-cli --program anbn --json")]
struct Cli {
    /// Transition table file: accept states on the first line, then `from,input,pop,push,to` rows
    #[clap(short, long, conflicts_with = "program")]
    table: Option<PathBuf>,

    /// Name of an embedded table (see --list)
    #[clap(short, long)]
    program: Option<String>,

    /// The input string. Prompted for (or read from piped stdin) when omitted
    #[clap(short, long)]
    input: Option<String>,

    /// JSON file with explorer limits
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Maximum number of rounds
    #[clap(long)]
    max_rounds: Option<usize>,

    /// Maximum number of distinct configurations
    #[clap(long)]
    max_configurations: Option<usize>,

    /// Print every configuration as it is explored
    #[clap(short = 'd', long)]
    trace: bool,

    /// Emit the graph, snapshots and verdict as JSON lines
    #[clap(long)]
    json: bool,

    /// List the embedded tables and exit
    #[clap(short, long)]
    list: bool,

    /// Increase log verbosity
    #[clap(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Prints snapshots as the search produces them.
struct Printer {
    trace: bool,
    json: bool,
}

impl Observer for Printer {
    fn on_round(&mut self, round: usize, frontier: &[pda::Configuration]) {
        if self.trace && !self.json {
            println!(
                "==================== ROUND {} ({} configurations) ====================",
                round,
                frontier.len()
            );
        }
    }

    fn on_configuration(&mut self, snapshot: &Snapshot) {
        if self.json {
            emit("snapshot", snapshot);
        } else if self.trace {
            println!(
                "{:<12} state: {:<8} stack: {:<12} input: {}",
                snapshot.lineage.to_string(),
                snapshot.state,
                snapshot.stack.to_string(),
                snapshot.remaining.concat()
            );
        }
    }
}

#[derive(Serialize)]
struct Event<'a, T: Serialize> {
    event: &'a str,
    #[serde(flatten)]
    data: &'a T,
}

fn emit<T: Serialize>(event: &str, data: &T) {
    match serde_json::to_string(&Event { event, data }) {
        Ok(line) => println!("{}", line),
        Err(e) => tracing::error!("Failed to serialize {}: {}", event, e),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .init();

    if cli.list {
        for i in 0..TableLibrary::count() {
            if let Ok(info) = TableLibrary::info(i) {
                println!(
                    "{:<22} start: {:<4} accept: {:<10} states: {:<3} rules: {}",
                    info.name,
                    info.start,
                    info.accept.join(","),
                    info.state_count,
                    info.rule_count
                );
            }
        }
        return ExitCode::SUCCESS;
    }

    let automaton = match load_automaton(&cli) {
        Ok(automaton) => automaton,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(3);
        }
    };

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(3);
        }
    };

    let input = match read_input(&cli) {
        Ok(input) => input,
        Err(e) => {
            eprintln!("Error: Failed to read input: {}", e);
            return ExitCode::from(3);
        }
    };

    if cli.json {
        emit("graph", &Graph::of(&automaton));
    }

    let mut printer = Printer {
        trace: cli.trace,
        json: cli.json,
    };
    let verdict = Explorer::new(&automaton)
        .with_config(config)
        .run_with(&input, &mut printer);

    report(&automaton, &input, &verdict, cli.json)
}

/// Loads the automaton from `--table`, or from the embedded library via `--program`.
fn load_automaton(cli: &Cli) -> Result<Automaton, PdaError> {
    let table = match (&cli.table, &cli.program) {
        (Some(path), _) => TableLoader::load_table(path)?,
        (None, Some(name)) => TableLibrary::get_by_name(name)?.table.clone(),
        (None, None) => {
            return Err(PdaError::FileError(
                "Either --table or --program is required".to_string(),
            ))
        }
    };

    Ok(Automaton::from_table(&table)?)
}

/// Builds explorer limits from the optional config file, then applies flag overrides.
fn load_config(cli: &Cli) -> Result<ExplorerConfig, PdaError> {
    let mut config = match &cli.config {
        Some(path) => read_config(path)?,
        None => ExplorerConfig::default(),
    };

    if let Some(max_rounds) = cli.max_rounds {
        config.max_rounds = max_rounds;
    }
    if let Some(max_configurations) = cli.max_configurations {
        config.max_configurations = max_configurations;
    }

    tracing::debug!(?config, "explorer limits");
    Ok(config)
}

fn read_config(path: &Path) -> Result<ExplorerConfig, PdaError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        PdaError::FileError(format!("Failed to read config {}: {}", path.display(), e))
    })?;

    serde_json::from_str(&content).map_err(|e| {
        PdaError::FileError(format!("Invalid config {}: {}", path.display(), e))
    })
}

/// Returns the input string from `--input`, a prompt, or the first line of piped stdin.
fn read_input(cli: &Cli) -> io::Result<String> {
    if let Some(input) = &cli.input {
        return Ok(input.clone());
    }

    if atty::is(atty::Stream::Stdin) {
        print!("Please input a string-->");
        io::stdout().flush()?;
    }

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

#[derive(Serialize)]
struct Summary<'a> {
    input: &'a str,
    outcome: &'a str,
    accepted: bool,
    rounds: usize,
    explored: usize,
    terminal: Snapshot,
}

fn report(automaton: &Automaton, input: &str, verdict: &Verdict, json: bool) -> ExitCode {
    let (outcome, code) = match &verdict.outcome {
        Outcome::Accepted(_) => ("accepted", ExitCode::SUCCESS),
        Outcome::Rejected(_) => ("rejected", ExitCode::from(1)),
        Outcome::LimitExceeded { .. } => ("limit exceeded", ExitCode::from(2)),
        Outcome::Cancelled(_) => ("cancelled", ExitCode::from(2)),
    };

    let terminal = Snapshot::capture(verdict.terminal(), automaton, verdict.rounds);

    if json {
        emit(
            "verdict",
            &Summary {
                input,
                outcome,
                accepted: verdict.accepted(),
                rounds: verdict.rounds,
                explored: verdict.explored,
                terminal,
            },
        );
    } else {
        if let Outcome::LimitExceeded { limit, .. } = &verdict.outcome {
            println!("Search stopped: {:?}", limit);
        }
        println!(
            "String{} recognized: {:?} (state {}, {} rounds, {} configurations)",
            if verdict.accepted() { "" } else { " not" },
            input,
            terminal.state,
            verdict.rounds,
            verdict.explored
        );
    }

    code
}
