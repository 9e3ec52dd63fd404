use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::process;

use clap::{Parser, Subcommand};
use serde::Serialize;

use mt_engine::{Decoder, EngineDecoder};

#[derive(Parser)]
#[command(name = "mttool", about = "N-best decoding diagnostics")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Decode sentences from stdin and print N-best lists
    Decode {
        /// Path to the engine configuration TOML
        config: String,
        /// Number of N-best candidates per sentence
        #[arg(short, long, default_value = "10")]
        n: usize,
        /// Override the configured verbosity level
        #[arg(long)]
        verbosity: Option<u8>,
        /// `key=value` configuration overrides (e.g. weights.tm=2.0)
        #[arg(long = "set", value_name = "KEY=VALUE")]
        overrides: Vec<String>,
        /// Output as JSON lines instead of text
        #[arg(long)]
        json: bool,
    },

    /// Print a sample engine configuration
    SampleConfig,
}

const SAMPLE_CONFIG: &str = r#"[engine]
phrase_table = "model/phrase-table.txt"
# language_model = "model/bigrams.txt"
verbosity = 0
distinct_nbest = true

[weights]
tm = 1.0
lm = 0.5
word_penalty = -0.3
phrase_penalty = -0.2
"#;

/// One N-best entry, one JSON object per line in `--json` mode.
#[derive(Debug, Serialize)]
struct NbestRecord {
    sentence: usize,
    rank: usize,
    tokens: Vec<String>,
    features: BTreeMap<String, f64>,
    total: f64,
}

fn run_decode(config: &str, n: usize, verbosity: Option<u8>, overrides: &[String], json: bool) {
    let state =
        mt_engine::engine::initialize_from_file(Path::new(config), verbosity, overrides)
            .unwrap_or_else(|e| {
                eprintln!("Failed to initialize engine from {config}: {e}");
                process::exit(1);
            });
    let decoder = EngineDecoder::new(state);

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for (sent_id, line) in stdin.lock().lines().enumerate() {
        let line = line.unwrap_or_else(|e| {
            eprintln!("Failed to read line: {e}");
            process::exit(1);
        });
        if line.trim().is_empty() {
            continue;
        }

        let candidates = match decoder.n_best(&line, n) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("sentence {sent_id}: {e}");
                continue;
            }
        };

        for (rank, candidate) in candidates.iter().enumerate() {
            let vocab = decoder.state().vocab();
            if json {
                let record = NbestRecord {
                    sentence: sent_id,
                    rank,
                    tokens: candidate
                        .tokens
                        .iter()
                        .map(|&t| vocab.token(t).to_string())
                        .collect(),
                    features: candidate
                        .features
                        .iter()
                        .map(|(name, value)| (name.to_string(), value))
                        .collect(),
                    total: candidate.total,
                };
                let line = serde_json::to_string(&record).unwrap_or_else(|e| {
                    eprintln!("Failed to serialize record: {e}");
                    process::exit(1);
                });
                writeln!(out, "{line}").ok();
            } else {
                let features: Vec<String> = candidate
                    .features
                    .iter()
                    .map(|(name, value)| format!("{name}={value}"))
                    .collect();
                writeln!(
                    out,
                    "{sent_id} ||| {} ||| {} ||| {}",
                    candidate.surface(vocab),
                    features.join(" "),
                    candidate.total
                )
                .ok();
            }
        }
    }
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Command::Decode {
            config,
            n,
            verbosity,
            overrides,
            json,
        } => run_decode(&config, n, verbosity, &overrides, json),
        Command::SampleConfig => print!("{SAMPLE_CONFIG}"),
    }
}
