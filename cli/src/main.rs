//! Membership filter over standard input
//!
//! Reads whitespace separated integers: a key count, that many keys, a query
//! count, and that many queries. Prints `Yes` or `No` on its own line for
//! each query, depending on whether it was one of the keys.

use clap::Parser;
use fixedset::{FixedSetBuilder, DEFAULT_MAX_ATTEMPTS};
use std::io::{self, BufWriter, Read, Write};
use std::num::NonZeroU32;
use std::process::ExitCode;
use std::str::{FromStr, SplitWhitespace};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Answer membership queries against a static set of integers
#[derive(Debug, Parser)]
#[command(name = "fixedset-cli", version, about)]
struct Args {
    /// Seed for a reproducible build. Uses fresh randomness when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Limit on top-level hash attempts
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    max_table_attempts: NonZeroU32,

    /// Limit on hash attempts for each bucket
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    max_bucket_attempts: NonZeroU32,
}

/// Everything that can stop a run
#[derive(Debug, thiserror::Error)]
enum CliError {
    /// Reading stdin or writing stdout failed.
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    /// A token was not a valid integer of the expected kind.
    #[error("expected an integer, found {token:?}")]
    Parse {
        /// The offending token
        token: String,
    },

    /// Input stopped early.
    #[error("input ended while reading {what}")]
    MissingValue {
        /// Description of the value we were waiting for
        what: &'static str,
    },

    /// Construction gave up.
    #[error(transparent)]
    Build(#[from] fixedset::Error),
}

/// Whitespace tokenizer with typed parsing
struct Tokens<'a> {
    /// Remaining tokens
    inner: SplitWhitespace<'a>,
}

impl<'a> Tokens<'a> {
    /// Start reading tokens from the beginning of `input`.
    fn new(input: &'a str) -> Self {
        Self {
            inner: input.split_whitespace(),
        }
    }

    /// Parse the next token, naming it `what` if the input ran out.
    fn next<T: FromStr>(&mut self, what: &'static str) -> Result<T, CliError> {
        let token = self.inner.next().ok_or(CliError::MissingValue { what })?;
        token.parse().map_err(|_| CliError::Parse {
            token: token.to_owned(),
        })
    }
}

/// Build the set from `input` and write one answer per query to `output`.
fn run<W: Write>(
    input: &str,
    builder: &FixedSetBuilder,
    seed: Option<u64>,
    output: &mut W,
) -> Result<(), CliError> {
    let mut tokens = Tokens::new(input);

    let count: usize = tokens.next("the key count")?;
    let keys = (0..count)
        .map(|_| tokens.next("a key"))
        .collect::<Result<Vec<i64>, _>>()?;

    let set = match seed {
        Some(seed) => builder.build_from_seed(seed, &keys)?,
        None => builder.build(&keys)?,
    };
    info!(keys = set.len(), slots = set.space().slots, "set ready");

    let queries: usize = tokens.next("the query count")?;
    for _ in 0..queries {
        let query: i64 = tokens.next("a query")?;
        let answer: &[u8] = if set.contains(query) { b"Yes\n" } else { b"No\n" };
        output.write_all(answer)?;
    }
    output.flush()?;
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let mut builder = FixedSetBuilder::new();
    builder
        .max_table_attempts(args.max_table_attempts)
        .max_bucket_attempts(args.max_bucket_attempts);

    let mut input = String::new();
    let result = io::stdin()
        .read_to_string(&mut input)
        .map_err(CliError::from)
        .and_then(|_| {
            let mut output = BufWriter::new(io::stdout().lock());
            run(&input, &builder, args.seed, &mut output)
        });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("fixedset-cli: {err}");
            ExitCode::FAILURE
        }
    }
}
