use std::cmp::Ordering;
use std::env;
use std::error::Error;
use std::path::PathBuf;

use anyhow::{anyhow, bail};
use clap::Parser;
use rustc_hash::FxHashMap;
use stanza::renderer::console::Console;
use stanza::renderer::Renderer;
use tracing::{debug, info};

use furlong::data::{self, RaceSnapshot};
use furlong::kelly;
use furlong::mc::MonteCarloEngine;
use furlong::placement::{place_probabilities, DEFAULT_DEPTH};
use furlong::pool::Pool;
use furlong::print::{tabulate_pools, tabulate_values, RunnerValue};
use furlong::value::{self, MarketData, Method, Valuation, ValuationOutcome};

#[derive(Debug, clap::Parser, Clone)]
struct Args {
    /// snapshot file to source the pools from; a .jsonl file yields its most recent line
    #[clap(short = 'f', long)]
    file: PathBuf,

    /// number of orderings to sample
    #[clap(short = 'i', long, default_value_t = 100_000)]
    iterations: u64,

    /// payout model: parimutuel or fixed_odds
    #[clap(short = 'm', long, default_value = "parimutuel")]
    method: String,

    /// posted odds as comma-separated runner=multiplier pairs (fixed_odds only)
    #[clap(long)]
    odds: Option<String>,

    /// fraction of winnings retained by the operator
    #[clap(short = 't', long, default_value_t = kelly::DEFAULT_TAKEOUT)]
    takeout: f64,

    /// fixed seed for a reproducible run
    #[clap(short = 's', long)]
    seed: Option<u64>,
}
impl Args {
    fn validate(&self) -> anyhow::Result<()> {
        if !(0.0..1.0).contains(&self.takeout) {
            bail!("takeout must lie in [0, 1)");
        }
        if self.iterations == 0 {
            bail!("at least one iteration is required");
        }
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    if env::var("RUST_BACKTRACE").is_err() {
        env::set_var("RUST_BACKTRACE", "full")
    }
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info")
    }
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    args.validate()?;
    debug!("args: {args:?}");

    let snapshot = read_snapshot(&args)?;
    info!(
        "{} R{}, retrieved {}",
        snapshot.track, snapshot.race_number, snapshot.retrieved_at
    );

    let win = snapshot.win_pool()?;
    let show = snapshot.show_pool()?;
    info!("\n{}", Console::default().render(&tabulate_pools(&win, &show)));

    let method = Method::parse(&args.method)?;
    let odds = args.odds.as_deref().map(parse_odds).transpose()?;
    let market = MarketData {
        show_pool: Some(&show),
        odds: odds.as_ref(),
    };

    let mut engine = MonteCarloEngine::default().with_trials(args.iterations);
    if let Some(seed) = args.seed {
        engine = engine.with_seed(seed);
    }
    let dist = engine.estimate(&win)?;
    let place_probs = place_probabilities(&dist, win.len(), DEFAULT_DEPTH);

    let valuation = match value::evaluate(&win, &dist, &method, &market)? {
        ValuationOutcome::Priced(valuation) => valuation,
        ValuationOutcome::NoMarketMoney => {
            info!(
                "show pool carries no money yet; skipping {} R{}",
                snapshot.track, snapshot.race_number
            );
            return Ok(());
        }
    };

    let rows = assemble_rows(&win, &place_probs, &valuation, args.takeout);
    info!("\n{}", Console::default().render(&tabulate_values(&rows)));
    Ok(())
}

fn read_snapshot(args: &Args) -> anyhow::Result<RaceSnapshot> {
    if args.file.extension().unwrap_or_default() == "jsonl" {
        let mut snapshots = data::read_jsonl(&args.file)?;
        return snapshots
            .pop()
            .ok_or_else(|| anyhow!("no snapshots in {:?}", args.file));
    }
    data::read_from_file(&args.file)
}

fn parse_odds(input: &str) -> anyhow::Result<FxHashMap<String, f64>> {
    let mut odds = FxHashMap::default();
    for pair in input.split(',') {
        let (runner, price) = pair
            .split_once('=')
            .ok_or_else(|| anyhow!("malformed odds pair '{pair}'"))?;
        odds.insert(runner.trim().to_string(), price.trim().parse()?);
    }
    Ok(odds)
}

fn assemble_rows(
    win: &Pool,
    place_probs: &[f64],
    valuation: &Valuation,
    takeout: f64,
) -> Vec<RunnerValue> {
    let shares = win.relative();
    let mut rows = vec![];
    for (runner, name) in win.runners().iter().enumerate() {
        let conditional = valuation.conditional[name];
        // sizing a stake is only meaningful against a positive return
        let advice = if conditional > 0.0 {
            kelly::advise(place_probs[runner], conditional, takeout).ok()
        } else {
            None
        };
        rows.push(RunnerValue {
            runner: name.clone(),
            pool_share: shares[name],
            place_prob: place_probs[runner],
            expected: valuation.expected[name],
            conditional,
            advice,
        });
    }
    rows.sort_by(|a, b| {
        b.expected
            .partial_cmp(&a.expected)
            .unwrap_or(Ordering::Equal)
    });
    rows
}
