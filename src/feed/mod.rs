//! Simulated multi-pair price feed
//!
//! Owns the price state for every traded pair and advances all of them
//! together on each tick. The orchestrator never reads prices directly from
//! the feed mid-pass; `advance` returns an immutable [`PriceSnapshot`] so a
//! whole tick pass observes one consistent set of prices.

use crate::config::FeedConfig;
use crate::types::PricePoint;
use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, VecDeque};

/// Baseline quote, per-tick volatility and display precision for one pair
#[derive(Debug, Clone, Copy)]
pub struct PairSpec {
    pub symbol: &'static str,
    pub baseline: f64,
    pub volatility: f64,
    pub decimals: u32,
}

/// Traded pair catalog: majors, metals, energy and crypto
pub const PAIR_SPECS: &[PairSpec] = &[
    PairSpec { symbol: "EUR/USD", baseline: 1.0820, volatility: 0.00015, decimals: 5 },
    PairSpec { symbol: "GBP/USD", baseline: 1.2950, volatility: 0.0002, decimals: 5 },
    PairSpec { symbol: "USD/JPY", baseline: 153.40, volatility: 0.04, decimals: 3 },
    PairSpec { symbol: "AUD/USD", baseline: 0.6580, volatility: 0.0002, decimals: 5 },
    PairSpec { symbol: "USD/CAD", baseline: 1.3910, volatility: 0.0002, decimals: 5 },
    PairSpec { symbol: "USD/CHF", baseline: 0.8650, volatility: 0.0002, decimals: 5 },
    PairSpec { symbol: "XAU/USD", baseline: 2745.50, volatility: 1.5, decimals: 2 },
    PairSpec { symbol: "WTI/USD", baseline: 71.50, volatility: 0.4, decimals: 2 },
    PairSpec { symbol: "BTC/USD", baseline: 72150.00, volatility: 35.0, decimals: 2 },
    PairSpec { symbol: "ETH/USD", baseline: 2650.00, volatility: 8.0, decimals: 2 },
    PairSpec { symbol: "SOL/USD", baseline: 175.50, volatility: 0.5, decimals: 2 },
    PairSpec { symbol: "GBP/JPY", baseline: 198.80, volatility: 0.06, decimals: 3 },
    PairSpec { symbol: "EUR/JPY", baseline: 166.10, volatility: 0.05, decimals: 3 },
    PairSpec { symbol: "EUR/GBP", baseline: 0.8350, volatility: 0.00015, decimals: 5 },
];

/// Consistent view of all pair prices taken at one tick
#[derive(Debug, Clone)]
pub struct PriceSnapshot {
    pub at: DateTime<Utc>,
    prices: BTreeMap<String, Decimal>,
}

impl PriceSnapshot {
    /// Build a snapshot from explicit prices (replay and test helper)
    pub fn from_prices(
        at: DateTime<Utc>,
        prices: impl IntoIterator<Item = (String, Decimal)>,
    ) -> Self {
        Self {
            at,
            prices: prices.into_iter().collect(),
        }
    }

    pub fn get(&self, symbol: &str) -> Option<Decimal> {
        self.prices.get(symbol).copied()
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

struct PairState {
    spec: PairSpec,
    price: f64,
    momentum: f64,
    history: VecDeque<PricePoint>,
}

/// Momentum random-walk feed over the pair catalog
pub struct PriceFeed {
    pairs: BTreeMap<String, PairState>,
    history_depth: usize,
    tick_interval_ms: u64,
    rng: StdRng,
}

impl PriceFeed {
    pub fn new(config: &FeedConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let pairs = PAIR_SPECS
            .iter()
            .map(|spec| {
                (
                    spec.symbol.to_string(),
                    PairState {
                        spec: *spec,
                        price: spec.baseline,
                        momentum: 0.0,
                        history: VecDeque::with_capacity(config.history_depth),
                    },
                )
            })
            .collect();
        Self {
            pairs,
            history_depth: config.history_depth,
            tick_interval_ms: config.tick_interval_ms,
            rng,
        }
    }

    pub fn symbols(&self) -> Vec<String> {
        self.pairs.keys().cloned().collect()
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.pairs.contains_key(symbol)
    }

    /// Current quantized price for one pair
    pub fn price(&self, symbol: &str) -> Option<Decimal> {
        self.pairs.get(symbol).map(|p| quantize(p.price, &p.spec))
    }

    /// Rolling history window for one pair, oldest first
    pub fn history(&self, symbol: &str) -> Vec<PricePoint> {
        self.pairs
            .get(symbol)
            .map(|p| p.history.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Backfill history for every pair, as if the feed had been running.
    /// Called once on startup before the tick loop begins.
    pub fn seed_history(&mut self, points: usize, now: DateTime<Utc>) {
        let interval = Duration::milliseconds(self.tick_interval_ms as i64);
        for state in self.pairs.values_mut() {
            let mut backwards = Vec::with_capacity(points);
            let mut price = state.price;
            for i in 0..points {
                let time = now - interval * (i as i32);
                let volume = self.rng.random_range(50..150u32);
                backwards.push(PricePoint {
                    time,
                    price: quantize(price, &state.spec),
                    volume,
                });
                let change = (self.rng.random::<f64>() - 0.5) * state.spec.volatility;
                price -= change;
            }
            state.history = backwards.into_iter().rev().collect();
        }
    }

    /// Advance every pair one tick and return the consistent snapshot.
    ///
    /// All pairs move even when only one is displayed, so background
    /// positions keep triggering their stops.
    pub fn advance(&mut self, now: DateTime<Utc>) -> PriceSnapshot {
        let mut prices = BTreeMap::new();
        for (symbol, state) in self.pairs.iter_mut() {
            let vol = state.spec.volatility;
            let trend = (self.rng.random::<f64>() - 0.5) * vol * 0.5;
            state.momentum = state.momentum * 0.9 + trend;
            let noise = (self.rng.random::<f64>() - 0.5) * vol * 0.5;
            state.price += state.momentum + noise;

            // Walks that collapse to zero restart from the baseline
            if state.price < 0.00001 {
                state.price = state.spec.baseline;
                state.momentum = 0.0;
            }

            let quantized = quantize(state.price, &state.spec);
            let volume = self.rng.random_range(50..150u32);
            state.history.push_back(PricePoint {
                time: now,
                price: quantized,
                volume,
            });
            while state.history.len() > self.history_depth {
                state.history.pop_front();
            }
            prices.insert(symbol.clone(), quantized);
        }
        PriceSnapshot { at: now, prices }
    }
}

fn quantize(price: f64, spec: &PairSpec) -> Decimal {
    Decimal::from_f64_retain(price)
        .unwrap_or_else(|| Decimal::from_f64_retain(spec.baseline).unwrap_or(Decimal::ONE))
        .round_dp(spec.decimals)
}
