//! Position lifecycle engine
//!
//! The orchestrator that owns all positions and the wallet ledger. Every
//! mutation flows through one of two single-threaded entry points: an open
//! request (manual or gate-admitted) or the per-tick evaluation pass. The
//! pass runs the trailing engine and then the closure evaluator over each
//! open position against one price snapshot, so a position can tighten its
//! stop and close against that tightened stop within the same tick.

pub mod closure;
pub mod position;
pub mod trailing;


pub use closure::CloseTrigger;
pub use position::{Position, PositionStatus};

use crate::config::{Config, GateConfig, RiskConfig};
use crate::error::{EngineError, Result};
use crate::feed::PriceSnapshot;
use crate::sizing::size_position;
use crate::types::{Direction, EntrySource, OpenRequest};
use crate::wallet::{Ledger, WalletKind};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{info, warn};
use uuid::Uuid;

/// One closure produced by a tick pass
#[derive(Debug, Clone)]
pub struct ClosedTrade {
    pub id: Uuid,
    pub symbol: String,
    pub trigger: CloseTrigger,
    pub close_price: Decimal,
    pub realized_pnl: Decimal,
}

/// What one orchestration pass did
#[derive(Debug, Default)]
pub struct TickReport {
    pub stops_adjusted: usize,
    pub closed: Vec<ClosedTrade>,
}

/// Account state derived from the position set and ledger
#[derive(Debug, Clone, Serialize)]
pub struct AccountSummary {
    pub wallet: WalletKind,
    pub balance: Decimal,
    pub margin_locked: Decimal,
    pub unrealized_pnl: Decimal,
    /// balance + locked margin + unrealized P&L
    pub equity: Decimal,
    pub realized_pnl: Decimal,
    pub open_positions: u32,
    pub closed_trades: u32,
    pub win_rate: Decimal,
    pub updated_at: DateTime<Utc>,
}

/// Owner of the position set and ledger; see the module docs
pub struct LifecycleEngine {
    positions: HashMap<Uuid, Position>,
    ledger: Ledger,
    risk: RiskConfig,
    gate: GateConfig,
    active_wallet: WalletKind,
}

impl LifecycleEngine {
    pub fn new(config: &Config) -> Self {
        Self {
            positions: HashMap::new(),
            ledger: Ledger::new(&config.wallet),
            risk: config.risk.clone(),
            gate: config.gate.clone(),
            active_wallet: WalletKind::Demo,
        }
    }

    pub fn active_wallet(&self) -> WalletKind {
        self.active_wallet
    }

    pub fn set_active_wallet(&mut self, wallet: WalletKind) {
        self.active_wallet = wallet;
    }

    pub fn risk(&self) -> &RiskConfig {
        &self.risk
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Broker sync: overwrite a wallet balance (external deposit)
    pub fn connect_broker(&mut self, wallet: WalletKind, balance: Decimal) {
        self.ledger.sync_balance(wallet, balance);
        self.active_wallet = wallet;
    }

    pub fn position(&self, id: Uuid) -> Option<&Position> {
        self.positions.get(&id)
    }

    /// All positions, open and closed
    pub fn positions(&self) -> impl Iterator<Item = &Position> {
        self.positions.values()
    }

    pub fn open_positions(&self) -> impl Iterator<Item = &Position> {
        self.positions.values().filter(|p| p.is_open())
    }

    /// Open positions currently held on one symbol
    pub fn open_count(&self, symbol: &str) -> usize {
        self.open_positions().filter(|p| p.symbol == symbol).count()
    }

    /// Open a position from a request, sizing it against the active wallet.
    ///
    /// Fails without any wallet mutation when sizing or the margin
    /// reservation rejects the request.
    pub fn open_position(
        &mut self,
        request: &OpenRequest,
        entry_price: Decimal,
        now: DateTime<Utc>,
    ) -> Result<Uuid> {
        let wallet = self.active_wallet;
        let balance = self.ledger.balance(wallet);
        let sized = size_position(balance, self.risk.risk_level.risk_fraction(), entry_price)?;

        let (stop_loss, take_profit) = self.resolve_levels(request, entry_price);

        self.ledger.reserve_margin(wallet, sized.margin)?;

        let position = Position::open(
            &request.symbol,
            request.direction,
            entry_price,
            sized.quantity,
            stop_loss,
            take_profit,
            wallet,
            request.source,
            request.reason.clone(),
            now,
        );
        let id = position.id;
        info!(
            "Opened {} {} {} @ {} (qty {}, margin {})",
            position.source_label(),
            position.direction,
            position.symbol,
            entry_price,
            position.quantity,
            sized.margin
        );
        self.positions.insert(id, position);
        Ok(id)
    }

    /// Auto entries always get exit levels: the oracle's suggestions when
    /// present, otherwise generic percentage levels around the entry.
    /// Manual entries keep exactly what the trader typed.
    fn resolve_levels(
        &self,
        request: &OpenRequest,
        entry_price: Decimal,
    ) -> (Option<Decimal>, Option<Decimal>) {
        if request.source == EntrySource::Manual {
            return (request.stop_loss, request.take_profit);
        }
        let (fallback_stop, fallback_target) = match request.direction {
            Direction::Long => (
                entry_price * (Decimal::ONE - self.gate.fallback_stop_pct),
                entry_price * (Decimal::ONE + self.gate.fallback_target_pct),
            ),
            Direction::Short => (
                entry_price * (Decimal::ONE + self.gate.fallback_stop_pct),
                entry_price * (Decimal::ONE - self.gate.fallback_target_pct),
            ),
        };
        (
            request.stop_loss.or(Some(fallback_stop)),
            request.take_profit.or(Some(fallback_target)),
        )
    }

    /// One orchestration pass over every open position.
    ///
    /// Trailing runs before closure for each position; a fault in one
    /// position is isolated and never blocks the rest of the pass.
    pub fn on_tick(&mut self, snapshot: &PriceSnapshot, now: DateTime<Utc>) -> TickReport {
        let mut report = TickReport::default();
        let open_ids: Vec<Uuid> = self
            .positions
            .values()
            .filter(|p| p.is_open())
            .map(|p| p.id)
            .collect();

        for id in open_ids {
            if let Err(e) = self.evaluate_position(id, snapshot, now, &mut report) {
                warn!("Skipping position {} this tick: {}", id, e);
            }
        }
        report
    }

    fn evaluate_position(
        &mut self,
        id: Uuid,
        snapshot: &PriceSnapshot,
        now: DateTime<Utc>,
        report: &mut TickReport,
    ) -> Result<()> {
        let position = self
            .positions
            .get_mut(&id)
            .ok_or_else(|| EngineError::PositionNotFound(id.to_string()))?;
        let price = snapshot
            .get(&position.symbol)
            .ok_or_else(|| EngineError::UnknownSymbol(position.symbol.clone()))?;

        if trailing::apply(position, price) {
            report.stops_adjusted += 1;
        }

        if let Some(trigger) = closure::evaluate(position, price) {
            let realized = closure::realized_pnl(position, price);
            let margin = position.margin();
            let wallet = position.wallet;
            position.close(price, realized, now);
            info!(
                "Closed {} {} @ {} ({}, P&L {})",
                position.direction, position.symbol, price, trigger, realized
            );
            report.closed.push(ClosedTrade {
                id,
                symbol: position.symbol.clone(),
                trigger,
                close_price: price,
                realized_pnl: realized,
            });
            self.ledger.release_margin(wallet, margin, realized);
        }
        Ok(())
    }

    /// Account roll-up for the active wallet at one snapshot
    pub fn summary(&self, snapshot: &PriceSnapshot) -> AccountSummary {
        let wallet = self.active_wallet;
        let balance = self.ledger.balance(wallet);

        let mut margin_locked = Decimal::ZERO;
        let mut unrealized = Decimal::ZERO;
        let mut open_count = 0u32;
        for position in self.open_positions().filter(|p| p.wallet == wallet) {
            margin_locked += position.margin();
            open_count += 1;
            if let Some(price) = snapshot.get(&position.symbol) {
                unrealized += position.unrealized_pnl(price);
            }
        }

        let closed: Vec<&Position> = self
            .positions
            .values()
            .filter(|p| !p.is_open() && p.wallet == wallet)
            .collect();
        let realized: Decimal = closed.iter().filter_map(|p| p.realized_pnl).sum();
        let wins = closed
            .iter()
            .filter(|p| p.realized_pnl.unwrap_or(Decimal::ZERO) > Decimal::ZERO)
            .count();
        let win_rate = if closed.is_empty() {
            Decimal::ZERO
        } else {
            Decimal::from(wins as u64) / Decimal::from(closed.len() as u64) * dec!(100)
        };

        AccountSummary {
            wallet,
            balance,
            margin_locked,
            unrealized_pnl: unrealized,
            equity: balance + margin_locked + unrealized,
            realized_pnl: realized,
            open_positions: open_count,
            closed_trades: closed.len() as u32,
            win_rate,
            updated_at: snapshot.at,
        }
    }
}

impl Position {
    fn source_label(&self) -> &'static str {
        match self.source {
            EntrySource::Manual => "manual",
            EntrySource::Auto => "auto",
        }
    }
}
