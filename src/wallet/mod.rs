//! Wallet ledger
//!
//! Named balance pools (demo and live) with the two margin operations every
//! position goes through: reserve on open, release on close. The ledger is
//! owned by the lifecycle engine and only mutated from its single-threaded
//! tick pass, so each operation is atomic with respect to position updates.

use crate::config::WalletConfig;
use crate::error::{EngineError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

/// Named balance pools
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WalletKind {
    Demo,
    Live,
}

impl std::fmt::Display for WalletKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WalletKind::Demo => write!(f, "DEMO"),
            WalletKind::Live => write!(f, "LIVE"),
        }
    }
}

/// Balance ledger for all wallets
#[derive(Debug, Clone)]
pub struct Ledger {
    balances: HashMap<WalletKind, Decimal>,
}

impl Ledger {
    pub fn new(config: &WalletConfig) -> Self {
        let mut balances = HashMap::new();
        balances.insert(WalletKind::Demo, config.demo_balance);
        balances.insert(WalletKind::Live, config.live_balance);
        Self { balances }
    }

    /// Current balance of one wallet
    pub fn balance(&self, kind: WalletKind) -> Decimal {
        self.balances.get(&kind).copied().unwrap_or(Decimal::ZERO)
    }

    /// Debit margin for a new position.
    ///
    /// Fails with [`EngineError::InsufficientFunds`] when the amount exceeds
    /// the available balance; no partial debit occurs.
    pub fn reserve_margin(&mut self, kind: WalletKind, amount: Decimal) -> Result<()> {
        let balance = self.balances.entry(kind).or_insert(Decimal::ZERO);
        if amount > *balance {
            return Err(EngineError::InsufficientFunds {
                required: amount,
                available: *balance,
            });
        }
        *balance -= amount;
        debug!("Reserved {} margin from {} wallet, {} left", amount, kind, balance);
        Ok(())
    }

    /// Return margin plus realized profit at closure.
    ///
    /// Called exactly once per position; profit may be negative.
    pub fn release_margin(&mut self, kind: WalletKind, amount: Decimal, profit: Decimal) {
        let balance = self.balances.entry(kind).or_insert(Decimal::ZERO);
        *balance += amount + profit;
        debug!(
            "Released {} margin to {} wallet ({} P&L), balance {}",
            amount, kind, profit, balance
        );
    }

    /// Overwrite a wallet balance from a broker sync. An external deposit,
    /// outside the conservation accounting of reserve/release.
    pub fn sync_balance(&mut self, kind: WalletKind, amount: Decimal) {
        self.balances.insert(kind, amount);
        info!("{} wallet synced to {}", kind, amount);
    }
}
