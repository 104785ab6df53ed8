//! NexusTrade position risk & lifecycle engine
//!
//! The state-machine core of a simulated multi-pair trading terminal:
//! sizing, margin accounting, trailing stops, closure evaluation and
//! auto-entry gating, driven by a synchronous per-tick orchestration pass.
//!
//! ## Architecture
//!
//! ```text
//! Price Feed ── tick ──▶ Lifecycle Engine ──▶ Trailing Stop ──▶ Closure ──▶ Wallet Ledger
//!                              ▲
//!                        Auto-Entry Gate ◀── Signal ◀── Oracle (external)
//!                              ▲
//!                       Manual open requests
//! ```
//!
//! All positions and wallet balances are owned by the
//! [`engine::LifecycleEngine`] and mutated only inside its single-threaded
//! pass; the oracle call is the only async boundary and is guarded by the
//! gate's in-flight state machine.

pub mod analysis;
pub mod config;
pub mod engine;
pub mod error;
pub mod feed;
pub mod gate;
pub mod oracle;
pub mod sizing;
pub mod types;
pub mod wallet;

#[cfg(test)]
mod config_tests;
