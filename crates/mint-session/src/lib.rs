//! Wallet session core of the minting dApp.
//!
//! `WalletSession` owns the wallet connection, forces the wallet onto the one
//! required chain, and gates `mint` on what the contract reports. Rendering,
//! timers and task spawning are injected through `MintSurface` and
//! `Scheduler` so the same state machine runs in the browser and in tests.

pub mod chain;
pub mod error;
pub mod session;
pub mod state;
pub mod surface;

#[cfg(test)]
mod mock;

pub use error::SessionError;
pub use session::WalletSession;
pub use state::{ConnectionState, MintState, RevealState};
pub use surface::{MintSurface, Scheduler, TimerHandle};
