//! In-process backends.

pub mod ledger;
pub mod relay;
pub mod state;

pub use ledger::MemoryTeamLedger;
pub use relay::MemoryRelay;
pub use state::MemoryStateStore;
