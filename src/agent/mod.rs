//! Offline cache agent module
//!
//! The core of the system: the agent reacting to install, activate and
//! fetch signals, the lifecycle phases it moves through, the client
//! control-claim registry, and the host that drives deployments.

mod clients;
mod host;
mod phase;
mod worker;

pub use clients::{ClientRegistry, DiskClientRegistry, MemoryClientRegistry};
pub use host::AgentHost;
pub use phase::AgentPhase;
pub use worker::{AgentConfig, CacheAgent};
