//! Agent lifecycle phases

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle phase of one agent instance
///
/// The deploy path runs `New -> Installing -> Installed -> Activating ->
/// Active`. `Failed` is reached when install or activate propagates an
/// error; install may be retried from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentPhase {
    /// Constructed, no lifecycle signal handled yet
    New,
    /// Install signal held open while the cache populates
    Installing,
    /// Population settled successfully; awaiting activation
    Installed,
    /// Activate signal held open while stale stores are reclaimed
    Activating,
    /// In control; fetch interception is meaningful
    Active,
    /// A lifecycle handler propagated an error
    Failed,
}

impl AgentPhase {
    /// Whether a lifecycle handler is currently held open
    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::Installing | Self::Activating)
    }
}

impl fmt::Display for AgentPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::New => "new",
            Self::Installing => "installing",
            Self::Installed => "installed",
            Self::Activating => "activating",
            Self::Active => "active",
            Self::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}
