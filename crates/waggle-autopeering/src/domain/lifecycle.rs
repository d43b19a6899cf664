//! Lifecycle vocabulary for the supervised subsystem.

use std::fmt;

/// Phases of the autopeering lifecycle.
///
/// States advance strictly forward. A stopped subsystem is never
/// restarted in place; the host builds a fresh supervisor instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SupervisorState {
    /// Constructed, nothing acquired.
    Idle,
    /// Resolving the bind and advertised addresses.
    Resolving,
    /// Probing reachability of the advertised address.
    SelfTesting,
    /// Binding the peering transport.
    Listening,
    /// Protocols started, serving traffic.
    Running,
    /// Teardown in progress.
    ShuttingDown,
    /// All resources released. Terminal.
    Stopped,
}

impl SupervisorState {
    /// Whether this is the terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SupervisorState::Stopped)
    }
}

impl fmt::Display for SupervisorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SupervisorState::Idle => "idle",
            SupervisorState::Resolving => "resolving",
            SupervisorState::SelfTesting => "self-testing",
            SupervisorState::Listening => "listening",
            SupervisorState::Running => "running",
            SupervisorState::ShuttingDown => "shutting-down",
            SupervisorState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_states_order_forward() {
        use SupervisorState::*;
        let order = [
            Idle,
            Resolving,
            SelfTesting,
            Listening,
            Running,
            ShuttingDown,
            Stopped,
        ];
        assert!(order.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_only_stopped_is_terminal() {
        assert!(SupervisorState::Stopped.is_terminal());
        assert!(!SupervisorState::Running.is_terminal());
        assert!(!SupervisorState::Idle.is_terminal());
    }

    #[test]
    fn test_states_display_kebab_case() {
        assert_eq!(SupervisorState::SelfTesting.to_string(), "self-testing");
        assert_eq!(SupervisorState::ShuttingDown.to_string(), "shutting-down");
    }
}
