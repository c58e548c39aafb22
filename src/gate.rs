//! Active Remote Selector
//!
//! Process-wide gate deciding which remote's inbound traffic may reach the
//! local bus. The check runs on every inbound message rather than toggling
//! subscriptions, so switching the active remote takes effect immediately
//! for channels that are already open.

use parking_lot::RwLock;

/// The currently active remote, shared across all relay callbacks.
///
/// A single-writer/multi-reader piece of routing context: set once at
/// startup from configuration, swappable at runtime by administrative
/// logic.
pub struct ActiveRemote {
    current: RwLock<String>,
}

impl ActiveRemote {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            current: RwLock::new(initial.into()),
        }
    }

    /// Name of the currently active remote.
    pub fn current(&self) -> String {
        self.current.read().clone()
    }

    /// Atomically switch the active remote.
    pub fn set(&self, remote: impl Into<String>) {
        *self.current.write() = remote.into();
    }

    /// Whether `remote` is the active remote.
    pub fn is_active(&self, remote: &str) -> bool {
        *self.current.read() == remote
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_remote_is_active() {
        let gate = ActiveRemote::new("robot");
        assert_eq!(gate.current(), "robot");
        assert!(gate.is_active("robot"));
        assert!(!gate.is_active("shore"));
    }

    #[test]
    fn test_set_switches_active_remote() {
        let gate = ActiveRemote::new("robot");
        gate.set("shore");
        assert_eq!(gate.current(), "shore");
        assert!(gate.is_active("shore"));
        assert!(!gate.is_active("robot"));
    }
}
