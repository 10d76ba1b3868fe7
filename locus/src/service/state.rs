//! Service lifecycle state.

use std::fmt;

/// Where the service is in its lifecycle.
///
/// ```text
/// Unconfigured --configure--> Configured --start--> AwaitingPermission
///                                  |                    |      ^
///                                  |        matching grant     | grant lowered
///                                  |                    v      |
///                                  +------start------> Active -+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ServiceState {
    /// No operating mode yet.
    #[default]
    Unconfigured,
    /// Mode set, `start` not called yet.
    Configured,
    /// Started, but the grant does not match the mode.
    AwaitingPermission,
    /// Accepting sample batches.
    Active,
}

impl ServiceState {
    /// True once `start` has been called.
    pub fn is_started(&self) -> bool {
        matches!(self, Self::AwaitingPermission | Self::Active)
    }

    /// User-facing status string.
    pub fn display_status(&self) -> &'static str {
        match self {
            Self::Unconfigured => "Not configured",
            Self::Configured => "Ready",
            Self::AwaitingPermission => "Waiting for permission",
            Self::Active => "Tracking",
        }
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_status())
    }
}
