//! The platform's permission and sensor surface.
//!
//! The service never talks to a sensor driver directly. It asks a
//! [`LocationPlatform`] for the current grant, to show the permission dialog,
//! and to start delivering sample batches. The platform then reports grant
//! changes through `LocationService::on_grant_changed` and pushes batches
//! through `LocationService::on_samples_delivered`.

use parking_lot::Mutex;

use crate::permission::{GrantLevel, OperatingMode};
use crate::service::ActivityProfile;

/// Permission and sensor operations provided by the host platform.
pub trait LocationPlatform: Send + Sync {
    /// The user's current grant level.
    fn grant_level(&self) -> GrantLevel;

    /// Show the platform permission dialog for `mode`.
    ///
    /// The answer arrives later as a grant change event.
    fn request_permission(&self, mode: OperatingMode);

    /// Start delivering sample batches tuned for `activity`.
    fn start_updates(&self, activity: ActivityProfile);
}

/// In-memory platform for replays and tests.
///
/// Holds a grant the host sets by hand and records every request it receives.
/// Changing the grant here does not notify the service; call
/// `on_grant_changed` as a real platform delegate would.
#[derive(Debug, Default)]
pub struct SimulatedPlatform {
    grant: Mutex<GrantLevel>,
    permission_requests: Mutex<Vec<OperatingMode>>,
    update_starts: Mutex<Vec<ActivityProfile>>,
}

impl SimulatedPlatform {
    /// Create a platform reporting `grant`.
    pub fn new(grant: GrantLevel) -> Self {
        Self {
            grant: Mutex::new(grant),
            ..Default::default()
        }
    }

    /// Change the reported grant.
    pub fn set_grant(&self, grant: GrantLevel) {
        *self.grant.lock() = grant;
    }

    /// Modes passed to `request_permission`, in call order.
    pub fn permission_requests(&self) -> Vec<OperatingMode> {
        self.permission_requests.lock().clone()
    }

    /// Activities passed to `start_updates`, in call order.
    pub fn update_starts(&self) -> Vec<ActivityProfile> {
        self.update_starts.lock().clone()
    }
}

impl LocationPlatform for SimulatedPlatform {
    fn grant_level(&self) -> GrantLevel {
        *self.grant.lock()
    }

    fn request_permission(&self, mode: OperatingMode) {
        tracing::debug!(%mode, "Simulated permission request");
        self.permission_requests.lock().push(mode);
    }

    fn start_updates(&self, activity: ActivityProfile) {
        tracing::debug!(%activity, "Simulated updates started");
        self.update_starts.lock().push(activity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulated_platform_records_calls() {
        let platform = SimulatedPlatform::new(GrantLevel::Undetermined);
        platform.request_permission(OperatingMode::AlwaysOn);
        platform.set_grant(GrantLevel::GrantedAlways);
        platform.start_updates(ActivityProfile::Fitness);

        assert_eq!(platform.grant_level(), GrantLevel::GrantedAlways);
        assert_eq!(platform.permission_requests(), vec![OperatingMode::AlwaysOn]);
        assert_eq!(platform.update_starts(), vec![ActivityProfile::Fitness]);
    }
}
