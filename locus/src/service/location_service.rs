//! `LocationService` implementation.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use super::profile::ActivityProfile;
use super::state::ServiceState;
use crate::bridge::{AsyncBridge, BridgeStats};
use crate::broadcast::{ChangeBroadcaster, ChangeObserver, SubscriptionId};
use crate::config::ServiceConfig;
use crate::error::LocationError;
use crate::geocode::{first_candidate, Geocoder, Placemark};
use crate::permission::{
    Action, GrantLevel, OperatingMode, PermissionStateMachine, SettingsPrompt,
};
use crate::platform::LocationPlatform;
use crate::sample::{Aggregation, LocationEstimate, RawSample, SampleAggregator};

/// Lifecycle and permission state. Written only under the control lock.
struct Control {
    state: ServiceState,
    config: Option<ServiceConfig>,
    permission: Option<PermissionStateMachine>,
}

/// Platform call decided under the control lock, run after releasing it.
enum Effect {
    None,
    RequestPermission(OperatingMode),
    StartUpdates(ActivityProfile),
    Prompt(SettingsPrompt),
}

/// Shared location manager.
///
/// See the [module docs](super) for the overall flow.
pub struct LocationService {
    platform: Arc<dyn LocationPlatform>,
    geocoder: Arc<dyn Geocoder>,
    control: Mutex<Control>,
    /// Replaced wholesale on every update.
    estimate: RwLock<Option<Arc<LocationEstimate>>>,
    /// Serializes batch processing so publishes follow delivery order.
    delivery: Mutex<()>,
    aggregator: SampleAggregator,
    broadcaster: ChangeBroadcaster,
    bridge: AsyncBridge,
}

impl LocationService {
    /// Create an unconfigured service.
    pub fn new(platform: Arc<dyn LocationPlatform>, geocoder: Arc<dyn Geocoder>) -> Self {
        Self {
            platform,
            geocoder,
            control: Mutex::new(Control {
                state: ServiceState::Unconfigured,
                config: None,
                permission: None,
            }),
            estimate: RwLock::new(None),
            delivery: Mutex::new(()),
            aggregator: SampleAggregator::new(),
            broadcaster: ChangeBroadcaster::new(),
            bridge: AsyncBridge::new(),
        }
    }

    /// Create a service already configured with `config`.
    pub fn with_config(
        config: ServiceConfig,
        platform: Arc<dyn LocationPlatform>,
        geocoder: Arc<dyn Geocoder>,
    ) -> Self {
        let service = Self::new(platform, geocoder);
        {
            let mut control = service.control.lock();
            control.permission = Some(PermissionStateMachine::new(config.mode));
            control.config = Some(config);
            control.state = ServiceState::Configured;
        }
        service
    }

    // ─── Lifecycle ──────────────────────────────────────────────────────────

    /// Set the operating mode and activity profile.
    ///
    /// Must happen before [`start`](Self::start). Once started the mode is
    /// fixed and reconfiguring is rejected with
    /// [`LocationError::AlreadyStarted`].
    pub fn configure(&self, config: ServiceConfig) -> Result<(), LocationError> {
        let mut control = self.control.lock();
        if control.state.is_started() {
            tracing::warn!(state = %control.state, "Rejected configure after start");
            return Err(LocationError::AlreadyStarted);
        }

        tracing::info!(
            mode = %config.mode,
            activity = %config.activity,
            "Location service configured"
        );
        control.permission = Some(PermissionStateMachine::new(config.mode));
        control.config = Some(config);
        control.state = ServiceState::Configured;
        Ok(())
    }

    /// Evaluate the platform's current grant and act on it.
    ///
    /// - `RequestPermission`: asks the platform to show its dialog.
    /// - `PromptUser`: calls `on_blocked` with the prompt to render.
    /// - `BeginUpdates`: starts sample delivery.
    ///
    /// Returns the action taken. Calling `start` on an active service is a
    /// no-op returning `BeginUpdates`.
    pub fn start<F>(&self, on_blocked: F) -> Result<Action, LocationError>
    where
        F: FnOnce(SettingsPrompt),
    {
        let grant = self.platform.grant_level();

        let (action, effect) = {
            let mut control = self.control.lock();
            if control.state == ServiceState::Active {
                tracing::debug!("start called on active service");
                return Ok(Action::BeginUpdates);
            }

            let activity = match &control.config {
                Some(config) => config.activity,
                None => {
                    tracing::warn!("Rejected start before configure");
                    return Err(LocationError::NotConfigured);
                }
            };
            let action = match control.permission.as_mut() {
                Some(permission) => permission.observe(grant),
                None => return Err(LocationError::NotConfigured),
            };

            let effect = match action {
                Action::RequestPermission(mode) => {
                    control.state = ServiceState::AwaitingPermission;
                    Effect::RequestPermission(mode)
                }
                Action::PromptUser(prompt) => {
                    control.state = ServiceState::AwaitingPermission;
                    Effect::Prompt(prompt)
                }
                Action::BeginUpdates => {
                    control.state = ServiceState::Active;
                    Effect::StartUpdates(activity)
                }
            };
            (action, effect)
        };

        tracing::info!(%grant, ?action, "Location service started");
        match effect {
            Effect::Prompt(prompt) => on_blocked(prompt),
            other => self.apply(other),
        }
        Ok(action)
    }

    /// Handle a grant change reported by the platform.
    ///
    /// A grant that matches the mode moves a started service to `Active` and
    /// begins updates. Any other grant leaves (or moves) it in
    /// `AwaitingPermission`; no prompt is fired from here, the returned
    /// action lets the caller render one if it wants to.
    ///
    /// Returns `None` if the service is not configured.
    pub fn on_grant_changed(&self, grant: GrantLevel) -> Option<Action> {
        let (action, effect) = {
            let mut control = self.control.lock();
            let permission = control.permission.as_mut()?;
            let action = permission.observe(grant);
            let mode = permission.mode();
            let satisfied = permission.is_satisfied();
            let activity = control.config.as_ref()?.activity;

            let effect = match (control.state, satisfied) {
                (ServiceState::AwaitingPermission, true) => {
                    control.state = ServiceState::Active;
                    tracing::info!(%grant, %mode, "Permission granted, starting updates");
                    Effect::StartUpdates(activity)
                }
                (ServiceState::Active, false) => {
                    control.state = ServiceState::AwaitingPermission;
                    tracing::info!(%grant, %mode, "Permission no longer sufficient, pausing");
                    Effect::None
                }
                _ => Effect::None,
            };
            (action, effect)
        };

        self.apply(effect);
        Some(action)
    }

    fn apply(&self, effect: Effect) {
        match effect {
            Effect::RequestPermission(mode) => self.platform.request_permission(mode),
            Effect::StartUpdates(activity) => self.platform.start_updates(activity),
            Effect::Prompt(_) | Effect::None => {}
        }
    }

    // ─── Samples ────────────────────────────────────────────────────────────

    /// Reduce a sample batch and, if it yields an estimate, store it and
    /// notify observers.
    ///
    /// Ignored unless the service is `Active`. A batch with no valid samples
    /// leaves the current estimate untouched and publishes nothing. Returns
    /// true if the estimate was replaced.
    pub fn on_samples_delivered(&self, samples: &[RawSample]) -> bool {
        let _ordered = self.delivery.lock();

        let state = self.control.lock().state;
        if state != ServiceState::Active {
            tracing::trace!(%state, batch = samples.len(), "Ignoring samples while not active");
            return false;
        }

        let estimate = match self.aggregator.aggregate(samples) {
            Aggregation::Updated(estimate) => estimate,
            Aggregation::NoUpdate => {
                tracing::debug!(batch = samples.len(), "Batch had no valid samples");
                return false;
            }
        };

        tracing::debug!(
            latitude = estimate.latitude,
            longitude = estimate.longitude,
            accuracy = estimate.horizontal_accuracy,
            samples = estimate.sample_count,
            "Location estimate updated"
        );
        *self.estimate.write() = Some(Arc::new(estimate));

        let report = self.broadcaster.publish();
        if report.failed > 0 {
            tracing::warn!(failed = report.failed, "Some observers failed");
        }
        true
    }

    /// The current estimate, or `None` if none has been computed yet.
    pub fn current_location(&self) -> Option<Arc<LocationEstimate>> {
        self.estimate.read().clone()
    }

    // ─── Reverse geocoding ──────────────────────────────────────────────────

    /// Resolve the current estimate to a placemark, blocking for at most the
    /// configured geocode timeout.
    ///
    /// Returns `None` without touching the geocoder when there is no
    /// estimate. Timeouts, failed lookups and empty results also give `None`.
    /// Must not be called from the thread the geocoder delivers on.
    pub fn current_address(&self) -> Option<Placemark> {
        let estimate = self.current_location()?;
        let coordinate = estimate.coordinate();
        let geocoder = Arc::clone(&self.geocoder);

        self.bridge
            .run_blocking(self.geocode_timeout(), move |resolver| {
                geocoder.reverse_geocode(
                    coordinate,
                    Box::new(move |result| {
                        resolver.resolve(first_candidate(result));
                    }),
                );
            })
            .ok()
            .flatten()
    }

    /// Async form of [`current_address`](Self::current_address).
    pub async fn current_address_async(&self) -> Option<Placemark> {
        let estimate = self.current_location()?;
        let coordinate = estimate.coordinate();
        let geocoder = Arc::clone(&self.geocoder);

        self.bridge
            .run_async(self.geocode_timeout(), move |resolver| {
                geocoder.reverse_geocode(
                    coordinate,
                    Box::new(move |result| {
                        resolver.resolve(first_candidate(result));
                    }),
                );
            })
            .await
            .ok()
            .flatten()
    }

    /// Callback form of [`current_address`](Self::current_address).
    ///
    /// `callback` runs exactly once: immediately with `None` if there is no
    /// estimate, otherwise with the lookup's first candidate on whatever
    /// thread the geocoder answers from.
    pub fn current_address_with<F>(&self, callback: F)
    where
        F: FnOnce(Option<Placemark>) + Send + 'static,
    {
        let Some(estimate) = self.current_location() else {
            callback(None);
            return;
        };

        self.geocoder.reverse_geocode(
            estimate.coordinate(),
            Box::new(move |result| callback(first_candidate(result))),
        );
    }

    fn geocode_timeout(&self) -> std::time::Duration {
        self.control
            .lock()
            .config
            .as_ref()
            .map(|c| c.geocode_timeout)
            .unwrap_or(crate::config::DEFAULT_GEOCODE_TIMEOUT)
    }

    // ─── Observers ──────────────────────────────────────────────────────────

    /// Register `observer` for change signals. The service keeps only a weak
    /// reference.
    pub fn subscribe<O>(&self, observer: &Arc<O>) -> SubscriptionId
    where
        O: ChangeObserver + 'static,
    {
        self.broadcaster.subscribe(observer)
    }

    /// Remove a registration. Returns false if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.broadcaster.unsubscribe(id)
    }

    // ─── Introspection ──────────────────────────────────────────────────────

    /// Current lifecycle state.
    pub fn state(&self) -> ServiceState {
        self.control.lock().state
    }

    /// Active configuration, if configured.
    pub fn config(&self) -> Option<ServiceConfig> {
        self.control.lock().config.clone()
    }

    /// Last grant level observed from the platform.
    pub fn grant(&self) -> GrantLevel {
        self.control
            .lock()
            .permission
            .as_ref()
            .map(|p| p.grant())
            .unwrap_or_default()
    }

    /// Counters of the bridge used for reverse geocoding.
    pub fn bridge_stats(&self) -> BridgeStats {
        self.bridge.stats()
    }
}
