//! Location service façade.
//!
//! [`LocationService`] owns one permission state machine, sample aggregator,
//! change broadcaster and async bridge. It is constructed explicitly and
//! shared by reference (`Arc<LocationService>`) with whatever needs it.
//!
//! # Flow
//!
//! ```text
//! configure(mode) ─► start ─► evaluate grant ─┬─► RequestPermission ─► platform dialog
//!                                             ├─► PromptUser ────────► on_blocked(prompt)
//!                                             └─► BeginUpdates ──────► platform.start_updates
//!
//! platform ─► on_samples_delivered(batch) ─► aggregate ─► store estimate ─► publish()
//!                                                                              │
//! observer ◄───────────────────────────────────────────────────────────────────┘
//!    └─► current_location() / current_address()
//! ```
//!
//! # Threading
//!
//! Grant changes and sample batches may arrive on any thread. All writes are
//! serialized; reads of the current estimate see either the old or the new
//! value, never a partial one. Observers run on the delivering thread and
//! must hop to the UI thread themselves. They must not deliver samples back
//! into the service from inside a notification.

mod location_service;
mod profile;
mod state;

pub use location_service::LocationService;
pub use profile::ActivityProfile;
pub use state::ServiceState;
