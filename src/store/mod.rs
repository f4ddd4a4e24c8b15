//! Team workflow store
//!
//! Owns the set of teams, the current selection, the deployed team record
//! and the loading flag, and notifies subscribers after every change.

pub mod clock;
pub mod errors;
pub mod state;
pub mod subscription;
pub mod team_store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use errors::{StoreError, StoreResult};
pub use state::StoreState;
pub use subscription::{Listener, StoreEvent, SubscriptionId};
pub use team_store::TeamStore;
