//! `cyberday-events` — session and cart-event records, plus the TTL event
//! store adapter boundary.
//!
//! Events are:
//! - **immutable** (treat them as facts)
//! - **ordered** (monotonic sequence per session)
//! - subject to **store-managed expiry** (the eventual-consistency source
//!   the reconciler must tolerate)

pub mod event;
pub mod in_memory;
pub mod session;
pub mod store;

pub use event::{CartEvent, EventKind};
pub use in_memory::InMemoryEventStore;
pub use session::{Session, SessionOutcome};
pub use store::{ActiveSnapshot, EventStore};
