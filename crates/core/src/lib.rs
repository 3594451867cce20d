//! `cyberday-core` — shared domain primitives.
//!
//! This crate contains **pure domain** building blocks (no store or engine
//! concerns): typed identifiers, the virtual clock, and the shared store
//! error taxonomy.

pub mod cancel;
pub mod clock;
pub mod error;
pub mod id;

pub use cancel::CancelToken;
pub use clock::{Tick, Ttl, VirtualClock};
pub use error::{StoreError, StoreResult};
pub use id::{CartEventId, ProductId, SessionId};
