//! # huddle-client
//!
//! Real-time synchronization layer for the Huddle group-scheduling/chat
//! browser client. It owns the in-memory cache of groups and users, the
//! mutating operations that keep that cache consistent with the server over
//! REST, and the push-channel listener that reconciles server-initiated
//! updates into the same cache.
//!
//! Rendering, routing and notification plumbing live elsewhere; this crate is
//! the single source of truth those layers subscribe to.
//!
//! All browser I/O is gated behind the `hydrate` feature so the logic layers
//! (wire types, cache store, synchronizer composition, envelope dispatch)
//! compile and test natively.

pub mod net;
pub mod session;
pub mod state;
pub mod sync;
