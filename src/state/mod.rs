//! Client-side state.
//!
//! DESIGN
//! ======
//! One store, one owner. The [`store::Store`] is the single source of truth
//! the UI subscribes to; the network layers relay server state into it but
//! never hold entity state of their own.

pub mod store;
