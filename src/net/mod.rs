//! Network layer: wire types, the REST resource client, and the push channel.
//!
//! DESIGN
//! ======
//! Both halves are stateless relays. `api` translates one logical operation
//! into exactly one HTTP request; `push` owns the single socket connection.
//! Neither holds entity state — everything they learn flows into
//! [`crate::state::store::Store`] through the synchronizer's merge logic.

pub mod api;
pub mod push;
pub mod types;
