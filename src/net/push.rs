//! Push channel: the single persistent socket carrying server-initiated
//! updates.
//!
//! ARCHITECTURE
//! ============
//! The listener owns one WebSocket at `/ws/` and relays parsed envelopes
//! into the store through the same merge logic the synchronizer uses.
//! Envelopes are handled strictly one at a time in delivery order: a
//! group-changed envelope awaits its refresh inline before the next frame
//! is read. No outbound messages are ever sent on this channel.
//!
//! The connection loop reconnects with capped exponential backoff. It is
//! spawned once per session, after the local user identity is resolved, so
//! self-referential events can be attributed.
//!
//! All socket code is gated behind `hydrate`; envelope dispatch is pure and
//! tested natively.

#[cfg(test)]
#[path = "push_test.rs"]
mod push_test;

use crate::net::types::{Envelope, GroupId};
use crate::state::store::Store;

/// How to route an envelope carrying more than one field.
///
/// The server contract does not make `group`/`user`/`message` mutually
/// exclusive. The historical behavior is [`RoutingMode::Multiplex`]; the
/// exclusive reading is available rather than guessed at.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RoutingMode {
    /// Every present field is applied.
    #[default]
    Multiplex,
    /// Only the first present field (group, then user, then message) is
    /// applied.
    FirstMatch,
}

/// Push channel tuning.
#[derive(Clone, Copy, Debug)]
pub struct PushConfig {
    pub routing: RoutingMode,
    pub initial_backoff_ms: u32,
    pub max_backoff_ms: u32,
}

impl Default for PushConfig {
    fn default() -> Self {
        PushConfig {
            routing: RoutingMode::Multiplex,
            initial_backoff_ms: 1000,
            max_backoff_ms: 10_000,
        }
    }
}

/// Apply one envelope to the store.
///
/// `user` and `message` fields are merged directly. A `group` field only
/// names the changed group; the returned id tells the caller to run a
/// refresh, which needs the network and so cannot happen here.
pub fn apply_envelope(
    store: &mut Store,
    envelope: &Envelope,
    routing: RoutingMode,
) -> Option<GroupId> {
    match routing {
        RoutingMode::Multiplex => {
            if let Some(user) = &envelope.user {
                store.merge_user(user);
            }
            if let Some(message) = &envelope.message {
                store.append_message(message.group_id, message.clone());
            }
            envelope.group.as_ref().map(|group| group.group_id)
        }
        RoutingMode::FirstMatch => {
            if let Some(group) = &envelope.group {
                return Some(group.group_id);
            }
            if let Some(user) = &envelope.user {
                store.merge_user(user);
            } else if let Some(message) = &envelope.message {
                store.append_message(message.group_id, message.clone());
            }
            None
        }
    }
}

#[cfg(feature = "hydrate")]
pub use listener::spawn_push_listener;

#[cfg(feature = "hydrate")]
mod listener {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    use futures::StreamExt;
    use gloo_net::websocket::Message as WsMessage;
    use gloo_net::websocket::futures::WebSocket;

    use super::{PushConfig, RoutingMode, apply_envelope};
    use crate::net::api::ResourceClient;
    use crate::net::types::Envelope;
    use crate::state::store::{ConnectionStatus, Store};
    use crate::sync;

    /// Spawn the push listener lifecycle as a local async task.
    pub fn spawn_push_listener<C>(client: C, store: Rc<RefCell<Store>>, config: PushConfig)
    where
        C: ResourceClient + 'static,
    {
        wasm_bindgen_futures::spawn_local(push_loop(client, store, config));
    }

    /// Main connection loop with reconnect logic.
    async fn push_loop<C: ResourceClient>(client: C, store: Rc<RefCell<Store>>, config: PushConfig) {
        let mut backoff_ms = config.initial_backoff_ms.max(1);

        loop {
            store.borrow_mut().set_connection(ConnectionStatus::Connecting);

            match connect_and_listen(&push_url(), &client, &store, config.routing).await {
                Ok(()) => log::info!("push channel closed"),
                Err(e) => log::warn!("push channel error: {e}"),
            }

            store.borrow_mut().set_connection(ConnectionStatus::Disconnected);

            gloo_timers::future::sleep(Duration::from_millis(u64::from(backoff_ms))).await;
            backoff_ms = (backoff_ms * 2).min(config.max_backoff_ms);
        }
    }

    /// Socket URL on the page's own host; secure scheme iff the page is.
    fn push_url() -> String {
        let location = web_sys::window()
            .and_then(|w| w.location().href().ok())
            .unwrap_or_default();
        let scheme = if location.starts_with("https") { "wss" } else { "ws" };
        let host = web_sys::window()
            .and_then(|w| w.location().host().ok())
            .unwrap_or_else(|| "localhost:8080".to_owned());
        format!("{scheme}://{host}/ws/")
    }

    /// Connect and process envelopes until the socket closes or errors.
    async fn connect_and_listen<C: ResourceClient>(
        url: &str,
        client: &C,
        store: &Rc<RefCell<Store>>,
        routing: RoutingMode,
    ) -> Result<(), String> {
        let ws = WebSocket::open(url).map_err(|e| e.to_string())?;
        let (_write, mut read) = ws.split();

        store.borrow_mut().set_connection(ConnectionStatus::Connected);
        log::info!("push channel open");

        while let Some(frame) = read.next().await {
            match frame {
                Ok(WsMessage::Text(text)) => match serde_json::from_str::<Envelope>(&text) {
                    Ok(envelope) => {
                        let refresh =
                            apply_envelope(&mut store.borrow_mut(), &envelope, routing);
                        if let Some(group_id) = refresh {
                            sync::refresh_group(client, store, group_id).await;
                        }
                    }
                    Err(e) => log::warn!("undecodable push envelope: {e}"),
                },
                Ok(WsMessage::Bytes(_)) => {}
                Err(e) => return Err(e.to_string()),
            }
        }

        Ok(())
    }
}
