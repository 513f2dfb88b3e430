//! Session: the one context object tying the layer together.
//!
//! DESIGN
//! ======
//! Constructed once at session start and passed to collaborators instead of
//! living as ambient globals. Owns the store and the HTTP client; starting
//! the session resolves the local identity and then opens the push channel
//! (at most once, however many times `start` is called). Teardown is the
//! page's: the session lives until the tab goes away.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::net::api::HttpClient;
use crate::net::push::PushConfig;
use crate::net::types::UserId;
use crate::state::store::Store;
use crate::sync;

/// Install the console logger and panic hook. Call once, before `start`.
pub fn init_logging() {
    #[cfg(feature = "hydrate")]
    {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Debug);
    }
}

pub struct Session {
    store: Rc<RefCell<Store>>,
    client: HttpClient,
    push_config: PushConfig,
    push_started: Cell<bool>,
}

impl Default for Session {
    fn default() -> Self {
        Session::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Session::with_config(PushConfig::default())
    }

    pub fn with_config(push_config: PushConfig) -> Self {
        Session {
            store: Rc::new(RefCell::new(Store::new())),
            client: HttpClient,
            push_config,
            push_started: Cell::new(false),
        }
    }

    /// The cache store; the UI subscribes here.
    pub fn store(&self) -> &Rc<RefCell<Store>> {
        &self.store
    }

    pub fn client(&self) -> &HttpClient {
        &self.client
    }

    /// Resolve the local user, then open the push channel.
    ///
    /// The channel is only opened once the identity is known, and at most
    /// one listener task ever runs per session. Returns the resolved id, or
    /// `None` if the user fetch failed (the push channel is then not
    /// started; a later `start` retries both).
    pub async fn start(&self) -> Option<UserId> {
        let user_id = sync::resolve_self(&self.client, &self.store).await?;
        self.start_push();
        Some(user_id)
    }

    fn start_push(&self) {
        if self.push_started.replace(true) {
            return;
        }
        #[cfg(feature = "hydrate")]
        crate::net::push::spawn_push_listener(
            self.client,
            Rc::clone(&self.store),
            self.push_config,
        );
        #[cfg(not(feature = "hydrate"))]
        let _ = self.push_config;
    }
}
