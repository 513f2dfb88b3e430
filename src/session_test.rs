use futures::executor::block_on;

use super::*;

#[test]
fn new_session_starts_with_an_empty_store() {
    let session = Session::new();
    let store = session.store().borrow();
    assert!(store.user_id().is_none());
    assert_eq!(store.groups().count(), 0);
}

#[test]
fn start_without_a_browser_resolves_nothing() {
    // Off-wasm the resource client reports Unavailable; the session must
    // degrade to "not started" rather than panic, and leave the store alone.
    let session = Session::new();
    assert_eq!(block_on(session.start()), None);
    assert!(session.store().borrow().user_id().is_none());
}
