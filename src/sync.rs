//! Synchronizer: composes resource client calls with cache store merges.
//!
//! DESIGN
//! ======
//! The UI only ever calls these functions; it never talks to the network or
//! writes the store directly. Two patterns cover everything:
//!
//! - **refresh**: fetch a group snapshot and merge it, guarded by a refresh
//!   ticket so an out-of-order response cannot overwrite newer state.
//! - **fire-and-log**: issue a mutation, and on success refresh the group to
//!   pick up server-computed fields (ids, vote tallies). Failures are logged
//!   and reported as a sentinel return — never thrown, never rolled back.
//!   The store simply does not change, so the UI keeps showing prior state.
//!
//! Functions take the store as `&RefCell<Store>`; borrows are taken after
//! each network suspension point, never held across one.

#[cfg(test)]
#[path = "sync_test.rs"]
mod sync_test;

use std::cell::RefCell;

use crate::net::api::{ApiResult, ResourceClient};
use crate::net::types::{
    ActivityId, AvailabilityId, ChatWindow, GroupId, GroupSnapshot, NewActivity, NewAvailability,
    TaskId, TaskPatch, User, UserId,
};
use crate::state::store::Store;

/// Fetch a group and merge the snapshot into the store.
///
/// On failure the prior cached state is left untouched: stale-but-present
/// beats absent. Returns whether a snapshot was applied (a response that
/// lost the race to a newer refresh counts as not applied).
pub async fn refresh_group<C: ResourceClient>(
    client: &C,
    store: &RefCell<Store>,
    group_id: GroupId,
) -> bool {
    let ticket = store.borrow_mut().begin_group_refresh(group_id);
    match client.fetch_group(group_id).await {
        Ok(snapshot) => store.borrow_mut().merge_group_refresh(ticket, &snapshot),
        Err(e) => {
            log::warn!("could not refresh group {group_id}: {e}");
            false
        }
    }
}

/// Create a group and refresh it before resolving.
///
/// When this settles with `Some(id)`, a read of `store.group(id)` is
/// guaranteed to yield a record carrying the requested name — even if the
/// follow-up fetch failed, the store is seeded from the request fields.
pub async fn create_group<C: ResourceClient>(
    client: &C,
    store: &RefCell<Store>,
    name: &str,
    calendar_mode: &str,
) -> Option<GroupId> {
    match client.create_group(name, calendar_mode).await {
        Ok(group_id) => {
            refresh_group(client, store, group_id).await;
            let mut store = store.borrow_mut();
            if store.group(group_id).is_none() {
                store.merge_group(
                    group_id,
                    &GroupSnapshot {
                        name: name.to_owned(),
                        calendar_mode: calendar_mode.to_owned(),
                        ..GroupSnapshot::default()
                    },
                );
            }
            Some(group_id)
        }
        Err(e) => {
            log::warn!("could not create group: {e}");
            None
        }
    }
}

/// Shared tail of every fire-and-log group mutation.
async fn reconcile<C: ResourceClient>(
    client: &C,
    store: &RefCell<Store>,
    group_id: GroupId,
    op: &str,
    result: ApiResult<()>,
) -> bool {
    match result {
        Ok(()) => {
            refresh_group(client, store, group_id).await;
            true
        }
        Err(e) => {
            log::warn!("could not {op} in group {group_id}: {e}");
            false
        }
    }
}

pub async fn create_availability<C: ResourceClient>(
    client: &C,
    store: &RefCell<Store>,
    group_id: GroupId,
    availability: &NewAvailability,
) -> bool {
    let result = client.create_availability(group_id, availability).await;
    reconcile(client, store, group_id, "create availability", result).await
}

pub async fn delete_availability<C: ResourceClient>(
    client: &C,
    store: &RefCell<Store>,
    group_id: GroupId,
    availability_id: AvailabilityId,
) -> bool {
    let result = client.delete_availability(group_id, availability_id).await;
    reconcile(client, store, group_id, "delete availability", result).await
}

pub async fn create_activity<C: ResourceClient>(
    client: &C,
    store: &RefCell<Store>,
    group_id: GroupId,
    activity: &NewActivity,
) -> bool {
    let result = client.create_activity(group_id, activity).await;
    reconcile(client, store, group_id, "create activity", result).await
}

pub async fn delete_activity<C: ResourceClient>(
    client: &C,
    store: &RefCell<Store>,
    group_id: GroupId,
    activity_id: ActivityId,
) -> bool {
    let result = client.delete_activity(group_id, activity_id).await;
    reconcile(client, store, group_id, "delete activity", result).await
}

pub async fn create_task<C: ResourceClient>(
    client: &C,
    store: &RefCell<Store>,
    group_id: GroupId,
    title: &str,
) -> bool {
    let result = client.create_task(group_id, title).await;
    reconcile(client, store, group_id, "create task", result).await
}

pub async fn update_task<C: ResourceClient>(
    client: &C,
    store: &RefCell<Store>,
    group_id: GroupId,
    task_id: TaskId,
    patch: &TaskPatch,
) -> bool {
    let result = client.update_task(group_id, task_id, patch).await;
    reconcile(client, store, group_id, "update task", result).await
}

pub async fn delete_task<C: ResourceClient>(
    client: &C,
    store: &RefCell<Store>,
    group_id: GroupId,
    task_id: TaskId,
) -> bool {
    let result = client.delete_task(group_id, task_id).await;
    reconcile(client, store, group_id, "delete task", result).await
}

pub async fn create_poll<C: ResourceClient>(
    client: &C,
    store: &RefCell<Store>,
    group_id: GroupId,
    title: &str,
    options: &[String],
) -> bool {
    let result = client.create_poll(group_id, title, options).await;
    reconcile(client, store, group_id, "create poll", result).await
}

pub async fn cast_votes<C: ResourceClient>(
    client: &C,
    store: &RefCell<Store>,
    group_id: GroupId,
    votes: &[String],
) -> bool {
    let result = client.cast_votes(group_id, votes).await;
    reconcile(client, store, group_id, "cast votes", result).await
}

pub async fn delete_poll<C: ResourceClient>(
    client: &C,
    store: &RefCell<Store>,
    group_id: GroupId,
) -> bool {
    let result = client.delete_poll(group_id).await;
    reconcile(client, store, group_id, "delete poll", result).await
}

pub async fn send_message<C: ResourceClient>(
    client: &C,
    store: &RefCell<Store>,
    group_id: GroupId,
    content: &str,
) -> bool {
    let result = client.send_message(group_id, content).await;
    reconcile(client, store, group_id, "send message", result).await
}

/// Fetch a bounded chat history window `[start, end)`.
///
/// Read-only: the window goes to the caller, not the store. The store's
/// message sequence is defined as push receipt order, and folding server
/// pages into it would corrupt that ordering.
pub async fn fetch_messages<C: ResourceClient>(
    client: &C,
    group_id: GroupId,
    start: u64,
    end: u64,
) -> Option<ChatWindow> {
    match client.fetch_messages(group_id, start, end).await {
        Ok(window) => Some(window),
        Err(e) => {
            log::warn!("could not fetch messages for group {group_id}: {e}");
            None
        }
    }
}

/// Fetch any user and merge the record.
pub async fn refresh_user<C: ResourceClient>(
    client: &C,
    store: &RefCell<Store>,
    user_id: UserId,
) -> bool {
    match client.fetch_user(Some(user_id)).await {
        Ok(user) => {
            store.borrow_mut().merge_user(&user);
            true
        }
        Err(e) => {
            log::warn!("could not fetch user {user_id}: {e}");
            false
        }
    }
}

/// Rename the local user.
///
/// The store is updated only after the server confirms, so an unconfirmed
/// name is never displayed.
pub async fn update_user_name<C: ResourceClient>(
    client: &C,
    store: &RefCell<Store>,
    user_id: UserId,
    name: &str,
) -> bool {
    match client.update_user(user_id, name).await {
        Ok(()) => {
            store.borrow_mut().merge_user(&User {
                user_id,
                name: Some(name.to_owned()),
                ..User::default()
            });
            true
        }
        Err(e) => {
            log::warn!("could not rename user {user_id}: {e}");
            false
        }
    }
}

/// Resolve the session's own identity (`GET /api/user/` without an id).
///
/// Records the id in the store and merges the returned record. The push
/// channel waits on this: self-referential events cannot be attributed
/// before the local identity is known.
pub async fn resolve_self<C: ResourceClient>(
    client: &C,
    store: &RefCell<Store>,
) -> Option<UserId> {
    match client.fetch_user(None).await {
        Ok(user) => {
            let mut store = store.borrow_mut();
            store.merge_user(&user);
            store.set_user_id(user.user_id);
            Some(user.user_id)
        }
        Err(e) => {
            log::warn!("could not resolve current user: {e}");
            None
        }
    }
}
