use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use futures::executor::block_on;

use super::*;
use crate::net::api::ApiError;
use crate::net::types::{ChatWindow, Message, Task};

/// Scripted in-memory server standing in for [`HttpClient`].
#[derive(Default)]
struct FakeClient {
    groups: RefCell<HashMap<GroupId, GroupSnapshot>>,
    next_group_id: Cell<GroupId>,
    fail_all: Cell<bool>,
    fail_fetch_group: Cell<bool>,
    calls: RefCell<Vec<&'static str>>,
}

impl FakeClient {
    fn call(&self, name: &'static str) -> ApiResult<()> {
        self.calls.borrow_mut().push(name);
        if self.fail_all.get() {
            return Err(ApiError::Status(500));
        }
        Ok(())
    }

    fn seed(&self, group_id: GroupId, snapshot: GroupSnapshot) {
        self.groups.borrow_mut().insert(group_id, snapshot);
    }

    fn calls(&self) -> Vec<&'static str> {
        self.calls.borrow().clone()
    }
}

impl ResourceClient for FakeClient {
    async fn fetch_user(&self, user_id: Option<UserId>) -> ApiResult<User> {
        self.call("fetch_user")?;
        Ok(User {
            user_id: user_id.unwrap_or(7),
            name: Some("Ana".to_owned()),
            status: Some("online".to_owned()),
            ..User::default()
        })
    }

    async fn update_user(&self, _user_id: UserId, _name: &str) -> ApiResult<()> {
        self.call("update_user")
    }

    async fn create_group(&self, name: &str, calendar_mode: &str) -> ApiResult<GroupId> {
        self.call("create_group")?;
        let group_id = self.next_group_id.get() + 1;
        self.next_group_id.set(group_id);
        self.seed(
            group_id,
            GroupSnapshot {
                name: name.to_owned(),
                calendar_mode: calendar_mode.to_owned(),
                members: vec![7],
                ..GroupSnapshot::default()
            },
        );
        Ok(group_id)
    }

    async fn fetch_group(&self, group_id: GroupId) -> ApiResult<GroupSnapshot> {
        self.call("fetch_group")?;
        if self.fail_fetch_group.get() {
            return Err(ApiError::Status(500));
        }
        self.groups
            .borrow()
            .get(&group_id)
            .cloned()
            .ok_or(ApiError::Status(404))
    }

    async fn create_availability(
        &self,
        _group_id: GroupId,
        _availability: &NewAvailability,
    ) -> ApiResult<()> {
        self.call("create_availability")
    }

    async fn delete_availability(
        &self,
        _group_id: GroupId,
        _availability_id: AvailabilityId,
    ) -> ApiResult<()> {
        self.call("delete_availability")
    }

    async fn create_activity(&self, _group_id: GroupId, _activity: &NewActivity) -> ApiResult<()> {
        self.call("create_activity")
    }

    async fn delete_activity(&self, _group_id: GroupId, _activity_id: ActivityId) -> ApiResult<()> {
        self.call("delete_activity")
    }

    async fn create_task(&self, group_id: GroupId, title: &str) -> ApiResult<()> {
        self.call("create_task")?;
        // The server assigns the id; the client only sees it on refresh.
        if let Some(snapshot) = self.groups.borrow_mut().get_mut(&group_id) {
            let task_id = 100 + snapshot.tasks.len() as u64;
            snapshot.tasks.push(Task {
                task_id,
                title: title.to_owned(),
                assignee: Some(7),
                completed: false,
            });
        }
        Ok(())
    }

    async fn update_task(
        &self,
        _group_id: GroupId,
        _task_id: TaskId,
        _patch: &TaskPatch,
    ) -> ApiResult<()> {
        self.call("update_task")
    }

    async fn delete_task(&self, _group_id: GroupId, _task_id: TaskId) -> ApiResult<()> {
        self.call("delete_task")
    }

    async fn create_poll(
        &self,
        _group_id: GroupId,
        _title: &str,
        _options: &[String],
    ) -> ApiResult<()> {
        self.call("create_poll")
    }

    async fn cast_votes(&self, _group_id: GroupId, _votes: &[String]) -> ApiResult<()> {
        self.call("cast_votes")
    }

    async fn delete_poll(&self, _group_id: GroupId) -> ApiResult<()> {
        self.call("delete_poll")
    }

    async fn send_message(&self, _group_id: GroupId, _content: &str) -> ApiResult<()> {
        self.call("send_message")
    }

    async fn fetch_messages(
        &self,
        group_id: GroupId,
        start: u64,
        _end: u64,
    ) -> ApiResult<ChatWindow> {
        self.call("fetch_messages")?;
        Ok(ChatWindow {
            messages: vec![Message {
                group_id: 0,
                sender: 7,
                timestamp: start,
                content: format!("history for {group_id}"),
            }],
            more: false,
        })
    }
}

// =============================================================
// Group creation
// =============================================================

#[test]
fn create_group_is_readable_when_it_settles() {
    let client = FakeClient::default();
    let store = RefCell::new(Store::new());

    let group_id =
        block_on(create_group(&client, &store, "Trip", "weekly")).expect("group created");

    let store = store.borrow();
    let group = store.group(group_id).expect("group in store");
    assert_eq!(group.name, "Trip");
    assert_eq!(group.calendar_mode, "weekly");
    assert_eq!(client.calls(), ["create_group", "fetch_group"]);
}

#[test]
fn create_group_seeds_store_when_refresh_fails() {
    let client = FakeClient::default();
    client.fail_fetch_group.set(true);
    let store = RefCell::new(Store::new());

    let group_id =
        block_on(create_group(&client, &store, "Trip", "weekly")).expect("group created");

    assert_eq!(store.borrow().group(group_id).expect("seeded group").name, "Trip");
}

#[test]
fn create_group_failure_returns_none_and_stores_nothing() {
    let client = FakeClient::default();
    client.fail_all.set(true);
    let store = RefCell::new(Store::new());

    assert!(block_on(create_group(&client, &store, "Trip", "weekly")).is_none());
    assert_eq!(store.borrow().groups().count(), 0);
}

// =============================================================
// Refresh
// =============================================================

#[test]
fn refresh_group_failure_keeps_stale_state() {
    let client = FakeClient::default();
    client.seed(1, GroupSnapshot { name: "Trip".to_owned(), ..GroupSnapshot::default() });
    let store = RefCell::new(Store::new());
    assert!(block_on(refresh_group(&client, &store, 1)));

    client.fail_all.set(true);
    assert!(!block_on(refresh_group(&client, &store, 1)));

    // Stale-but-present beats absent.
    assert_eq!(store.borrow().group(1).expect("group").name, "Trip");
}

// =============================================================
// Fire-and-log mutations
// =============================================================

#[test]
fn failing_mutation_leaves_group_untouched() {
    let client = FakeClient::default();
    client.seed(1, GroupSnapshot { name: "Trip".to_owned(), ..GroupSnapshot::default() });
    let store = RefCell::new(Store::new());
    assert!(block_on(refresh_group(&client, &store, 1)));
    let before = store.borrow().group(1).cloned().expect("group");

    client.fail_all.set(true);
    let availability = NewAvailability {
        date: "2026-09-01".to_owned(),
        start: "09:00".to_owned(),
        end: "12:00".to_owned(),
    };
    assert!(!block_on(create_availability(&client, &store, 1, &availability)));

    assert_eq!(store.borrow().group(1).cloned().expect("group"), before);
}

#[test]
fn successful_mutation_reconciles_server_fields() {
    let client = FakeClient::default();
    client.seed(1, GroupSnapshot { name: "Trip".to_owned(), ..GroupSnapshot::default() });
    let store = RefCell::new(Store::new());

    assert!(block_on(create_task(&client, &store, 1, "bring snacks")));

    // The id is server-assigned and only visible through the refresh.
    let store = store.borrow();
    let tasks = &store.group(1).expect("group").tasks;
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].task_id, 100);
    assert_eq!(client.calls(), ["create_task", "fetch_group"]);
}

#[test]
fn mutation_refreshes_only_after_success() {
    let client = FakeClient::default();
    client.fail_all.set(true);
    let store = RefCell::new(Store::new());

    assert!(!block_on(delete_poll(&client, &store, 1)));
    assert_eq!(client.calls(), ["delete_poll"]);
}

// =============================================================
// Users
// =============================================================

#[test]
fn resolve_self_records_identity_and_merges_record() {
    let client = FakeClient::default();
    let store = RefCell::new(Store::new());

    assert_eq!(block_on(resolve_self(&client, &store)), Some(7));

    let store = store.borrow();
    assert_eq!(store.user_id(), Some(7));
    assert_eq!(store.user(7).expect("user").name.as_deref(), Some("Ana"));
}

#[test]
fn update_user_name_merges_only_after_confirmation() {
    let client = FakeClient::default();
    let store = RefCell::new(Store::new());

    assert!(block_on(update_user_name(&client, &store, 7, "Ana B")));
    assert_eq!(store.borrow().user(7).expect("user").name.as_deref(), Some("Ana B"));

    client.fail_all.set(true);
    assert!(!block_on(update_user_name(&client, &store, 7, "unconfirmed")));
    assert_eq!(store.borrow().user(7).expect("user").name.as_deref(), Some("Ana B"));
}

// =============================================================
// Chat history
// =============================================================

#[test]
fn fetch_messages_returns_window_without_touching_store() {
    let client = FakeClient::default();
    let store = RefCell::new(Store::new());

    let window = block_on(fetch_messages(&client, 1, 0, 100)).expect("window");

    assert_eq!(window.messages.len(), 1);
    assert_eq!(store.borrow().groups().count(), 0);
}
