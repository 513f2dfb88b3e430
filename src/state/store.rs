//! The cache store: the client's mirror of server entities.
//!
//! ARCHITECTURE
//! ============
//! All mutation happens on the single browser event loop in discrete,
//! non-preemptible steps, so the store needs no locking — the correctness
//! burden is on keeping each merge small and idempotent. Every mutation
//! notifies subscribers synchronously, one [`StoreChange`] per mutation.
//!
//! The one record the server never sends is a group's chat history:
//! `messages` accumulates push events in receipt order and must survive
//! every refresh.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::collections::HashMap;

use crate::net::types::{
    Activity, Availability, GroupId, GroupSnapshot, Message, Poll, Task, User, UserId,
};

/// Push channel connectivity, reflected here so the UI can observe it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

/// A cached group: the latest server snapshot plus locally-accumulated chat.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Group {
    pub group_id: GroupId,
    pub name: String,
    pub calendar_mode: String,
    pub members: Vec<UserId>,
    pub availabilities: Vec<Availability>,
    pub activities: Vec<Activity>,
    pub tasks: Vec<Task>,
    pub poll: Option<Poll>,
    /// Append-only, in push receipt order. Never part of a server snapshot.
    pub messages: Vec<Message>,
}

impl Group {
    /// A group known only by id, created when a message arrives before the
    /// first fetch. A later refresh backfills the server fields.
    fn placeholder(group_id: GroupId) -> Self {
        Group { group_id, ..Group::default() }
    }
}

/// What changed, delivered synchronously to every subscriber.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreChange {
    /// A group's server-sourced fields were replaced.
    Group(GroupId),
    /// A user record was inserted or updated.
    User(UserId),
    /// A chat message was appended to a group.
    Message(GroupId),
    /// The local user identity was resolved.
    SelfUser(UserId),
    /// Push channel connectivity changed.
    Connection(ConnectionStatus),
}

pub type SubscriberId = u64;

/// Proof that a refresh was issued; responses apply only if still current.
///
/// Issued by [`Store::begin_group_refresh`] before the fetch suspends. If
/// another refresh for the same group is issued while the first is in
/// flight, the first ticket goes stale and its response is dropped instead
/// of overwriting newer state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RefreshTicket {
    group_id: GroupId,
    seq: u64,
}

/// The process-wide cache of groups and users.
#[derive(Default)]
pub struct Store {
    user_id: Option<UserId>,
    groups: HashMap<GroupId, Group>,
    users: HashMap<UserId, User>,
    connection: ConnectionStatus,
    refresh_seq: HashMap<GroupId, u64>,
    subscribers: Vec<(SubscriberId, Box<dyn Fn(&StoreChange)>)>,
    next_subscriber: SubscriberId,
}

impl Store {
    pub fn new() -> Self {
        Store::default()
    }

    /// The locally-known user identity, once resolved.
    pub fn user_id(&self) -> Option<UserId> {
        self.user_id
    }

    pub fn connection(&self) -> ConnectionStatus {
        self.connection
    }

    /// Pure read, no network.
    pub fn group(&self, group_id: GroupId) -> Option<&Group> {
        self.groups.get(&group_id)
    }

    /// Pure read, no network.
    pub fn user(&self, user_id: UserId) -> Option<&User> {
        self.users.get(&user_id)
    }

    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.groups.values()
    }

    /// Record the resolved local identity.
    pub fn set_user_id(&mut self, user_id: UserId) {
        self.user_id = Some(user_id);
        self.notify(&StoreChange::SelfUser(user_id));
    }

    pub fn set_connection(&mut self, status: ConnectionStatus) {
        if self.connection == status {
            return;
        }
        self.connection = status;
        self.notify(&StoreChange::Connection(status));
    }

    /// Replace a group's server-sourced fields with a fresh snapshot,
    /// preserving accumulated chat messages. Idempotent.
    pub fn merge_group(&mut self, group_id: GroupId, snapshot: &GroupSnapshot) {
        let messages = self
            .groups
            .remove(&group_id)
            .map(|prior| prior.messages)
            .unwrap_or_default();
        self.groups.insert(
            group_id,
            Group {
                group_id,
                name: snapshot.name.clone(),
                calendar_mode: snapshot.calendar_mode.clone(),
                members: snapshot.members.clone(),
                availabilities: snapshot.availabilities.clone(),
                activities: snapshot.activities.clone(),
                tasks: snapshot.tasks.clone(),
                poll: snapshot.poll.clone(),
                messages,
            },
        );
        self.notify(&StoreChange::Group(group_id));
    }

    /// Shallow-merge a partial user record, inserting if absent.
    ///
    /// Only fields the partial actually carries are applied; a push envelope
    /// renaming a user must not wipe their status.
    pub fn merge_user(&mut self, partial: &User) {
        let user = self
            .users
            .entry(partial.user_id)
            .or_insert_with(|| User { user_id: partial.user_id, ..User::default() });
        if let Some(name) = &partial.name {
            user.name = Some(name.clone());
        }
        if let Some(status) = &partial.status {
            user.status = Some(status.clone());
        }
        if !partial.groups.is_empty() {
            user.groups = partial.groups.clone();
        }
        self.notify(&StoreChange::User(partial.user_id));
    }

    /// Append a pushed chat message to its group, in receipt order.
    ///
    /// A message can arrive before its group is first fetched; it then lands
    /// on a placeholder record that a later refresh backfills. Until that
    /// refresh the group is visible with messages but empty server fields —
    /// an observable race inherited from the server's delivery model.
    pub fn append_message(&mut self, group_id: GroupId, message: Message) {
        self.groups
            .entry(group_id)
            .or_insert_with(|| Group::placeholder(group_id))
            .messages
            .push(message);
        self.notify(&StoreChange::Message(group_id));
    }

    /// Issue a refresh ticket for a group, superseding any in-flight one.
    pub fn begin_group_refresh(&mut self, group_id: GroupId) -> RefreshTicket {
        let seq = self.refresh_seq.entry(group_id).or_insert(0);
        *seq += 1;
        RefreshTicket { group_id, seq: *seq }
    }

    /// Merge a refresh response, unless the ticket has been superseded.
    ///
    /// Returns whether the snapshot was applied. HTTP responses can complete
    /// out of request order; this is the guard that keeps a stale response
    /// from overwriting a newer one.
    pub fn merge_group_refresh(&mut self, ticket: RefreshTicket, snapshot: &GroupSnapshot) -> bool {
        let current = self.refresh_seq.get(&ticket.group_id).copied().unwrap_or(0);
        if ticket.seq != current {
            log::debug!(
                "dropping stale refresh for group {} (seq {} < {current})",
                ticket.group_id,
                ticket.seq
            );
            return false;
        }
        self.merge_group(ticket.group_id, snapshot);
        true
    }

    /// Register a change listener, called synchronously on every mutation.
    pub fn subscribe(&mut self, subscriber: impl Fn(&StoreChange) + 'static) -> SubscriberId {
        let id = self.next_subscriber;
        self.next_subscriber += 1;
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) {
        self.subscribers.retain(|(sid, _)| *sid != id);
    }

    fn notify(&self, change: &StoreChange) {
        for (_, subscriber) in &self.subscribers {
            subscriber(change);
        }
    }
}
