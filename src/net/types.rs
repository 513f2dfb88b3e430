//! Wire types shared by the REST client and the push channel.
//!
//! Field names mirror the server's JSON (camelCase). Ids are random 64-bit
//! integers minted by the server and carried as JSON numbers; the client
//! never generates one.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::{Deserialize, Serialize};

pub type UserId = u64;
pub type GroupId = u64;
pub type AvailabilityId = u64;
pub type ActivityId = u64;
pub type TaskId = u64;

/// A user record as the server reports it.
///
/// Partial by design: the same shape arrives from `GET /api/user/` and inside
/// push envelopes, which may carry only the fields that changed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<GroupId>,
}

/// The server's group payload from `GET /api/group/{id}/`.
///
/// Never carries chat messages — those arrive only over the push channel and
/// are owned by the cache store.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSnapshot {
    pub name: String,
    #[serde(default)]
    pub calendar_mode: String,
    #[serde(default)]
    pub members: Vec<UserId>,
    #[serde(default)]
    pub availabilities: Vec<Availability>,
    #[serde(default)]
    pub activities: Vec<Activity>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub poll: Option<Poll>,
}

/// One member's availability window.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    pub availability_id: AvailabilityId,
    pub user_id: UserId,
    pub date: String,
    pub start: String,
    pub end: String,
}

/// Body for creating an availability window.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAvailability {
    pub date: String,
    pub start: String,
    pub end: String,
}

/// A scheduled group activity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub activity_id: ActivityId,
    pub title: String,
    pub date: String,
    pub start: String,
    pub end: String,
    #[serde(default)]
    pub confirmed: Vec<UserId>,
}

/// Body for creating an activity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewActivity {
    pub title: String,
    pub date: String,
    pub start: String,
    pub end: String,
}

/// A group task.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub task_id: TaskId,
    pub title: String,
    #[serde(default)]
    pub assignee: Option<UserId>,
    #[serde(default)]
    pub completed: bool,
}

/// Partial task update; absent fields are left unchanged by the server.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

/// The group's current poll, including server-computed vote tallies.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Poll {
    pub title: String,
    #[serde(default)]
    pub options: Vec<PollOption>,
}

/// One poll option and the members who voted for it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollOption {
    #[serde(rename = "option")]
    pub name: String,
    #[serde(default)]
    pub votes: Vec<UserId>,
}

/// A chat message.
///
/// Entries in a fetched window omit `groupId` (the group is implied by the
/// request path); pushed messages carry it so the listener can route them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(default)]
    pub group_id: GroupId,
    pub sender: UserId,
    pub timestamp: u64,
    pub content: String,
}

/// A bounded page of chat history from `GET /api/group/{id}/chat/`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatWindow {
    pub messages: Vec<Message>,
    /// Server indicates more messages exist beyond this window.
    #[serde(rename = "continue")]
    pub more: bool,
}

/// Response to group creation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedGroup {
    pub group_id: GroupId,
}

/// Reference to a group carried by a group-changed envelope.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupRef {
    pub group_id: GroupId,
}

/// One parsed push-channel message.
///
/// A discriminated object with at most one of three fields in practice,
/// though the server contract does not enforce exclusivity — routing of
/// multi-field envelopes is a [`crate::net::push::RoutingMode`] decision.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<GroupRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
}
