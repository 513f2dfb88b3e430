//! REST resource client.
//!
//! Client-side (hydrate): real HTTP calls via `gloo-net`. Native builds get
//! stubs reporting [`ApiError::Unavailable`] since the endpoints only exist
//! in the browser.
//!
//! ERROR HANDLING
//! ==============
//! Every operation returns [`ApiResult`]. Transport failures, non-2xx
//! statuses and undecodable bodies are distinct [`ApiError`] kinds, but all
//! of them mean the same thing to the synchronizer: the operation did not
//! happen. Nothing here touches the cache store, and nothing panics.

use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::types::{
    ActivityId, AvailabilityId, ChatWindow, CreatedGroup, GroupId, GroupSnapshot, NewActivity,
    NewAvailability, TaskId, TaskPatch, User, UserId,
};

/// Why a resource operation produced no result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApiError {
    /// The request never completed (network failure, CORS, aborted).
    Transport(String),
    /// The server answered with a non-success status.
    Status(u16),
    /// The response body could not be decoded as the expected shape.
    Decode(String),
    /// No browser environment (native build without `hydrate`).
    Unavailable,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Transport(e) => write!(f, "transport failure: {e}"),
            ApiError::Status(code) => write!(f, "server returned status {code}"),
            ApiError::Decode(e) => write!(f, "could not decode response: {e}"),
            ApiError::Unavailable => write!(f, "not available outside the browser"),
        }
    }
}

impl std::error::Error for ApiError {}

pub type ApiResult<T> = Result<T, ApiError>;

/// One logical operation per method, one HTTP request per call.
///
/// The trait seam exists so the synchronizer can be exercised against a
/// scripted client in tests; [`HttpClient`] is the only production impl.
#[allow(async_fn_in_trait)]
pub trait ResourceClient {
    /// `GET /api/user/[{id}/]` — omit the id for the session's own user.
    async fn fetch_user(&self, user_id: Option<UserId>) -> ApiResult<User>;

    /// `PATCH /api/user/` — rename.
    async fn update_user(&self, user_id: UserId, name: &str) -> ApiResult<()>;

    /// `PATCH /api/group/` — create; returns the server-assigned id.
    async fn create_group(&self, name: &str, calendar_mode: &str) -> ApiResult<GroupId>;

    /// `GET /api/group/{id}/`.
    async fn fetch_group(&self, group_id: GroupId) -> ApiResult<GroupSnapshot>;

    /// `PATCH /api/group/{id}/availability/`.
    async fn create_availability(
        &self,
        group_id: GroupId,
        availability: &NewAvailability,
    ) -> ApiResult<()>;

    /// `DELETE /api/group/{id}/availability/{availabilityId}/`.
    async fn delete_availability(
        &self,
        group_id: GroupId,
        availability_id: AvailabilityId,
    ) -> ApiResult<()>;

    /// `PATCH /api/group/{id}/activity/`.
    async fn create_activity(&self, group_id: GroupId, activity: &NewActivity) -> ApiResult<()>;

    /// `DELETE /api/group/{id}/activity/{activityId}/`.
    async fn delete_activity(&self, group_id: GroupId, activity_id: ActivityId) -> ApiResult<()>;

    /// `PATCH /api/group/{id}/task/`.
    async fn create_task(&self, group_id: GroupId, title: &str) -> ApiResult<()>;

    /// `PATCH /api/group/{id}/task/{taskId}/`.
    async fn update_task(&self, group_id: GroupId, task_id: TaskId, patch: &TaskPatch)
    -> ApiResult<()>;

    /// `DELETE /api/group/{id}/task/{taskId}/`.
    async fn delete_task(&self, group_id: GroupId, task_id: TaskId) -> ApiResult<()>;

    /// `PUT /api/group/{id}/poll/` — full replacement of any prior poll.
    async fn create_poll(&self, group_id: GroupId, title: &str, options: &[String])
    -> ApiResult<()>;

    /// `PATCH /api/group/{id}/poll/` — replace this user's votes.
    async fn cast_votes(&self, group_id: GroupId, votes: &[String]) -> ApiResult<()>;

    /// `DELETE /api/group/{id}/poll/`.
    async fn delete_poll(&self, group_id: GroupId) -> ApiResult<()>;

    /// `PATCH /api/group/{id}/chat/`.
    async fn send_message(&self, group_id: GroupId, content: &str) -> ApiResult<()>;

    /// `GET /api/group/{id}/chat/?start=&end=` — bounded window `[start, end)`.
    async fn fetch_messages(&self, group_id: GroupId, start: u64, end: u64)
    -> ApiResult<ChatWindow>;
}

/// The production client, speaking to the page's own origin.
#[derive(Clone, Copy, Debug, Default)]
pub struct HttpClient;

impl ResourceClient for HttpClient {
    async fn fetch_user(&self, user_id: Option<UserId>) -> ApiResult<User> {
        match user_id {
            Some(id) => http::get(&format!("/api/user/{id}/")).await,
            None => http::get("/api/user/").await,
        }
    }

    async fn update_user(&self, user_id: UserId, name: &str) -> ApiResult<()> {
        http::patch("/api/user/", &serde_json::json!({ "userId": user_id, "name": name })).await
    }

    async fn create_group(&self, name: &str, calendar_mode: &str) -> ApiResult<GroupId> {
        let created: CreatedGroup = http::patch(
            "/api/group/",
            &serde_json::json!({ "name": name, "calendarMode": calendar_mode }),
        )
        .await?;
        Ok(created.group_id)
    }

    async fn fetch_group(&self, group_id: GroupId) -> ApiResult<GroupSnapshot> {
        http::get(&format!("/api/group/{group_id}/")).await
    }

    async fn create_availability(
        &self,
        group_id: GroupId,
        availability: &NewAvailability,
    ) -> ApiResult<()> {
        http::patch(&format!("/api/group/{group_id}/availability/"), availability).await
    }

    async fn delete_availability(
        &self,
        group_id: GroupId,
        availability_id: AvailabilityId,
    ) -> ApiResult<()> {
        http::delete(&format!("/api/group/{group_id}/availability/{availability_id}/")).await
    }

    async fn create_activity(&self, group_id: GroupId, activity: &NewActivity) -> ApiResult<()> {
        http::patch(&format!("/api/group/{group_id}/activity/"), activity).await
    }

    async fn delete_activity(&self, group_id: GroupId, activity_id: ActivityId) -> ApiResult<()> {
        http::delete(&format!("/api/group/{group_id}/activity/{activity_id}/")).await
    }

    async fn create_task(&self, group_id: GroupId, title: &str) -> ApiResult<()> {
        http::patch(
            &format!("/api/group/{group_id}/task/"),
            &serde_json::json!({ "title": title }),
        )
        .await
    }

    async fn update_task(
        &self,
        group_id: GroupId,
        task_id: TaskId,
        patch: &TaskPatch,
    ) -> ApiResult<()> {
        http::patch(&format!("/api/group/{group_id}/task/{task_id}/"), patch).await
    }

    async fn delete_task(&self, group_id: GroupId, task_id: TaskId) -> ApiResult<()> {
        http::delete(&format!("/api/group/{group_id}/task/{task_id}/")).await
    }

    async fn create_poll(
        &self,
        group_id: GroupId,
        title: &str,
        options: &[String],
    ) -> ApiResult<()> {
        http::put(
            &format!("/api/group/{group_id}/poll/"),
            &serde_json::json!({ "title": title, "options": options }),
        )
        .await
    }

    async fn cast_votes(&self, group_id: GroupId, votes: &[String]) -> ApiResult<()> {
        http::patch(
            &format!("/api/group/{group_id}/poll/"),
            &serde_json::json!({ "votes": votes }),
        )
        .await
    }

    async fn delete_poll(&self, group_id: GroupId) -> ApiResult<()> {
        http::delete(&format!("/api/group/{group_id}/poll/")).await
    }

    async fn send_message(&self, group_id: GroupId, content: &str) -> ApiResult<()> {
        http::patch(
            &format!("/api/group/{group_id}/chat/"),
            &serde_json::json!({ "content": content }),
        )
        .await
    }

    async fn fetch_messages(
        &self,
        group_id: GroupId,
        start: u64,
        end: u64,
    ) -> ApiResult<ChatWindow> {
        http::get(&format!("/api/group/{group_id}/chat/?start={start}&end={end}")).await
    }
}

/// Verb helpers over `gloo-net`, browser builds only.
#[cfg(feature = "hydrate")]
mod http {
    use gloo_net::http::{Request, Response};

    use super::{ApiError, ApiResult, DeserializeOwned, Serialize};

    async fn decode<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
        if !response.ok() {
            return Err(ApiError::Status(response.status()));
        }
        response.json::<T>().await.map_err(|e| ApiError::Decode(e.to_string()))
    }

    pub async fn get<T: DeserializeOwned>(path: &str) -> ApiResult<T> {
        let response = Request::get(path)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        decode(response).await
    }

    pub async fn patch<B: Serialize, T: DeserializeOwned>(path: &str, body: &B) -> ApiResult<T> {
        let response = Request::patch(path)
            .json(body)
            .map_err(|e| ApiError::Transport(e.to_string()))?
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        decode(response).await
    }

    pub async fn put<B: Serialize, T: DeserializeOwned>(path: &str, body: &B) -> ApiResult<T> {
        let response = Request::put(path)
            .json(body)
            .map_err(|e| ApiError::Transport(e.to_string()))?
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        decode(response).await
    }

    pub async fn delete<T: DeserializeOwned>(path: &str) -> ApiResult<T> {
        let response = Request::delete(path)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        decode(response).await
    }
}

#[cfg(not(feature = "hydrate"))]
#[allow(clippy::unused_async)]
mod http {
    use super::{ApiError, ApiResult, DeserializeOwned, Serialize};

    pub async fn get<T: DeserializeOwned>(path: &str) -> ApiResult<T> {
        let _ = path;
        Err(ApiError::Unavailable)
    }

    pub async fn patch<B: Serialize, T: DeserializeOwned>(path: &str, body: &B) -> ApiResult<T> {
        let _ = (path, body);
        Err(ApiError::Unavailable)
    }

    pub async fn put<B: Serialize, T: DeserializeOwned>(path: &str, body: &B) -> ApiResult<T> {
        let _ = (path, body);
        Err(ApiError::Unavailable)
    }

    pub async fn delete<T: DeserializeOwned>(path: &str) -> ApiResult<T> {
        let _ = path;
        Err(ApiError::Unavailable)
    }
}
