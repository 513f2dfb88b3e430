use super::*;

#[test]
fn chat_window_decodes_continue_flag() {
    let window: ChatWindow = serde_json::from_str(
        r#"{"messages":[{"sender":7,"timestamp":10,"content":"hi"}],"continue":true}"#,
    )
    .expect("chat window");

    assert!(window.more);
    assert_eq!(window.messages.len(), 1);
    // Window entries carry no groupId; the group is implied by the path.
    assert_eq!(window.messages[0].group_id, 0);
}

#[test]
fn user_decodes_with_optional_fields_absent() {
    let user: User = serde_json::from_str(r#"{"userId":7,"status":"online"}"#).expect("user");
    assert_eq!(user.user_id, 7);
    assert!(user.name.is_none());
    assert!(user.groups.is_empty());
}

#[test]
fn group_snapshot_tolerates_missing_collections() {
    let snapshot: GroupSnapshot =
        serde_json::from_str(r#"{"name":"Trip","calendarMode":"weekly"}"#).expect("snapshot");
    assert_eq!(snapshot.name, "Trip");
    assert!(snapshot.tasks.is_empty());
    assert!(snapshot.poll.is_none());
}

#[test]
fn poll_option_uses_option_key() {
    let poll: Poll = serde_json::from_str(
        r#"{"title":"who?","options":[{"option":"me","votes":[7]},{"option":"you","votes":[]}]}"#,
    )
    .expect("poll");
    assert_eq!(poll.options[0].name, "me");
    assert_eq!(poll.options[0].votes, [7]);
}

#[test]
fn task_patch_serializes_only_present_fields() {
    let patch = TaskPatch { completed: Some(true), ..TaskPatch::default() };
    let value = serde_json::to_value(&patch).expect("patch json");
    assert_eq!(value, serde_json::json!({ "completed": true }));
}

#[test]
fn created_group_decodes_numeric_id() {
    let created: CreatedGroup =
        serde_json::from_str(r#"{"groupId":18446744073709551615}"#).expect("created group");
    assert_eq!(created.group_id, u64::MAX);
}
