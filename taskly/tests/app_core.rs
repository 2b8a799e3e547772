use reqwest::Method;
use serde_json::{json, Value};
use taskly::testing::TestApp;
use taskly::AppError;
use taskly_api::endpoints::tasks::SearchTasks;
use taskly_api::testing::{json_response, task_json, user_json};
use taskly_api::transport::{Body, HttpRequest};
use taskly_api::Request;

const TASKS: &str = "/api/users/tasks";
const CURRENT: &str = "/api/users/current";
const REFRESH: &str = "/api/refresh-token";
const AVATAR: &str = "/api/users/avatar";

fn json_body(request: &HttpRequest) -> Value {
    match &request.body {
        Body::Json(bytes) => serde_json::from_slice(bytes).unwrap(),
        other => panic!("expected a JSON body, got {:?}", other),
    }
}

fn auth_json(id: &str, name: &str) -> Value {
    let mut user = user_json(id, name);
    user["token"] = json!("access-1");
    user["refreshToken"] = json!("refresh-1");
    user
}

#[tokio::test]
async fn test_sign_in_loads_profile_and_tasks() {
    let mut app = TestApp::new();
    app.transport
        .reply_data(Method::POST, "/api/login", auth_json("u1", "Ada"))
        .reply_data(Method::GET, TASKS, json!([task_json("t1", "Buy milk", false)]));

    let user = app.core.sign_in(" ada@example.com ", "secret").await.unwrap();

    assert_eq!(user.id, "u1");
    assert!(app.core.is_signed_in());
    assert_eq!(app.core.display_name().as_deref(), Some("Ada"));
    assert_eq!(app.task_titles(), vec!["Buy milk"]);
    assert_eq!(
        app.transport.bearer_tokens(Method::GET, TASKS),
        vec![Some("Bearer access-1".to_string())]
    );
    let login = &app.transport.requests_to(Method::POST, "/api/login")[0];
    assert_eq!(json_body(login)["email"], "ada@example.com");
}

#[tokio::test]
async fn test_missing_task_list_is_empty() {
    let mut app = TestApp::signed_in("access-1", "refresh-1");
    app.transport.reply(
        Method::GET,
        TASKS,
        json_response(404, json!({ "errors": "Tasks not found" })),
    );

    let tasks = app.core.load_tasks().await.unwrap();

    assert!(tasks.is_empty());
    assert!(app.core.is_signed_in());
}

#[tokio::test]
async fn test_expired_session_yields_empty_list() {
    let mut app = TestApp::signed_in("expired", "refresh-1");
    app.transport
        .reply_status(Method::GET, TASKS, 401)
        .reply_status(Method::POST, REFRESH, 403);

    let tasks = app.core.load_tasks().await.unwrap();

    assert!(tasks.is_empty());
    app.assert_signed_out();
    assert_eq!(app.session().refresh_token(), None);
}

#[tokio::test]
async fn test_expired_session_forgets_profile() {
    let mut app = TestApp::signed_in("access-1", "refresh-1");
    app.transport
        .reply_data(Method::GET, CURRENT, user_json("u1", "Ada"))
        .reply_data(Method::GET, TASKS, json!([]))
        .reply_status(Method::GET, TASKS, 401)
        .reply_status(Method::POST, REFRESH, 403);
    app.core.start().await.unwrap();
    app.core.set_dark_mode(true).unwrap();
    assert_eq!(app.core.display_name().as_deref(), Some("Ada"));

    app.core.load_tasks().await.unwrap();

    app.assert_signed_out();
    assert_eq!(app.state().user, None);
    assert_eq!(app.core.display_name(), None);
    assert_eq!(app.core.profile_picture(), None);
    assert!(app.core.dark_mode());
}

#[tokio::test]
async fn test_other_load_failures_propagate() {
    let mut app = TestApp::signed_in("access-1", "refresh-1");
    app.transport.reply(
        Method::GET,
        TASKS,
        json_response(500, json!({ "message": "Database unavailable" })),
    );

    let err = app.core.load_tasks().await.unwrap_err();

    assert_eq!(err.to_string(), "Database unavailable");
}

#[tokio::test]
async fn test_start_restores_session() {
    let mut app = TestApp::signed_in("access-1", "refresh-1");
    app.transport
        .reply_data(Method::GET, CURRENT, user_json("u1", "Ada"))
        .reply_data(
            Method::GET,
            TASKS,
            json!([task_json("t2", "Second", true), task_json("t1", "First", false)]),
        );

    let user = app.core.start().await.unwrap();

    assert_eq!(user.map(|u| u.name), Some("Ada".to_string()));
    assert_eq!(app.task_titles(), vec!["First", "Second"]);
    assert_eq!(app.session().identity().map(|u| u.id), Some("u1".to_string()));
    assert_eq!(app.core.profile_picture(), None);
}

#[tokio::test]
async fn test_start_without_session_makes_no_calls() {
    let mut app = TestApp::new();

    assert_eq!(app.core.start().await.unwrap(), None);
    assert!(app.transport.requests().is_empty());
}

#[tokio::test]
async fn test_start_signs_out_unrecoverable_session() {
    let mut app = TestApp::signed_in("access-1", "refresh-1");
    app.transport
        .reply_status(Method::GET, CURRENT, 500)
        .reply_status(Method::POST, REFRESH, 403);

    assert_eq!(app.core.start().await.unwrap(), None);
    app.assert_signed_out();
    assert_eq!(app.transport.count(Method::GET, TASKS), 0);
}

#[tokio::test]
async fn test_create_task_rejects_blank_title() {
    let mut app = TestApp::signed_in("access-1", "refresh-1");

    let err = app.core.create_task("   ", None).await.unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
    assert!(app.transport.requests().is_empty());
}

#[tokio::test]
async fn test_create_task_then_refetch() {
    let mut app = TestApp::signed_in("access-1", "refresh-1");
    app.transport
        .reply_data(Method::POST, TASKS, task_json("t1", "Buy milk", false))
        .reply_data(Method::GET, TASKS, json!([task_json("t1", "Buy milk", false)]));

    let task = app
        .core
        .create_task(" Buy milk ", Some("Two litres"))
        .await
        .unwrap();

    assert_eq!(task.id, "t1");
    assert_eq!(app.task_titles(), vec!["Buy milk"]);
    let create = &app.transport.requests_to(Method::POST, TASKS)[0];
    assert_eq!(
        json_body(create),
        json!({ "title": "Buy milk", "desc": "Two litres" })
    );
}

#[tokio::test]
async fn test_created_task_survives_failed_refetch() {
    let mut app = TestApp::signed_in("access-1", "refresh-1");
    app.transport
        .reply_data(Method::POST, TASKS, task_json("t1", "Buy milk", false))
        .reply(
            Method::GET,
            TASKS,
            json_response(500, json!({ "message": "Database unavailable" })),
        );

    let task = app.core.create_task("Buy milk", None).await.unwrap();

    assert_eq!(task.id, "t1");
    assert_eq!(app.transport.count(Method::POST, TASKS), 1);
    assert_eq!(app.transport.count(Method::GET, TASKS), 1);
}

#[tokio::test]
async fn test_deleted_task_survives_failed_refetch() {
    let mut app = TestApp::signed_in("access-1", "refresh-1");
    app.transport
        .reply_data(Method::DELETE, "/api/users/tasks/t1", json!({ "message": "Deleted" }))
        .fail(Method::GET, TASKS, "connection reset");

    app.core.delete_task("t1").await.unwrap();

    assert_eq!(app.transport.count(Method::DELETE, "/api/users/tasks/t1"), 1);
}

#[tokio::test]
async fn test_toggle_task_flips_completion() {
    let mut app = TestApp::signed_in("access-1", "refresh-1");
    app.transport
        .reply_data(Method::GET, TASKS, json!([task_json("t1", "Buy milk", false)]))
        .reply_data(Method::PATCH, "/api/users/tasks/t1", task_json("t1", "Buy milk", true))
        .reply_data(Method::GET, TASKS, json!([task_json("t1", "Buy milk", true)]));
    app.core.load_tasks().await.unwrap();

    let task = app.core.toggle_task("t1").await.unwrap();

    assert!(task.completed);
    assert_eq!(app.state().completed_count(), 1);
    let patch = &app.transport.requests_to(Method::PATCH, "/api/users/tasks/t1")[0];
    assert_eq!(json_body(patch), json!({ "completed": true }));
}

#[tokio::test]
async fn test_update_task_sends_only_changed_fields() {
    let mut app = TestApp::signed_in("access-1", "refresh-1");
    app.transport
        .reply_data(Method::PATCH, "/api/users/tasks/t1", task_json("t1", "Renamed", false))
        .reply_data(Method::GET, TASKS, json!([task_json("t1", "Renamed", false)]));

    app.core
        .update_task(Request::tasks().update("t1").title("Renamed"))
        .await
        .unwrap();

    let patch = &app.transport.requests_to(Method::PATCH, "/api/users/tasks/t1")[0];
    assert_eq!(json_body(patch), json!({ "title": "Renamed" }));
    assert_eq!(app.task_titles(), vec!["Renamed"]);
}

#[tokio::test]
async fn test_delete_task_then_refetch() {
    let mut app = TestApp::signed_in("access-1", "refresh-1");
    app.transport
        .reply_data(Method::DELETE, "/api/users/tasks/t1", json!({ "message": "Deleted" }))
        .reply(Method::GET, TASKS, json_response(404, json!({ "errors": "Not found" })));

    app.core.delete_task("t1").await.unwrap();

    assert!(app.core.tasks().is_empty());
    assert_eq!(app.transport.count(Method::GET, TASKS), 1);
}

#[tokio::test]
async fn test_search_returns_paging() {
    let app = TestApp::signed_in("access-1", "refresh-1");
    app.transport.reply(
        Method::GET,
        "/api/users/tasks/search",
        json_response(
            200,
            json!({
                "data": [task_json("t1", "Buy milk", false)],
                "paging": { "current_page": 2, "total_page": 3, "size": 1 }
            }),
        ),
    );

    let result = app
        .core
        .search_tasks(SearchTasks::new().title("milk").page(2u32).size(1u32))
        .await
        .unwrap();

    assert_eq!(result.data.len(), 1);
    assert_eq!(result.paging.current_page, 2);
    assert_eq!(result.paging.total_page, 3);
    let request = &app.transport.requests()[0];
    assert_eq!(
        request.url,
        "http://api.test/api/users/tasks/search?page=2&size=1&title=milk"
    );
}

#[tokio::test]
async fn test_clear_all_tasks_deletes_each() {
    let mut app = TestApp::signed_in("access-1", "refresh-1");
    app.transport.reply_data(
        Method::GET,
        TASKS,
        json!([
            task_json("t1", "One", false),
            task_json("t2", "Two", true),
            task_json("t3", "Three", false)
        ]),
    );
    for id in ["t1", "t2", "t3"] {
        app.transport.reply_data(
            Method::DELETE,
            &format!("{}/{}", TASKS, id),
            json!({ "message": "Deleted" }),
        );
    }

    let deleted = app.core.clear_all_tasks().await.unwrap();

    assert_eq!(deleted, 3);
    assert!(app.core.tasks().is_empty());
    for id in ["t1", "t2", "t3"] {
        assert_eq!(app.transport.count(Method::DELETE, &format!("{}/{}", TASKS, id)), 1);
    }
}

#[tokio::test]
async fn test_clear_all_tasks_reports_failure() {
    let mut app = TestApp::signed_in("access-1", "refresh-1");
    app.transport
        .reply_data(
            Method::GET,
            TASKS,
            json!([task_json("t1", "One", false), task_json("t2", "Two", false)]),
        )
        .reply_data(Method::DELETE, "/api/users/tasks/t1", json!({ "message": "Deleted" }))
        .reply(
            Method::DELETE,
            "/api/users/tasks/t2",
            json_response(500, json!({ "errors": "Could not delete task" })),
        )
        .reply_data(Method::GET, TASKS, json!([task_json("t2", "Two", false)]));

    let err = app.core.clear_all_tasks().await.unwrap_err();

    assert_eq!(err.to_string(), "Could not delete task");
    assert_eq!(app.task_titles(), vec!["Two"]);
}

#[tokio::test]
async fn test_upload_avatar_rejects_non_images() {
    let mut app = TestApp::signed_in("access-1", "refresh-1");

    let err = app
        .core
        .upload_avatar("notes.pdf", "application/pdf", vec![1, 2, 3])
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::InvalidAvatar(_)));
    assert!(app.transport.requests().is_empty());
}

#[tokio::test]
async fn test_upload_avatar_rejects_large_files() {
    let mut app = TestApp::signed_in("access-1", "refresh-1");

    let err = app
        .core
        .upload_avatar("big.png", "image/png", vec![0; 5 * 1024 * 1024 + 1])
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::InvalidAvatar(_)));
    assert!(app.transport.requests().is_empty());
}

#[tokio::test]
async fn test_upload_and_remove_avatar() {
    let mut app = TestApp::signed_in("access-1", "refresh-1");
    let mut user = user_json("u1", "Ada");
    user["avatarUrl"] = json!("/uploads/ada.png");
    app.transport
        .reply_data(Method::POST, AVATAR, user)
        .reply_data(Method::DELETE, AVATAR, json!({ "message": "Avatar removed" }));

    let uploaded = app
        .core
        .upload_avatar("ada.png", "image/png", vec![137, 80, 78, 71])
        .await
        .unwrap();

    assert_eq!(uploaded.avatar_url.as_deref(), Some("/uploads/ada.png"));
    assert_eq!(
        app.core.profile_picture().as_deref(),
        Some("http://api.test/uploads/ada.png")
    );
    assert!(matches!(
        app.transport.requests_to(Method::POST, AVATAR)[0].body,
        Body::Form(_)
    ));

    app.core.remove_avatar().await.unwrap();

    assert_eq!(app.core.profile_picture(), None);
    assert_eq!(app.state().user.as_ref().and_then(|u| u.avatar_url.clone()), None);
}

#[tokio::test]
async fn test_update_display_name() {
    let mut app = TestApp::signed_in("access-1", "refresh-1");
    app.transport
        .reply_data(Method::PATCH, CURRENT, user_json("u1", "Grace"));

    let user = app.core.update_display_name(" Grace ").await.unwrap();

    assert_eq!(user.name, "Grace");
    assert_eq!(app.core.display_name().as_deref(), Some("Grace"));
    let patch = &app.transport.requests_to(Method::PATCH, CURRENT)[0];
    assert_eq!(json_body(patch), json!({ "name": "Grace" }));
}

#[tokio::test]
async fn test_sign_out_forgets_user_but_keeps_dark_mode() {
    let mut app = TestApp::signed_in("access-1", "refresh-1");
    app.transport
        .reply_data(Method::GET, CURRENT, user_json("u1", "Ada"))
        .reply_data(Method::GET, TASKS, json!([task_json("t1", "Buy milk", false)]))
        .reply_data(Method::POST, "/api/users/logout", json!({ "message": "Logged out" }));
    app.core.start().await.unwrap();
    app.core.set_dark_mode(true).unwrap();

    app.core.sign_out().await;

    app.assert_signed_out();
    assert!(app.core.tasks().is_empty());
    assert_eq!(app.state().user, None);
    assert_eq!(app.core.display_name(), None);
    assert!(app.core.dark_mode());
    let logout = &app.transport.requests_to(Method::POST, "/api/users/logout")[0];
    assert_eq!(json_body(logout), json!({ "refreshToken": "refresh-1" }));
}
