use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, Echo, Widget};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(String::new())
        .unwrap()
}

// --- widgets ---

#[tokio::test]
async fn list_widgets_empty() {
    let resp = app()
        .oneshot(empty_request("GET", "/api/v1/widgets"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let widgets: Vec<Widget> = body_json(resp).await;
    assert!(widgets.is_empty());
}

#[tokio::test]
async fn create_widget_returns_201_with_first_id() {
    let resp = app()
        .oneshot(json_request("POST", "/api/v1/widgets", r#"{"name":"x"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let widget: Widget = body_json(resp).await;
    assert_eq!(widget.id, 1);
    assert_eq!(widget.name, "x");
    assert_eq!(widget.quantity, 0);
}

#[tokio::test]
async fn create_widget_malformed_json_returns_422() {
    let resp = app()
        .oneshot(json_request("POST", "/api/v1/widgets", r#"{"not_name":1}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn get_widget_not_found() {
    let resp = app()
        .oneshot(empty_request("GET", "/api/v1/widgets/42"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn get_widget_bad_id_returns_400() {
    let resp = app()
        .oneshot(empty_request("GET", "/api/v1/widgets/not-a-number"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_widget_not_found() {
    let resp = app()
        .oneshot(json_request("PUT", "/api/v1/widgets/42", r#"{"name":"Nope"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_widget_not_found() {
    let resp = app()
        .oneshot(empty_request("DELETE", "/api/v1/widgets/42"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn routes_outside_prefix_are_404() {
    let resp = app().oneshot(empty_request("GET", "/widgets")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- diagnostics routes ---

#[tokio::test]
async fn echo_reports_method_path_headers_and_body() {
    let req = Request::builder()
        .method("POST")
        .uri("/api/v1/echo?x=1")
        .header("Accept", "application/json")
        .header("Authorization", "Basic dTpw")
        .body(r#"{"a":1}"#.to_string())
        .unwrap();
    let resp = app().oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let echo: Echo = body_json(resp).await;
    assert_eq!(echo.method, "POST");
    assert_eq!(echo.path, "/api/v1/echo?x=1");
    assert_eq!(echo.headers["accept"], "application/json");
    assert_eq!(echo.headers["authorization"], "Basic dTpw");
    assert_eq!(echo.body, r#"{"a":1}"#);
}

#[tokio::test]
async fn status_route_replies_with_requested_code() {
    for code in [201u16, 404, 500, 503] {
        let resp = app()
            .oneshot(empty_request("GET", &format!("/api/v1/status/{code}")))
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), code);
        assert_eq!(body_bytes(resp).await.as_ref(), b"status body");
    }
}

#[tokio::test]
async fn malformed_route_returns_truncated_json() {
    let resp = app()
        .oneshot(empty_request("GET", "/api/v1/malformed"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = body_bytes(resp).await;
    assert!(serde_json::from_slice::<serde_json::Value>(&bytes).is_err());
}

// --- full CRUD lifecycle ---

#[tokio::test]
async fn crud_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    // create
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/api/v1/widgets",
            r#"{"name":"sprocket","quantity":3}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Widget = body_json(resp).await;
    assert_eq!(created.name, "sprocket");
    let id = created.id;

    // update quantity only
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "PUT",
            &format!("/api/v1/widgets/{id}"),
            r#"{"quantity":7}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Widget = body_json(resp).await;
    assert_eq!(updated.name, "sprocket");
    assert_eq!(updated.quantity, 7);

    // list — should contain the one widget
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("GET", "/api/v1/widgets"))
        .await
        .unwrap();
    let widgets: Vec<Widget> = body_json(resp).await;
    assert_eq!(widgets, vec![updated.clone()]);

    // delete returns the removed widget
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("DELETE", &format!("/api/v1/widgets/{id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let removed: Widget = body_json(resp).await;
    assert_eq!(removed, updated);

    // get after delete
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("GET", &format!("/api/v1/widgets/{id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
