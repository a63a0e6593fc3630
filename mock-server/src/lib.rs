use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use axum::{
    body::Bytes,
    extract::{OriginalUri, Path, State},
    http::{HeaderMap, Method, StatusCode},
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};

pub mod tls;

/// Prefix every route is mounted under.
pub const API_PREFIX: &str = "/api/v1";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Widget {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub quantity: u32,
}

#[derive(Deserialize)]
pub struct CreateWidget {
    pub name: String,
    #[serde(default)]
    pub quantity: u32,
}

#[derive(Deserialize)]
pub struct UpdateWidget {
    pub name: Option<String>,
    pub quantity: Option<u32>,
}

/// What `/echo` saw: method, path and query, headers (lower-cased names,
/// repeated values joined with `", "`) and the body as text.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Echo {
    pub method: String,
    pub path: String,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

#[derive(Default)]
pub struct Store {
    next_id: u64,
    widgets: HashMap<u64, Widget>,
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    let api = Router::new()
        .route("/widgets", get(list_widgets).post(create_widget))
        .route(
            "/widgets/{id}",
            get(get_widget).put(update_widget).delete(delete_widget),
        )
        .route("/echo", any(echo))
        .route("/status/{code}", any(status))
        .route("/malformed", get(malformed))
        .with_state(db);
    Router::new().nest(API_PREFIX, api)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn list_widgets(State(db): State<Db>) -> Json<Vec<Widget>> {
    let store = db.read().await;
    let mut widgets: Vec<Widget> = store.widgets.values().cloned().collect();
    widgets.sort_by_key(|w| w.id);
    Json(widgets)
}

async fn create_widget(
    State(db): State<Db>,
    Json(input): Json<CreateWidget>,
) -> (StatusCode, Json<Widget>) {
    let mut store = db.write().await;
    store.next_id += 1;
    let widget = Widget {
        id: store.next_id,
        name: input.name,
        quantity: input.quantity,
    };
    store.widgets.insert(widget.id, widget.clone());
    (StatusCode::CREATED, Json(widget))
}

async fn get_widget(
    State(db): State<Db>,
    Path(id): Path<u64>,
) -> Result<Json<Widget>, StatusCode> {
    let store = db.read().await;
    store.widgets.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn update_widget(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(input): Json<UpdateWidget>,
) -> Result<Json<Widget>, StatusCode> {
    let mut store = db.write().await;
    let widget = store.widgets.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    if let Some(name) = input.name {
        widget.name = name;
    }
    if let Some(quantity) = input.quantity {
        widget.quantity = quantity;
    }
    Ok(Json(widget.clone()))
}

/// Returns the removed widget so clients that ignore DELETE bodies can be
/// checked against a non-empty response.
async fn delete_widget(
    State(db): State<Db>,
    Path(id): Path<u64>,
) -> Result<Json<Widget>, StatusCode> {
    let mut store = db.write().await;
    store.widgets.remove(&id).map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn echo(
    method: Method,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    body: Bytes,
) -> Json<Echo> {
    let mut seen: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in &headers {
        let joined = seen.entry(name.as_str().to_owned()).or_default();
        if !joined.is_empty() {
            joined.push_str(", ");
        }
        joined.push_str(&String::from_utf8_lossy(value.as_bytes()));
    }
    let path = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_owned())
        .unwrap_or_else(|| uri.path().to_owned());
    Json(Echo {
        method: method.as_str().to_owned(),
        path,
        headers: seen,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

async fn status(Path(code): Path<u16>) -> (StatusCode, &'static str) {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, "status body")
}

async fn malformed() -> ([(&'static str, &'static str); 1], &'static str) {
    ([("content-type", "application/json")], r#"{"id":1,"name":"#)
}
