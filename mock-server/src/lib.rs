use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub label: String,
    pub done: bool,
}

/// Body of create and replace requests.
#[derive(Deserialize)]
pub struct TaskInput {
    pub label: String,
    #[serde(default)]
    pub done: bool,
}

/// Body of patch requests; absent fields are left unchanged.
#[derive(Deserialize)]
pub struct TaskPatch {
    pub label: Option<String>,
    pub done: Option<bool>,
}

/// The `{"data": [...]}` wrapper used by every response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub data: Vec<T>,
}

impl<T> Envelope<T> {
    fn one(item: T) -> Self {
        Self { data: vec![item] }
    }
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub done: Option<bool>,
    pub label: Option<String>,
    pub access_token: Option<String>,
}

#[derive(Deserialize)]
pub struct TokenQuery {
    pub access_token: Option<String>,
}

#[derive(Default)]
pub struct Store {
    tasks: BTreeMap<i64, Task>,
    next_id: i64,
}

pub type Db = Arc<RwLock<Store>>;

#[derive(Clone)]
pub struct AppState {
    db: Db,
    token: Option<Arc<str>>,
}

/// Router that accepts every request.
pub fn app() -> Router {
    app_with_token(None)
}

/// Router that requires `access_token=<token>` on every request when a
/// token is given.
pub fn app_with_token(token: Option<String>) -> Router {
    let state = AppState {
        db: Arc::new(RwLock::new(Store::default())),
        token: token.map(Arc::from),
    };
    Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/{id}",
            get(get_task)
                .put(replace_task)
                .patch(patch_task)
                .delete(delete_task),
        )
        .with_state(state)
}

pub async fn serve(listener: TcpListener, router: Router) -> Result<(), std::io::Error> {
    axum::serve(listener, router).await
}

fn authorize(state: &AppState, token: Option<&str>) -> Result<(), StatusCode> {
    match &state.token {
        Some(expected) if token != Some(&**expected) => {
            debug!("rejected request with missing or wrong access token");
            Err(StatusCode::UNAUTHORIZED)
        }
        _ => Ok(()),
    }
}

async fn list_tasks(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Envelope<Task>>, StatusCode> {
    authorize(&state, query.access_token.as_deref())?;
    let store = state.db.read().await;
    let data = store
        .tasks
        .values()
        .filter(|t| query.done.map_or(true, |done| t.done == done))
        .filter(|t| query.label.as_deref().map_or(true, |label| t.label == label))
        .cloned()
        .collect();
    Ok(Json(Envelope { data }))
}

async fn create_task(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
    Json(input): Json<TaskInput>,
) -> Result<(StatusCode, Json<Envelope<Task>>), StatusCode> {
    authorize(&state, query.access_token.as_deref())?;
    let mut store = state.db.write().await;
    store.next_id += 1;
    let task = Task {
        id: store.next_id,
        label: input.label,
        done: input.done,
    };
    store.tasks.insert(task.id, task.clone());
    Ok((StatusCode::CREATED, Json(Envelope::one(task))))
}

async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<TokenQuery>,
) -> Result<Json<Envelope<Task>>, StatusCode> {
    authorize(&state, query.access_token.as_deref())?;
    let store = state.db.read().await;
    store
        .tasks
        .get(&id)
        .cloned()
        .map(|t| Json(Envelope::one(t)))
        .ok_or(StatusCode::NOT_FOUND)
}

async fn replace_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<TokenQuery>,
    Json(input): Json<TaskInput>,
) -> Result<Json<Envelope<Task>>, StatusCode> {
    authorize(&state, query.access_token.as_deref())?;
    let mut store = state.db.write().await;
    let task = store.tasks.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    task.label = input.label;
    task.done = input.done;
    Ok(Json(Envelope::one(task.clone())))
}

async fn patch_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<TokenQuery>,
    Json(input): Json<TaskPatch>,
) -> Result<Json<Envelope<Task>>, StatusCode> {
    authorize(&state, query.access_token.as_deref())?;
    let mut store = state.db.write().await;
    let task = store.tasks.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    if let Some(label) = input.label {
        task.label = label;
    }
    if let Some(done) = input.done {
        task.done = done;
    }
    Ok(Json(Envelope::one(task.clone())))
}

async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<TokenQuery>,
) -> Result<StatusCode, StatusCode> {
    authorize(&state, query.access_token.as_deref())?;
    let mut store = state.db.write().await;
    store.tasks.remove(&id).map(|_| StatusCode::NO_CONTENT).ok_or(StatusCode::NOT_FOUND)
}
