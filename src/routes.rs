use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use maud::{html, Markup, DOCTYPE};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::extract::{BaseUrl, JsonBody};
use crate::models::TodoItem;
use crate::repository::TodoRepository;
use crate::state::AppState;
use crate::validation::{validate, Mode};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(api_root))
        .route(
            "/todos",
            get(list_todos).post(create_todo).delete(delete_all_todos),
        )
        .route(
            "/todos/:id",
            get(retrieve_todo)
                .put(replace_todo)
                .patch(patch_todo)
                .delete(delete_todo),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ids that are not integers can't match any record
fn parse_id(raw: &str) -> Result<u64, AppError> {
    raw.parse().map_err(|_| AppError::NotFound)
}

// === Components ===
fn todo_html(todo: &TodoItem) -> Markup {
    html! {
        li class="flex items-center bg-white rounded-lg shadow-lg my-2 py-2 px-4" {
            span class="mr-4 text-gray-500" { "#" (todo.id) }
            span class={@if todo.completed { "flex-grow line-through" } @else { "flex-grow" }} { (todo.title) }
        }
    }
}

fn root_html(base: &BaseUrl, todos: &[TodoItem]) -> Markup {
    let collection = base.join("/todos");
    html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                title { "Todo API" }
                script src="https://cdn.tailwindcss.com" {}
            }
            body class="bg-gray-100 font-sans leading-normal tracking-normal" {
                div class="container mx-auto p-8" {
                    h1 class="text-4xl text-center text-gray-700 mb-6" { "Todo API" }
                    p { "todos: " a class="text-blue-500" href=(collection) { (collection) } }
                    ul class="list-none p-0 mt-6" {
                        @for todo in todos {
                            (todo_html(todo))
                        }
                    }
                }
            }
        }
    }
}

fn prefers_html(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|accept| accept.to_str().ok())
        .is_some_and(|accept| accept.contains("text/html"))
}

// === Routes ===
async fn api_root(
    State(state): State<AppState>,
    base: BaseUrl,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    if prefers_html(&headers) {
        let db = state.read().await;
        let todos = TodoRepository::new(&db).list()?;
        return Ok(Html(root_html(&base, &todos).into_string()).into_response());
    }
    Ok(Json(json!({ "todos": base.join("/todos") })).into_response())
}

async fn list_todos(State(state): State<AppState>) -> Result<Json<Vec<TodoItem>>, AppError> {
    let db = state.read().await;
    let todos = TodoRepository::new(&db).list()?;
    Ok(Json(todos))
}

async fn create_todo(
    State(state): State<AppState>,
    base: BaseUrl,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, AppError> {
    let input = validate(body, Mode::Full)?;
    let db = state.write().await;
    let todo = TodoRepository::new(&db).create(input)?;
    tracing::debug!(id = todo.id, "created todo");

    let location = base.join(&format!("/todos/{}", todo.id));
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(todo)))
}

async fn retrieve_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TodoItem>, AppError> {
    let id = parse_id(&id)?;
    let db = state.read().await;
    let todo = TodoRepository::new(&db).get(id)?.ok_or(AppError::NotFound)?;
    Ok(Json(todo))
}

async fn update_todo(
    state: AppState,
    id: &str,
    body: serde_json::Value,
    mode: Mode,
) -> Result<Json<TodoItem>, AppError> {
    let id = parse_id(id)?;
    let db = state.write().await;
    let repo = TodoRepository::new(&db);
    // a missing record wins over an invalid body
    if repo.get(id)?.is_none() {
        return Err(AppError::NotFound);
    }
    let input = validate(body, mode)?;
    let todo = repo
        .update(id, input, mode == Mode::Partial)?
        .ok_or(AppError::NotFound)?;
    tracing::debug!(id, ?mode, "updated todo");
    Ok(Json(todo))
}

async fn replace_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody,
) -> Result<Json<TodoItem>, AppError> {
    update_todo(state, &id, body, Mode::Full).await
}

async fn patch_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody,
) -> Result<Json<TodoItem>, AppError> {
    update_todo(state, &id, body, Mode::Partial).await
}

async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id)?;
    let db = state.write().await;
    if !TodoRepository::new(&db).delete(id)? {
        return Err(AppError::NotFound);
    }
    tracing::debug!(id, "deleted todo");
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_all_todos(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    let db = state.write().await;
    let removed = TodoRepository::new(&db).delete_all()?;
    tracing::debug!(removed, "deleted all todos");
    Ok(StatusCode::NO_CONTENT)
}
