//! CRUD HTTP service over a single `todos` table.
//!
//! # Overview
//! Five endpoints, each mapped to one store operation:
//! `GET /todos`, `POST /todos`, `GET /todos/{id}`, `PUT /todos/{id}`,
//! `DELETE /todos/{id}`. Deletes are soft; reads never see deleted rows.
//!
//! # Design
//! - The store is injected as `Arc<dyn TodoStore>` through axum state, so the
//!   router can be driven against any backend.
//! - Decode failures are 400, missing rows are 404, store failures are 500.

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod model;
pub mod startup;
pub mod store;
pub mod telemetry;

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

pub use config::Config;
pub use error::AppError;
pub use model::{BaseRecord, CreateTodo, Todo, UpdateTodo};
pub use startup::Application;
pub use store::{SharedStore, SqliteStore, TodoStore};

use handlers::{create_todo, delete_todo, get_todo, list_todos, update_todo};

pub fn app(store: SharedStore) -> Router {
    Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/{id}", get(get_todo).put(update_todo).delete(delete_todo))
        .layer(TraceLayer::new_for_http())
        .with_state(store)
}

/// Serves the router on `listener` until the process receives Ctrl-C or
/// SIGTERM, then drains in-flight requests.
pub async fn run(listener: TcpListener, store: SharedStore) -> Result<(), std::io::Error> {
    axum::serve(listener, app(store))
        .with_graceful_shutdown(startup::shutdown_signal())
        .await
}
