use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DbBackend, Schema};
use serde_json::Value;
use tokio::sync::mpsc;
use tower::ServiceExt;

use atelier_api::{
    config::AppConfig,
    entities,
    events::{self, EventSender},
    handlers::AppServices,
    AppState,
};

/// Test harness: application state plus router backed by an in-memory
/// SQLite database.
pub struct TestApp {
    pub state: AppState,
    router: Router,
    _event_task: tokio::task::JoinHandle<()>,
}

fn test_config() -> AppConfig {
    AppConfig {
        database_url: "sqlite::memory:".to_string(),
        host: "127.0.0.1".to_string(),
        port: 18080,
        environment: "test".to_string(),
        log_level: "warn".to_string(),
        log_json: false,
        default_employee_capacity: 5,
    }
}

impl TestApp {
    pub async fn new() -> Self {
        let cfg = test_config();

        // A single connection keeps every query on the same in-memory
        // database.
        let mut options = ConnectOptions::new(cfg.database_url.clone());
        options.max_connections(1).sqlx_logging(false);
        let db = Database::connect(options)
            .await
            .expect("failed to open in-memory database");

        let schema = Schema::new(DbBackend::Sqlite);
        let statements = [
            schema.create_table_from_entity(entities::order::Entity),
            schema.create_table_from_entity(entities::order_history::Entity),
            schema.create_table_from_entity(entities::task::Entity),
            schema.create_table_from_entity(entities::employee::Entity),
            schema.create_table_from_entity(entities::employee_skill::Entity),
            schema.create_table_from_entity(entities::employee_specialization::Entity),
            schema.create_table_from_entity(entities::supplier::Entity),
            schema.create_table_from_entity(entities::purchase_order::Entity),
            schema.create_table_from_entity(entities::material_usage::Entity),
            schema.create_table_from_entity(entities::measurement::Entity),
        ];
        for statement in statements {
            db.execute(db.get_database_backend().build(&statement))
                .await
                .expect("failed to create table");
        }

        let db_arc = Arc::new(db);
        let (event_tx, event_rx) = mpsc::channel(256);
        let event_sender = EventSender::new(event_tx);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let services = AppServices::new(db_arc.clone(), Arc::new(event_sender.clone()), &cfg);
        let state = AppState {
            db: db_arc,
            config: cfg,
            event_sender,
            services,
        };

        let router = Router::new()
            .nest("/api/v1", atelier_api::api_v1_routes())
            .with_state(state.clone());

        Self {
            state,
            router,
            _event_task: event_task,
        }
    }

    /// Sends a JSON request to the router and returns status + parsed body.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                builder
                    .body(Body::from(json.to_string()))
                    .expect("failed to build request")
            }
            None => builder.body(Body::empty()).expect("failed to build request"),
        };

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("request failed");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("failed to read body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("response was not JSON")
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(body)).await
    }
}
