use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

use hoja_api::app::{AppState, router};
use hoja_api::{Config, MemoryStore, SheetData, TabularProxy};

fn sheet(headers: &[&str], rows: &[&[&str]]) -> SheetData {
    SheetData::new(
        headers.iter().map(|h| h.to_string()).collect(),
        rows.iter()
            .map(|row| row.iter().map(|c| c.to_string()).collect())
            .collect(),
    )
}

fn seeded_store() -> MemoryStore {
    let store = MemoryStore::new();
    store.insert_sheet(
        "usuarios",
        sheet(
            &["ID", "usuario", "clave"],
            &[&["1", "alice", "secret"], &["2", "bob", "hunter2"]],
        ),
    );
    store.insert_sheet(
        "Usuarios",
        sheet(&["ID", "name"], &[&["1", "Ana"], &["2", "Bo"]]),
    );
    store
}

fn state_with(store: MemoryStore, config: Config) -> Arc<AppState> {
    Arc::new(AppState {
        proxy: TabularProxy::new(Arc::new(store)),
        config,
    })
}

fn state() -> Arc<AppState> {
    state_with(seeded_store(), Config::default())
}

async fn send(state: Arc<AppState>, request: Request<Body>) -> (StatusCode, Value) {
    let response = router(state).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn with_json(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn health_reports_plain_text() {
    let (status, body) = send(state(), get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Servidor y base de datos funcionando");
}

#[tokio::test]
async fn login_with_exact_pair_succeeds() {
    let body = json!({ "usuario": "alice", "clave": "secret" });
    let (status, body) = send(state(), with_json("POST", "/login", &body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["acceso"], true);
    assert_eq!(body["mensaje"], "Acceso permitido");
    assert_eq!(body["usuario"]["ID"], "1");
    assert_eq!(body["usuario"]["usuario"], "alice");
}

#[tokio::test]
async fn login_mismatch_on_either_field_is_401() {
    for body in [
        json!({ "usuario": "alice", "clave": "wrong" }),
        json!({ "usuario": "eve", "clave": "secret" }),
    ] {
        let (status, body) = send(state(), with_json("POST", "/login", &body)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body["error"].is_string());
    }
}

#[tokio::test]
async fn login_with_missing_field_is_400() {
    let body = json!({ "usuario": "alice" });
    let (status, body) = send(state(), with_json("POST", "/login", &body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn list_returns_one_record_per_data_row() {
    let (status, body) = send(state(), get("/hoja/Usuarios")).await;
    assert_eq!(status, StatusCode::OK);

    let records = body.as_array().expect("raw array");
    assert_eq!(records.len(), 2);
    assert_eq!(records[0], json!({ "ID": "1", "name": "Ana" }));
}

#[tokio::test]
async fn get_returns_the_matching_record() {
    let (status, body) = send(state(), get("/hoja/Usuarios/2")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ID": "2", "name": "Bo" }));
}

#[tokio::test]
async fn get_unknown_id_is_404() {
    let (status, body) = send(state(), get("/hoja/Usuarios/9")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn unknown_sheet_is_404() {
    let (status, _) = send(state(), get("/hoja/Inventada")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_assigns_next_id_and_get_finds_it() {
    let shared = state();

    let body = json!({ "name": "Cy" });
    let (status, body) = send(shared.clone(), with_json("POST", "/hoja/Usuarios", &body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["id"], "3");
    assert_eq!(body["mensaje"], "Registro creado");

    let (status, body) = send(shared, get("/hoja/Usuarios/3")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ID": "3", "name": "Cy" }));
}

#[tokio::test]
async fn create_skips_gaps_in_numeric_ids() {
    let store = MemoryStore::new();
    store.insert_sheet(
        "Ventas",
        sheet(&["ID", "total"], &[&["1", "10"], &["2", "20"], &["5", "50"]]),
    );
    let shared = state_with(store, Config::default());

    let body = json!({ "total": "60" });
    let (status, body) = send(shared, with_json("POST", "/hoja/Ventas", &body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["id"], "6");
}

#[tokio::test]
async fn create_defaults_to_id_one_without_numeric_ids() {
    let store = MemoryStore::new();
    store.insert_sheet("Ventas", sheet(&["ID", "total"], &[&["abc", "10"]]));
    let shared = state_with(store, Config::default());

    let body = json!({ "total": "20" });
    let (status, body) = send(shared, with_json("POST", "/hoja/Ventas", &body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["id"], "1");
}

#[tokio::test]
async fn create_with_empty_body_is_400() {
    let (status, _) = send(state(), with_json("POST", "/hoja/Usuarios", &json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_is_a_full_overwrite() {
    let store = MemoryStore::new();
    store.insert_sheet(
        "Usuarios",
        sheet(&["ID", "name", "city"], &[&["1", "Ana", "Quito"]]),
    );
    let shared = state_with(store, Config::default());

    let body = json!({ "name": "Ana M" });
    let (status, body) = send(
        shared.clone(),
        with_json("PUT", "/hoja/Usuarios/1", &body),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mensaje"], "Registro actualizado");

    // The omitted `city` field was reset, not preserved.
    let (_, body) = send(shared, get("/hoja/Usuarios/1")).await;
    assert_eq!(body, json!({ "ID": "1", "name": "Ana M", "city": "" }));
}

#[tokio::test]
async fn update_unknown_id_is_404() {
    let body = json!({ "name": "X" });
    let (status, _) = send(state(), with_json("PUT", "/hoja/Usuarios/9", &body)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_then_get_is_404() {
    let shared = state();

    let (status, body) = send(shared.clone(), delete("/hoja/Usuarios/1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mensaje"], "Registro eliminado");

    let (status, _) = send(shared.clone(), get("/hoja/Usuarios/1")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // The surviving record is still reachable.
    let (status, body) = send(shared, get("/hoja/Usuarios/2")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Bo");
}

#[tokio::test]
async fn disallowed_sheet_is_400() {
    let config = Config {
        allowed_sheets: Some(vec!["Usuarios".to_string()]),
        ..Config::default()
    };
    let shared = state_with(seeded_store(), config);

    let (status, body) = send(shared.clone(), get("/hoja/usuarios")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    // The allow-listed sheet still works.
    let (status, _) = send(shared, get("/hoja/Usuarios")).await;
    assert_eq!(status, StatusCode::OK);
}
