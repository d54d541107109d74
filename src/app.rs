use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde_json::json;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

use crate::config::Config;
use crate::error::ApiError;
use crate::login::{self, Credentials};
use crate::proxy::TabularProxy;
use crate::sheet::Record;
use crate::store::RowStore;

pub struct AppState {
    pub proxy: TabularProxy,
    pub config: Config,
}

/// Build the full route table over a shared state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/login", axum::routing::post(handle_login))
        .route("/hoja/:name", get(list_records).post(create_record))
        .route(
            "/hoja/:name/:id",
            get(get_record).put(update_record).delete(delete_record),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn run(
    config: Config,
    store: Arc<dyn RowStore>,
) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("0.0.0.0:{}", config.port);

    // Setup app state
    let state = Arc::new(AppState {
        proxy: TabularProxy::new(store),
        config,
    });

    // Build router and start server
    let app = router(state);
    let listener = TcpListener::bind(&addr).await?;
    log::info!("servidor corriendo en http://{addr}");
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health() -> &'static str {
    "Servidor y base de datos funcionando"
}

async fn handle_login(
    State(state): State<Arc<AppState>>,
    Json(credentials): Json<Credentials>,
) -> Result<impl IntoResponse, ApiError> {
    if credentials.usuario.is_empty() || credentials.clave.is_empty() {
        return Err(ApiError::Validation(
            "usuario y clave son obligatorios".to_string(),
        ));
    }

    let store = state.proxy.store();
    match login::verify(store, &state.config.credentials_sheet, &credentials).await? {
        Some(usuario) => Ok(Json(json!({
            "mensaje": "Acceso permitido",
            "acceso": true,
            "usuario": usuario,
        }))),
        None => Err(ApiError::Auth("Credenciales inválidas".to_string())),
    }
}

async fn list_records(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    check_allowed(&state, &name)?;
    let records = state.proxy.list(&name).await?;
    Ok(Json(records))
}

async fn get_record(
    State(state): State<Arc<AppState>>,
    Path((name, id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    check_allowed(&state, &name)?;
    let record = state.proxy.get(&name, &id).await?;
    Ok(Json(record))
}

async fn create_record(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(fields): Json<Record>,
) -> Result<impl IntoResponse, ApiError> {
    check_allowed(&state, &name)?;
    let id = state.proxy.create(&name, &fields).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "mensaje": "Registro creado", "id": id })),
    ))
}

async fn update_record(
    State(state): State<Arc<AppState>>,
    Path((name, id)): Path<(String, String)>,
    Json(fields): Json<Record>,
) -> Result<impl IntoResponse, ApiError> {
    check_allowed(&state, &name)?;
    state.proxy.update(&name, &id, &fields).await?;
    Ok(Json(json!({ "mensaje": "Registro actualizado" })))
}

async fn delete_record(
    State(state): State<Arc<AppState>>,
    Path((name, id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    check_allowed(&state, &name)?;
    state.proxy.delete(&name, &id).await?;
    Ok(Json(json!({ "mensaje": "Registro eliminado" })))
}

fn check_allowed(state: &AppState, name: &str) -> Result<(), ApiError> {
    if state.config.sheet_allowed(name) {
        Ok(())
    } else {
        Err(ApiError::Validation(format!("hoja '{name}' no permitida")))
    }
}
