use crate::error::{ApiError, Result};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

const NOT_FOUND_BY_ID: &str = "No se encontró la credencial con ese id";
const NOT_FOUND_BY_CURP: &str = "No se encontró la credencial con esa CURP";

/// A stored identity-credential row. `IDpersona` keeps its historical
/// capitalization both on the wire and in the table.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Credencial {
    pub id: String,
    pub clave_ine: String,
    pub curp: String,
    #[serde(rename = "IDpersona")]
    #[sqlx(rename = "IDpersona")]
    pub id_persona: String,
}

/// Incoming body for create and update. Fields stay raw JSON values so the
/// truthiness rule in [`provided`] can see strings and numbers alike.
#[derive(Debug, Default, Deserialize)]
pub struct CredencialPayload {
    pub clave_ine: Option<Value>,
    pub curp: Option<Value>,
    #[serde(rename = "IDpersona")]
    pub id_persona: Option<Value>,
}

/// Truthiness rule shared by create validation and update merging: a field
/// counts as provided only when it is a non-empty string or a non-zero
/// number. Absent, null, `""`, `0` and every other JSON type all read as
/// "not provided", so a client cannot clear a field to empty.
fn provided(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Number(n)) if n.as_f64().is_some_and(|f| f != 0.0) => Some(n.to_string()),
        _ => None,
    }
}

/// Field-wise merge for update: each provided field overwrites, everything
/// else keeps the stored value. The id is never regenerated.
fn merge_with_stored(payload: &CredencialPayload, stored: &Credencial) -> Credencial {
    Credencial {
        id: stored.id.clone(),
        clave_ine: provided(payload.clave_ine.as_ref()).unwrap_or_else(|| stored.clave_ine.clone()),
        curp: provided(payload.curp.as_ref()).unwrap_or_else(|| stored.curp.clone()),
        id_persona: provided(payload.id_persona.as_ref())
            .unwrap_or_else(|| stored.id_persona.clone()),
    }
}

/// `GET /credenciales` — every row, unfiltered. An empty table is an empty
/// array, not a 404.
pub async fn list_credenciales(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Credencial>>> {
    let rows =
        sqlx::query_as::<_, Credencial>("SELECT id, clave_ine, curp, IDpersona FROM credenciales")
            .fetch_all(&state.pool)
            .await?;
    debug!(count = rows.len(), "Listed credenciales");
    Ok(Json(rows))
}

/// `GET /credenciales/id/:id` — exact match, bare object on the single hit.
pub async fn get_credencial_by_id(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Credencial>> {
    let row = sqlx::query_as::<_, Credencial>(
        "SELECT id, clave_ine, curp, IDpersona FROM credenciales WHERE id = ?",
    )
    .bind(&id)
    .fetch_optional(&state.pool)
    .await?;

    row.map(Json).ok_or(ApiError::NotFound(NOT_FOUND_BY_ID))
}

/// `GET /credenciales/curp/:curp` — a CURP is not unique, so the response
/// is always an array, even for a single match.
pub async fn get_credenciales_by_curp(
    State(state): State<Arc<AppState>>,
    Path(curp): Path<String>,
) -> Result<Json<Vec<Credencial>>> {
    let rows = sqlx::query_as::<_, Credencial>(
        "SELECT id, clave_ine, curp, IDpersona FROM credenciales WHERE curp = ?",
    )
    .bind(&curp)
    .fetch_all(&state.pool)
    .await?;

    if rows.is_empty() {
        return Err(ApiError::NotFound(NOT_FOUND_BY_CURP));
    }
    Ok(Json(rows))
}

/// `POST /credenciales` — all three fields must be provided; the id is
/// generated server-side and never taken from the client.
pub async fn create_credencial(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CredencialPayload>,
) -> Result<Response> {
    let (Some(clave_ine), Some(curp), Some(id_persona)) = (
        provided(payload.clave_ine.as_ref()),
        provided(payload.curp.as_ref()),
        provided(payload.id_persona.as_ref()),
    ) else {
        return Err(ApiError::MissingFields);
    };

    let cred = Credencial {
        id: Uuid::new_v4().to_string(),
        clave_ine,
        curp,
        id_persona,
    };
    sqlx::query("INSERT INTO credenciales (id, clave_ine, curp, IDpersona) VALUES (?, ?, ?, ?)")
        .bind(&cred.id)
        .bind(&cred.clave_ine)
        .bind(&cred.curp)
        .bind(&cred.id_persona)
        .execute(&state.pool)
        .await?;

    info!(id = %cred.id, "Created credencial");
    Ok((StatusCode::CREATED, Json(cred)).into_response())
}

/// `PUT /credenciales/:id` — read the stored row, merge, write all three
/// columns. The read and the write are not a transaction: a concurrent
/// delete makes the UPDATE affect zero rows and the response is still 200
/// with the merged values.
pub async fn update_credencial(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<CredencialPayload>,
) -> Result<Json<Credencial>> {
    let stored = sqlx::query_as::<_, Credencial>(
        "SELECT id, clave_ine, curp, IDpersona FROM credenciales WHERE id = ?",
    )
    .bind(&id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or(ApiError::NotFound(NOT_FOUND_BY_ID))?;

    let merged = merge_with_stored(&payload, &stored);
    sqlx::query("UPDATE credenciales SET clave_ine = ?, curp = ?, IDpersona = ? WHERE id = ?")
        .bind(&merged.clave_ine)
        .bind(&merged.curp)
        .bind(&merged.id_persona)
        .bind(&id)
        .execute(&state.pool)
        .await?;

    info!(id = %id, "Updated credencial");
    Ok(Json(merged))
}

/// `DELETE /credenciales/:id` — 404 when nothing was deleted.
pub async fn delete_credencial_by_id(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let result = sqlx::query("DELETE FROM credenciales WHERE id = ?")
        .bind(&id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound(NOT_FOUND_BY_ID));
    }
    info!(id = %id, "Deleted credencial");
    Ok(Json(json!({ "message": "Registro eliminado correctamente" })))
}

/// `DELETE /credenciales/curp/:curp` — removes every matching row in one
/// statement; the confirmation does not report how many went away.
pub async fn delete_credenciales_by_curp(
    State(state): State<Arc<AppState>>,
    Path(curp): Path<String>,
) -> Result<Json<Value>> {
    let result = sqlx::query("DELETE FROM credenciales WHERE curp = ?")
        .bind(&curp)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound(NOT_FOUND_BY_CURP));
    }
    info!(%curp, rows = result.rows_affected(), "Deleted credenciales by CURP");
    Ok(Json(json!({ "message": "Registro eliminado correctamente por CURP" })))
}
