//! Village list endpoints

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use douanes_common::db::{villages, Village};
use serde::Deserialize;
use serde_json::{json, Value};

use super::Agent;
use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct NewVillageRequest {
    pub name: String,
}

/// GET /api/villages
pub async fn list_villages(_agent: Agent, State(state): State<AppState>) -> ApiResult<Json<Vec<Village>>> {
    Ok(Json(villages::list_villages(&state.db).await?))
}

/// POST /api/villages
///
/// 201 when added, 200 when it was already listed.
pub async fn add_village(
    agent: Agent,
    State(state): State<AppState>,
    Json(request): Json<NewVillageRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    agent.require_supervisor()?;

    let created = villages::insert_village(&state.db, &request.name).await?;
    let status = if created { StatusCode::CREATED } else { StatusCode::OK };

    Ok((status, Json(json!({ "name": request.name.trim(), "created": created }))))
}

pub fn village_routes() -> Router<AppState> {
    Router::new().route("/api/villages", get(list_villages).post(add_village))
}
