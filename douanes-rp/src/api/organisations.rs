//! Organisation registry endpoints (prévôt and above)

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use douanes_common::db::organisations::{self, OrganisationPatch};
use douanes_common::db::Organisation;
use serde::Deserialize;

use super::Agent;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateOrganisationRequest {
    #[serde(default)]
    pub nom_complet: String,
    #[serde(default)]
    pub nom_abrege: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateOrganisationRequest {
    pub nom_complet: Option<String>,
    /// `""` clears the short name
    pub nom_abrege: Option<String>,
}

/// GET /api/organisations
pub async fn list_organisations(
    agent: Agent,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<Organisation>>> {
    agent.require_supervisor()?;
    Ok(Json(organisations::list_organisations(&state.db).await?))
}

/// POST /api/organisations
pub async fn create_organisation(
    agent: Agent,
    State(state): State<AppState>,
    Json(request): Json<CreateOrganisationRequest>,
) -> ApiResult<(StatusCode, Json<Organisation>)> {
    agent.require_supervisor()?;

    let org = organisations::create_organisation(
        &state.db,
        &request.nom_complet,
        request.nom_abrege.as_deref(),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(org)))
}

/// PUT /api/organisations/:id
pub async fn update_organisation(
    agent: Agent,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateOrganisationRequest>,
) -> ApiResult<Json<Organisation>> {
    agent.require_supervisor()?;

    let patch = OrganisationPatch {
        nom_complet: request.nom_complet,
        nom_abrege: request.nom_abrege,
    };
    Ok(Json(organisations::update_organisation(&state.db, id, &patch).await?))
}

/// DELETE /api/organisations/:id
///
/// Linked brigands stay on the roster, unlinked.
pub async fn delete_organisation(
    agent: Agent,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    agent.require_supervisor()?;

    if organisations::delete_organisation(&state.db, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("Organisation {}", id)))
    }
}

pub fn organisation_routes() -> Router<AppState> {
    Router::new()
        .route("/api/organisations", get(list_organisations).post(create_organisation))
        .route("/api/organisations/:id", put(update_organisation).delete(delete_organisation))
}
