//! Brigand roster endpoints (prévôt and above)

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use douanes_common::db::brigands::{self, AffiliationInput, BrigandPatch, NewBrigand};
use douanes_common::db::{Brigand, Organisation};
use serde::{Deserialize, Deserializer, Serialize};

use super::Agent;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Brigand as returned to clients
///
/// `order` is the label users see: the linked organisation's short name,
/// else its full name, else the legacy text.
#[derive(Debug, Serialize)]
pub struct BrigandJson {
    pub id: i64,
    pub name: String,
    pub list: String,
    pub facts: String,
    pub is_crown: bool,
    pub is_png: bool,
    pub order_id: Option<i64>,
    pub order: String,
    pub organisation: Option<Organisation>,
}

impl From<Brigand> for BrigandJson {
    fn from(brigand: Brigand) -> Self {
        let order = brigand.order_label();
        Self {
            id: brigand.id,
            name: brigand.name,
            list: brigand.list,
            facts: brigand.facts,
            is_crown: brigand.is_crown,
            is_png: brigand.is_png,
            order_id: brigand.order_id,
            order,
            organisation: brigand.organisation,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateBrigandRequest {
    pub name: String,
    #[serde(default)]
    pub list: String,
    #[serde(default)]
    pub facts: String,
    #[serde(default)]
    pub is_crown: bool,
    #[serde(default)]
    pub is_png: bool,
    #[serde(default)]
    pub order_id: Option<i64>,
    #[serde(default)]
    pub order: Option<String>,
}

/// Absent keys leave fields unchanged; an explicit `null` affiliation unlinks
#[derive(Debug, Deserialize)]
pub struct UpdateBrigandRequest {
    pub name: Option<String>,
    pub list: Option<String>,
    pub facts: Option<String>,
    pub is_crown: Option<bool>,
    pub is_png: Option<bool>,
    #[serde(default, deserialize_with = "present")]
    pub order_id: Option<Option<i64>>,
    #[serde(default, deserialize_with = "present")]
    pub order: Option<Option<String>>,
}

/// Distinguish a key sent as `null` from a missing key
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl UpdateBrigandRequest {
    fn into_patch(self) -> BrigandPatch {
        let affiliation = if self.order_id.is_some() || self.order.is_some() {
            Some(AffiliationInput {
                order_id: self.order_id.flatten(),
                order: self.order.flatten(),
            })
        } else {
            None
        };

        BrigandPatch {
            name: self.name,
            list: self.list,
            facts: self.facts,
            is_crown: self.is_crown,
            is_png: self.is_png,
            affiliation,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteByNameRequest {
    pub names: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct DeleteByNameResponse {
    pub deleted: Vec<String>,
}

/// GET /api/brigands
pub async fn list_brigands(agent: Agent, State(state): State<AppState>) -> ApiResult<Json<Vec<BrigandJson>>> {
    agent.require_supervisor()?;

    let roster = brigands::list_brigands(&state.db).await?;
    Ok(Json(roster.into_iter().map(BrigandJson::from).collect()))
}

/// POST /api/brigands
pub async fn create_brigand(
    agent: Agent,
    State(state): State<AppState>,
    Json(request): Json<CreateBrigandRequest>,
) -> ApiResult<(StatusCode, Json<BrigandJson>)> {
    agent.require_supervisor()?;

    let new = NewBrigand {
        name: request.name,
        list: request.list,
        facts: request.facts,
        is_crown: request.is_crown,
        is_png: request.is_png,
        affiliation: AffiliationInput {
            order_id: request.order_id,
            order: request.order,
        },
    };

    let brigand = brigands::create_brigand(&state.db, &new).await?;
    Ok((StatusCode::CREATED, Json(brigand.into())))
}

/// GET /api/brigands/search?name=
pub async fn search_brigand(
    agent: Agent,
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<BrigandJson>> {
    agent.require_supervisor()?;

    brigands::find_brigand_by_name(&state.db, &query.name)
        .await?
        .map(|b| Json(b.into()))
        .ok_or_else(|| ApiError::NotFound(format!("Brigand '{}'", query.name.trim())))
}

/// PUT /api/brigands/:id
pub async fn update_brigand(
    agent: Agent,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateBrigandRequest>,
) -> ApiResult<Json<BrigandJson>> {
    agent.require_supervisor()?;

    let brigand = brigands::update_brigand(&state.db, id, &request.into_patch()).await?;
    Ok(Json(brigand.into()))
}

/// POST /api/brigands/delete-by-name
pub async fn delete_by_name(
    agent: Agent,
    State(state): State<AppState>,
    Json(request): Json<DeleteByNameRequest>,
) -> ApiResult<Json<DeleteByNameResponse>> {
    agent.require_supervisor()?;

    let deleted = brigands::delete_brigands_by_name(&state.db, &request.names).await?;
    Ok(Json(DeleteByNameResponse { deleted }))
}

pub fn brigand_routes() -> Router<AppState> {
    Router::new()
        .route("/api/brigands", get(list_brigands).post(create_brigand))
        .route("/api/brigands/search", get(search_brigand))
        .route("/api/brigands/delete-by-name", post(delete_by_name))
        .route("/api/brigands/:id", put(update_brigand))
}
