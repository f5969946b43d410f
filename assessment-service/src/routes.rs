use std::fmt::Debug;

use assessment_utils::{
    generation::{Assembler, QuestionSetResult},
    policy::Mode,
    validation::{parse_assessment_type_id, parse_org_id, validate_new_assessment_type},
};
use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use question_bank::{AssessmentType, AssessmentTypeSummary, NewAssessmentType, QuestionRepository};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::{config::AppState, error::Error};

impl<R> AppState<R> {
    /// Logs a failure and converts it to a generic server error.
    fn server_error(&self, message: &str, error: &impl Debug, test_type: Option<Mode>) -> Error {
        error!(error = ?error, "{message}");
        let details = self
            .env_vars
            .environment
            .exposes_error_details()
            .then(|| format!("{error:?}"));
        Error::Server {
            message: message.to_string(),
            details,
            test_type,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct QuestionSetParams {
    assessment_type_id: Option<String>,
    #[serde(rename = "type")]
    test_type: Option<String>,
}

fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, Error> {
    query.map(|Query(params)| params).map_err(|rejection| {
        Error::Client(
            StatusCode::BAD_REQUEST,
            format!("Invalid query string: {}", rejection.body_text()),
        )
    })
}

#[tracing::instrument(skip_all)]
pub async fn get_question_set<R: QuestionRepository>(
    State(state): State<AppState<R>>,
    query: Result<Query<QuestionSetParams>, QueryRejection>,
) -> Result<Json<QuestionSetResult>, Error> {
    let params = query_params(query)?;
    tracing::debug!(?params, "question set requested");
    let mode = Mode::from_param(params.test_type.as_deref());
    let assessment_type_id = parse_assessment_type_id(params.assessment_type_id.as_deref())?;

    let question_set = Assembler::new(&state.repository, &state.policy)
        .assemble(assessment_type_id, mode)
        .await
        .map_err(|e| state.server_error("Failed to load questions", &e, Some(mode)))?;

    Ok(Json(question_set))
}

#[derive(Debug, Deserialize)]
pub struct AssessmentTypesParams {
    org_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AssessmentTypesResponse {
    success: bool,
    assessment_types: Vec<AssessmentTypeSummary>,
    count: usize,
}

#[tracing::instrument(skip_all)]
pub async fn get_assessment_types<R: QuestionRepository>(
    State(state): State<AppState<R>>,
    query: Result<Query<AssessmentTypesParams>, QueryRejection>,
) -> Result<Json<AssessmentTypesResponse>, Error> {
    let params = query_params(query)?;
    let org_id = parse_org_id(params.org_id.as_deref())?;

    let assessment_types = state
        .repository
        .list_assessment_types()
        .await
        .map_err(|e| state.server_error("Failed to fetch assessment types", &e, None))?;

    info!(org_id, count = assessment_types.len(), "listed assessment types");
    Ok(Json(AssessmentTypesResponse {
        success: true,
        count: assessment_types.len(),
        assessment_types,
    }))
}

#[derive(Debug, Deserialize)]
pub struct NewAssessmentTypeRequest {
    name: Option<String>,
    description: Option<String>,
    key_area_id: Option<i64>,
    is_active: Option<bool>,
}

impl From<NewAssessmentTypeRequest> for NewAssessmentType {
    fn from(request: NewAssessmentTypeRequest) -> Self {
        NewAssessmentType {
            name: request.name.unwrap_or_default(),
            description: request.description.filter(|d| !d.is_empty()),
            key_area_id: request.key_area_id.filter(|id| *id != 0),
            is_active: request.is_active.unwrap_or(true),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreatedAssessmentTypeResponse {
    success: bool,
    assessment_type: AssessmentType,
    message: String,
}

#[tracing::instrument(skip_all)]
pub async fn post_assessment_type<R: QuestionRepository>(
    State(state): State<AppState<R>>,
    payload: Result<Json<NewAssessmentTypeRequest>, JsonRejection>,
) -> Result<Json<CreatedAssessmentTypeResponse>, Error> {
    let Json(request) = payload.map_err(|rejection| {
        Error::Client(
            StatusCode::BAD_REQUEST,
            format!("Invalid request body: {}", rejection.body_text()),
        )
    })?;

    let new_assessment_type = NewAssessmentType::from(request);
    validate_new_assessment_type(&new_assessment_type)?;

    let assessment_type = state
        .repository
        .create_assessment_type(&new_assessment_type)
        .await
        .map_err(|e| state.server_error("Failed to create assessment type", &e, None))?;

    Ok(Json(CreatedAssessmentTypeResponse {
        success: true,
        assessment_type,
        message: "Assessment type created successfully".to_string(),
    }))
}

pub async fn get_status_ping() -> impl IntoResponse {
    info!("Status");
    StatusCode::OK
}
