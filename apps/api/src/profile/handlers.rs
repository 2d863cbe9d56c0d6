use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::profile::{
    ApplicantProfileRow, CertificationRow, EducationRow, WorkExperienceRow,
};
use crate::profile::completion::{compute_completion, CompletionReport};
use crate::profile::recompute::{on_profile_graph_changed, GraphMutation};
use crate::profile::store;
use crate::profile::upload;
use crate::profile::validation::{
    validate_certification, validate_education, validate_experience, validate_links,
    validate_personal_info, validate_skills, validate_summary, CertificationInput,
    EducationInput, ExperienceInput, LinksInput, PersonalInfoInput, SkillsInput, SummaryInput,
};
use crate::state::AppState;

/// Acting identity, passed explicitly on every route. There is no ambient
/// current user.
#[derive(Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

#[derive(Serialize)]
pub struct ProfileResponse {
    pub profile: ApplicantProfileRow,
    pub experiences: Vec<WorkExperienceRow>,
    pub educations: Vec<EducationRow>,
    pub certifications: Vec<CertificationRow>,
    pub completion: CompletionReport,
}

#[derive(Serialize)]
pub struct CreatedResponse {
    pub id: Uuid,
}

#[derive(Serialize)]
pub struct CvUploadResponse {
    pub cv_url: String,
    pub cv_file_name: String,
}

/// GET /api/v1/profile
/// Returns the profile graph with its completion report, creating an empty
/// profile on first access. Read path; persisted metrics are not touched.
pub async fn handle_get_profile(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<ProfileResponse>, AppError> {
    let graph = store::get_or_create_graph(&state.db, params.user_id).await?;
    let completion = compute_completion(&graph);
    Ok(Json(ProfileResponse {
        profile: graph.profile,
        experiences: graph.experiences,
        educations: graph.educations,
        certifications: graph.certifications,
        completion,
    }))
}

/// GET /api/v1/profile/completion
pub async fn handle_get_completion(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<CompletionReport>, AppError> {
    let graph = store::get_or_create_graph(&state.db, params.user_id).await?;
    Ok(Json(compute_completion(&graph)))
}

/// PUT /api/v1/profile/personal-info
pub async fn handle_update_personal_info(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
    Json(mut input): Json<PersonalInfoInput>,
) -> Result<StatusCode, AppError> {
    validate_personal_info(&mut input)?;
    store::update_personal_info(&state.db, params.user_id, &input).await?;
    on_profile_graph_changed(&*state.repo, params.user_id, GraphMutation::Sections).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/profile/links
pub async fn handle_update_links(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
    Json(mut input): Json<LinksInput>,
) -> Result<StatusCode, AppError> {
    validate_links(&mut input)?;
    store::update_links(&state.db, params.user_id, &input).await?;
    on_profile_graph_changed(&*state.repo, params.user_id, GraphMutation::Sections).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/profile/summary
pub async fn handle_update_summary(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
    Json(mut input): Json<SummaryInput>,
) -> Result<StatusCode, AppError> {
    validate_summary(&mut input)?;
    store::update_summary(&state.db, params.user_id, &input).await?;
    on_profile_graph_changed(&*state.repo, params.user_id, GraphMutation::Sections).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/profile/skills
pub async fn handle_update_skills(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
    Json(mut input): Json<SkillsInput>,
) -> Result<StatusCode, AppError> {
    validate_skills(&mut input)?;
    store::update_skills(&state.db, params.user_id, &input.skills).await?;
    on_profile_graph_changed(&*state.repo, params.user_id, GraphMutation::Sections).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/profile/experiences
pub async fn handle_create_experience(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
    Json(mut input): Json<ExperienceInput>,
) -> Result<(StatusCode, Json<CreatedResponse>), AppError> {
    validate_experience(&mut input)?;
    let id = store::create_experience(&state.db, params.user_id, &input).await?;
    on_profile_graph_changed(&*state.repo, params.user_id, GraphMutation::WorkHistory).await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// PUT /api/v1/profile/experiences/:id
pub async fn handle_update_experience(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
    Json(mut input): Json<ExperienceInput>,
) -> Result<StatusCode, AppError> {
    validate_experience(&mut input)?;
    store::update_experience(&state.db, params.user_id, id, &input).await?;
    on_profile_graph_changed(&*state.repo, params.user_id, GraphMutation::WorkHistory).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/profile/experiences/:id
pub async fn handle_delete_experience(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<StatusCode, AppError> {
    store::delete_experience(&state.db, params.user_id, id).await?;
    on_profile_graph_changed(&*state.repo, params.user_id, GraphMutation::WorkHistory).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/profile/educations
pub async fn handle_create_education(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
    Json(mut input): Json<EducationInput>,
) -> Result<(StatusCode, Json<CreatedResponse>), AppError> {
    validate_education(&mut input)?;
    let id = store::create_education(&state.db, params.user_id, &input).await?;
    on_profile_graph_changed(&*state.repo, params.user_id, GraphMutation::Sections).await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// PUT /api/v1/profile/educations/:id
pub async fn handle_update_education(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
    Json(mut input): Json<EducationInput>,
) -> Result<StatusCode, AppError> {
    validate_education(&mut input)?;
    store::update_education(&state.db, params.user_id, id, &input).await?;
    on_profile_graph_changed(&*state.repo, params.user_id, GraphMutation::Sections).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/profile/educations/:id
pub async fn handle_delete_education(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<StatusCode, AppError> {
    store::delete_education(&state.db, params.user_id, id).await?;
    on_profile_graph_changed(&*state.repo, params.user_id, GraphMutation::Sections).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/profile/certifications
pub async fn handle_create_certification(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
    Json(mut input): Json<CertificationInput>,
) -> Result<(StatusCode, Json<CreatedResponse>), AppError> {
    validate_certification(&mut input)?;
    let id = store::create_certification(&state.db, params.user_id, &input).await?;
    on_profile_graph_changed(&*state.repo, params.user_id, GraphMutation::Sections).await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// PUT /api/v1/profile/certifications/:id
pub async fn handle_update_certification(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
    Json(mut input): Json<CertificationInput>,
) -> Result<StatusCode, AppError> {
    validate_certification(&mut input)?;
    store::update_certification(&state.db, params.user_id, id, &input).await?;
    on_profile_graph_changed(&*state.repo, params.user_id, GraphMutation::Sections).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/profile/certifications/:id
pub async fn handle_delete_certification(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<StatusCode, AppError> {
    store::delete_certification(&state.db, params.user_id, id).await?;
    on_profile_graph_changed(&*state.repo, params.user_id, GraphMutation::Sections).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/profile/cv
/// Multipart upload of a single `file` field. Counts toward the Document
/// Upload section, so the metrics recompute after the reference is stored.
pub async fn handle_upload_cv(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
    mut multipart: Multipart,
) -> Result<Json<CvUploadResponse>, AppError> {
    let mut file = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart payload: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("cv.pdf").to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;
        file = Some((file_name, content_type, data.to_vec()));
        break;
    }

    let (file_name, content_type, data) =
        file.ok_or_else(|| AppError::Validation("Missing 'file' field".to_string()))?;
    upload::validate_cv_file(&content_type, data.len())?;

    // First access may land here before any profile view.
    store::get_or_create_graph(&state.db, params.user_id).await?;

    let stored = upload::store_cv(
        &state.s3,
        &state.config.s3_bucket,
        &state.config.s3_public_url,
        params.user_id,
        &file_name,
        &content_type,
        data,
    )
    .await?;

    store::set_cv_reference(&state.db, params.user_id, &stored.url, &stored.file_name).await?;
    on_profile_graph_changed(&*state.repo, params.user_id, GraphMutation::Sections).await?;

    Ok(Json(CvUploadResponse {
        cv_url: stored.url,
        cv_file_name: stored.file_name,
    }))
}
