//! Profile graph persistence. All queries key on the owner identity; child
//! rows are only ever touched through an ownership check against their
//! parent profile.

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::profile::{
    ApplicantProfileRow, CertificationRow, EducationRow, ProfileGraph, WorkExperienceRow,
};
use crate::profile::recompute::DerivedMetrics;
use crate::profile::validation::{
    CertificationInput, EducationInput, ExperienceInput, LinksInput, PersonalInfoInput,
    SummaryInput,
};

/// Loads a profile with all three child collections, or `None` when the
/// owner has no profile yet.
pub async fn load_graph(pool: &PgPool, user_id: Uuid) -> Result<Option<ProfileGraph>, AppError> {
    let profile: Option<ApplicantProfileRow> =
        sqlx::query_as("SELECT * FROM applicant_profiles WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(pool)
            .await?;

    let Some(profile) = profile else {
        return Ok(None);
    };

    let experiences: Vec<WorkExperienceRow> = sqlx::query_as(
        "SELECT * FROM work_experiences WHERE applicant_profile_id = $1 ORDER BY start_date DESC",
    )
    .bind(profile.id)
    .fetch_all(pool)
    .await?;

    let educations: Vec<EducationRow> = sqlx::query_as(
        "SELECT * FROM educations WHERE applicant_profile_id = $1 ORDER BY end_date DESC NULLS LAST",
    )
    .bind(profile.id)
    .fetch_all(pool)
    .await?;

    let certifications: Vec<CertificationRow> = sqlx::query_as(
        "SELECT * FROM certifications WHERE applicant_profile_id = $1 ORDER BY issue_date DESC NULLS LAST",
    )
    .bind(profile.id)
    .fetch_all(pool)
    .await?;

    Ok(Some(ProfileGraph {
        profile,
        experiences,
        educations,
        certifications,
    }))
}

/// Returns the owner's profile graph, creating an empty profile on first
/// access.
pub async fn get_or_create_graph(pool: &PgPool, user_id: Uuid) -> Result<ProfileGraph, AppError> {
    if let Some(graph) = load_graph(pool, user_id).await? {
        return Ok(graph);
    }

    let profile: ApplicantProfileRow = sqlx::query_as(
        r#"
        INSERT INTO applicant_profiles
            (id, user_id, skills, profile_completeness, total_years_experience)
        VALUES ($1, $2, $3, 0, 0)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(Vec::<String>::new())
    .fetch_one(pool)
    .await?;

    info!("Created applicant profile for user {user_id}");

    Ok(ProfileGraph {
        profile,
        experiences: vec![],
        educations: vec![],
        certifications: vec![],
    })
}

/// Writes the derived metrics back onto the profile row. A `None` total
/// leaves the stored value as is (the mutation could not have moved it).
pub async fn save_derived_metrics(
    pool: &PgPool,
    user_id: Uuid,
    metrics: &DerivedMetrics,
) -> Result<(), AppError> {
    let result = sqlx::query(
        r#"
        UPDATE applicant_profiles
        SET profile_completeness = $2,
            total_years_experience = COALESCE($3, total_years_experience),
            updated_at = NOW()
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .bind(metrics.completion_percentage as i32)
    .bind(metrics.total_years_experience)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(profile_not_found(user_id));
    }
    Ok(())
}

pub async fn update_personal_info(
    pool: &PgPool,
    user_id: Uuid,
    input: &PersonalInfoInput,
) -> Result<(), AppError> {
    let result = sqlx::query(
        r#"
        UPDATE applicant_profiles
        SET first_name = $2, last_name = $3, phone = $4, city = $5, country = $6,
            updated_at = NOW()
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .bind(&input.first_name)
    .bind(&input.last_name)
    .bind(&input.phone)
    .bind(&input.city)
    .bind(&input.country)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(profile_not_found(user_id));
    }
    Ok(())
}

pub async fn update_links(
    pool: &PgPool,
    user_id: Uuid,
    input: &LinksInput,
) -> Result<(), AppError> {
    let result = sqlx::query(
        r#"
        UPDATE applicant_profiles
        SET linkedin_url = $2, github_url = $3, portfolio_url = $4, updated_at = NOW()
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .bind(&input.linkedin_url)
    .bind(&input.github_url)
    .bind(&input.portfolio_url)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(profile_not_found(user_id));
    }
    Ok(())
}

pub async fn update_summary(
    pool: &PgPool,
    user_id: Uuid,
    input: &SummaryInput,
) -> Result<(), AppError> {
    let result = sqlx::query(
        r#"
        UPDATE applicant_profiles
        SET headline = $2, bio = $3, updated_at = NOW()
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .bind(&input.headline)
    .bind(&input.bio)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(profile_not_found(user_id));
    }
    Ok(())
}

pub async fn update_skills(
    pool: &PgPool,
    user_id: Uuid,
    skills: &[String],
) -> Result<(), AppError> {
    let result = sqlx::query(
        "UPDATE applicant_profiles SET skills = $2, updated_at = NOW() WHERE user_id = $1",
    )
    .bind(user_id)
    .bind(skills)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(profile_not_found(user_id));
    }
    Ok(())
}

pub async fn set_cv_reference(
    pool: &PgPool,
    user_id: Uuid,
    cv_url: &str,
    cv_file_name: &str,
) -> Result<(), AppError> {
    let result = sqlx::query(
        r#"
        UPDATE applicant_profiles
        SET cv_url = $2, cv_file_name = $3, updated_at = NOW()
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .bind(cv_url)
    .bind(cv_file_name)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(profile_not_found(user_id));
    }
    Ok(())
}

pub async fn create_experience(
    pool: &PgPool,
    user_id: Uuid,
    input: &ExperienceInput,
) -> Result<Uuid, AppError> {
    let profile_id = profile_id_for_owner(pool, user_id).await?;
    let id = Uuid::new_v4();

    sqlx::query(
        r#"
        INSERT INTO work_experiences
            (id, applicant_profile_id, company, role, location, start_date,
             end_date, is_current, description)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(id)
    .bind(profile_id)
    .bind(&input.company)
    .bind(&input.role)
    .bind(&input.location)
    .bind(input.start_date)
    .bind(input.end_date)
    .bind(input.is_current)
    .bind(&input.description)
    .execute(pool)
    .await?;

    Ok(id)
}

pub async fn update_experience(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
    input: &ExperienceInput,
) -> Result<(), AppError> {
    verify_experience_owner(pool, id, user_id).await?;

    sqlx::query(
        r#"
        UPDATE work_experiences
        SET company = $2, role = $3, location = $4, start_date = $5,
            end_date = $6, is_current = $7, description = $8, updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(&input.company)
    .bind(&input.role)
    .bind(&input.location)
    .bind(input.start_date)
    .bind(input.end_date)
    .bind(input.is_current)
    .bind(&input.description)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn delete_experience(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<(), AppError> {
    verify_experience_owner(pool, id, user_id).await?;

    sqlx::query("DELETE FROM work_experiences WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn create_education(
    pool: &PgPool,
    user_id: Uuid,
    input: &EducationInput,
) -> Result<Uuid, AppError> {
    let profile_id = profile_id_for_owner(pool, user_id).await?;
    let id = Uuid::new_v4();

    sqlx::query(
        r#"
        INSERT INTO educations
            (id, applicant_profile_id, institution, degree, field_of_study,
             start_date, end_date, description)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(id)
    .bind(profile_id)
    .bind(&input.institution)
    .bind(&input.degree)
    .bind(&input.field_of_study)
    .bind(input.start_date)
    .bind(input.end_date)
    .bind(&input.description)
    .execute(pool)
    .await?;

    Ok(id)
}

pub async fn update_education(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
    input: &EducationInput,
) -> Result<(), AppError> {
    verify_education_owner(pool, id, user_id).await?;

    sqlx::query(
        r#"
        UPDATE educations
        SET institution = $2, degree = $3, field_of_study = $4, start_date = $5,
            end_date = $6, description = $7, updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(&input.institution)
    .bind(&input.degree)
    .bind(&input.field_of_study)
    .bind(input.start_date)
    .bind(input.end_date)
    .bind(&input.description)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn delete_education(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<(), AppError> {
    verify_education_owner(pool, id, user_id).await?;

    sqlx::query("DELETE FROM educations WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn create_certification(
    pool: &PgPool,
    user_id: Uuid,
    input: &CertificationInput,
) -> Result<Uuid, AppError> {
    let profile_id = profile_id_for_owner(pool, user_id).await?;
    let id = Uuid::new_v4();

    sqlx::query(
        r#"
        INSERT INTO certifications
            (id, applicant_profile_id, name, issuing_org, issue_date,
             expiration_date, credential_url)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(id)
    .bind(profile_id)
    .bind(&input.name)
    .bind(&input.issuing_org)
    .bind(input.issue_date)
    .bind(input.expiration_date)
    .bind(&input.credential_url)
    .execute(pool)
    .await?;

    Ok(id)
}

pub async fn update_certification(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
    input: &CertificationInput,
) -> Result<(), AppError> {
    verify_certification_owner(pool, id, user_id).await?;

    sqlx::query(
        r#"
        UPDATE certifications
        SET name = $2, issuing_org = $3, issue_date = $4, expiration_date = $5,
            credential_url = $6, updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(&input.name)
    .bind(&input.issuing_org)
    .bind(input.issue_date)
    .bind(input.expiration_date)
    .bind(&input.credential_url)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn delete_certification(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<(), AppError> {
    verify_certification_owner(pool, id, user_id).await?;

    sqlx::query("DELETE FROM certifications WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

async fn profile_id_for_owner(pool: &PgPool, user_id: Uuid) -> Result<Uuid, AppError> {
    sqlx::query_scalar::<_, Uuid>("SELECT id FROM applicant_profiles WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| profile_not_found(user_id))
}

// The three ownership checks answer "does this child exist AND belong to
// this owner" in one query. Both failure cases collapse into the same
// NotFound.

async fn verify_experience_owner(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<(), AppError> {
    sqlx::query_scalar::<_, Uuid>(
        r#"
        SELECT we.id FROM work_experiences we
        JOIN applicant_profiles p ON p.id = we.applicant_profile_id
        WHERE we.id = $1 AND p.user_id = $2
        "#,
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Work experience not found".to_string()))?;
    Ok(())
}

async fn verify_education_owner(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<(), AppError> {
    sqlx::query_scalar::<_, Uuid>(
        r#"
        SELECT e.id FROM educations e
        JOIN applicant_profiles p ON p.id = e.applicant_profile_id
        WHERE e.id = $1 AND p.user_id = $2
        "#,
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Education entry not found".to_string()))?;
    Ok(())
}

async fn verify_certification_owner(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<(), AppError> {
    sqlx::query_scalar::<_, Uuid>(
        r#"
        SELECT c.id FROM certifications c
        JOIN applicant_profiles p ON p.id = c.applicant_profile_id
        WHERE c.id = $1 AND p.user_id = $2
        "#,
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Certification not found".to_string()))?;
    Ok(())
}

fn profile_not_found(user_id: Uuid) -> AppError {
    AppError::NotFound(format!("Profile for user {user_id} not found"))
}
