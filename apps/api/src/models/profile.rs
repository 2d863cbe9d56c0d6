use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ApplicantProfileRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub linkedin_url: Option<String>,
    pub github_url: Option<String>,
    pub portfolio_url: Option<String>,
    pub headline: Option<String>,
    pub bio: Option<String>,
    pub skills: Vec<String>,
    pub cv_url: Option<String>,
    pub cv_file_name: Option<String>,
    /// Derived; kept in sync by the recomputation step after every mutation.
    pub profile_completeness: i32,
    /// Derived; recomputed only when work-history intervals change.
    pub total_years_experience: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WorkExperienceRow {
    pub id: Uuid,
    pub applicant_profile_id: Uuid,
    pub company: String,
    pub role: String,
    pub location: Option<String>,
    pub start_date: NaiveDate,
    /// NULL whenever `is_current` is set; normalized at input.
    pub end_date: Option<NaiveDate>,
    pub is_current: bool,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EducationRow {
    pub id: Uuid,
    pub applicant_profile_id: Uuid,
    pub institution: String,
    pub degree: String,
    pub field_of_study: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CertificationRow {
    pub id: Uuid,
    pub applicant_profile_id: Uuid,
    pub name: String,
    pub issuing_org: Option<String>,
    pub issue_date: Option<NaiveDate>,
    pub expiration_date: Option<NaiveDate>,
    pub credential_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A profile row together with its fully-loaded child collections.
/// The completion scorer and the recomputation policy both operate on this.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileGraph {
    pub profile: ApplicantProfileRow,
    pub experiences: Vec<WorkExperienceRow>,
    pub educations: Vec<EducationRow>,
    pub certifications: Vec<CertificationRow>,
}
