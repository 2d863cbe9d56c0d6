//! Derived-metric recomputation: keeps `profile_completeness` and
//! `total_years_experience` consistent with the profile graph after every
//! mutation. Handlers call `on_profile_graph_changed` as the final step of
//! each write path; read paths never do.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::profile::ProfileGraph;
use crate::profile::completion::compute_completion;
use crate::profile::experience::total_years;
use crate::profile::store;

/// What a mutation touched, which decides how much gets recomputed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphMutation {
    /// Scalar fields, skills, education, certifications, or the CV
    /// reference changed. Total years cannot have moved, so it is skipped.
    Sections,
    /// A work-experience entry was created, updated, or deleted.
    WorkHistory,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DerivedMetrics {
    pub completion_percentage: u32,
    /// `None` when the mutation could not have affected work-history
    /// intervals; the stored value is left untouched in that case.
    pub total_years_experience: Option<f64>,
}

/// Storage seam for the recomputation policy.
///
/// Carried in `AppState` as `Arc<dyn ProfileRepository>` so the policy can
/// be exercised against an in-memory fake.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn load_graph(&self, owner_id: Uuid) -> Result<Option<ProfileGraph>, AppError>;

    async fn save_derived_metrics(
        &self,
        owner_id: Uuid,
        metrics: &DerivedMetrics,
    ) -> Result<(), AppError>;
}

/// PostgreSQL-backed repository used in production.
pub struct PgProfileRepository {
    pool: PgPool,
}

impl PgProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileRepository for PgProfileRepository {
    async fn load_graph(&self, owner_id: Uuid) -> Result<Option<ProfileGraph>, AppError> {
        store::load_graph(&self.pool, owner_id).await
    }

    async fn save_derived_metrics(
        &self,
        owner_id: Uuid,
        metrics: &DerivedMetrics,
    ) -> Result<(), AppError> {
        store::save_derived_metrics(&self.pool, owner_id, metrics).await
    }
}

/// Recomputes and persists derived metrics after a mutation.
///
/// Loads the full graph, scores it, and aggregates work history only when
/// the mutation could have moved it. `NotFound` means the caller violated
/// the contract (mutating a profile that was never created) and propagates
/// unmodified. Idempotent: both computations are pure functions of current
/// state.
pub async fn on_profile_graph_changed(
    repo: &dyn ProfileRepository,
    owner_id: Uuid,
    mutation: GraphMutation,
) -> Result<DerivedMetrics, AppError> {
    let graph = repo
        .load_graph(owner_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile for user {owner_id} not found")))?;

    let report = compute_completion(&graph);
    let total_years_experience = match mutation {
        GraphMutation::WorkHistory => Some(total_years(&graph.experiences)),
        GraphMutation::Sections => None,
    };

    let metrics = DerivedMetrics {
        completion_percentage: report.percentage,
        total_years_experience,
    };
    repo.save_derived_metrics(owner_id, &metrics).await?;

    debug!(
        "Recomputed metrics for user {owner_id}: {}% complete, total years {:?}",
        metrics.completion_percentage, metrics.total_years_experience
    );
    Ok(metrics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::profile::{ApplicantProfileRow, WorkExperienceRow};
    use chrono::{Datelike, NaiveDate, Utc};
    use std::sync::Mutex;

    /// In-memory repository that applies saves back onto the held graph,
    /// the way the real UPDATE does.
    struct InMemoryRepository {
        graph: Mutex<Option<ProfileGraph>>,
        saves: Mutex<Vec<DerivedMetrics>>,
    }

    impl InMemoryRepository {
        fn new(graph: Option<ProfileGraph>) -> Self {
            Self {
                graph: Mutex::new(graph),
                saves: Mutex::new(vec![]),
            }
        }
    }

    #[async_trait]
    impl ProfileRepository for InMemoryRepository {
        async fn load_graph(&self, _owner_id: Uuid) -> Result<Option<ProfileGraph>, AppError> {
            Ok(self.graph.lock().unwrap().clone())
        }

        async fn save_derived_metrics(
            &self,
            _owner_id: Uuid,
            metrics: &DerivedMetrics,
        ) -> Result<(), AppError> {
            if let Some(graph) = self.graph.lock().unwrap().as_mut() {
                graph.profile.profile_completeness = metrics.completion_percentage as i32;
                if let Some(total) = metrics.total_years_experience {
                    graph.profile.total_years_experience = total;
                }
            }
            self.saves.lock().unwrap().push(metrics.clone());
            Ok(())
        }
    }

    fn make_graph(user_id: Uuid) -> ProfileGraph {
        ProfileGraph {
            profile: ApplicantProfileRow {
                id: Uuid::new_v4(),
                user_id,
                first_name: Some("Ada".to_string()),
                last_name: Some("Lovelace".to_string()),
                phone: None,
                city: None,
                country: None,
                linkedin_url: None,
                github_url: None,
                portfolio_url: None,
                headline: None,
                bio: None,
                skills: vec!["Rust".into(), "SQL".into(), "AWS".into()],
                cv_url: None,
                cv_file_name: None,
                profile_completeness: 0,
                total_years_experience: 0.0,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            experiences: vec![],
            educations: vec![],
            certifications: vec![],
        }
    }

    fn year_long_experience(profile_id: Uuid) -> WorkExperienceRow {
        let today = Utc::now().naive_utc().date();
        let start = NaiveDate::from_ymd_opt(today.year() - 1, today.month(), 1).unwrap();
        WorkExperienceRow {
            id: Uuid::new_v4(),
            applicant_profile_id: profile_id,
            company: "Acme".to_string(),
            role: "Engineer".to_string(),
            location: None,
            start_date: start,
            end_date: None,
            is_current: true,
            description: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_missing_profile_is_not_found() {
        let repo = InMemoryRepository::new(None);
        let result =
            on_profile_graph_changed(&repo, Uuid::new_v4(), GraphMutation::Sections).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert!(repo.saves.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sections_mutation_skips_total_years() {
        let user_id = Uuid::new_v4();
        let repo = InMemoryRepository::new(Some(make_graph(user_id)));

        let metrics = on_profile_graph_changed(&repo, user_id, GraphMutation::Sections)
            .await
            .unwrap();

        // Basic info (15) + skills (15); aggregator not run.
        assert_eq!(metrics.completion_percentage, 30);
        assert_eq!(metrics.total_years_experience, None);
    }

    #[tokio::test]
    async fn test_work_history_mutation_recomputes_total_years() {
        let user_id = Uuid::new_v4();
        let mut graph = make_graph(user_id);
        let profile_id = graph.profile.id;
        graph.experiences.push(year_long_experience(profile_id));
        let repo = InMemoryRepository::new(Some(graph));

        let metrics = on_profile_graph_changed(&repo, user_id, GraphMutation::WorkHistory)
            .await
            .unwrap();

        // Basic info (15) + skills (15) + experience (20).
        assert_eq!(metrics.completion_percentage, 50);
        assert_eq!(metrics.total_years_experience, Some(1.0));
    }

    #[tokio::test]
    async fn test_recomputation_is_idempotent() {
        let user_id = Uuid::new_v4();
        let mut graph = make_graph(user_id);
        let profile_id = graph.profile.id;
        graph.experiences.push(year_long_experience(profile_id));
        let repo = InMemoryRepository::new(Some(graph));

        let first = on_profile_graph_changed(&repo, user_id, GraphMutation::WorkHistory)
            .await
            .unwrap();
        let second = on_profile_graph_changed(&repo, user_id, GraphMutation::WorkHistory)
            .await
            .unwrap();

        assert_eq!(first, second);
        let saves = repo.saves.lock().unwrap();
        assert_eq!(saves.len(), 2);
        assert_eq!(saves[0], saves[1]);
    }

    #[tokio::test]
    async fn test_sections_save_leaves_stored_total_untouched() {
        let user_id = Uuid::new_v4();
        let mut graph = make_graph(user_id);
        graph.profile.total_years_experience = 3.5;
        let repo = InMemoryRepository::new(Some(graph));

        on_profile_graph_changed(&repo, user_id, GraphMutation::Sections)
            .await
            .unwrap();

        let held = repo.graph.lock().unwrap();
        assert_eq!(held.as_ref().unwrap().profile.total_years_experience, 3.5);
    }
}
