use serde::{Deserialize, Serialize};

use crate::models::profile::ProfileGraph;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionStatus {
    pub name: String,
    pub completed: bool,
    pub weight: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionReport {
    /// Weighted boolean sum; a section is fully credited or not at all.
    pub percentage: u32,
    pub sections: Vec<SectionStatus>,
    pub missing_sections: Vec<String>,
}

struct Section {
    name: &'static str,
    weight: u32,
    check: fn(&ProfileGraph) -> bool,
}

/// Weights must sum to exactly 100, enforced by test below.
/// Order here is the order sections are reported in.
const PROFILE_SECTIONS: &[Section] = &[
    Section {
        name: "Basic Information",
        weight: 15,
        check: |g| has_text(&g.profile.first_name) && has_text(&g.profile.last_name),
    },
    Section {
        name: "Contact Details",
        weight: 10,
        check: |g| has_text(&g.profile.phone) || has_text(&g.profile.city),
    },
    Section {
        name: "Professional Links",
        weight: 10,
        check: |g| {
            has_text(&g.profile.linkedin_url)
                || has_text(&g.profile.github_url)
                || has_text(&g.profile.portfolio_url)
        },
    },
    Section {
        name: "Professional Summary",
        weight: 15,
        check: |g| has_text(&g.profile.headline) && has_text(&g.profile.bio),
    },
    Section {
        name: "Skills",
        weight: 15,
        check: |g| g.profile.skills.len() >= 3,
    },
    Section {
        name: "Work Experience",
        weight: 20,
        check: |g| !g.experiences.is_empty(),
    },
    Section {
        name: "Education",
        weight: 10,
        check: |g| !g.educations.is_empty(),
    },
    Section {
        name: "Document Upload",
        weight: 5,
        check: |g| has_text(&g.profile.cv_url),
    },
];

/// Scores a fully-loaded profile graph against the weighted section table.
/// Pure and total: performs no I/O and cannot fail.
pub fn compute_completion(graph: &ProfileGraph) -> CompletionReport {
    let sections: Vec<SectionStatus> = PROFILE_SECTIONS
        .iter()
        .map(|section| SectionStatus {
            name: section.name.to_string(),
            completed: (section.check)(graph),
            weight: section.weight,
        })
        .collect();

    let percentage = sections
        .iter()
        .filter(|s| s.completed)
        .map(|s| s.weight)
        .sum();

    let missing_sections = sections
        .iter()
        .filter(|s| !s.completed)
        .map(|s| s.name.clone())
        .collect();

    CompletionReport {
        percentage,
        sections,
        missing_sections,
    }
}

fn has_text(field: &Option<String>) -> bool {
    field.as_deref().is_some_and(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::profile::{
        ApplicantProfileRow, EducationRow, ProfileGraph, WorkExperienceRow,
    };
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    fn empty_graph() -> ProfileGraph {
        ProfileGraph {
            profile: ApplicantProfileRow {
                id: Uuid::new_v4(),
                user_id: Uuid::new_v4(),
                first_name: None,
                last_name: None,
                phone: None,
                city: None,
                country: None,
                linkedin_url: None,
                github_url: None,
                portfolio_url: None,
                headline: None,
                bio: None,
                skills: vec![],
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

    fn make_experience(profile_id: Uuid) -> WorkExperienceRow {
        WorkExperienceRow {
            id: Uuid::new_v4(),
            applicant_profile_id: profile_id,
            company: "Acme".to_string(),
            role: "Engineer".to_string(),
            location: None,
            start_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            end_date: None,
            is_current: true,
            description: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn make_education(profile_id: Uuid) -> EducationRow {
        EducationRow {
            id: Uuid::new_v4(),
            applicant_profile_id: profile_id,
            institution: "MIT".to_string(),
            degree: "BSc".to_string(),
            field_of_study: None,
            start_date: None,
            end_date: None,
            description: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn full_graph() -> ProfileGraph {
        let mut graph = empty_graph();
        let profile_id = graph.profile.id;
        graph.profile.first_name = Some("Ada".to_string());
        graph.profile.last_name = Some("Lovelace".to_string());
        graph.profile.phone = Some("+44 20 7946 0000".to_string());
        graph.profile.linkedin_url = Some("https://linkedin.com/in/ada".to_string());
        graph.profile.headline = Some("Engineer".to_string());
        graph.profile.bio = Some("I build things.".to_string());
        graph.profile.skills = vec!["Rust".into(), "SQL".into(), "AWS".into()];
        graph.profile.cv_url = Some("https://cdn.example.com/cvs/ada.pdf".to_string());
        graph.experiences = vec![make_experience(profile_id)];
        graph.educations = vec![make_education(profile_id)];
        graph
    }

    #[test]
    fn test_weights_sum_to_100() {
        let total: u32 = PROFILE_SECTIONS.iter().map(|s| s.weight).sum();
        assert_eq!(total, 100);
    }

    #[test]
    fn test_full_profile_scores_100() {
        let report = compute_completion(&full_graph());
        assert_eq!(report.percentage, 100);
        assert!(report.missing_sections.is_empty());
        assert!(report.sections.iter().all(|s| s.completed));
    }

    #[test]
    fn test_empty_profile_scores_0() {
        let report = compute_completion(&empty_graph());
        assert_eq!(report.percentage, 0);
        assert_eq!(
            report.missing_sections,
            vec![
                "Basic Information",
                "Contact Details",
                "Professional Links",
                "Professional Summary",
                "Skills",
                "Work Experience",
                "Education",
                "Document Upload",
            ]
        );
    }

    #[test]
    fn test_basic_info_requires_both_names() {
        let mut graph = empty_graph();
        graph.profile.first_name = Some("Ada".to_string());
        let report = compute_completion(&graph);
        assert!(report.missing_sections.contains(&"Basic Information".to_string()));

        graph.profile.last_name = Some("Lovelace".to_string());
        let report = compute_completion(&graph);
        assert_eq!(report.percentage, 15);
    }

    #[test]
    fn test_contact_details_phone_or_city() {
        let mut graph = empty_graph();
        graph.profile.city = Some("Berlin".to_string());
        assert_eq!(compute_completion(&graph).percentage, 10);

        graph.profile.city = None;
        graph.profile.phone = Some("+49 30 1234".to_string());
        assert_eq!(compute_completion(&graph).percentage, 10);
    }

    #[test]
    fn test_any_single_link_credits_section() {
        let mut graph = empty_graph();
        graph.profile.portfolio_url = Some("https://ada.dev".to_string());
        assert_eq!(compute_completion(&graph).percentage, 10);
    }

    #[test]
    fn test_summary_requires_headline_and_bio() {
        let mut graph = empty_graph();
        graph.profile.headline = Some("Engineer".to_string());
        assert_eq!(compute_completion(&graph).percentage, 0);

        graph.profile.bio = Some("I build things.".to_string());
        assert_eq!(compute_completion(&graph).percentage, 15);
    }

    #[test]
    fn test_skills_threshold_is_three() {
        let mut graph = empty_graph();
        graph.profile.skills = vec!["Rust".into(), "SQL".into()];
        assert_eq!(compute_completion(&graph).percentage, 0);

        graph.profile.skills.push("AWS".into());
        assert_eq!(compute_completion(&graph).percentage, 15);
    }

    #[test]
    fn test_empty_string_fields_count_as_missing() {
        let mut graph = empty_graph();
        graph.profile.first_name = Some(String::new());
        graph.profile.last_name = Some("Lovelace".to_string());
        assert_eq!(compute_completion(&graph).percentage, 0);
    }

    #[test]
    fn test_skills_and_current_experience_scenario() {
        // Three skills plus one current experience: 15 + 20 on an
        // otherwise-empty profile.
        let mut graph = empty_graph();
        let profile_id = graph.profile.id;
        graph.profile.skills = vec!["Rust".into(), "SQL".into(), "AWS".into()];
        graph.experiences = vec![make_experience(profile_id)];
        assert_eq!(compute_completion(&graph).percentage, 35);
    }
}
