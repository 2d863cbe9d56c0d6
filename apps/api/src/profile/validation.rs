//! Input shape validation for the profile mutation endpoints. Runs before
//! any storage call; the scorer and aggregator never re-check these rules.
//! Validators also normalize: blank optional strings become `None`, skills
//! are deduplicated case-insensitively, and a current position drops any
//! submitted end date.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::errors::AppError;

#[derive(Debug, Clone, Deserialize)]
pub struct PersonalInfoInput {
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LinksInput {
    pub linkedin_url: Option<String>,
    pub github_url: Option<String>,
    pub portfolio_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SummaryInput {
    pub headline: Option<String>,
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SkillsInput {
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExperienceInput {
    pub company: String,
    pub role: String,
    pub location: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub is_current: bool,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EducationInput {
    pub institution: String,
    pub degree: String,
    pub field_of_study: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CertificationInput {
    pub name: String,
    pub issuing_org: Option<String>,
    pub issue_date: Option<NaiveDate>,
    pub expiration_date: Option<NaiveDate>,
    pub credential_url: Option<String>,
}

pub const MAX_SKILLS: usize = 50;

pub fn validate_personal_info(input: &mut PersonalInfoInput) -> Result<(), AppError> {
    input.first_name = input.first_name.trim().to_string();
    input.last_name = input.last_name.trim().to_string();
    require_text(&input.first_name, "First name", 50)?;
    require_text(&input.last_name, "Last name", 50)?;

    normalize_optional(&mut input.phone);
    normalize_optional(&mut input.city);
    normalize_optional(&mut input.country);

    if let Some(phone) = &input.phone {
        if !is_valid_phone(phone) {
            return Err(AppError::Validation("Invalid phone number".to_string()));
        }
    }
    optional_max(&input.city, "City", 100)?;
    optional_max(&input.country, "Country", 100)?;
    Ok(())
}

pub fn validate_links(input: &mut LinksInput) -> Result<(), AppError> {
    normalize_optional(&mut input.linkedin_url);
    normalize_optional(&mut input.github_url);
    normalize_optional(&mut input.portfolio_url);

    if let Some(url) = &input.linkedin_url {
        if !is_http_url(url) || !url.contains("linkedin.com") {
            return Err(AppError::Validation("Must be a LinkedIn URL".to_string()));
        }
    }
    if let Some(url) = &input.github_url {
        if !is_http_url(url) || !url.contains("github.com") {
            return Err(AppError::Validation("Must be a GitHub URL".to_string()));
        }
    }
    if let Some(url) = &input.portfolio_url {
        if !is_http_url(url) {
            return Err(AppError::Validation("Invalid portfolio URL".to_string()));
        }
    }
    Ok(())
}

pub fn validate_summary(input: &mut SummaryInput) -> Result<(), AppError> {
    normalize_optional(&mut input.headline);
    normalize_optional(&mut input.bio);
    optional_max(&input.headline, "Headline", 100)?;
    optional_max(&input.bio, "Bio", 2000)?;
    Ok(())
}

/// Validates and deduplicates the skill list. Dedup is case-insensitive
/// with first occurrence winning, so "Rust" followed by "rust" keeps the
/// former.
pub fn validate_skills(input: &mut SkillsInput) -> Result<(), AppError> {
    let mut seen: Vec<String> = Vec::new();
    let mut deduped: Vec<String> = Vec::new();

    for raw in &input.skills {
        let skill = raw.trim();
        if skill.is_empty() {
            return Err(AppError::Validation("Skills must not be empty".to_string()));
        }
        if skill.chars().count() > 50 {
            return Err(AppError::Validation(
                "Skills must be less than 50 characters".to_string(),
            ));
        }
        let lowered = skill.to_lowercase();
        if !seen.contains(&lowered) {
            seen.push(lowered);
            deduped.push(skill.to_string());
        }
    }

    if deduped.len() > MAX_SKILLS {
        return Err(AppError::Validation(format!(
            "Maximum {MAX_SKILLS} skills allowed"
        )));
    }

    input.skills = deduped;
    Ok(())
}

pub fn validate_experience(input: &mut ExperienceInput) -> Result<(), AppError> {
    input.company = input.company.trim().to_string();
    input.role = input.role.trim().to_string();
    require_text(&input.company, "Company name", 100)?;
    require_text(&input.role, "Role", 100)?;

    normalize_optional(&mut input.location);
    normalize_optional(&mut input.description);
    optional_max(&input.location, "Location", 100)?;
    optional_max(&input.description, "Description", 2000)?;

    if input.is_current {
        // A current position has no end; drop whatever was submitted.
        input.end_date = None;
    } else if let Some(end) = input.end_date {
        if end < input.start_date {
            return Err(AppError::Validation(
                "End date must be after start date".to_string(),
            ));
        }
    }
    Ok(())
}

pub fn validate_education(input: &mut EducationInput) -> Result<(), AppError> {
    input.institution = input.institution.trim().to_string();
    input.degree = input.degree.trim().to_string();
    require_text(&input.institution, "Institution name", 150)?;
    require_text(&input.degree, "Degree", 100)?;

    normalize_optional(&mut input.field_of_study);
    normalize_optional(&mut input.description);
    optional_max(&input.field_of_study, "Field of study", 100)?;
    optional_max(&input.description, "Description", 1000)?;

    if let (Some(start), Some(end)) = (input.start_date, input.end_date) {
        if end < start {
            return Err(AppError::Validation(
                "End date must be after start date".to_string(),
            ));
        }
    }
    Ok(())
}

pub fn validate_certification(input: &mut CertificationInput) -> Result<(), AppError> {
    input.name = input.name.trim().to_string();
    require_text(&input.name, "Certification name", 150)?;

    normalize_optional(&mut input.issuing_org);
    normalize_optional(&mut input.credential_url);
    optional_max(&input.issuing_org, "Issuing organization", 150)?;

    if let Some(url) = &input.credential_url {
        if !is_http_url(url) {
            return Err(AppError::Validation("Invalid credential URL".to_string()));
        }
    }
    Ok(())
}

fn require_text(value: &str, name: &str, max: usize) -> Result<(), AppError> {
    if value.is_empty() {
        return Err(AppError::Validation(format!("{name} is required")));
    }
    if value.chars().count() > max {
        return Err(AppError::Validation(format!(
            "{name} must be less than {max} characters"
        )));
    }
    Ok(())
}

fn optional_max(value: &Option<String>, name: &str, max: usize) -> Result<(), AppError> {
    if let Some(v) = value {
        if v.chars().count() > max {
            return Err(AppError::Validation(format!(
                "{name} must be less than {max} characters"
            )));
        }
    }
    Ok(())
}

/// Blank optional fields are stored as NULL, not empty strings.
fn normalize_optional(value: &mut Option<String>) {
    if let Some(v) = value.take() {
        let trimmed = v.trim();
        if !trimmed.is_empty() {
            *value = Some(trimmed.to_string());
        }
    }
}

fn is_http_url(url: &str) -> bool {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"));
    matches!(rest, Some(r) if !r.is_empty())
}

/// Permissive phone shape: an optional leading +, then digits with common
/// separators. At least one digit required.
fn is_valid_phone(phone: &str) -> bool {
    let mut chars = phone.chars().peekable();
    if chars.peek() == Some(&'+') {
        chars.next();
    }
    let mut has_digit = false;
    for c in chars {
        match c {
            '0'..='9' => has_digit = true,
            '(' | ')' | '-' | ' ' | '.' | '/' => {}
            _ => return false,
        }
    }
    has_digit
}

#[cfg(test)]
mod tests {
    use super::*;

    fn personal(first: &str, last: &str, phone: Option<&str>) -> PersonalInfoInput {
        PersonalInfoInput {
            first_name: first.to_string(),
            last_name: last.to_string(),
            phone: phone.map(str::to_string),
            city: None,
            country: None,
        }
    }

    #[test]
    fn test_personal_info_requires_first_name() {
        let mut input = personal("", "Lovelace", None);
        assert!(validate_personal_info(&mut input).is_err());
    }

    #[test]
    fn test_personal_info_rejects_long_name() {
        let mut input = personal(&"a".repeat(51), "Lovelace", None);
        assert!(validate_personal_info(&mut input).is_err());
    }

    #[test]
    fn test_personal_info_accepts_international_phone() {
        let mut input = personal("Ada", "Lovelace", Some("+44 (20) 7946-0000"));
        assert!(validate_personal_info(&mut input).is_ok());
    }

    #[test]
    fn test_personal_info_rejects_alphabetic_phone() {
        let mut input = personal("Ada", "Lovelace", Some("call me"));
        assert!(validate_personal_info(&mut input).is_err());
    }

    #[test]
    fn test_personal_info_blank_phone_becomes_none() {
        let mut input = personal("Ada", "Lovelace", Some("  "));
        validate_personal_info(&mut input).unwrap();
        assert_eq!(input.phone, None);
    }

    #[test]
    fn test_links_require_linkedin_domain() {
        let mut input = LinksInput {
            linkedin_url: Some("https://example.com/in/ada".to_string()),
            github_url: None,
            portfolio_url: None,
        };
        assert!(validate_links(&mut input).is_err());

        input.linkedin_url = Some("https://www.linkedin.com/in/ada".to_string());
        assert!(validate_links(&mut input).is_ok());
    }

    #[test]
    fn test_links_reject_non_http_scheme() {
        let mut input = LinksInput {
            linkedin_url: None,
            github_url: None,
            portfolio_url: Some("ftp://ada.dev".to_string()),
        };
        assert!(validate_links(&mut input).is_err());
    }

    #[test]
    fn test_summary_rejects_long_headline() {
        let mut input = SummaryInput {
            headline: Some("x".repeat(101)),
            bio: None,
        };
        assert!(validate_summary(&mut input).is_err());
    }

    #[test]
    fn test_skills_dedup_is_case_insensitive() {
        let mut input = SkillsInput {
            skills: vec!["Rust".into(), "rust".into(), "SQL".into()],
        };
        validate_skills(&mut input).unwrap();
        assert_eq!(input.skills, vec!["Rust".to_string(), "SQL".to_string()]);
    }

    #[test]
    fn test_skills_cap_applies_after_dedup() {
        let mut input = SkillsInput {
            skills: (0..51).map(|i| format!("skill-{i}")).collect(),
        };
        assert!(validate_skills(&mut input).is_err());

        // 51 raw entries collapsing to 50 unique is fine.
        let mut skills: Vec<String> = (0..50).map(|i| format!("skill-{i}")).collect();
        skills.push("SKILL-0".to_string());
        let mut input = SkillsInput { skills };
        validate_skills(&mut input).unwrap();
        assert_eq!(input.skills.len(), 50);
    }

    #[test]
    fn test_skills_reject_blank_entry() {
        let mut input = SkillsInput {
            skills: vec!["Rust".into(), "  ".into()],
        };
        assert!(validate_skills(&mut input).is_err());
    }

    fn experience(start: (i32, u32, u32), end: Option<(i32, u32, u32)>, current: bool) -> ExperienceInput {
        ExperienceInput {
            company: "Acme".to_string(),
            role: "Engineer".to_string(),
            location: None,
            start_date: NaiveDate::from_ymd_opt(start.0, start.1, start.2).unwrap(),
            end_date: end.map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap()),
            is_current: current,
            description: None,
        }
    }

    #[test]
    fn test_experience_end_before_start_rejected() {
        let mut input = experience((2022, 5, 1), Some((2021, 5, 1)), false);
        assert!(validate_experience(&mut input).is_err());
    }

    #[test]
    fn test_experience_current_clears_end_date() {
        let mut input = experience((2022, 5, 1), Some((2021, 5, 1)), true);
        validate_experience(&mut input).unwrap();
        assert_eq!(input.end_date, None);
    }

    #[test]
    fn test_experience_open_ended_without_current_ok() {
        let mut input = experience((2022, 5, 1), None, false);
        assert!(validate_experience(&mut input).is_ok());
    }

    #[test]
    fn test_experience_requires_company() {
        let mut input = experience((2022, 5, 1), None, true);
        input.company = "  ".to_string();
        assert!(validate_experience(&mut input).is_err());
    }

    #[test]
    fn test_education_date_order_checked_when_both_present() {
        let mut input = EducationInput {
            institution: "MIT".to_string(),
            degree: "BSc".to_string(),
            field_of_study: None,
            start_date: Some(NaiveDate::from_ymd_opt(2020, 9, 1).unwrap()),
            end_date: Some(NaiveDate::from_ymd_opt(2019, 6, 1).unwrap()),
            description: None,
        };
        assert!(validate_education(&mut input).is_err());

        input.end_date = None;
        assert!(validate_education(&mut input).is_ok());
    }

    #[test]
    fn test_certification_url_must_be_http() {
        let mut input = CertificationInput {
            name: "AWS SAA".to_string(),
            issuing_org: None,
            issue_date: None,
            expiration_date: None,
            credential_url: Some("not-a-url".to_string()),
        };
        assert!(validate_certification(&mut input).is_err());

        input.credential_url = Some("https://verify.aws/abc".to_string());
        assert!(validate_certification(&mut input).is_ok());
    }
}
