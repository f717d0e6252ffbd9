//! Direct signup from the website's join form
//!
//! This path is separate from checkout reconciliation: it registers an unpaid
//! member, refuses duplicates outright, and never renews anything.

use std::sync::Arc;

use serde::Deserialize;
use time::UtcOffset;

use crate::error::{MembershipError, MembershipResult};
use crate::identity::Identity;
use crate::member::{Member, NewMember};
use crate::semester;
use crate::store::MemberStore;

pub const MAJORS: &[&str] = &[
    "Computer Science",
    "Computer Engineering",
    "Electrical Engineering",
    "Industrial Engineering",
    "Mechanical Engineering",
    "Management Information Systems (MIS)",
    "Computer Information Systems",
    "Mathematics",
    "Other",
];

pub const CLASSIFICATIONS: &[&str] = &["Freshman", "Sophomore", "Junior", "Senior"];

pub const MINORS: &[&str] = &[
    "Computer Science",
    "Computer Engineering",
    "Electrical Engineering",
    "Industrial Engineering",
    "Mechanical Engineering",
    "Mathematics",
    "Statistics",
    "Business Administration",
    "Finance",
    "Accounting",
    "Marketing",
    "Economics",
    "Psychology",
    "Communications",
    "English",
    "History",
    "Political Science",
    "Sociology",
    "Philosophy",
    "Physics",
    "Chemistry",
    "Biology",
    "Data Science",
    "Cybersecurity",
    "Other",
];

const MAX_NAME_LEN: usize = 50;
const MAX_MAJOR_OTHER_LEN: usize = 100;
const STUDENT_ID_LEN: usize = 7;

/// Join form body as posted by the website
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub student_id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub major: String,
    pub major_other: Option<String>,
    pub classification: Option<String>,
    pub minor: Option<Vec<String>>,
}

/// Normalised, validated join form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSignup {
    pub first_name: String,
    pub last_name: String,
    pub student_id: String,
    pub email: String,
    pub major: String,
    pub major_other: Option<String>,
    pub classification: Option<String>,
    pub minors: Vec<String>,
}

impl ValidatedSignup {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

fn is_valid_name(name: &str) -> bool {
    name.chars()
        .all(|c| c.is_ascii_alphabetic() || c.is_whitespace() || matches!(c, '-' | '\'' | '.'))
}

/// `local@domain.tld` with no whitespace and a single `@`
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

fn check_name(field: &str, label: &str, value: &str, errors: &mut Vec<String>) {
    if value.is_empty() {
        errors.push(format!("{}: {} is required", field, label));
    } else if value.chars().count() > MAX_NAME_LEN {
        errors.push(format!(
            "{}: {} must be {} characters or less",
            field, label, MAX_NAME_LEN
        ));
    } else if !is_valid_name(value) {
        errors.push(format!(
            "{}: {} must contain only letters (no numbers or special characters)",
            field, label
        ));
    }
}

impl SignupRequest {
    /// Validate every field, collecting all failures as `field: message`
    pub fn validate(&self) -> Result<ValidatedSignup, Vec<String>> {
        let mut errors = Vec::new();

        let first_name = self.first_name.trim().to_string();
        let last_name = self.last_name.trim().to_string();
        check_name("firstName", "First name", &first_name, &mut errors);
        check_name("lastName", "Last name", &last_name, &mut errors);

        let student_id = self.student_id.trim().to_string();
        if student_id.len() != STUDENT_ID_LEN || !student_id.bytes().all(|b| b.is_ascii_digit()) {
            errors.push("studentId: Student ID must be exactly 7 digits".to_string());
        }

        if !MAJORS.contains(&self.major.as_str()) {
            errors.push("major: Please select a valid major from the list".to_string());
        }

        let major_other = self
            .major_other
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string);
        if let Some(other) = &major_other {
            if other.chars().count() > MAX_MAJOR_OTHER_LEN {
                errors.push(format!(
                    "majorOther: Major (Other) must be {} characters or less",
                    MAX_MAJOR_OTHER_LEN
                ));
            }
        }

        let email = self.email.trim().to_lowercase();
        if !is_valid_email(&email) {
            errors.push(
                "email: Please enter a valid email address (e.g., user@example.com)".to_string(),
            );
        }

        if self.major == "Other" && major_other.is_none() {
            errors.push("majorOther: Please specify your major when selecting \"Other\"".to_string());
        }

        let classification = self
            .classification
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string);
        if let Some(c) = &classification {
            if !CLASSIFICATIONS.contains(&c.as_str()) {
                errors.push("classification: Please select your classification".to_string());
            }
        }

        let minors = self.minor.clone().unwrap_or_default();
        if minors.iter().any(|m| !MINORS.contains(&m.as_str())) {
            errors.push("minor: Please select minors from the list".to_string());
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(ValidatedSignup {
            first_name,
            last_name,
            student_id,
            email,
            major: self.major.clone(),
            major_other,
            classification,
            minors,
        })
    }
}

#[derive(Clone)]
pub struct SignupService {
    store: Arc<dyn MemberStore>,
    utc_offset: UtcOffset,
}

impl SignupService {
    pub fn new(store: Arc<dyn MemberStore>, utc_offset: UtcOffset) -> Self {
        Self { store, utc_offset }
    }

    /// Validate, reject duplicates by email or student ID, then create an
    /// unpaid member joined today
    pub async fn register(&self, request: &SignupRequest) -> MembershipResult<Member> {
        let signup = request.validate().map_err(MembershipError::Validation)?;

        let identity = Identity::new(Some(&signup.student_id), Some(&signup.email));
        let existing = self.store.find_by_identity(&identity).await?;
        if !existing.is_empty() {
            tracing::info!(
                matches = existing.len(),
                "Signup rejected: member already exists"
            );
            return Err(MembershipError::DuplicateMember);
        }

        let mut member = NewMember::new(
            signup.full_name(),
            signup.email.clone(),
            semester::today(self.utc_offset),
        );
        member.student_id = Some(signup.student_id.clone());
        member.major = Some(signup.major.clone());
        member.major_other = signup.major_other.clone();
        member.classification = signup.classification.clone();
        member.minors = signup.minors.clone();

        let created = self.store.create(member).await?;
        tracing::info!(member_id = %created.id, "Member registered via signup form");
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> SignupRequest {
        SignupRequest {
            first_name: " Jane ".into(),
            last_name: "O'Neil-Doe".into(),
            student_id: "1234567".into(),
            email: " Jane@UH.edu ".into(),
            major: "Computer Science".into(),
            major_other: None,
            classification: Some("Junior".into()),
            minor: Some(vec!["Finance".into()]),
        }
    }

    #[test]
    fn test_valid_request_is_normalised() {
        let signup = valid().validate().unwrap();
        assert_eq!(signup.first_name, "Jane");
        assert_eq!(signup.email, "jane@uh.edu");
        assert_eq!(signup.full_name(), "Jane O'Neil-Doe");
        assert_eq!(signup.minors, vec!["Finance".to_string()]);
    }

    #[test]
    fn test_reports_every_failing_field() {
        let request = SignupRequest {
            first_name: "".into(),
            last_name: "D0e".into(),
            student_id: "12345".into(),
            email: "not-an-email".into(),
            major: "Basket Weaving".into(),
            ..Default::default()
        };

        let errors = request.validate().unwrap_err();
        assert_eq!(errors.len(), 5, "{errors:?}");
        assert!(errors.contains(&"firstName: First name is required".to_string()));
        assert!(errors[1].starts_with("lastName:"));
        assert!(errors.iter().any(|e| e.starts_with("studentId:")));
        assert!(errors.iter().any(|e| e.starts_with("major:")));
        assert!(errors.iter().any(|e| e.starts_with("email:")));
    }

    #[test]
    fn test_other_major_requires_detail() {
        let mut request = valid();
        request.major = "Other".into();
        request.major_other = Some("   ".into());
        let errors = request.validate().unwrap_err();
        assert_eq!(
            errors,
            vec!["majorOther: Please specify your major when selecting \"Other\"".to_string()]
        );

        request.major_other = Some("Architecture".into());
        assert_eq!(
            request.validate().unwrap().major_other.as_deref(),
            Some("Architecture")
        );
    }

    #[test]
    fn test_name_length_limit() {
        let mut request = valid();
        request.first_name = "a".repeat(51);
        let errors = request.validate().unwrap_err();
        assert_eq!(
            errors,
            vec!["firstName: First name must be 50 characters or less".to_string()]
        );
    }

    #[test]
    fn test_email_shapes() {
        assert!(is_valid_email("a@b.co"));
        assert!(is_valid_email("first.last@mail.uh.edu"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a@.co"));
        assert!(!is_valid_email("a@b."));
        assert!(!is_valid_email("@b.co"));
        assert!(!is_valid_email("a b@c.co"));
        assert!(!is_valid_email("a@b@c.co"));
    }

    #[test]
    fn test_student_id_must_be_digits() {
        let mut request = valid();
        request.student_id = "12345a7".into();
        assert!(request.validate().is_err());
        request.student_id = " 7654321 ".into();
        assert_eq!(request.validate().unwrap().student_id, "7654321");
    }

    #[test]
    fn test_unknown_classification_and_minor() {
        let mut request = valid();
        request.classification = Some("Graduate".into());
        request.minor = Some(vec!["Finance".into(), "Alchemy".into()]);
        let errors = request.validate().unwrap_err();
        assert_eq!(errors.len(), 2);
    }
}
