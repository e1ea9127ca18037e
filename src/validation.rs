//! Field validation for student records and its one-line translation.
//!
//! A single [`Validator`] is built at startup and shared by every request.
//! It holds no state beyond the compiled email pattern, so checking a record
//! has no side effects.

use std::fmt;

use regex::Regex;

use crate::student::{NewStudent, Student};

/// The HTML living standard's "valid email address" production.
const EMAIL_PATTERN: &str = concat!(
    r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+",
    r"@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?",
    r"(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
);

/// Why a field failed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FieldErrorKind {
    /// The field was absent or empty.
    Required,
    /// The field was present but broke some other constraint.
    Invalid,
}

/// One failed field.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldError {
    pub field: &'static str,
    pub kind: FieldErrorKind,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            FieldErrorKind::Required => write!(f, "field {} is required", self.field),
            FieldErrorKind::Invalid => write!(f, "field {} is invalid", self.field),
        }
    }
}

/// Every failure found in one record, in field order.
///
/// Displays as one sentence per failure joined with `", "`, e.g.
/// `field Name is required, field Email is invalid`.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn push(&mut self, field: &'static str, kind: FieldErrorKind) {
        self.0.push(FieldError { field, kind });
    }
}

impl From<Vec<FieldError>> for ValidationErrors {
    fn from(errors: Vec<FieldError>) -> Self {
        Self(errors)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// A create payload that passed validation; the only thing storage will
/// accept for a new row.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ValidStudent {
    pub name: String,
    pub email: String,
    pub age: i64,
}

/// Checks student records against the name / email / age rules.
#[derive(Clone, Debug)]
pub struct Validator {
    email: Regex,
}

impl Validator {
    pub fn new() -> Self {
        // Compile-time constant pattern; covered by the tests below.
        let email = Regex::new(EMAIL_PATTERN).expect("email pattern compiles");
        Self { email }
    }

    /// Validates a create payload, handing back the checked fields.
    pub fn check_new(&self, candidate: NewStudent) -> Result<ValidStudent, ValidationErrors> {
        self.check_fields(candidate.name, candidate.email, candidate.age)
    }

    /// Re-validates a full record, e.g. after merging an update.
    pub fn check(&self, student: &Student) -> Result<(), ValidationErrors> {
        self.check_fields(
            Some(student.name.clone()),
            Some(student.email.clone()),
            Some(student.age),
        )
        .map(|_| ())
    }

    /// Every field left `None` below has pushed an error, so the final
    /// match only fails with a non-empty list.
    fn check_fields(
        &self,
        name: Option<String>,
        email: Option<String>,
        age: Option<i64>,
    ) -> Result<ValidStudent, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let name = name.filter(|name| !name.is_empty());
        if name.is_none() {
            errors.push("Name", FieldErrorKind::Required);
        }

        let email = match email.filter(|email| !email.is_empty()) {
            None => {
                errors.push("Email", FieldErrorKind::Required);
                None
            }
            Some(email) if !self.email.is_match(&email) => {
                errors.push("Email", FieldErrorKind::Invalid);
                None
            }
            email => email,
        };

        if age.is_none() {
            errors.push("Age", FieldErrorKind::Required);
        }

        match (name, email, age) {
            (Some(name), Some(email), Some(age)) => Ok(ValidStudent { name, email, age }),
            _ => Err(errors),
        }
    }
}

impl Default for Validator {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(name: Option<&str>, email: Option<&str>, age: Option<i64>) -> NewStudent {
        NewStudent {
            name: name.map(str::to_owned),
            email: email.map(str::to_owned),
            age,
        }
    }

    #[test]
    fn accepts_complete_candidate() {
        let valid = Validator::new()
            .check_new(candidate(Some("Ann"), Some("ann@x.com"), Some(20)))
            .unwrap();

        assert_eq!(valid, ValidStudent { name: "Ann".into(), email: "ann@x.com".into(), age: 20 });
    }

    #[test]
    fn explicit_zero_age_is_accepted() {
        let result = Validator::new().check_new(candidate(Some("Ann"), Some("ann@x.com"), Some(0)));
        assert!(result.is_ok());
    }

    #[test]
    fn reports_every_missing_field_in_order() {
        let err = Validator::new().check_new(NewStudent::default()).unwrap_err();

        assert_eq!(
            err.to_string(),
            "field Name is required, field Email is required, field Age is required"
        );
    }

    #[test]
    fn empty_strings_count_as_missing() {
        let err = Validator::new()
            .check_new(candidate(Some(""), Some(""), Some(20)))
            .unwrap_err();

        assert_eq!(err.to_string(), "field Name is required, field Email is required");
    }

    #[test]
    fn every_rejection_names_a_field() {
        let validator = Validator::new();
        for name in [None, Some(""), Some("Ann")] {
            for email in [None, Some(""), Some("bad"), Some("ann@x.com")] {
                for age in [None, Some(20)] {
                    if let Err(err) = validator.check_new(candidate(name, email, age)) {
                        assert!(!err.is_empty(), "{name:?} {email:?} {age:?}");
                    }
                }
            }
        }
    }

    #[test]
    fn malformed_email_is_invalid_not_required() {
        let err = Validator::new()
            .check_new(candidate(Some("Ann"), Some("not-an-email"), None))
            .unwrap_err();

        assert_eq!(err.errors()[0], FieldError { field: "Email", kind: FieldErrorKind::Invalid });
        assert_eq!(err.to_string(), "field Email is invalid, field Age is required");
    }

    #[test]
    fn email_grammar() {
        let validator = Validator::new();
        for ok in ["ann@x.com", "a.b+c@sub.example.org", "x@localhost"] {
            assert!(validator.email.is_match(ok), "{ok} should match");
        }
        for bad in ["ann", "@x.com", "ann@", "ann@-x.com", "a b@x.com", "ann@x..com"] {
            assert!(!validator.email.is_match(bad), "{bad} should not match");
        }
    }

    #[test]
    fn full_record_is_rechecked() {
        let student = Student { id: 1, name: "Ann".into(), email: "nope".into(), age: 20 };
        let err = Validator::new().check(&student).unwrap_err();
        assert_eq!(err.to_string(), "field Email is invalid");
    }

    #[test]
    fn translation_of_arbitrary_failures() {
        let errors = ValidationErrors::from(vec![
            FieldError { field: "Age", kind: FieldErrorKind::Invalid },
            FieldError { field: "Name", kind: FieldErrorKind::Required },
        ]);
        assert_eq!(errors.to_string(), "field Age is invalid, field Name is required");
        assert_eq!(ValidationErrors::default().to_string(), "");
    }
}
