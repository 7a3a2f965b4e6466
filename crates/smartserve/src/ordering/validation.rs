use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Key under which errors that do not belong to a single field are reported.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

const NAME_MIN_LENGTH: usize = 2;
const NAME_MAX_LENGTH: usize = 100;
const PERSON_NAME_MAX_LENGTH: usize = 75;
const TEXT_MAX_LENGTH: usize = 200;
const EMPLOYEE_ID_LENGTH: usize = 6;

/// Field keyed validation failures, mirroring what API clients receive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationError {
    fields: BTreeMap<String, Vec<String>>,
}

impl ValidationError {
    pub fn field(name: &str, message: impl Into<String>) -> Self {
        let mut error = Self::default();
        error.add(name, message);
        error
    }

    pub fn general(message: impl Into<String>) -> Self {
        Self::field(NON_FIELD_ERRORS, message)
    }

    pub fn add(&mut self, name: &str, message: impl Into<String>) {
        self.fields
            .entry(name.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn merge(&mut self, other: ValidationError) {
        for (name, messages) in other.fields {
            self.fields.entry(name).or_default().extend(messages);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn messages(&self, name: &str) -> &[String] {
        self.fields.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// `Ok(())` when nothing was collected.
    pub fn into_result(self) -> Result<(), ValidationError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (name, messages) in &self.fields {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                first = false;
                if name == NON_FIELD_ERRORS {
                    f.write_str(message)?;
                } else {
                    write!(f, "{name}: {message}")?;
                }
            }
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

fn is_separator(ch: char) -> bool {
    matches!(ch, ' ' | '\'' | '-')
}

/// Restaurant and menu item names: ASCII letters separated by single spaces,
/// apostrophes or hyphens, never leading or trailing with a separator.
pub fn check_display_name(errors: &mut ValidationError, field: &str, value: &str) {
    let length = value.chars().count();
    if length == 0 {
        errors.add(field, "This field may not be blank.");
        return;
    }

    let allowed = value
        .chars()
        .all(|ch| ch.is_ascii_alphabetic() || is_separator(ch));
    let edges_ok = !value.starts_with(is_separator) && !value.ends_with(is_separator);
    let no_runs = !value
        .chars()
        .zip(value.chars().skip(1))
        .any(|(a, b)| is_separator(a) && is_separator(b));
    if !(allowed && edges_ok && no_runs) {
        errors.add(field, "Enter a valid value.");
    }

    if length < NAME_MIN_LENGTH {
        errors.add(
            field,
            format!("Ensure this value has at least {NAME_MIN_LENGTH} characters (it has {length})."),
        );
    }
    check_max_length(errors, field, value, NAME_MAX_LENGTH);
}

pub fn check_person_name(errors: &mut ValidationError, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.add(field, "This field may not be blank.");
        return;
    }
    check_max_length(errors, field, value, PERSON_NAME_MAX_LENGTH);
}

/// Free text such as descriptions and kitchen notes; blank is allowed.
pub fn check_text(errors: &mut ValidationError, field: &str, value: &str) {
    check_max_length(errors, field, value, TEXT_MAX_LENGTH);
}

pub fn check_employee_id(errors: &mut ValidationError, value: &str) {
    if value.is_empty() || !value.chars().all(|ch| ch.is_ascii_digit()) {
        errors.add("employee_id", "The Employee ID must be a 6 digit number.");
    }
    if value.chars().count() != EMPLOYEE_ID_LENGTH {
        errors.add("employee_id", "The Employee ID must be 6 digits.");
    }
}

fn check_max_length(errors: &mut ValidationError, field: &str, value: &str, max: usize) {
    let length = value.chars().count();
    if length > max {
        errors.add(
            field,
            format!("Ensure this value has at most {max} characters (it has {length})."),
        );
    }
}
