use serde_json::{Map, Value};
use thiserror::Error;
use url::Url;

/// Decoded JSON object body of a write request.
pub type Payload = Map<String, Value>;

/// Column size shared by short text fields (names, titles, locations).
pub const MAX_TEXT_LEN: usize = 255;
pub const MAX_EMAIL_LEN: usize = 254;
pub const MAX_URL_LEN: usize = 200;

const URL_SCHEMES: [&str; 4] = ["http", "https", "ftp", "ftps"];

/// Field level failures reported back to API callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    #[error("Field {0} must be a string")]
    NotAString(&'static str),
    #[error("Invalid salary format")]
    InvalidSalaryFormat,
    #[error("Salary must be positive")]
    NegativeSalary,
    #[error("Enter a valid email address.")]
    InvalidEmail,
    #[error("Enter a valid URL.")]
    InvalidUrl,
    #[error("Ensure {field} has at most {max} characters")]
    TooLong { field: &'static str, max: usize },
}

/// Request body could not be decoded into a JSON object.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid JSON")]
pub struct DecodeError;

/// Parses a raw request body into a JSON object.
pub fn decode_payload(body: &[u8]) -> Result<Payload, DecodeError> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        _ => Err(DecodeError),
    }
}

/// Returns the trimmed string value of `field`, rejecting absent or blank values.
pub fn required_text(payload: &Payload, field: &'static str) -> Result<String, ValidationError> {
    match payload.get(field) {
        None | Some(Value::Null) => Err(ValidationError::MissingField(field)),
        Some(Value::String(raw)) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                Err(ValidationError::MissingField(field))
            } else {
                Ok(trimmed.to_string())
            }
        }
        Some(_) => Err(ValidationError::NotAString(field)),
    }
}

/// Returns the trimmed string value of a field whose presence was already checked.
///
/// Empty strings are accepted.
pub fn present_text(payload: &Payload, field: &'static str) -> Result<String, ValidationError> {
    match payload.get(field) {
        None => Err(ValidationError::MissingField(field)),
        Some(Value::String(raw)) => Ok(raw.trim().to_string()),
        Some(_) => Err(ValidationError::NotAString(field)),
    }
}

/// Fails with [`ValidationError::MissingField`] for the first key absent from the payload.
pub fn require_keys(payload: &Payload, fields: &[&'static str]) -> Result<(), ValidationError> {
    match fields.iter().find(|field| !payload.contains_key(**field)) {
        Some(field) => Err(ValidationError::MissingField(field)),
        None => Ok(()),
    }
}

/// Renders a scalar JSON value as trimmed text.
///
/// `null`, arrays and objects have no text form and yield `None`.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(raw) => Some(raw.trim().to_string()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Converts a salary value into a non-negative integer.
///
/// Integers and integer strings are accepted as-is; floats are truncated toward zero.
pub fn parse_salary(value: &Value) -> Result<i64, ValidationError> {
    let salary = match value {
        Value::Number(number) => match number.as_i64() {
            Some(salary) => salary,
            None => number
                .as_f64()
                .filter(|raw| raw.is_finite() && raw.abs() < i64::MAX as f64)
                .map(|raw| raw.trunc() as i64)
                .ok_or(ValidationError::InvalidSalaryFormat)?,
        },
        Value::String(raw) => raw
            .trim()
            .parse::<i64>()
            .map_err(|_| ValidationError::InvalidSalaryFormat)?,
        _ => return Err(ValidationError::InvalidSalaryFormat),
    };

    if salary < 0 {
        return Err(ValidationError::NegativeSalary);
    }
    Ok(salary)
}

pub fn check_max_len(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.chars().count() > max {
        Err(ValidationError::TooLong { field, max })
    } else {
        Ok(())
    }
}

/// Checks the link parses as an absolute URL with a supported scheme and a host.
///
/// The link is never fetched.
pub fn is_valid_resume_link(value: &str) -> bool {
    match Url::parse(value) {
        Ok(url) => URL_SCHEMES.contains(&url.scheme()) && url.host_str().is_some(),
        Err(_) => false,
    }
}
