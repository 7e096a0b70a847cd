//! Typed inputs for the create operations, extracted from decoded payloads.
//!
//! Each extractor applies its operation's checks in the order callers observe
//! them: only the first failure is reported.

use validator::ValidateEmail;

use crate::validation::{
    check_max_len, is_valid_resume_link, parse_salary, present_text, require_keys,
    required_text, scalar_text, Payload, ValidationError, MAX_EMAIL_LEN, MAX_TEXT_LEN,
    MAX_URL_LEN,
};

/// Validated fields for a new company.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCompanyInput {
    pub name: String,
    pub location: String,
    pub description: String,
}

impl NewCompanyInput {
    pub fn from_payload(payload: &Payload) -> Result<Self, ValidationError> {
        let name = required_text(payload, "name")?;
        let location = required_text(payload, "location")?;
        let description = required_text(payload, "description")?;

        check_max_len("name", &name, MAX_TEXT_LEN)?;
        check_max_len("location", &location, MAX_TEXT_LEN)?;

        Ok(Self {
            name,
            location,
            description,
        })
    }
}

/// Post-job payload that passed the presence check.
///
/// The company lookup happens between the presence check and the remaining
/// field checks, so the payload is split into two stages.
#[derive(Debug, Clone, Copy)]
pub struct JobPostPayload<'a> {
    payload: &'a Payload,
}

impl<'a> JobPostPayload<'a> {
    const REQUIRED: [&'static str; 5] = ["company_id", "title", "description", "salary", "location"];

    /// Checks every required key exists. Any value, blank strings included, counts as present.
    pub fn from_payload(payload: &'a Payload) -> Result<Self, ValidationError> {
        require_keys(payload, &Self::REQUIRED)?;
        Ok(Self { payload })
    }

    /// Owning company identifier as text, `None` when the value cannot name a company.
    pub fn company_id(&self) -> Option<String> {
        self.payload.get("company_id").and_then(scalar_text)
    }

    /// Validates salary first, then the text fields.
    pub fn into_input(self) -> Result<NewJobPostInput, ValidationError> {
        let salary = self
            .payload
            .get("salary")
            .ok_or(ValidationError::MissingField("salary"))
            .and_then(parse_salary)?;
        let title = present_text(self.payload, "title")?;
        let description = present_text(self.payload, "description")?;
        let location = present_text(self.payload, "location")?;

        check_max_len("title", &title, MAX_TEXT_LEN)?;
        check_max_len("location", &location, MAX_TEXT_LEN)?;

        Ok(NewJobPostInput {
            title,
            description,
            salary,
            location,
        })
    }
}

/// Validated fields for a new job posting, minus the resolved company.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewJobPostInput {
    pub title: String,
    pub description: String,
    pub salary: i64,
    pub location: String,
}

/// Application fields after the presence check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewApplicationInput {
    pub name: String,
    pub email: String,
    pub resume_link: String,
    pub job_id: String,
}

impl NewApplicationInput {
    const REQUIRED: [&'static str; 4] = ["name", "email", "resume_link", "job_id"];

    /// Requires all four fields to be non-blank. `job_id` may be any scalar and is compared as text.
    pub fn from_payload(payload: &Payload) -> Result<Self, ValidationError> {
        for field in Self::REQUIRED {
            let blank = payload
                .get(field)
                .and_then(scalar_text)
                .map_or(true, |text| text.is_empty());
            if blank {
                return Err(ValidationError::MissingField(field));
            }
        }

        Ok(Self {
            name: required_text(payload, "name")?,
            email: required_text(payload, "email")?,
            resume_link: required_text(payload, "resume_link")?,
            job_id: payload
                .get("job_id")
                .and_then(scalar_text)
                .ok_or(ValidationError::MissingField("job_id"))?,
        })
    }

    /// Format checks applied right before the application is persisted.
    pub fn validate_contact(&self) -> Result<(), ValidationError> {
        check_max_len("name", &self.name, MAX_TEXT_LEN)?;
        check_max_len("email", &self.email, MAX_EMAIL_LEN)?;
        if !self.email.validate_email() {
            return Err(ValidationError::InvalidEmail);
        }
        check_max_len("resume_link", &self.resume_link, MAX_URL_LEN)?;
        if !is_valid_resume_link(&self.resume_link) {
            return Err(ValidationError::InvalidUrl);
        }
        Ok(())
    }
}
