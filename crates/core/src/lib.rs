//! Domain types and input validation for the job board.
//!
//! Nothing in this crate touches storage; it only decides what a valid
//! company, posting or application looks like and how results are shaped.

pub mod input;
pub mod types;
pub mod validation;

pub use input::{JobPostPayload, NewApplicationInput, NewCompanyInput, NewJobPostInput};
pub use validation::{decode_payload, DecodeError, Payload, ValidationError};
