//! Error types for check-in operations.
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad arguments, unknown ids)
//! - 3: Rejected by a rule (duplicates, backfill window)
//! - 4: Operation failed (I/O, corrupt data files)

use chrono::NaiveDate;
use thiserror::Error;

use crate::makeup::Eligibility;

pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const RULE_VIOLATION: i32 = 3;
    pub const OPERATION_FAILED: i32 = 4;
}

#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Task {0} not found")]
    UnknownTask(u64),

    #[error("Check-in {0} not found")]
    CheckinNotFound(u64),

    #[error("No category is bound to task {0}")]
    UnknownCategory(u64),

    #[error("Tag name must not be empty")]
    InvalidTagName,

    #[error("Category name must not be empty")]
    InvalidCategoryName,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // Rule violations (exit code 3)
    #[error("Task {task_id} already has a check-in on {date}")]
    DuplicateCheckin { task_id: u64, date: NaiveDate },

    #[error("\"{0}\" is already used by a category or task")]
    DuplicateCategoryName(String),

    #[error("Tag \"{0}\" already exists")]
    DuplicateTag(String),

    #[error("Cannot check in for {date}: {eligibility}")]
    EligibilityViolation { date: NaiveDate, eligibility: Eligibility },

    // Operation failures (exit code 4)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::UnknownTask(_)
            | Error::CheckinNotFound(_)
            | Error::UnknownCategory(_)
            | Error::InvalidTagName
            | Error::InvalidCategoryName
            | Error::InvalidArgument(_) => exit_codes::USER_ERROR,

            Error::DuplicateCheckin { .. }
            | Error::DuplicateCategoryName(_)
            | Error::DuplicateTag(_)
            | Error::EligibilityViolation { .. } => exit_codes::RULE_VIOLATION,

            Error::Io(_) | Error::Json(_) => exit_codes::OPERATION_FAILED,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
