//! Test double for `JobSubmitter`.

use std::cell::RefCell;

use crate::domain::AppError;
use crate::ports::JobSubmitter;

#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub description: String,
    pub count: u32,
    pub extra_flags: Vec<String>,
}

/// Records submissions and hands out sequential ids in cluster `100`.
#[derive(Debug, Default)]
pub struct RecordingSubmitter {
    submissions: RefCell<Vec<Submission>>,
    failure: Option<String>,
}

impl RecordingSubmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every submission with the given details.
    pub fn failing(details: &str) -> Self {
        Self { failure: Some(details.to_string()), ..Self::default() }
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.submissions.borrow().clone()
    }
}

impl JobSubmitter for RecordingSubmitter {
    fn submit(
        &self,
        description: &str,
        count: u32,
        extra_flags: &[String],
    ) -> Result<Vec<String>, AppError> {
        if let Some(details) = &self.failure {
            return Err(AppError::SubmitError {
                command: "condor_submit".to_string(),
                details: details.clone(),
            });
        }
        self.submissions.borrow_mut().push(Submission {
            description: description.to_string(),
            count,
            extra_flags: extra_flags.to_vec(),
        });
        Ok((0..count).map(|proc_id| format!("100.{}", proc_id)).collect())
    }
}
