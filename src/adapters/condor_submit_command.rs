use std::io::Write;
use std::process::Command;
use std::sync::LazyLock;

use regex::Regex;
use tempfile::Builder;

use crate::domain::AppError;
use crate::ports::JobSubmitter;

static SUBMITTED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+) job\(s\) submitted to cluster (\d+)").expect("valid condor_submit regex")
});

/// Submits jobs by running `condor_submit` on a temporary submit file.
#[derive(Debug, Clone)]
pub struct CondorSubmitCommand {
    program: String,
}

impl Default for CondorSubmitCommand {
    fn default() -> Self {
        Self::new("condor_submit")
    }
}

impl CondorSubmitCommand {
    pub fn new<S: Into<String>>(program: S) -> Self {
        Self { program: program.into() }
    }

    fn run(&self, submit_file: &str, extra_flags: &[String]) -> Result<String, AppError> {
        let command_line = format!("{} {} {}", self.program, extra_flags.join(" "), submit_file);

        let output = Command::new(&self.program)
            .args(extra_flags)
            .arg(submit_file)
            .output()
            .map_err(|e| AppError::SubmitError {
                command: command_line.clone(),
                details: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(AppError::SubmitError {
                command: command_line,
                details: if stderr.is_empty() { "Unknown error".to_string() } else { stderr },
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

impl JobSubmitter for CondorSubmitCommand {
    fn submit(
        &self,
        description: &str,
        count: u32,
        extra_flags: &[String],
    ) -> Result<Vec<String>, AppError> {
        let mut file = Builder::new().prefix("lxdask-").suffix(".sub").tempfile()?;
        file.write_all(description.as_bytes())?;
        file.flush()?;
        let path = file.path().to_string_lossy().to_string();

        let mut ids = Vec::new();
        for _ in 0..count {
            let stdout = self.run(&path, extra_flags)?;
            let submitted = parse_submit_output(&stdout)?;
            tracing::info!(jobs = ?submitted, "submitted worker job");
            ids.extend(submitted);
        }
        Ok(ids)
    }
}

/// Parse `N job(s) submitted to cluster C.` into the ids `C.0` to `C.N-1`.
pub fn parse_submit_output(stdout: &str) -> Result<Vec<String>, AppError> {
    let captures = SUBMITTED.captures(stdout).ok_or_else(|| AppError::ParseError {
        what: "condor_submit output".to_string(),
        details: stdout.trim().to_string(),
    })?;
    let count: u32 = captures[1].parse().map_err(|_| AppError::ParseError {
        what: "condor_submit job count".to_string(),
        details: captures[1].to_string(),
    })?;
    let cluster = &captures[2];
    Ok((0..count).map(|proc_id| format!("{}.{}", cluster, proc_id)).collect())
}
