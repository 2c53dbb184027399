use crate::domain::AppError;

/// Port handing rendered submit descriptions to the batch scheduler.
pub trait JobSubmitter {
    /// Submit `count` copies of `description`, passing `extra_flags` to the
    /// submit command. Returns the scheduler job ids in submission order.
    fn submit(
        &self,
        description: &str,
        count: u32,
        extra_flags: &[String],
    ) -> Result<Vec<String>, AppError>;
}
