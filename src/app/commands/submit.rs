//! Submit worker jobs to the batch scheduler.

use crate::app::AppContext;
use crate::app::cluster::CernCluster;
use crate::domain::{AppError, ClusterOptions, ProfileSettings};
use crate::ports::{ConfigFilesystem, JobSubmitter};

pub fn execute<F, S>(
    ctx: &AppContext<F, S>,
    options: &ClusterOptions,
    jobs: u32,
) -> Result<Vec<String>, AppError>
where
    F: ConfigFilesystem,
    S: JobSubmitter,
{
    let config = ctx.load_config()?;
    let cluster = CernCluster::new(options, &ProfileSettings::cern(&config))?;
    cluster.submit(ctx.submitter(), jobs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::config_bootstrap::ConfigEnv;
    use crate::domain::JobKwargs;
    use crate::testing::{MemoryConfigFilesystem, RecordingSubmitter};

    #[test]
    fn submits_rendered_description() {
        let ctx = AppContext::new(
            MemoryConfigFilesystem::new(),
            RecordingSubmitter::new(),
            ConfigEnv::default(),
        );
        let options = ClusterOptions {
            gpus: Some(1),
            kwargs: JobKwargs {
                cores: Some(1),
                memory: Some("2GB".to_string()),
                submit_command_extra: Some(vec!["-name".to_string(), "bigbird".to_string()]),
                ..Default::default()
            },
            ..Default::default()
        };

        let ids = execute(&ctx, &options, 3).unwrap();

        assert_eq!(ids, vec!["100.0", "100.1", "100.2"]);
        let submissions = ctx.submitter().submissions();
        let submission = &submissions[0];
        assert_eq!(submission.extra_flags, vec!["-name", "bigbird", "-spool"]);
        assert!(submission.description.contains("request_gpus = 1\n"));
    }
}
