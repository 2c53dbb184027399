//! Translate CERN cluster options into the HTCondor submit directives, submit
//! flags and worker arguments the lxbatch pool requires.

use std::env;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::domain::config::ProfileSettings;
use crate::domain::{
    AppError, ClusterOptions, ContainerRuntime, DirectiveValue, Directives, JobKwargs, merge,
    prologue, storage_path,
};

/// Flag making `condor_submit` spool input and output through the schedd.
pub const SPOOL_FLAG: &str = "-spool";

/// Port range workers listen on; the only range open on lxbatch nodes.
pub const WORKER_PORT_ARGS: [&str; 2] = ["--worker-port", "10000:10100"];

/// Interpreter used when neither the caller nor the config names one.
pub const DEFAULT_PYTHON: &str = "python3";

/// Batch label used when neither the caller nor the config names one.
pub const DEFAULT_BATCH_NAME: &str = "dask-worker";

static LCG_INTERPRETER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/cvmfs/sft(?:-nightlies)?\.cern\.ch/lcg/.+/python[23]?$")
        .expect("valid LCG interpreter regex")
});

/// Container runtime after applying the deprecated `image_type` synonym.
pub fn requested_container_runtime(options: &ClusterOptions) -> Option<ContainerRuntime> {
    match options.image_type {
        Some(image_type) => {
            tracing::warn!(
                "The `image_type` parameter is deprecated. Please use `container_runtime` instead."
            );
            options.container_runtime.or(Some(image_type))
        }
        None => options.container_runtime,
    }
}

/// Interpreter the workers will run: explicit, configured, or `python3`.
pub fn worker_interpreter(
    kwargs: &JobKwargs,
    profile: &ProfileSettings<'_>,
) -> Result<String, AppError> {
    if let Some(python) = kwargs.python.as_deref().filter(|p| !p.is_empty()) {
        return Ok(python.to_string());
    }
    Ok(profile.python()?.unwrap_or_else(|| DEFAULT_PYTHON.to_string()))
}

/// Whether `interpreter` lives in an LCG release or nightly view on CVMFS.
pub fn is_lcg_interpreter(interpreter: &str) -> bool {
    LCG_INTERPRETER.is_match(interpreter)
}

/// Locate a bare command name on `search_path`. Names containing a path
/// separator are returned unchanged.
pub fn resolve_on_path(command: &str, search_path: Option<&OsStr>) -> Option<PathBuf> {
    if command.contains('/') {
        return Some(PathBuf::from(command));
    }
    env::split_paths(search_path?).map(|dir| dir.join(command)).find(|path| path.is_file())
}

/// Path the LCG check runs against: bare names are looked up on `PATH`.
fn interpreter_location(interpreter: &str) -> String {
    resolve_on_path(interpreter, env::var_os("PATH").as_deref())
        .as_deref()
        .and_then(Path::to_str)
        .map_or_else(|| interpreter.to_string(), str::to_string)
}

/// Derive the job keywords for the CERN pool.
///
/// Returns a copy of `options.kwargs` with `job_extra_directives`,
/// `submit_command_extra` and `worker_extra_args` replaced. Fails before
/// producing anything when `lcg` is requested from an interpreter outside CVMFS.
pub fn derive(
    options: &ClusterOptions,
    profile: &ProfileSettings<'_>,
) -> Result<JobKwargs, AppError> {
    let kwargs = &options.kwargs;
    let requested_runtime = requested_container_runtime(options);

    if options.lcg {
        let interpreter = interpreter_location(&worker_interpreter(kwargs, profile)?);
        if !is_lcg_interpreter(&interpreter) {
            return Err(AppError::UntrustedInterpreter { interpreter });
        }
    }

    let container_runtime = match requested_runtime {
        Some(runtime) => Some(runtime),
        None => profile.container_runtime()?,
    };
    let worker_image = match options.worker_image.as_deref().filter(|image| !image.is_empty()) {
        Some(image) => Some(image.to_string()),
        None => profile.worker_image()?,
    };
    let batch_name = match options.batch_name.as_deref().filter(|name| !name.is_empty()) {
        Some(name) => name.to_string(),
        None => profile.batch_name()?.unwrap_or_else(|| DEFAULT_BATCH_NAME.to_string()),
    };
    let log_directory = match kwargs.log_directory() {
        Some(dir) => Some(dir.to_string()),
        None => profile.log_directory()?.filter(|dir| !dir.is_empty()),
    };
    let raw_directives = match &kwargs.job_extra_directives {
        Some(directives) => directives.clone(),
        None => profile.job_extra_directives()?,
    };

    let image_directive = match (container_runtime, worker_image.as_deref()) {
        (Some(ContainerRuntime::Docker), Some(image)) => {
            Some(Directives::single("docker_image", DirectiveValue::quoted(image)))
        }
        (Some(ContainerRuntime::Singularity), Some(image)) => {
            Some(Directives::single("MY.SingularityImage", DirectiveValue::quoted(image)))
        }
        (Some(ContainerRuntime::Docker | ContainerRuntime::Singularity), None) => {
            return Err(AppError::MissingSetting(profile.key("worker-image")));
        }
        _ => None,
    };
    let universe = container_runtime.map_or("vanilla", |runtime| runtime.universe());
    let xroot_url = log_directory.as_deref().and_then(storage_path::resolve);

    let directives = merge([
        Some(Directives::single("universe", universe)),
        image_directive,
        options.gpus.map(|gpus| Directives::single("request_gpus", gpus.to_string())),
        Some(Directives::single("MY.IsDaskWorker", "true")),
        // both sides run the same LCG view, so the submit environment is valid remotely
        options.lcg.then(|| Directives::single("getenv", "true")),
        xroot_url.map(|url| output_redirection(&url)),
        log_directory.is_some().then(|| Directives::single("MY.SpoolOnEvict", false)),
        Some(raw_directives),
        Some(Directives::single("JobBatchName", DirectiveValue::quoted(&batch_name))),
        // never transfer files back through the schedd
        Some(Directives::single("transfer_output_files", "\"\"")),
    ]);

    let mut submit_command_extra = match &kwargs.submit_command_extra {
        Some(flags) => flags.clone(),
        None => profile.submit_command_extra()?,
    };
    if !submit_command_extra.iter().any(|flag| flag == SPOOL_FLAG) {
        submit_command_extra.push(SPOOL_FLAG.to_string());
    }

    let mut worker_extra_args = match &kwargs.worker_extra_args {
        Some(args) => args.clone(),
        None => profile.worker_extra_args()?,
    };
    worker_extra_args.extend(WORKER_PORT_ARGS.iter().map(|arg| arg.to_string()));

    let job_script_prologue = if options.exports.is_empty() {
        kwargs.job_script_prologue.clone()
    } else {
        let lines = match &kwargs.job_script_prologue {
            Some(lines) => lines.clone(),
            None => profile.job_script_prologue()?,
        };
        Some(prologue::with_exports(lines, &options.exports))
    };

    tracing::debug!(
        directives = directives.len(),
        runtime = container_runtime.map_or("unset", |runtime| runtime.label()),
        "derived CERN job directives"
    );

    Ok(JobKwargs {
        job_extra_directives: Some(directives),
        submit_command_extra: Some(submit_command_extra),
        worker_extra_args: Some(worker_extra_args),
        job_script_prologue,
        ..kwargs.clone()
    })
}

fn output_redirection(xroot_url: &str) -> Directives {
    [
        ("output_destination", xroot_url),
        ("Output", "worker-$(ClusterId).$(ProcId).out"),
        ("Error", "worker-$(ClusterId).$(ProcId).err"),
        ("Log", "worker-$(ClusterId).log"),
    ]
    .into_iter()
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::ConfigStore;

    const DEFAULT_IMAGE: &str =
        "/cvmfs/unpacked.cern.ch/gitlab-registry.cern.ch/batch-team/dask-lxplus/lxdask-cc7:latest";
    const LCG_PYTHON: &str =
        "/cvmfs/sft-nightlies.cern.ch/lcg/views/devswan/Mon/x86_64-centos7-gcc8-opt/bin/python3";

    fn defaults() -> ConfigStore {
        ConfigStore::from_yaml_str(&format!(
            "jobqueue:\n  cern:\n    container-runtime: singularity\n    worker-image: {}\n    batch-name: dask-worker\n    job_extra_directives: {{}}\n    worker_extra_args: []\n",
            DEFAULT_IMAGE
        ))
        .unwrap()
    }

    fn derive_with(options: ClusterOptions) -> Result<JobKwargs, AppError> {
        let config = defaults();
        derive(&options, &ProfileSettings::cern(&config))
    }

    fn directives(kwargs: &JobKwargs) -> &Directives {
        kwargs.job_extra_directives.as_ref().unwrap()
    }

    fn str_value(kwargs: &JobKwargs, key: &str) -> Option<String> {
        directives(kwargs).get(key).map(|value| value.to_string())
    }

    #[test]
    fn docker_runtime_selects_docker_universe_and_image() {
        let kwargs = derive_with(ClusterOptions {
            container_runtime: Some(ContainerRuntime::Docker),
            worker_image: Some("X".to_string()),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(str_value(&kwargs, "universe").as_deref(), Some("docker"));
        assert_eq!(str_value(&kwargs, "docker_image").as_deref(), Some("\"X\""));
        assert!(!directives(&kwargs).contains_key("MY.SingularityImage"));
    }

    #[test]
    fn singularity_uses_packaged_image_by_default() {
        let kwargs = derive_with(ClusterOptions {
            container_runtime: Some(ContainerRuntime::Singularity),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(str_value(&kwargs, "universe").as_deref(), Some("vanilla"));
        assert_eq!(
            str_value(&kwargs, "MY.SingularityImage"),
            Some(format!("\"{}\"", DEFAULT_IMAGE))
        );
        assert!(!directives(&kwargs).contains_key("docker_image"));
    }

    #[test]
    fn no_runtime_emits_no_image() {
        let kwargs = derive_with(ClusterOptions {
            container_runtime: Some(ContainerRuntime::None),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(str_value(&kwargs, "universe").as_deref(), Some("vanilla"));
        assert!(!directives(&kwargs).contains_key("docker_image"));
        assert!(!directives(&kwargs).contains_key("MY.SingularityImage"));
    }

    #[test]
    fn always_present_directives() {
        let kwargs = derive_with(ClusterOptions::default()).unwrap();

        assert_eq!(str_value(&kwargs, "MY.IsDaskWorker").as_deref(), Some("true"));
        assert_eq!(str_value(&kwargs, "JobBatchName").as_deref(), Some("\"dask-worker\""));
        assert_eq!(str_value(&kwargs, "transfer_output_files").as_deref(), Some("\"\""));
        assert!(!directives(&kwargs).contains_key("request_gpus"));
        assert!(!directives(&kwargs).contains_key("getenv"));
        assert!(!directives(&kwargs).contains_key("MY.SpoolOnEvict"));
    }

    #[test]
    fn zero_gpus_is_still_requested() {
        let kwargs = derive_with(ClusterOptions { gpus: Some(0), ..Default::default() }).unwrap();
        assert_eq!(str_value(&kwargs, "request_gpus").as_deref(), Some("0"));
    }

    #[test]
    fn batch_name_is_quoted() {
        let kwargs = derive_with(ClusterOptions {
            batch_name: Some("analysis".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(str_value(&kwargs, "JobBatchName").as_deref(), Some("\"analysis\""));
    }

    #[test]
    fn caller_directives_beat_batch_name_and_transfer_defaults() {
        let overrides: Directives = [
            ("MY.Jobflavour", "\"longlunch\""),
            ("JobBatchName", "\"mine\""),
            ("transfer_output_files", "\"out.txt\""),
        ]
        .into_iter()
        .collect();
        let kwargs = derive_with(ClusterOptions {
            kwargs: JobKwargs { job_extra_directives: Some(overrides), ..Default::default() },
            ..Default::default()
        })
        .unwrap();

        assert_eq!(str_value(&kwargs, "MY.Jobflavour").as_deref(), Some("\"longlunch\""));
        assert_eq!(str_value(&kwargs, "JobBatchName").as_deref(), Some("\"mine\""));
        assert_eq!(str_value(&kwargs, "transfer_output_files").as_deref(), Some("\"out.txt\""));
    }

    #[test]
    fn computed_directives_beat_caller_directives() {
        let kwargs = derive_with(ClusterOptions {
            container_runtime: Some(ContainerRuntime::Docker),
            worker_image: Some("img".to_string()),
            kwargs: JobKwargs {
                job_extra_directives: Some(Directives::single("universe", "vanilla")),
                ..Default::default()
            },
            ..Default::default()
        })
        .unwrap();

        assert_eq!(str_value(&kwargs, "universe").as_deref(), Some("docker"));
    }

    #[test]
    fn configured_raw_directives_apply_without_caller_overrides() {
        let mut config = defaults();
        config.set(
            "jobqueue.cern.job_extra_directives",
            serde_yaml::from_str("{MY.Jobflavour: '\"espresso\"'}").unwrap(),
        );
        let kwargs = derive(&ClusterOptions::default(), &ProfileSettings::cern(&config)).unwrap();
        assert_eq!(str_value(&kwargs, "MY.Jobflavour").as_deref(), Some("\"espresso\""));
    }

    #[test]
    fn resolvable_log_directory_redirects_output() {
        let kwargs = derive_with(ClusterOptions {
            kwargs: JobKwargs {
                log_directory: Some("/eos/home-b/bejones/dask-logs".to_string()),
                ..Default::default()
            },
            ..Default::default()
        })
        .unwrap();

        assert_eq!(
            str_value(&kwargs, "output_destination").as_deref(),
            Some("root://eosuser.cern.ch//eos/user/b/bejones/dask-logs")
        );
        assert_eq!(
            str_value(&kwargs, "Output").as_deref(),
            Some("worker-$(ClusterId).$(ProcId).out")
        );
        assert_eq!(
            str_value(&kwargs, "Error").as_deref(),
            Some("worker-$(ClusterId).$(ProcId).err")
        );
        assert_eq!(str_value(&kwargs, "Log").as_deref(), Some("worker-$(ClusterId).log"));
        assert_eq!(directives(&kwargs).get("MY.SpoolOnEvict"), Some(&DirectiveValue::Bool(false)));
    }

    #[test]
    fn unresolvable_log_directory_only_disables_spool_on_evict() {
        let kwargs = derive_with(ClusterOptions {
            kwargs: JobKwargs { log_directory: Some("/tmp/logs".to_string()), ..Default::default() },
            ..Default::default()
        })
        .unwrap();

        for key in ["output_destination", "Output", "Error", "Log"] {
            assert!(!directives(&kwargs).contains_key(key), "{} should be absent", key);
        }
        assert_eq!(directives(&kwargs).get("MY.SpoolOnEvict"), Some(&DirectiveValue::Bool(false)));
    }

    #[test]
    fn spool_flag_is_added_once() {
        let kwargs = derive_with(ClusterOptions::default()).unwrap();
        assert_eq!(kwargs.submit_command_extra.as_deref(), Some(&["-spool".to_string()][..]));

        let again = derive_with(ClusterOptions { kwargs: kwargs.clone(), ..Default::default() })
            .unwrap();
        let flags = again.submit_command_extra.unwrap();
        assert_eq!(flags.iter().filter(|flag| *flag == SPOOL_FLAG).count(), 1);
    }

    #[test]
    fn caller_submit_flags_are_kept_in_order() {
        let kwargs = derive_with(ClusterOptions {
            kwargs: JobKwargs {
                submit_command_extra: Some(vec!["-name".to_string(), "bigbird".to_string()]),
                ..Default::default()
            },
            ..Default::default()
        })
        .unwrap();
        assert_eq!(kwargs.submit_command_extra.unwrap(), vec!["-name", "bigbird", "-spool"]);
    }

    #[test]
    fn worker_port_range_is_appended_after_caller_args() {
        let kwargs = derive_with(ClusterOptions {
            kwargs: JobKwargs {
                worker_extra_args: Some(vec!["--lifetime".to_string(), "1h".to_string()]),
                ..Default::default()
            },
            ..Default::default()
        })
        .unwrap();
        assert_eq!(kwargs.worker_extra_args.unwrap(), vec![
            "--lifetime",
            "1h",
            "--worker-port",
            "10000:10100"
        ]);
    }

    #[test]
    fn lcg_requires_cvmfs_interpreter() {
        let err = derive_with(ClusterOptions {
            lcg: true,
            kwargs: JobKwargs { python: Some("/usr/bin/python3".to_string()), ..Default::default() },
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, AppError::UntrustedInterpreter { ref interpreter } if interpreter == "/usr/bin/python3"));
    }

    #[test]
    fn lcg_with_cvmfs_interpreter_inherits_environment() {
        let kwargs = derive_with(ClusterOptions {
            lcg: true,
            kwargs: JobKwargs { python: Some(LCG_PYTHON.to_string()), ..Default::default() },
            ..Default::default()
        })
        .unwrap();
        assert_eq!(str_value(&kwargs, "getenv").as_deref(), Some("true"));
    }

    #[test]
    fn bare_interpreter_is_resolved_on_path() {
        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("cvmfs/sft.cern.ch/lcg/views/LCG_105/x86_64-el9-gcc13-opt/bin");
        std::fs::create_dir_all(&bin).unwrap();
        std::fs::write(bin.join("python3"), "").unwrap();
        let search_path = env::join_paths([dir.path().join("empty"), bin.clone()]).unwrap();

        let resolved = resolve_on_path("python3", Some(search_path.as_os_str())).unwrap();
        assert_eq!(resolved, bin.join("python3"));
        assert_eq!(resolve_on_path("python9", Some(search_path.as_os_str())), None);
        assert_eq!(resolve_on_path("python3", None), None);
        assert_eq!(
            resolve_on_path("/usr/bin/python3", None),
            Some(PathBuf::from("/usr/bin/python3"))
        );
    }

    #[test]
    fn exports_extend_the_configured_prologue() {
        let mut config = defaults();
        config.set(
            "jobqueue.cern.job_script_prologue",
            serde_yaml::from_str("['source /cvmfs/setup.sh', 'export XRD_RUNFORKHANDLER=0']")
                .unwrap(),
        );
        let options = ClusterOptions {
            exports: vec![
                ("XRD_RUNFORKHANDLER".to_string(), "1".to_string()),
                ("PYTHONPATH".to_string(), "/opt/lib".to_string()),
            ],
            ..Default::default()
        };
        let kwargs = derive(&options, &ProfileSettings::cern(&config)).unwrap();

        assert_eq!(kwargs.job_script_prologue.unwrap(), vec![
            "source /cvmfs/setup.sh",
            "export XRD_RUNFORKHANDLER=0",
            "export PYTHONPATH=/opt/lib"
        ]);
    }

    #[test]
    fn exports_extend_caller_prologue_instead_of_config() {
        let mut config = defaults();
        config.set(
            "jobqueue.cern.job_script_prologue",
            serde_yaml::from_str("['source /cvmfs/setup.sh']").unwrap(),
        );
        let options = ClusterOptions {
            exports: vec![("A".to_string(), "1".to_string())],
            kwargs: JobKwargs {
                job_script_prologue: Some(vec!["cd /tmp".to_string()]),
                ..Default::default()
            },
            ..Default::default()
        };
        let kwargs = derive(&options, &ProfileSettings::cern(&config)).unwrap();
        assert_eq!(kwargs.job_script_prologue.unwrap(), vec!["cd /tmp", "export A=1"]);
    }

    #[test]
    fn without_exports_the_prologue_is_left_to_the_job_builder() {
        let kwargs = derive_with(ClusterOptions::default()).unwrap();
        assert_eq!(kwargs.job_script_prologue, None);
    }

    #[test]
    fn lcg_interpreter_pattern() {
        assert!(is_lcg_interpreter(LCG_PYTHON));
        assert!(is_lcg_interpreter("/cvmfs/sft.cern.ch/lcg/views/LCG_105/x86_64-el9-gcc13-opt/bin/python"));
        assert!(!is_lcg_interpreter("/cvmfs/sft.cern.ch/lcg/views/LCG_105/bin/python3.11"));
        assert!(!is_lcg_interpreter("/usr/bin/python3"));
    }

    #[test]
    fn image_type_is_a_fallback_for_container_runtime() {
        let kwargs = derive_with(ClusterOptions {
            image_type: Some(ContainerRuntime::Docker),
            worker_image: Some("img".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(str_value(&kwargs, "universe").as_deref(), Some("docker"));

        let kwargs = derive_with(ClusterOptions {
            image_type: Some(ContainerRuntime::Docker),
            container_runtime: Some(ContainerRuntime::None),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(str_value(&kwargs, "universe").as_deref(), Some("vanilla"));
    }

    #[test]
    fn container_image_without_any_image_configured_is_an_error() {
        let config = ConfigStore::new();
        let err = derive(
            &ClusterOptions {
                container_runtime: Some(ContainerRuntime::Docker),
                ..Default::default()
            },
            &ProfileSettings::cern(&config),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::MissingSetting(ref key) if key == "jobqueue.cern.worker-image"));
    }

    #[test]
    fn other_kwargs_pass_through() {
        let kwargs = derive_with(ClusterOptions {
            kwargs: JobKwargs {
                cores: Some(4),
                memory: Some("2000MB".to_string()),
                ..Default::default()
            },
            ..Default::default()
        })
        .unwrap();
        assert_eq!(kwargs.cores, Some(4));
        assert_eq!(kwargs.memory.as_deref(), Some("2000MB"));
    }
}
