//! Local process adapter
//!
//! Runs the ingestion program as a child process of the manager. Useful for
//! development and tests. Unless detached, jobs die with the adapter, and
//! states are only known for jobs this adapter instance spawned. Once a
//! process has exited only its final state is kept.

use async_trait::async_trait;
use sluice_core::domain::runner::Runner;
use sluice_core::dto::options::ImportOptions;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{BackendAdapter, Submission};
use crate::error::BackendError;
use crate::status::{DirectState, NativeState};

/// Adapter running jobs as local processes
pub struct DirectBackend {
    program: PathBuf,
    /// Arguments placed before the rendered options
    args: Vec<String>,
    /// Kill spawned processes when the adapter is dropped
    kill_on_drop: bool,
    /// Registry of spawned jobs: external id -> process
    processes: Mutex<HashMap<String, LocalJob>>,
}

/// A spawned job; the process handle is released once it has exited
enum LocalJob {
    Live { child: Child, cancelled: bool },
    Finished(DirectState),
}

impl LocalJob {
    fn state(&mut self) -> Result<DirectState, BackendError> {
        let state = match self {
            Self::Finished(state) => return Ok(*state),
            Self::Live { child, cancelled } => match child.try_wait()? {
                None => DirectState::Running,
                Some(_) if *cancelled => DirectState::Cancelled,
                Some(status) if status.success() => DirectState::Done,
                Some(_) => DirectState::Failed,
            },
        };

        if state != DirectState::Running {
            *self = Self::Finished(state);
        }
        Ok(state)
    }
}

impl DirectBackend {
    /// Create an adapter running `program`
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            kill_on_drop: true,
            processes: Mutex::new(HashMap::new()),
        }
    }

    /// Arguments passed ahead of the options (e.g. an interpreter script)
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Let spawned processes outlive the adapter
    pub fn detached(mut self) -> Self {
        self.kill_on_drop = false;
        self
    }

    fn processes(&self) -> std::sync::MutexGuard<'_, HashMap<String, LocalJob>> {
        self.processes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn generate_external_id(job_name: &str) -> String {
        let suffix = Uuid::new_v4().simple().to_string();
        format!("{}-{}", job_name, &suffix[..8])
    }
}

#[async_trait]
impl BackendAdapter for DirectBackend {
    fn runner(&self) -> Runner {
        Runner::Direct
    }

    async fn submit(&self, options: &ImportOptions) -> Result<Submission, BackendError> {
        let external_id = Self::generate_external_id(&options.job_name);

        debug!(
            program = %self.program.display(),
            external_id = %external_id,
            "Spawning local ingestion process"
        );

        let child = Command::new(&self.program)
            .args(&self.args)
            .args(options.to_args())
            .kill_on_drop(self.kill_on_drop)
            .spawn()?;

        let pid = child.id();
        let mut job = LocalJob::Live {
            child,
            cancelled: false,
        };
        let state = job.state()?;

        info!(external_id = %external_id, pid = ?pid, "Local job started");
        self.processes().insert(external_id.clone(), job);

        Ok(Submission {
            external_id,
            state: NativeState::Direct(state),
        })
    }

    async fn query_state(&self, external_id: &str) -> Result<NativeState, BackendError> {
        let mut processes = self.processes();
        let job = processes
            .get_mut(external_id)
            .ok_or_else(|| BackendError::NotFound(external_id.to_string()))?;

        Ok(NativeState::Direct(job.state()?))
    }

    async fn cancel(&self, external_id: &str) -> Result<(), BackendError> {
        let mut processes = self.processes();
        let job = processes
            .get_mut(external_id)
            .ok_or_else(|| BackendError::NotFound(external_id.to_string()))?;

        if job.state()? != DirectState::Running {
            warn!(external_id = %external_id, "Cancel requested for finished local job");
            return Ok(());
        }

        if let LocalJob::Live { child, cancelled } = job {
            *cancelled = true;
            child.start_kill()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn options() -> ImportOptions {
        ImportOptions {
            runner: "DirectRunner".to_string(),
            job_name: "job".to_string(),
            files_to_stage: vec!["/bin/sh".to_string()],
            ..Default::default()
        }
    }

    fn shell(script: &str) -> DirectBackend {
        DirectBackend::new("sh").with_args(["-c", script, "sluice-ingest"])
    }

    async fn wait_for(backend: &DirectBackend, id: &str, expected: DirectState) {
        for _ in 0..100 {
            if backend.query_state(id).await.unwrap() == NativeState::Direct(expected) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("job {} never reached {:?}", id, expected);
    }

    #[tokio::test]
    async fn test_long_running_process_is_running() {
        let backend = shell("sleep 30");
        let submission = backend.submit(&options()).await.unwrap();

        assert!(submission.external_id.starts_with("job-"));
        assert_eq!(submission.state, NativeState::Direct(DirectState::Running));
    }

    #[tokio::test]
    async fn test_exit_codes_map_to_states() {
        let ok = shell("exit 0");
        let submission = ok.submit(&options()).await.unwrap();
        wait_for(&ok, &submission.external_id, DirectState::Done).await;

        let failing = shell("exit 3");
        let submission = failing.submit(&options()).await.unwrap();
        wait_for(&failing, &submission.external_id, DirectState::Failed).await;
    }

    #[tokio::test]
    async fn test_exited_process_handle_is_released() {
        let backend = shell("exit 0");
        let submission = backend.submit(&options()).await.unwrap();
        wait_for(&backend, &submission.external_id, DirectState::Done).await;

        assert!(matches!(
            backend.processes().get(&submission.external_id),
            Some(LocalJob::Finished(DirectState::Done))
        ));
        assert_eq!(
            backend.query_state(&submission.external_id).await.unwrap(),
            NativeState::Direct(DirectState::Done)
        );
        backend.cancel(&submission.external_id).await.unwrap();
        assert_eq!(
            backend.query_state(&submission.external_id).await.unwrap(),
            NativeState::Direct(DirectState::Done)
        );
    }

    #[tokio::test]
    async fn test_cancel_kills_process() {
        let backend = shell("sleep 30");
        let submission = backend.submit(&options()).await.unwrap();

        backend.cancel(&submission.external_id).await.unwrap();
        wait_for(&backend, &submission.external_id, DirectState::Cancelled).await;
    }

    #[tokio::test]
    async fn test_missing_program_fails_submission() {
        let backend = DirectBackend::new("/nonexistent/sluice-ingest");
        let err = backend.submit(&options()).await.unwrap_err();
        assert!(matches!(err, BackendError::Io(_)));
    }

    #[tokio::test]
    async fn test_unknown_external_id() {
        let backend = shell("true");
        assert!(matches!(
            backend.query_state("nope").await,
            Err(BackendError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_options_are_passed_as_arguments() {
        let backend = shell(r#"case "$*" in *--jobName=job*) exit 0;; *) exit 1;; esac"#);
        let submission = backend.submit(&options()).await.unwrap();
        wait_for(&backend, &submission.external_id, DirectState::Done).await;
    }
}
