//! Source-control revision lookup
//!
//! Asks git for the short hash of the checked-out head. The lookup is best
//! effort: [`RevisionResolver::lookup`] reports why it failed, and
//! [`RevisionResolver::resolve`] folds every failure into [`NOT_AVAILABLE`].

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::build_info::{DistMode, NOT_AVAILABLE};
use crate::error::LookupError;

const GIT: &str = "git";
const POLL_INTERVAL: Duration = Duration::from_millis(20);

#[derive(Debug, Clone)]
pub struct RevisionResolver {
    program: PathBuf,
    working_dir: PathBuf,
    timeout: Duration,
}

impl RevisionResolver {
    pub fn new(working_dir: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: PathBuf::from(GIT),
            working_dir: working_dir.into(),
            timeout,
        }
    }

    /// Use a different git executable
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Short revision for `mode`, or `"n/a"` when not requested or unavailable
    pub fn resolve(&self, mode: DistMode) -> String {
        if !mode.wants_revision() {
            return NOT_AVAILABLE.to_string();
        }

        match self.lookup() {
            Ok(sha) => sha,
            Err(e) => {
                tracing::debug!(
                    dir = %self.working_dir.display(),
                    error = %e,
                    "revision lookup failed"
                );
                NOT_AVAILABLE.to_string()
            }
        }
    }

    /// Run `git rev-parse --short HEAD` in the working directory
    pub fn lookup(&self) -> Result<String, LookupError> {
        let tool = self.program.display().to_string();
        let program =
            which::which(&self.program).map_err(|_| LookupError::ToolNotFound(tool.clone()))?;

        let mut child = Command::new(program)
            .args(["rev-parse", "--short", "HEAD"])
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| LookupError::Spawn {
                tool: tool.clone(),
                source,
            })?;

        let status = wait_with_timeout(&mut child, self.timeout).map_err(|source| {
            LookupError::Spawn {
                tool: tool.clone(),
                source,
            }
        })?;

        let Some(status) = status else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(LookupError::Timeout {
                tool,
                timeout: self.timeout,
            });
        };

        let stdout = read_pipe(child.stdout.take());
        if !status.success() {
            let stderr = read_pipe(child.stderr.take());
            return Err(LookupError::ExitStatus {
                tool,
                status,
                stderr: stderr.trim().to_string(),
            });
        }

        parse_short_hash(&tool, &stdout)
    }
}

/// Poll the child until it exits or the timeout passes.
/// `Ok(None)` means the child is still running.
fn wait_with_timeout(
    child: &mut Child,
    timeout: Duration,
) -> std::io::Result<Option<std::process::ExitStatus>> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn read_pipe<R: Read>(pipe: Option<R>) -> String {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        let _ = pipe.read_to_end(&mut buf);
    }
    String::from_utf8_lossy(&buf).into_owned()
}

fn parse_short_hash(tool: &str, output: &str) -> Result<String, LookupError> {
    let sha = output.trim();
    if sha.is_empty() {
        return Err(LookupError::EmptyOutput(tool.to_string()));
    }
    if !sha.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(LookupError::MalformedOutput {
            tool: tool.to_string(),
            output: sha.to_string(),
        });
    }
    Ok(sha.to_string())
}
