use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use crate::config::credentials::Secret;
use crate::errors::GenmapError;
use crate::models::scan_result::ToolOutput;
use super::target::ScanTarget;
use tracing::{debug, warn};

/// Runs the external scanner for one phase and hands back everything it
/// printed. Implementations never interpret the output.
#[async_trait]
pub trait ToolInvoker: Send + Sync {
    async fn run(
        &self,
        phase_args: &[String],
        credential: Option<&Secret>,
        target: &ScanTarget,
        cancel: &CancellationToken,
    ) -> Result<ToolOutput, GenmapError>;

    /// Full argv that `run` would execute, for display and logging.
    fn command_line(&self, phase_args: &[String], target: &ScanTarget) -> Vec<String>;

    /// Binary name used in diagnostics.
    fn tool_name(&self) -> &str;
}

/// Privilege elevation wrapper placed in front of the tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Elevation {
    pub program: String,
    pub args: Vec<String>,
}

impl Default for Elevation {
    fn default() -> Self {
        // -S reads the password from stdin, an empty -p keeps the prompt out of stderr
        Self {
            program: "sudo".to_string(),
            args: vec!["-S".to_string(), "-p".to_string(), String::new()],
        }
    }
}

#[derive(Debug, Clone)]
pub struct ToolSettings {
    pub tool: String,
    pub elevation: Option<Elevation>,
    pub timeout: Option<Duration>,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            tool: "nmap".to_string(),
            elevation: Some(Elevation::default()),
            timeout: None,
        }
    }
}

pub struct NmapInvoker {
    settings: ToolSettings,
}

impl NmapInvoker {
    pub fn new(settings: ToolSettings) -> Self {
        Self { settings }
    }

    /// Wait for the child while keeping its handle, so a timeout or
    /// cancellation can still signal the whole process group.
    async fn collect(
        &self,
        mut child: Child,
        cancel: &CancellationToken,
    ) -> Result<ToolOutput, GenmapError> {
        let stdout = tokio::spawn(read_pipe(child.stdout.take()));
        let stderr = tokio::spawn(read_pipe(child.stderr.take()));

        let limit = self.settings.timeout;
        let deadline = async move {
            match limit {
                Some(limit) => {
                    tokio::time::sleep(limit).await;
                    limit
                }
                None => std::future::pending::<Duration>().await,
            }
        };

        let exit = tokio::select! {
            biased;
            _ = cancel.cancelled() => Exit::Cancelled,
            limit = deadline => Exit::TimedOut(limit),
            status = child.wait() => Exit::Finished(status),
        };

        let error = match exit {
            Exit::Finished(status) => {
                let status = status?;
                let stdout = join_pipe(stdout).await?;
                let stderr = join_pipe(stderr).await?;
                return Ok(ToolOutput::from_bytes(status.code(), &stdout, &stderr));
            }
            Exit::Cancelled => {
                warn!(tool = %self.settings.tool, "Scan cancelled, terminating child process");
                GenmapError::Cancelled(format!("{} run was cancelled", self.settings.tool))
            }
            Exit::TimedOut(limit) => {
                warn!(tool = %self.settings.tool, "Scan timed out, terminating child process");
                GenmapError::ProcessTimeout(format!(
                    "{} did not finish within {}s",
                    self.settings.tool,
                    limit.as_secs_f64()
                ))
            }
        };

        terminate(&mut child).await;
        stdout.abort();
        stderr.abort();
        Err(error)
    }
}

enum Exit {
    Finished(std::io::Result<std::process::ExitStatus>),
    Cancelled,
    TimedOut(Duration),
}

/// Time the tool gets to exit after SIGTERM before it is killed outright.
const TERMINATE_GRACE: Duration = Duration::from_secs(3);

/// Stop the wrapper and everything it started. sudo relays SIGTERM to the
/// tool, which it cannot do for the SIGKILL that dropping the child sends.
async fn terminate(child: &mut Child) {
    if signal_group(child, StopSignal::Terminate)
        && tokio::time::timeout(TERMINATE_GRACE, child.wait()).await.is_ok()
    {
        return;
    }

    signal_group(child, StopSignal::Kill);
    if let Err(e) = child.start_kill() {
        debug!(error = %e, "Could not kill scan process");
    }
    if tokio::time::timeout(TERMINATE_GRACE, child.wait()).await.is_err() {
        warn!(pid = ?child.id(), "Scan process did not exit after SIGKILL");
    }
}

#[derive(Debug, Clone, Copy)]
enum StopSignal {
    Terminate,
    Kill,
}

/// Signal the child's process group. Returns whether anything was delivered.
#[cfg(unix)]
fn signal_group(child: &Child, signal: StopSignal) -> bool {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    let Some(pid) = child.id() else {
        return false;
    };
    let signal = match signal {
        StopSignal::Terminate => Signal::SIGTERM,
        StopSignal::Kill => Signal::SIGKILL,
    };
    match killpg(Pid::from_raw(pid as i32), signal) {
        Ok(()) => true,
        Err(e) => {
            debug!(pid, signal = ?signal, error = %e, "Signalling scan process group failed");
            false
        }
    }
}

#[cfg(not(unix))]
fn signal_group(_child: &Child, _signal: StopSignal) -> bool {
    false
}

async fn read_pipe<R: AsyncRead + Unpin>(pipe: Option<R>) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        pipe.read_to_end(&mut buf).await?;
    }
    Ok(buf)
}

async fn join_pipe(handle: JoinHandle<std::io::Result<Vec<u8>>>) -> Result<Vec<u8>, GenmapError> {
    let bytes = handle
        .await
        .map_err(|e| GenmapError::Internal(format!("output reader failed: {}", e)))??;
    Ok(bytes)
}

#[async_trait]
impl ToolInvoker for NmapInvoker {
    async fn run(
        &self,
        phase_args: &[String],
        credential: Option<&Secret>,
        target: &ScanTarget,
        cancel: &CancellationToken,
    ) -> Result<ToolOutput, GenmapError> {
        let argv = self.command_line(phase_args, target);
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| GenmapError::Internal("empty command line".into()))?;
        debug!(command = %argv.join(" "), "Launching scan process");

        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        // Own process group, so termination reaches whatever the wrapper forks
        #[cfg(unix)]
        command.process_group(0);
        let mut child = command.spawn().map_err(|e| spawn_error(program, e))?;

        if let Some(mut stdin) = child.stdin.take() {
            if let (Some(_), Some(secret)) = (&self.settings.elevation, credential) {
                let line = format!("{}\n", secret.expose());
                match stdin.write_all(line.as_bytes()).await {
                    Ok(()) => {
                        let _ = stdin.flush().await;
                    }
                    // The wrapper may exit before reading (cached credentials)
                    Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {
                        debug!("Elevation program closed stdin before reading the credential");
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            drop(stdin);
        }

        self.collect(child, cancel).await
    }

    fn command_line(&self, phase_args: &[String], target: &ScanTarget) -> Vec<String> {
        let mut argv = Vec::new();
        if let Some(elevation) = &self.settings.elevation {
            argv.push(elevation.program.clone());
            argv.extend(elevation.args.iter().cloned());
        }
        argv.push(self.settings.tool.clone());
        argv.extend(phase_args.iter().cloned());
        argv.extend(target.to_args());
        argv
    }

    fn tool_name(&self) -> &str {
        &self.settings.tool
    }
}

fn spawn_error(program: &str, e: std::io::Error) -> GenmapError {
    match e.kind() {
        std::io::ErrorKind::NotFound => {
            GenmapError::ToolNotFound(format!("'{}' is not installed or not on PATH", program))
        }
        std::io::ErrorKind::PermissionDenied => {
            GenmapError::PermissionDenied(format!("cannot execute '{}': {}", program, e))
        }
        _ => GenmapError::Io(e),
    }
}
