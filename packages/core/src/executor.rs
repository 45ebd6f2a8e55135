//! Re-execution of the running binary with a translated command.
//!
//! [`SubprocessRunner`] resolves the current executable and hands the argument
//! vector to an [`Invoker`]. The real invoker, [`ProcessInvoker`], spawns the
//! child with inherited standard streams and relays SIGINT/SIGTERM to it until
//! it exits. Tests substitute their own invoker so nothing gets spawned.

use std::io;
use std::os::unix::process::{CommandExt, ExitStatusExt};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};

use nix::errno::Errno;
use nix::sys::wait::{Id, WaitPidFlag, waitid};
use nix::unistd::Pid;
use snafu::ResultExt;
use tracing::debug;

use crate::error::{ExecutableResolutionSnafu, IoResultExt, Result};
use crate::signal::{SignalBlock, SignalRelay};
use crate::translate::TranslatedCommand;

/// How a child process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildExit {
    Success,
    /// Non-zero exit. A child killed by signal N reports `128 + N`.
    Failure { code: i32 },
}

impl ChildExit {
    pub fn from_status(status: ExitStatus) -> Self {
        match (status.code(), status.signal()) {
            (Some(0), _) => Self::Success,
            (Some(code), _) => Self::Failure { code },
            (None, Some(signal)) => Self::Failure { code: 128 + signal },
            (None, None) => Self::Failure { code: 1 },
        }
    }

    /// The exit code this process should terminate with.
    pub fn code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::Failure { code } => code,
        }
    }

    pub fn success(self) -> bool {
        self == Self::Success
    }
}

/// Runs an executable with an argument vector and reports how it ended.
pub trait Invoker {
    fn invoke(&self, executable: &Path, args: &[String]) -> Result<ChildExit>;
}

/// Invoker that spawns a real process.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessInvoker;

impl Invoker for ProcessInvoker {
    fn invoke(&self, executable: &Path, args: &[String]) -> Result<ChildExit> {
        ChildProcess::spawn(executable, args)?.wait()
    }
}

/// A spawned child together with the relay forwarding signals to it.
struct ChildProcess {
    child: Child,
    command: String,
    relay: SignalRelay,
}

impl ChildProcess {
    fn spawn(executable: &Path, args: &[String]) -> Result<Self> {
        let command = executable.display().to_string();

        let block = SignalBlock::new()?;
        let child_mask = block.previous_mask();

        let mut process = Command::new(executable);
        process
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        // SAFETY: pthread_sigmask is async-signal-safe.
        unsafe {
            process.pre_exec(move || child_mask.thread_set_mask().map_err(io::Error::from));
        }

        let mut child = process.spawn().command_context(command.as_str())?;
        debug!(command = %command, ?args, pid = child.id(), "spawned child");

        let relay = match SignalRelay::start(block, Pid::from_raw(child.id() as i32)) {
            Ok(relay) => relay,
            Err(err) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(err);
            }
        };

        Ok(Self {
            child,
            command,
            relay,
        })
    }

    fn wait(self) -> Result<ChildExit> {
        let Self {
            mut child,
            command,
            relay,
        } = self;

        // Leave the child unreaped until the relay is gone so its pid
        // cannot be reused by a forwarded signal.
        if let Err(errno) = wait_exited(Pid::from_raw(child.id() as i32)) {
            debug!(%errno, command = %command, "waitid failed, reaping directly");
        }
        drop(relay);
        let status = child.wait();

        let exit = ChildExit::from_status(status.wait_context(command.as_str())?);
        debug!(command = %command, code = exit.code(), "child exited");
        Ok(exit)
    }
}

/// Blocks until `pid` has exited, without reaping it.
fn wait_exited(pid: Pid) -> nix::Result<()> {
    let flags = WaitPidFlag::WEXITED | WaitPidFlag::WNOWAIT;
    loop {
        match waitid(Id::Pid(pid), flags) {
            Err(Errno::EINTR) => continue,
            result => return result.map(drop),
        }
    }
}

/// Runs translated commands by re-executing the current binary.
#[derive(Debug, Clone, Default)]
pub struct SubprocessRunner<I = ProcessInvoker> {
    invoker: I,
    executable: Option<PathBuf>,
}

impl SubprocessRunner<ProcessInvoker> {
    /// Creates a runner that spawns real processes.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<I: Invoker> SubprocessRunner<I> {
    /// Creates a runner backed by a specific invoker.
    pub fn with_invoker(invoker: I) -> Self {
        Self {
            invoker,
            executable: None,
        }
    }

    /// Runs `executable` instead of the current binary.
    pub fn executable(mut self, executable: impl Into<PathBuf>) -> Self {
        self.executable = Some(executable.into());
        self
    }

    pub fn invoker(&self) -> &I {
        &self.invoker
    }

    /// Runs `command` and reports how the child ended.
    ///
    /// A failing child is not an error: it is returned as
    /// [`ChildExit::Failure`] so the caller can exit with the same code.
    pub fn run(&self, command: &TranslatedCommand) -> Result<ChildExit> {
        let executable = match &self.executable {
            Some(path) => path.clone(),
            None => std::env::current_exe().context(ExecutableResolutionSnafu)?,
        };

        debug!(executable = %executable.display(), %command, "running native command");
        self.invoker.invoke(&executable, &command.argv())
    }
}
