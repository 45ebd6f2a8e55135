//! Forwarding of termination signals to a child process.
//!
//! SIGINT and SIGTERM are blocked in the waiting thread with a [`SignalBlock`]
//! before the child is spawned, so a signal arriving during spawn stays
//! pending instead of terminating the parent. Once the child runs, a
//! [`SignalRelay`] collects them on a dedicated thread with `sigwait` and
//! forwards each one to the child. Dropping the relay stops the thread and
//! restores the previous signal mask.
//!
//! The relay thread inherits the blocked mask from the thread that starts it.
//! Any other thread of the process that does not block these signals may
//! still receive them with their default disposition.

use std::os::unix::thread::JoinHandleExt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use nix::sys::pthread::pthread_kill;
use nix::sys::signal::{SigSet, SigmaskHow, Signal, kill};
use nix::unistd::Pid;
use snafu::ResultExt;
use tracing::debug;

use crate::error::{Result, SignalMaskSnafu, SignalRelaySnafu};

/// Signals relayed to the child.
pub const RELAYED_SIGNALS: [Signal; 2] = [Signal::SIGINT, Signal::SIGTERM];

/// The relayed signals as a set.
pub fn relayed_signals() -> SigSet {
    let mut set = SigSet::empty();
    for signal in RELAYED_SIGNALS {
        set.add(signal);
    }
    set
}

/// Guard that keeps SIGINT/SIGTERM blocked in the calling thread.
///
/// Must be dropped on the thread that created it.
#[derive(Debug)]
pub struct SignalBlock {
    previous_mask: SigSet,
}

impl SignalBlock {
    pub fn new() -> Result<Self> {
        let previous_mask = relayed_signals()
            .thread_swap_mask(SigmaskHow::SIG_BLOCK)
            .context(SignalMaskSnafu)?;
        Ok(Self { previous_mask })
    }

    /// The mask in effect before blocking, for a child to restore.
    pub fn previous_mask(&self) -> SigSet {
        self.previous_mask
    }
}

impl Drop for SignalBlock {
    fn drop(&mut self) {
        if let Err(errno) = self.previous_mask.thread_set_mask() {
            debug!(%errno, "failed to restore signal mask");
        }
    }
}

/// Guard that forwards SIGINT/SIGTERM to a process until dropped.
#[derive(Debug)]
pub struct SignalRelay {
    stop: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
    _block: SignalBlock,
}

impl SignalRelay {
    /// Starts forwarding to `target`.
    ///
    /// Signals that arrived while `block` was held are forwarded too. The
    /// mask is restored when the relay is dropped, or right away if it
    /// fails to start.
    pub fn start(block: SignalBlock, target: Pid) -> Result<Self> {
        let stop = Arc::new(AtomicBool::new(false));
        let worker = {
            let stop = Arc::clone(&stop);
            thread::Builder::new()
                .name("signal-relay".to_string())
                .spawn(move || relay(relayed_signals(), target, &stop))
                .context(SignalRelaySnafu)?
        };

        Ok(Self {
            stop,
            worker: Some(worker),
            _block: block,
        })
    }
}

fn relay(signals: SigSet, target: Pid, stop: &AtomicBool) {
    loop {
        let signal = match signals.wait() {
            Ok(signal) => signal,
            Err(errno) => {
                debug!(%errno, "sigwait failed, signal relay exiting");
                return;
            }
        };
        if stop.load(Ordering::Acquire) {
            return;
        }

        // The child may already be gone; nothing to do then.
        match kill(target, signal) {
            Ok(()) => debug!(signal = signal.as_str(), pid = target.as_raw(), "forwarded signal"),
            Err(errno) => debug!(
                signal = signal.as_str(),
                pid = target.as_raw(),
                %errno,
                "failed to forward signal"
            ),
        }
    }
}

impl Drop for SignalRelay {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Release);

        if let Some(worker) = self.worker.take() {
            // Wake the worker out of sigwait; with `stop` set it exits
            // without forwarding.
            let _ = pthread_kill(worker.as_pthread_t(), Signal::SIGTERM);
            let _ = worker.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command;

    fn blocks_relayed_signals() -> bool {
        let mask = SigSet::thread_get_mask().unwrap();
        RELAYED_SIGNALS.iter().all(|signal| mask.contains(*signal))
    }

    #[test]
    fn test_relayed_signals() {
        let set = relayed_signals();
        assert!(set.contains(Signal::SIGINT));
        assert!(set.contains(Signal::SIGTERM));
        assert!(!set.contains(Signal::SIGKILL));
    }

    fn start(child: &std::process::Child) -> SignalRelay {
        let block = SignalBlock::new().unwrap();
        SignalRelay::start(block, Pid::from_raw(child.id() as i32)).unwrap()
    }

    #[test]
    fn test_block_guard_restores_mask() {
        assert!(!blocks_relayed_signals());
        let block = SignalBlock::new().unwrap();
        assert!(blocks_relayed_signals());
        assert!(!block.previous_mask().contains(Signal::SIGTERM));
        drop(block);
        assert!(!blocks_relayed_signals());
    }

    #[test]
    fn test_drop_restores_mask() {
        assert!(!blocks_relayed_signals());

        let mut child = Command::new("sleep").arg("5").spawn().unwrap();
        let relay = start(&child);
        assert!(blocks_relayed_signals());

        drop(relay);
        assert!(!blocks_relayed_signals());

        // The wake-up signal went to the relay thread, not to the child.
        assert!(child.try_wait().unwrap().is_none());
        child.kill().unwrap();
        child.wait().unwrap();
    }

    #[test]
    fn test_repeated_relays_do_not_leak() {
        for _ in 0..16 {
            let mut child = Command::new("true").spawn().unwrap();
            let relay = start(&child);
            child.wait().unwrap();
            drop(relay);
        }
        assert!(!blocks_relayed_signals());
    }
}
