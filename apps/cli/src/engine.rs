//! Hand-off of native commands to the engine binary.
//!
//! The native commands are what a pantheon command re-executes this binary
//! with. They are implemented by the engine, so the process replaces itself
//! with it: signals and the exit status then belong to the engine directly.

use std::os::unix::process::CommandExt;
use std::path::Path;
use std::process::Command;

use pantheon_core::Error;
use tracing::debug;

/// Replaces the current process with `engine argv...`.
///
/// Only returns if the exec itself failed.
pub fn exec(engine: &Path, argv: &[String]) -> Error {
    debug!(engine = %engine.display(), ?argv, "handing native command to engine");

    let source = Command::new(engine).args(argv).exec();
    Error::CommandExecution {
        command: engine.display().to_string(),
        source,
    }
}
