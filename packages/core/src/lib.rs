//! pantheon-core: PantheonFS commands on top of the native command set.
//!
//! The `pantheon` commands are an opinionated view of the native `format`,
//! `mount`, `umount` and `clone` commands. Nothing here formats or mounts
//! anything: a pantheon command is validated, translated into the equivalent
//! native command and run by re-executing the current binary, with signals
//! forwarded to the child and its exit code passed through.
//!
//! # Modules
//!
//! - [`path`]: Absolute-path and existence preconditions, query suffixes
//! - [`flags`]: Flag declarations, resolved values and token reconstruction
//! - [`schema`]: Flag schemas of the native commands
//! - [`translate`]: Pantheon command to native command translation
//! - [`command`]: Clap commands generated from the schemas
//! - [`signal`]: SIGINT/SIGTERM relay to a child process
//! - [`executor`]: Re-execution of the current binary
//! - [`error`]: Error types
//!
//! # Example
//!
//! ```no_run
//! use pantheon_core::{command, executor::SubprocessRunner, translate};
//!
//! let matches = command::pantheon_command()
//!     .get_matches_from(["pantheon", "mount", "/var/lib/juicefs/myfs", "/mnt/jfs", "-d"]);
//! if let Some((name, sub)) = matches.subcommand() {
//!     let cmd = translate::AlternateCommand::from_name(name).unwrap();
//!     let invocation = command::invocation_from_matches(cmd, sub).unwrap();
//!
//!     // mount badger:///var/lib/juicefs/myfs /mnt/jfs --background
//!     let native = translate::translate(&invocation).unwrap();
//!     let exit = SubprocessRunner::new().run(&native).unwrap();
//!     std::process::exit(exit.code());
//! }
//! ```

pub mod command;
pub mod error;
pub mod executor;
pub mod flags;
pub mod path;
pub mod schema;
pub mod signal;
pub mod translate;

// Re-export commonly used types
pub use error::{Error, Result};
pub use executor::{ChildExit, Invoker, ProcessInvoker, SubprocessRunner};
pub use flags::{FlagKind, FlagSpec, FlagValue, ResolvedFlags};
pub use translate::{AlternateCommand, Invocation, TargetCommand, TranslatedCommand, translate};
