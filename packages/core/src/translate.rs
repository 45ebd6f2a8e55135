//! Translation of pantheon commands into native commands.
//!
//! Each pantheon command maps to exactly one native command of the same tool.
//! Translation validates the metadata paths, rewrites metadata locations to
//! the `badger://` scheme and rebuilds the caller's flags from the inherited
//! schema.

use std::fmt;
use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};
use crate::flags::{self, FlagSpec, ResolvedFlags};
use crate::path::{self, MetaLocation};
use crate::schema::{
    CLONE_FLAGS, FORCED_FORMAT_FLAGS, FORCED_TRASH_DAYS, FORMAT_FLAGS, MOUNT_FLAGS, UMOUNT_FLAGS,
};

/// A pantheon subcommand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlternateCommand {
    Format,
    Mount,
    Umount,
    Checkpoint,
}

impl AlternateCommand {
    pub const ALL: [AlternateCommand; 4] = [
        Self::Format,
        Self::Mount,
        Self::Umount,
        Self::Checkpoint,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Format => "format",
            Self::Mount => "mount",
            Self::Umount => "umount",
            Self::Checkpoint => "checkpoint",
        }
    }

    pub fn from_name(name: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|cmd| cmd.name() == name)
            .ok_or_else(|| Error::UnknownCommand {
                name: name.to_string(),
            })
    }

    /// The native command this one translates into.
    pub fn target(self) -> TargetCommand {
        match self {
            Self::Format => TargetCommand::Format,
            Self::Mount => TargetCommand::Mount,
            Self::Umount => TargetCommand::Umount,
            Self::Checkpoint => TargetCommand::Clone,
        }
    }

    /// Positional argument names, in order.
    pub fn positionals(self) -> &'static [&'static str] {
        match self {
            Self::Format => &["META-DIR", "NAME"],
            Self::Mount => &["META-DIR", "MOUNTPOINT"],
            Self::Umount => &["MOUNTPOINT"],
            Self::Checkpoint => &["OLD-META-DIR", "NEW-META-DIR"],
        }
    }

    /// Flags accepted by this command, inherited from the target's schema.
    ///
    /// `format` withholds the flags it forces; `checkpoint` forwards nothing.
    pub fn flags(self) -> impl Iterator<Item = &'static FlagSpec> {
        let schema: &'static [FlagSpec] = match self {
            Self::Checkpoint => &[],
            other => other.target().flags(),
        };
        schema.iter().filter(move |spec| {
            self != Self::Format || !FORCED_FORMAT_FLAGS.contains(&spec.name)
        })
    }
}

impl fmt::Display for AlternateCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A native command of the underlying tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetCommand {
    Format,
    Mount,
    Umount,
    Clone,
}

impl TargetCommand {
    pub const ALL: [TargetCommand; 4] = [Self::Format, Self::Mount, Self::Umount, Self::Clone];

    pub fn name(self) -> &'static str {
        match self {
            Self::Format => "format",
            Self::Mount => "mount",
            Self::Umount => "umount",
            Self::Clone => "clone",
        }
    }

    pub fn from_name(name: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|cmd| cmd.name() == name)
            .ok_or_else(|| Error::UnknownCommand {
                name: name.to_string(),
            })
    }

    pub fn positionals(self) -> &'static [&'static str] {
        match self {
            Self::Format => &["META-URL", "NAME"],
            Self::Mount => &["META-URL", "MOUNTPOINT"],
            Self::Umount => &["MOUNTPOINT"],
            Self::Clone => &["SRC", "DST"],
        }
    }

    pub fn flags(self) -> &'static [FlagSpec] {
        match self {
            Self::Format => FORMAT_FLAGS,
            Self::Mount => MOUNT_FLAGS,
            Self::Umount => UMOUNT_FLAGS,
            Self::Clone => CLONE_FLAGS,
        }
    }
}

impl fmt::Display for TargetCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A parsed pantheon command.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub command: AlternateCommand,
    pub positionals: Vec<String>,
    pub flags: ResolvedFlags,
}

impl Invocation {
    pub fn new(command: AlternateCommand, positionals: Vec<String>) -> Self {
        Self {
            command,
            positionals,
            flags: ResolvedFlags::new(),
        }
    }

    pub fn with_flags(mut self, flags: ResolvedFlags) -> Self {
        self.flags = flags;
        self
    }

    fn positional(&self, index: usize) -> Result<&str> {
        self.positionals
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| Error::MissingArgument {
                command: self.command.to_string(),
                name: self
                    .command
                    .positionals()
                    .get(index)
                    .copied()
                    .unwrap_or("ARG")
                    .to_string(),
            })
    }

    fn reconstruct_flags(&self) -> Result<Vec<String>> {
        flags::reconstruct(self.command.flags(), &self.flags)
    }
}

/// A native command ready to be run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatedCommand {
    pub subcommand: TargetCommand,
    pub args: Vec<String>,
}

impl TranslatedCommand {
    /// Full argument vector: the subcommand name followed by its arguments.
    pub fn argv(&self) -> Vec<String> {
        let mut argv = Vec::with_capacity(self.args.len() + 1);
        argv.push(self.subcommand.name().to_string());
        argv.extend(self.args.iter().cloned());
        argv
    }
}

impl fmt::Display for TranslatedCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.argv().join(" "))
    }
}

/// Translates a pantheon invocation into the native command it stands for.
///
/// Path preconditions are checked here, before anything is spawned.
pub fn translate(invocation: &Invocation) -> Result<TranslatedCommand> {
    let args = match invocation.command {
        AlternateCommand::Format => {
            let meta = MetaLocation::new(invocation.positional(0)?);
            let name = invocation.positional(1)?;
            meta.validate(false)?;

            let mut args = vec![
                meta.encoded(),
                name.to_string(),
                format!("--trash-days={FORCED_TRASH_DAYS}"),
            ];
            args.extend(invocation.reconstruct_flags()?);
            args
        }
        AlternateCommand::Mount => {
            let meta = MetaLocation::new(invocation.positional(0)?);
            let mount_point = invocation.positional(1)?;
            meta.validate(true)?;

            let mut args = vec![meta.encoded(), mount_point.to_string()];
            args.extend(invocation.reconstruct_flags()?);
            args
        }
        AlternateCommand::Umount => {
            let mut args = vec![invocation.positional(0)?.to_string()];
            args.extend(invocation.reconstruct_flags()?);
            args
        }
        AlternateCommand::Checkpoint => {
            let old = invocation.positional(0)?;
            let new = invocation.positional(1)?;
            // Plain directories handed to `clone`: a `?` is part of the name.
            path::validate(Path::new(old), true)?;
            path::validate(Path::new(new), false)?;

            vec![old.to_string(), new.to_string()]
        }
    };

    let translated = TranslatedCommand {
        subcommand: invocation.command.target(),
        args,
    };
    debug!(command = %invocation.command, target = %translated, "translated pantheon command");
    Ok(translated)
}
