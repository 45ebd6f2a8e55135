//! Command-line surface built from the flag schemas.
//!
//! Both the pantheon commands and the native commands are generated from the
//! same [`FlagSpec`] lists, which is what makes flag inheritance exact: a flag
//! accepted by a native command is accepted, with the same name, aliases and
//! value kind, by the pantheon command translating into it.

use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};

use crate::error::{Error, Result};
use crate::flags::{self, FlagKind, FlagSpec, FlagValue, ResolvedFlags};
use crate::translate::{AlternateCommand, Invocation, TargetCommand};

/// The `pantheon` command group.
pub fn pantheon_command() -> Command {
    Command::new("pantheon")
        .about("Controlling PantheonFS related features")
        .subcommands(AlternateCommand::ALL.map(alternate_command))
}

/// A single pantheon subcommand.
pub fn alternate_command(cmd: AlternateCommand) -> Command {
    let (about, examples) = match cmd {
        AlternateCommand::Format => (
            "Format a volume in PantheonFS mode",
            "Examples:
# Format a simple volume with local metadata
$ pantheon-cli pantheon format /var/lib/juicefs/myfs myfs

# Format with custom storage options
$ pantheon-cli pantheon format /var/lib/juicefs/myfs myfs --storage s3 --bucket https://mybucket.s3.amazonaws.com",
        ),
        AlternateCommand::Mount => (
            "Mount a volume in PantheonFS mode",
            "Examples:
# Mount a pantheon volume
$ pantheon-cli pantheon mount /var/lib/juicefs/myfs /mnt/jfs

# Mount in background
$ pantheon-cli pantheon mount /var/lib/juicefs/myfs /mnt/jfs -d",
        ),
        AlternateCommand::Umount => (
            "Unmount a volume",
            "Examples:
# Unmount a volume
$ pantheon-cli pantheon umount /mnt/jfs

# Force unmount
$ pantheon-cli pantheon umount /mnt/jfs -f",
        ),
        AlternateCommand::Checkpoint => (
            "Create a checkpoint of the entire filesystem by copying metadata to a new directory",
            "The old metadata should not be mounted when creating a checkpoint.

Examples:
$ pantheon-cli pantheon checkpoint /var/lib/juicefs/myfs /var/lib/juicefs/myfs-branch2",
        ),
    };

    with_schema(
        Command::new(cmd.name()).about(about).after_help(examples),
        cmd.positionals(),
        cmd.flags(),
    )
}

/// A native command, as seen by the re-executed child.
pub fn native_command(target: TargetCommand) -> Command {
    let about = match target {
        TargetCommand::Format => "Format a volume",
        TargetCommand::Mount => "Mount a volume",
        TargetCommand::Umount => "Unmount a volume",
        TargetCommand::Clone => "Clone a file or directory without copying the underlying data",
    };

    with_schema(
        Command::new(target.name()).about(about),
        target.positionals(),
        target.flags().iter(),
    )
}

fn with_schema<'a>(
    command: Command,
    positionals: &'static [&'static str],
    schema: impl Iterator<Item = &'a FlagSpec>,
) -> Command {
    let command = positionals.iter().fold(command, |command, name| {
        command.arg(Arg::new(*name).value_name(*name).required(true))
    });
    command.args_override_self(true).args(schema.map(flag_arg))
}

/// Builds the clap argument for one flag.
///
/// Booleans take an optional `=true`/`=false` so that an explicit `false`
/// is still distinguishable from an unset flag.
pub fn flag_arg(spec: &FlagSpec) -> Arg {
    let mut arg = Arg::new(spec.name).long(spec.name).help(spec.help);

    if let Some(short) = spec.short {
        arg = arg.short(short);
    }
    if !spec.aliases.is_empty() {
        arg = arg.visible_aliases(spec.aliases.iter().copied());
    }

    arg = match spec.kind {
        FlagKind::Bool => arg
            .action(ArgAction::Set)
            .value_parser(value_parser!(bool))
            .num_args(0..=1)
            .require_equals(true)
            .default_missing_value("true"),
        FlagKind::String => arg
            .action(ArgAction::Set)
            .value_parser(value_parser!(String)),
        FlagKind::Int | FlagKind::Int64 => {
            arg.action(ArgAction::Set).value_parser(value_parser!(i64))
        }
        FlagKind::Float64 => arg.action(ArgAction::Set).value_parser(value_parser!(f64)),
        FlagKind::StringSlice => arg
            .action(ArgAction::Append)
            .value_parser(value_parser!(String)),
    };

    if let Some(default) = spec.default {
        arg = arg.default_value(default);
    }
    arg
}

/// Collects the flags of `schema` that were set explicitly.
///
/// Values that come from a declared default are left out.
pub fn resolve_flags<'a, I>(schema: I, matches: &ArgMatches) -> Result<ResolvedFlags>
where
    I: IntoIterator<Item = &'a FlagSpec>,
{
    let mut flags = ResolvedFlags::new();

    for spec in schema {
        match matches.value_source(spec.name) {
            None | Some(ValueSource::DefaultValue) => continue,
            Some(_) => {}
        }

        let value = match spec.kind {
            FlagKind::Bool => one::<bool>(matches, spec)?.map(FlagValue::Bool),
            FlagKind::String => one::<String>(matches, spec)?.map(FlagValue::String),
            FlagKind::Int | FlagKind::Int64 => one::<i64>(matches, spec)?.map(FlagValue::Int),
            FlagKind::Float64 => one::<f64>(matches, spec)?.map(FlagValue::Float),
            FlagKind::StringSlice => matches
                .try_get_many::<String>(spec.name)
                .map_err(|_| mismatch(spec))?
                .map(|values| FlagValue::StringList(values.cloned().collect())),
        };

        if let Some(value) = value {
            flags.set(spec.name, value);
        }
    }

    Ok(flags)
}

fn one<T>(matches: &ArgMatches, spec: &FlagSpec) -> Result<Option<T>>
where
    T: Clone + Send + Sync + 'static,
{
    matches
        .try_get_one::<T>(spec.name)
        .map(|value| value.cloned())
        .map_err(|_| mismatch(spec))
}

fn mismatch(spec: &FlagSpec) -> Error {
    Error::UnsupportedFlagType {
        flag: spec.name.to_string(),
        kind: spec.kind,
    }
}

fn positionals(names: &[&str], matches: &ArgMatches) -> Vec<String> {
    names
        .iter()
        .map_while(|name| matches.get_one::<String>(name).cloned())
        .collect()
}

/// Turns the matches of a pantheon subcommand into an [`Invocation`].
pub fn invocation_from_matches(cmd: AlternateCommand, matches: &ArgMatches) -> Result<Invocation> {
    let flags = resolve_flags(cmd.flags(), matches)?;
    Ok(Invocation::new(cmd, positionals(cmd.positionals(), matches)).with_flags(flags))
}

/// Rebuilds the argument vector of a native command from its matches.
pub fn native_argv(target: TargetCommand, matches: &ArgMatches) -> Result<Vec<String>> {
    let flags = resolve_flags(target.flags(), matches)?;

    let mut argv = vec![target.name().to_string()];
    argv.extend(positionals(target.positionals(), matches));
    argv.extend(flags::reconstruct(target.flags(), &flags)?);
    Ok(argv)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::translate;
    use tempfile::tempdir;

    fn parse(cmd: AlternateCommand, args: &[&str]) -> Invocation {
        let matches = alternate_command(cmd)
            .try_get_matches_from(std::iter::once(cmd.name()).chain(args.iter().copied()))
            .unwrap();
        invocation_from_matches(cmd, &matches).unwrap()
    }

    #[test]
    fn test_commands_are_well_formed() {
        pantheon_command().debug_assert();
        for target in TargetCommand::ALL {
            native_command(target).debug_assert();
        }
    }

    #[test]
    fn test_defaults_are_not_set() {
        let inv = parse(AlternateCommand::Mount, &["/data/myfs", "/mnt/jfs"]);
        assert_eq!(inv.positionals, vec!["/data/myfs", "/mnt/jfs"]);
        assert!(inv.flags.is_empty());
    }

    #[test]
    fn test_explicit_default_value_is_set() {
        let inv = parse(
            AlternateCommand::Mount,
            &["/data/myfs", "/mnt/jfs", "--buffer-size=300"],
        );
        assert_eq!(inv.flags.get("buffer-size"), Some(&FlagValue::Int(300)));
    }

    #[test]
    fn test_bool_forms() {
        let inv = parse(AlternateCommand::Mount, &["/m", "/mnt/jfs", "-d"]);
        assert_eq!(inv.flags.get("background"), Some(&FlagValue::Bool(true)));

        let inv = parse(AlternateCommand::Mount, &["/m", "/mnt/jfs", "--writeback=false"]);
        assert_eq!(inv.flags.get("writeback"), Some(&FlagValue::Bool(false)));
        assert!(flags::reconstruct(AlternateCommand::Mount.flags(), &inv.flags)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_bool_does_not_swallow_positional() {
        let inv = parse(AlternateCommand::Mount, &["-d", "/data/myfs", "/mnt/jfs"]);
        assert_eq!(inv.positionals, vec!["/data/myfs", "/mnt/jfs"]);
    }

    #[test]
    fn test_alias_resolves_to_canonical_name() {
        let inv = parse(AlternateCommand::Mount, &["/m", "/mnt/jfs", "--ro"]);
        assert_eq!(inv.flags.get("read-only"), Some(&FlagValue::Bool(true)));
    }

    #[test]
    fn test_repeated_and_typed_values() {
        let inv = parse(
            AlternateCommand::Mount,
            &[
                "/m",
                "/mnt/jfs",
                "-o",
                "allow_other",
                "--option=fsname=jfs",
                "--free-space-ratio",
                "0.25",
                "--cache-size=2048",
            ],
        );
        assert_eq!(
            inv.flags.get("option"),
            Some(&FlagValue::StringList(vec![
                "allow_other".into(),
                "fsname=jfs".into()
            ]))
        );
        assert_eq!(inv.flags.get("free-space-ratio"), Some(&FlagValue::Float(0.25)));
        assert_eq!(inv.flags.get("cache-size"), Some(&FlagValue::Int(2048)));
    }

    #[test]
    fn test_int_flags_are_64_bit() {
        let inv = parse(
            AlternateCommand::Mount,
            &["/m", "/mnt/jfs", "--buffer-size=3000000000"],
        );
        assert_eq!(
            inv.flags.get("buffer-size"),
            Some(&FlagValue::Int(3_000_000_000))
        );
        assert_eq!(
            flags::reconstruct(AlternateCommand::Mount.flags(), &inv.flags).unwrap(),
            vec!["--buffer-size=3000000000"]
        );
    }

    #[test]
    fn test_last_occurrence_wins() {
        let inv = parse(
            AlternateCommand::Umount,
            &["/mnt/jfs", "--force", "--force=false"],
        );
        assert_eq!(inv.flags.get("force"), Some(&FlagValue::Bool(false)));
    }

    #[test]
    fn test_format_rejects_forced_trash_days() {
        let result = alternate_command(AlternateCommand::Format).try_get_matches_from([
            "format",
            "/data/myfs",
            "myfs",
            "--trash-days=5",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_pantheon_without_subcommand_parses() {
        let matches = pantheon_command().try_get_matches_from(["pantheon"]).unwrap();
        assert!(matches.subcommand().is_none());
    }

    #[test]
    fn test_checkpoint_takes_no_flags() {
        let result = alternate_command(AlternateCommand::Checkpoint)
            .try_get_matches_from(["checkpoint", "/a", "/b", "--preserve"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_command_line_order_does_not_matter() {
        let dir = tempdir().unwrap();
        let meta = dir.path().to_str().unwrap();

        let a = parse(
            AlternateCommand::Mount,
            &[meta, "/mnt/jfs", "--writeback", "--subdir=/x", "-d"],
        );
        let b = parse(
            AlternateCommand::Mount,
            &[meta, "/mnt/jfs", "-d", "--subdir=/x", "--writeback"],
        );

        let expected = vec![
            format!("badger://{meta}"),
            "/mnt/jfs".to_string(),
            "--background".to_string(),
            "--subdir=/x".to_string(),
            "--writeback".to_string(),
        ];
        assert_eq!(translate(&a).unwrap().args, expected);
        assert_eq!(translate(&b).unwrap().args, expected);
    }

    #[test]
    fn test_native_argv_round_trips_translation() {
        let matches = native_command(TargetCommand::Format)
            .try_get_matches_from([
                "format",
                "badger:///data/myfs",
                "myfs",
                "--trash-days=999",
                "--storage",
                "s3",
            ])
            .unwrap();

        assert_eq!(
            native_argv(TargetCommand::Format, &matches).unwrap(),
            vec![
                "format",
                "badger:///data/myfs",
                "myfs",
                "--storage=s3",
                "--trash-days=999",
            ]
        );
    }

    #[test]
    fn test_pantheon_group_dispatch() {
        let matches = pantheon_command()
            .try_get_matches_from(["pantheon", "umount", "/mnt/jfs", "-f"])
            .unwrap();
        let (name, sub) = matches.subcommand().unwrap();
        let cmd = AlternateCommand::from_name(name).unwrap();
        let inv = invocation_from_matches(cmd, sub).unwrap();

        assert_eq!(translate(&inv).unwrap().to_string(), "umount /mnt/jfs --force");
    }
}
