//! Flag schemas and their reconstruction into command-line tokens.
//!
//! A schema is an ordered list of [`FlagSpec`]s. Parsed values are kept in
//! [`ResolvedFlags`], which only ever holds flags the caller set explicitly.
//! [`reconstruct`] walks the schema in order and renders every set flag back
//! into `--name=value` tokens, so the token order depends on nothing but the
//! schema.

use std::collections::HashMap;

use crate::error::{Error, Result};

/// Value kind of a flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagKind {
    Bool,
    String,
    Int,
    Int64,
    Float64,
    StringSlice,
}

/// Declaration of a single flag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlagSpec {
    /// Canonical long name, used when rendering.
    pub name: &'static str,
    /// Additional long names accepted when parsing.
    pub aliases: &'static [&'static str],
    pub short: Option<char>,
    pub kind: FlagKind,
    pub help: &'static str,
    /// Default shown in help; a defaulted flag is never considered set.
    pub default: Option<&'static str>,
}

impl FlagSpec {
    pub const fn new(name: &'static str, kind: FlagKind, help: &'static str) -> Self {
        Self {
            name,
            aliases: &[],
            short: None,
            kind,
            help,
            default: None,
        }
    }

    pub const fn short(mut self, short: char) -> Self {
        self.short = Some(short);
        self
    }

    pub const fn aliases(mut self, aliases: &'static [&'static str]) -> Self {
        self.aliases = aliases;
        self
    }

    pub const fn default_value(mut self, default: &'static str) -> Self {
        self.default = Some(default);
        self
    }
}

/// A resolved flag value.
#[derive(Debug, Clone, PartialEq)]
pub enum FlagValue {
    Bool(bool),
    String(String),
    Int(i64),
    Float(f64),
    StringList(Vec<String>),
}

/// Flags the caller set explicitly, keyed by canonical name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedFlags {
    values: HashMap<String, FlagValue>,
}

impl ResolvedFlags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `name` as set to `value`, replacing any earlier value.
    pub fn set(&mut self, name: impl Into<String>, value: FlagValue) -> &mut Self {
        self.values.insert(name.into(), value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&FlagValue> {
        self.values.get(name)
    }

    pub fn is_set(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Renders every set flag of `schema` into command-line tokens.
///
/// Tokens follow schema order. A `false` boolean produces no token even
/// though it was set.
pub fn reconstruct<'a, I>(schema: I, flags: &ResolvedFlags) -> Result<Vec<String>>
where
    I: IntoIterator<Item = &'a FlagSpec>,
{
    let mut args = Vec::new();

    for spec in schema {
        let Some(value) = flags.get(spec.name) else {
            continue;
        };
        let name = spec.name;

        match (spec.kind, value) {
            (FlagKind::Bool, FlagValue::Bool(enabled)) => {
                if *enabled {
                    args.push(format!("--{name}"));
                }
            }
            (FlagKind::String, FlagValue::String(s)) => args.push(format!("--{name}={s}")),
            (FlagKind::Int | FlagKind::Int64, FlagValue::Int(n)) => {
                args.push(format!("--{name}={n}"))
            }
            (FlagKind::Float64, FlagValue::Float(f)) => args.push(format!("--{name}={f:.6}")),
            (FlagKind::StringSlice, FlagValue::StringList(values)) => {
                args.extend(values.iter().map(|v| format!("--{name}={v}")));
            }
            (kind, _) => {
                return Err(Error::UnsupportedFlagType {
                    flag: name.to_string(),
                    kind,
                });
            }
        }
    }

    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &[FlagSpec] = &[
        FlagSpec::new("background", FlagKind::Bool, "run in background").short('d'),
        FlagSpec::new("storage", FlagKind::String, "object storage type"),
        FlagSpec::new("buffer-size", FlagKind::Int, "total read/write buffering in MiB"),
        FlagSpec::new("capacity", FlagKind::Int64, "hard quota in GiB"),
        FlagSpec::new("free-space-ratio", FlagKind::Float64, "min free space"),
        FlagSpec::new("option", FlagKind::StringSlice, "extra FUSE option").short('o'),
    ];

    #[test]
    fn test_reconstruct_all_kinds() {
        let mut flags = ResolvedFlags::new();
        flags
            .set("background", FlagValue::Bool(true))
            .set("storage", FlagValue::String("s3".into()))
            .set("buffer-size", FlagValue::Int(300))
            .set("capacity", FlagValue::Int(1 << 40))
            .set("free-space-ratio", FlagValue::Float(0.1))
            .set(
                "option",
                FlagValue::StringList(vec!["allow_other".into(), "ro".into()]),
            );

        assert_eq!(
            reconstruct(SCHEMA, &flags).unwrap(),
            vec![
                "--background",
                "--storage=s3",
                "--buffer-size=300",
                "--capacity=1099511627776",
                "--free-space-ratio=0.100000",
                "--option=allow_other",
                "--option=ro",
            ]
        );
    }

    #[test]
    fn test_reconstruct_follows_schema_order() {
        let mut forward = ResolvedFlags::new();
        forward
            .set("storage", FlagValue::String("file".into()))
            .set("capacity", FlagValue::Int(10))
            .set("background", FlagValue::Bool(true));

        let mut backward = ResolvedFlags::new();
        backward
            .set("background", FlagValue::Bool(true))
            .set("capacity", FlagValue::Int(10))
            .set("storage", FlagValue::String("file".into()));

        let expected = vec!["--background", "--storage=file", "--capacity=10"];
        assert_eq!(reconstruct(SCHEMA, &forward).unwrap(), expected);
        assert_eq!(reconstruct(SCHEMA, &backward).unwrap(), expected);
    }

    #[test]
    fn test_false_bool_is_omitted() {
        let mut flags = ResolvedFlags::new();
        flags.set("background", FlagValue::Bool(false));

        assert!(flags.is_set("background"));
        assert!(reconstruct(SCHEMA, &flags).unwrap().is_empty());
    }

    #[test]
    fn test_unset_and_unknown_flags_are_ignored() {
        let mut flags = ResolvedFlags::new();
        flags.set("not-in-schema", FlagValue::Bool(true));
        assert!(reconstruct(SCHEMA, &flags).unwrap().is_empty());
        assert!(reconstruct(SCHEMA, &ResolvedFlags::new()).unwrap().is_empty());
    }

    #[test]
    fn test_string_list_keeps_every_value_in_order() {
        let values: Vec<String> = ["c", "a", "b", "a"].iter().map(|s| s.to_string()).collect();
        let mut flags = ResolvedFlags::new();
        flags.set("option", FlagValue::StringList(values));

        assert_eq!(
            reconstruct(SCHEMA, &flags).unwrap(),
            vec!["--option=c", "--option=a", "--option=b", "--option=a"]
        );
    }

    #[test]
    fn test_float_never_uses_exponent() {
        let mut flags = ResolvedFlags::new();
        flags.set("free-space-ratio", FlagValue::Float(1e-7));
        assert_eq!(
            reconstruct(SCHEMA, &flags).unwrap(),
            vec!["--free-space-ratio=0.000000"]
        );

        flags.set("free-space-ratio", FlagValue::Float(2.5e7));
        assert_eq!(
            reconstruct(SCHEMA, &flags).unwrap(),
            vec!["--free-space-ratio=25000000.000000"]
        );
    }

    #[test]
    fn test_kind_mismatch_is_rejected() {
        let mut flags = ResolvedFlags::new();
        flags.set("buffer-size", FlagValue::String("300".into()));

        let err = reconstruct(SCHEMA, &flags).unwrap_err();
        assert!(matches!(
            err,
            Error::UnsupportedFlagType { ref flag, kind: FlagKind::Int } if flag == "buffer-size"
        ));
    }
}
