//! Flag schemas of the native commands.
//!
//! Pantheon commands inherit these lists instead of redefining them, so every
//! flag the native command accepts is forwarded as-is. Order matters: it is
//! the order flags are rendered in.

use crate::flags::FlagKind::{Bool, Float64, Int, Int64, String, StringSlice};
use crate::flags::FlagSpec;

/// Flags of the native `format` command.
pub const FORMAT_FLAGS: &[FlagSpec] = &[
    FlagSpec::new("block-size", Int, "size of block in KiB").default_value("4096"),
    FlagSpec::new(
        "capacity",
        Int64,
        "hard quota of the volume limiting its usage of space in GiB",
    ),
    FlagSpec::new(
        "inodes",
        Int64,
        "hard quota of the volume limiting its number of inodes",
    ),
    FlagSpec::new("compress", String, "compression algorithm (lz4, zstd, none)")
        .default_value("none"),
    FlagSpec::new("shards", Int, "store the blocks into N buckets by hash of key")
        .default_value("0"),
    FlagSpec::new("storage", String, "object storage type (e.g. s3, gs, oss, cos)")
        .default_value("file"),
    FlagSpec::new("bucket", String, "the bucket URL of object storage to store data"),
    FlagSpec::new("access-key", String, "access key for object storage"),
    FlagSpec::new("secret-key", String, "secret key for object storage"),
    FlagSpec::new("session-token", String, "session token for object storage"),
    FlagSpec::new("storage-class", String, "the default storage class"),
    FlagSpec::new("encrypt-rsa-key", String, "a path to RSA private key (PEM)"),
    FlagSpec::new("encrypt-algo", String, "encrypt algorithm (aes256gcm-rsa, chacha20-rsa)")
        .default_value("aes256gcm-rsa"),
    FlagSpec::new("hash-prefix", Bool, "distribute objects by adding a hash prefix to keys"),
    FlagSpec::new(
        "trash-days",
        Int,
        "number of days after which removed files will be permanently deleted",
    )
    .default_value("1"),
    FlagSpec::new("enable-acl", Bool, "enable POSIX ACL"),
    FlagSpec::new("force", Bool, "overwrite existing format"),
    FlagSpec::new("no-update", Bool, "don't update existing volume"),
];

/// Flags of the native `mount` command.
pub const MOUNT_FLAGS: &[FlagSpec] = &[
    FlagSpec::new("background", Bool, "run in background").short('d'),
    FlagSpec::new("no-syslog", Bool, "disable syslog"),
    FlagSpec::new("log", String, "path of log file when running in background"),
    FlagSpec::new("update-fstab", Bool, "add / update entry in /etc/fstab"),
    FlagSpec::new("option", StringSlice, "extra FUSE option, may be repeated").short('o'),
    FlagSpec::new("subdir", String, "mount a sub-directory as root"),
    FlagSpec::new("read-only", Bool, "allow lookup/read operations only").aliases(&["ro"]),
    FlagSpec::new("no-bgjob", Bool, "disable background jobs (clean-up, backup, etc.)"),
    FlagSpec::new("buffer-size", Int, "total read/write buffering in MiB").default_value("300"),
    FlagSpec::new("prefetch", Int, "prefetch N blocks in parallel").default_value("1"),
    FlagSpec::new("writeback", Bool, "upload objects in background"),
    FlagSpec::new("upload-limit", Int64, "bandwidth limit for upload in Mbps"),
    FlagSpec::new("download-limit", Int64, "bandwidth limit for download in Mbps"),
    FlagSpec::new("max-uploads", Int, "number of connections to upload").default_value("20"),
    FlagSpec::new("cache-dir", String, "directory paths of local cache, separated by ':'"),
    FlagSpec::new("cache-size", Int64, "size of cached object for read in MiB")
        .default_value("102400"),
    FlagSpec::new("free-space-ratio", Float64, "min free space (ratio)").default_value("0.1"),
    FlagSpec::new("cache-partial-only", Bool, "cache only random/small read"),
    FlagSpec::new("metrics", String, "address to export metrics")
        .default_value("127.0.0.1:9567"),
    FlagSpec::new("no-usage-report", Bool, "do not send usage report"),
];

/// Flags of the native `umount` command.
pub const UMOUNT_FLAGS: &[FlagSpec] = &[
    FlagSpec::new("force", Bool, "force unmount a busy mount point").short('f'),
    FlagSpec::new("flush", Bool, "wait for all staging chunks to be flushed"),
];

/// Flags of the native `clone` command.
pub const CLONE_FLAGS: &[FlagSpec] = &[
    FlagSpec::new("preserve", Bool, "preserve the UID, GID, and mode of the file").short('p'),
];

/// Flags `pantheon format` sets itself and never takes from the caller.
pub const FORCED_FORMAT_FLAGS: &[&str] = &["trash-days"];

/// Trash retention forced on every pantheon volume.
pub const FORCED_TRASH_DAYS: i64 = 999;
