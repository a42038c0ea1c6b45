//! Shared helpers for integration tests.
//!
//! The converter is exercised against small shell scripts standing in for
//! gpsbabel. All scripts are written once per test binary, before any test
//! spawns a process, so no executable is still open for writing while
//! another thread forks.

#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tempfile::TempDir;

/// Echoes stdin to stdout, like an identity conversion.
pub const ECHO: &str = "echo";
/// Prints its arguments, one per line, without reading stdin.
pub const ARGS: &str = "args";
/// Consumes stdin, writes junk to stdout and a diagnostic to stderr, exits 3.
pub const FAIL: &str = "fail";
/// Echoes stdin and writes a warning to stderr, exits 0.
pub const WARN: &str = "warn";
/// Exits 0 immediately without reading stdin.
pub const EARLY_EXIT: &str = "early-exit";
/// Never exits on its own.
pub const HANG: &str = "hang";
/// Prefixes the echoed stdin with a marker.
pub const MARKER: &str = "marker";
/// Writes a lot of stderr before failing.
pub const NOISY: &str = "noisy";
/// Reads the first 100000 bytes of stdin, prints "ok" and exits 0.
pub const PARTIAL: &str = "partial";

const SCRIPTS: &[(&str, &str)] = &[
    (ECHO, "#!/bin/sh\nexec cat\n"),
    (ARGS, "#!/bin/sh\nprintf '%s\\n' \"$@\"\n"),
    (
        FAIL,
        "#!/bin/sh\ncat >/dev/null\nprintf 'junk'\necho 'X: unsupported input' >&2\nexit 3\n",
    ),
    (WARN, "#!/bin/sh\ncat\necho 'WARNING: no timestamps' >&2\n"),
    (EARLY_EXIT, "#!/bin/sh\nexit 0\n"),
    (HANG, "#!/bin/sh\nexec sleep 30\n"),
    (MARKER, "#!/bin/sh\nprintf 'marker:'\nexec cat\n"),
    (
        NOISY,
        "#!/bin/sh\ncat >/dev/null\nhead -c 200000 /dev/zero | tr '\\0' 'e' >&2\nexit 1\n",
    ),
    (PARTIAL, "#!/bin/sh\nhead -c 100000 >/dev/null\nprintf ok\n"),
];

struct Stubs {
    dir: TempDir,
}

static STUBS: OnceLock<Stubs> = OnceLock::new();

fn stubs() -> &'static Stubs {
    STUBS.get_or_init(|| {
        let dir = TempDir::new().expect("Failed to create stub dir");
        for (name, script) in SCRIPTS {
            let path = dir.path().join(name);
            fs::write(&path, script).expect("Failed to write stub");
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
                .expect("Failed to make stub executable");
        }
        Stubs { dir }
    })
}

/// Path of the named stub executable.
pub fn stub(name: &str) -> PathBuf {
    stubs().dir.path().join(name)
}

/// A path guaranteed not to exist, inside the stub directory.
pub fn missing_executable() -> PathBuf {
    stubs().dir.path().join("missing").join("gpsbabel")
}

/// Directory holding the stubs.
pub fn stub_dir() -> &'static Path {
    stubs().dir.path()
}
