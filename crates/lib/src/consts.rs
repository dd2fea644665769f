//! Shared constants: CLI flags, environment variable names, exit codes.

/// Exit status for a failed build (`-1` truncated to a byte on POSIX).
pub const FAILURE_EXIT_CODE: u8 = 255;

/// Flags that print the target listing when given as the first argument.
pub const HELP_FLAGS: &[&str] = &["-h", "--help"];

/// Flags that enable verbose mode when given as the first argument.
pub const VERBOSE_FLAGS: &[&str] = &["-v", "--verbose"];

/// Environment variable that starts every build in verbose mode.
pub const VERBOSE_ENV: &str = "MKRS_VERBOSE";

/// Environment variable selecting the color mode (`auto`, `always`, `never`).
pub const COLOR_ENV: &str = "MKRS_COLOR";

/// Environment variable overriding the shell used by the shell-run variants.
pub const SHELL_ENV: &str = "MKRS_SHELL";

/// Go toolchain executable.
pub const GO: &str = "go";

/// Cargo executable.
pub const CARGO: &str = "cargo";
