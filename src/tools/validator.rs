//! Denylist filter applied to shell commands before they run.
//!
//! # This is not a security boundary
//!
//! The check is a literal, case-sensitive substring search over a short list of patterns. It is
//! trivially bypassed through aliasing, whitespace variation (`rm  -rf`), quoting, variables or
//! command chaining, and it says nothing about what the command can reach once it runs. It only
//! catches the most obvious accidents. A production deployment should replace it with an allowlist
//! or run commands in a sandbox.

use tracing::warn;

/// Substrings that cause a shell command to be refused, checked in this order.
pub const DENYLIST: &[&str] = &["rm -rf", "sudo", "chmod 777", "dd if=", "> /dev/"];

/// Outcome of checking a command against [`DENYLIST`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// No denylisted pattern found.
    Allowed,
    /// The command contains this denylisted pattern.
    Blocked(&'static str),
}

impl Decision {
    #[must_use]
    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked(_))
    }
}

/// Checks a raw command string against the denylist.
#[must_use]
pub fn validate(command: &str) -> Decision {
    match DENYLIST.iter().copied().find(|pattern| command.contains(pattern)) {
        Some(pattern) => {
            warn!(pattern, "Command matched denylist");
            Decision::Blocked(pattern)
        }
        None => Decision::Allowed,
    }
}
