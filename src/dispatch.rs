//! Chat line gating and tokenization.
//!
//! The gate sequence applied by [`crate::bot::Bot::handle_chat`]:
//!
//! 1. channel must be known and not of a disabled (negative) type
//! 2. leading whitespace is trimmed
//! 3. the command prefix must match, ignoring ASCII case
//! 4. the remainder splits into trigger and parameters
//! 5. the trigger must name a registered command
//! 6. the command's effective level must not be negative
//! 7. the caller's level must reach the effective level
//!
//! Steps 1-5 fail silently. Steps 6 and 7 answer the caller with a notice.

use crate::access::AccessLevel;
use crate::error::CommandError;

/// Notice sent when a command is disabled in the channel it was used in.
pub const DISABLED_REPLY: &str = "This command has been disabled in this channel.";

/// Notice sent when the caller's access level is too low.
pub const DENIED_REPLY: &str = "Access Denied.";

/// Why a line produced no dispatch and no reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    UnknownChannel,
    DisabledChannel,
    NoPrefix,
    EmptyTrigger,
    UnknownCommand,
}

/// Result of handling one chat line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Silently dropped.
    Ignored(IgnoreReason),
    /// The command resolved to a negative level here.
    Disabled,
    /// The caller's level was below the command's.
    Denied {
        required: AccessLevel,
        actual: AccessLevel,
    },
    /// The trigger ran and succeeded.
    Executed,
    /// The trigger ran and reported an error to the caller.
    Failed(CommandError),
}

impl DispatchOutcome {
    /// Whether the dispatcher itself sent something back.
    pub fn replied(&self) -> bool {
        !matches!(self, Self::Ignored(_) | Self::Executed)
    }

    /// Static label for log fields.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Ignored(_) => "ignored",
            Self::Disabled => "disabled",
            Self::Denied { .. } => "denied",
            Self::Executed => "executed",
            Self::Failed(_) => "failed",
        }
    }
}

/// A chat line split into trigger and parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Invocation<'a> {
    pub trigger: &'a str,
    /// Everything after the whitespace run following the trigger.
    pub parameters: &'a str,
}

/// Strip `prefix` from the start of `message`, after trimming leading
/// whitespace. Only ASCII letters compare case-insensitively; any other
/// character in the prefix must match exactly, so `É` does not match `é`.
pub fn strip_prefix<'a>(message: &'a str, prefix: &str) -> Option<&'a str> {
    let message = message.trim_start();
    // `get` rejects a cut through a multi-byte character.
    let head = message.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&message[prefix.len()..])
    } else {
        None
    }
}

/// Split text that follows the prefix into trigger and parameters.
pub fn split_trigger(text: &str) -> (&str, &str) {
    let text = text.trim_start();
    match text.find(char::is_whitespace) {
        Some(end) => (&text[..end], text[end..].trim_start()),
        None => (text, ""),
    }
}

/// Run the prefix gate and tokenizer over one chat line.
pub fn tokenize<'a>(message: &'a str, prefix: &str) -> Result<Invocation<'a>, IgnoreReason> {
    let rest = strip_prefix(message, prefix).ok_or(IgnoreReason::NoPrefix)?;
    let (trigger, parameters) = split_trigger(rest);
    if trigger.is_empty() {
        return Err(IgnoreReason::EmptyTrigger);
    }
    Ok(Invocation {
        trigger,
        parameters,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(message: &str, prefix: &str) -> (String, String) {
        let inv = tokenize(message, prefix).expect("line should tokenize");
        (inv.trigger.to_string(), inv.parameters.to_string())
    }

    #[test]
    fn test_tokenize_consumes_whitespace_run() {
        assert_eq!(
            ok("!resolve  host 1.2.3.4", "!"),
            ("resolve".into(), "host 1.2.3.4".into())
        );
    }

    #[test]
    fn test_tokenize_trims_leading_whitespace() {
        assert_eq!(ok("   !help", "!"), ("help".into(), "".into()));
        assert_eq!(ok("\t! help me", "!"), ("help".into(), "me".into()));
    }

    #[test]
    fn test_tokenize_keeps_inner_parameter_spacing() {
        assert_eq!(
            ok("!8ball will it  rain?", "!"),
            ("8ball".into(), "will it  rain?".into())
        );
    }

    #[test]
    fn test_prefix_is_case_insensitive() {
        assert_eq!(ok("BOT: version", "bot:"), ("version".into(), "".into()));
        assert_eq!(ok("bot:version", "BOT:"), ("version".into(), "".into()));
    }

    #[test]
    fn test_missing_or_short_prefix_is_ignored() {
        assert_eq!(tokenize("resolve host", "!"), Err(IgnoreReason::NoPrefix));
        assert_eq!(tokenize("!", "!!"), Err(IgnoreReason::NoPrefix));
        assert_eq!(tokenize("", "!"), Err(IgnoreReason::NoPrefix));
        assert_eq!(tokenize("?help", "!"), Err(IgnoreReason::NoPrefix));
    }

    #[test]
    fn test_prefix_cutting_a_character_is_ignored() {
        // "é" is two bytes; a one-byte prefix would split it.
        assert_eq!(tokenize("é", "e"), Err(IgnoreReason::NoPrefix));
    }

    #[test]
    fn test_prefix_without_trigger_is_ignored() {
        assert_eq!(tokenize("!", "!"), Err(IgnoreReason::EmptyTrigger));
        assert_eq!(tokenize("!   ", "!"), Err(IgnoreReason::EmptyTrigger));
    }

    #[test]
    fn test_empty_prefix_accepts_every_line() {
        assert_eq!(ok("help resolve", ""), ("help".into(), "resolve".into()));
    }

    #[test]
    fn test_outcome_replied() {
        assert!(!DispatchOutcome::Ignored(IgnoreReason::UnknownCommand).replied());
        assert!(!DispatchOutcome::Executed.replied());
        assert!(DispatchOutcome::Disabled.replied());
        assert!(
            DispatchOutcome::Denied {
                required: 2,
                actual: 0
            }
            .replied()
        );
    }

    #[test]
    fn test_non_ascii_prefix_matches_exactly() {
        assert_eq!(strip_prefix("Éhelp", "É"), Some("help"));
        assert_eq!(strip_prefix("éhelp", "É"), None);
        assert_eq!(strip_prefix("BOT:help", "bot:"), Some("help"));
    }
}
