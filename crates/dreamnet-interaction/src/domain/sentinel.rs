//! Resolution markers embedded in narrator replies.
//!
//! The narrator is told to mark a resolved scene with a literal token.
//! Two scan rules exist and must match the wire contract exactly:
//!
//! * [`ScanStrategy::LastLine`]: only a final line consisting of exactly
//!   `SOLUTION=TRUE` or `SOLUTION=FALSE`, below at least one line of
//!   dialogue, counts. The line is removed.
//! * [`ScanStrategy::Anywhere`]: `SOLUTION=TRUE` anywhere in the reply
//!   counts. Every occurrence is removed.
//!
//! A reply without a marker is never an error; it simply resolves nothing.

/// Marker for a resolved scene.
pub const SOLUTION_TRUE: &str = "SOLUTION=TRUE";

/// Marker for an unresolved scene.
pub const SOLUTION_FALSE: &str = "SOLUTION=FALSE";

/// Where in a reply the marker is looked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStrategy {
    /// The last non-blank line, compared by exact equality.
    LastLine,
    /// Anywhere in the text.
    Anywhere,
}

/// A reply split into displayable dialogue and the recovered signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// The reply with markers removed.
    pub dialogue: String,
    /// Whether a resolving marker was found.
    pub solved: bool,
}

impl ScanStrategy {
    /// Splits `reply` into dialogue and signal.
    #[must_use]
    pub fn extract(self, reply: &str) -> Extraction {
        match self {
            ScanStrategy::LastLine => extract_last_line(reply),
            ScanStrategy::Anywhere => extract_anywhere(reply),
        }
    }
}

fn extract_last_line(reply: &str) -> Extraction {
    let text = reply.trim();
    // A marker needs at least one line of dialogue above it.
    let Some((body, last)) = text.rsplit_once('\n') else {
        return Extraction {
            dialogue: text.to_owned(),
            solved: false,
        };
    };

    let solved = match last.trim() {
        SOLUTION_TRUE => true,
        SOLUTION_FALSE => false,
        _ => {
            return Extraction {
                dialogue: text.to_owned(),
                solved: false,
            };
        }
    };

    Extraction {
        dialogue: body.trim().to_owned(),
        solved,
    }
}

fn extract_anywhere(reply: &str) -> Extraction {
    if !reply.contains(SOLUTION_TRUE) {
        return Extraction {
            dialogue: reply.trim().to_owned(),
            solved: false,
        };
    }

    let mut lines = Vec::new();
    for line in reply.lines() {
        if line.contains(SOLUTION_TRUE) {
            let cleaned = line
                .replace(SOLUTION_TRUE, " ")
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ");
            if !cleaned.is_empty() {
                lines.push(cleaned);
            }
        } else {
            lines.push(line.to_owned());
        }
    }

    Extraction {
        dialogue: lines.join("\n").trim().to_owned(),
        solved: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_line_true_is_stripped_and_solves() {
        let extraction = ScanStrategy::LastLine.extract("Foo bar.\nSOLUTION=TRUE");
        assert_eq!(extraction.dialogue, "Foo bar.");
        assert!(extraction.solved);
    }

    #[test]
    fn test_last_line_false_is_stripped_without_solving() {
        let extraction =
            ScanStrategy::LastLine.extract("I need a clearer order, leader.\nSOLUTION=FALSE\n");
        assert_eq!(extraction.dialogue, "I need a clearer order, leader.");
        assert!(!extraction.solved);
    }

    #[test]
    fn test_missing_marker_keeps_full_text() {
        let reply = "The stones shift.\nThe way is still blocked.";
        let extraction = ScanStrategy::LastLine.extract(reply);
        assert_eq!(extraction.dialogue, reply);
        assert!(!extraction.solved);
    }

    #[test]
    fn test_marker_before_last_line_is_ignored() {
        let reply = "SOLUTION=TRUE\nActually, no.";
        let extraction = ScanStrategy::LastLine.extract(reply);
        assert_eq!(extraction.dialogue, reply);
        assert!(!extraction.solved);
    }

    #[test]
    fn test_last_line_requires_exact_token() {
        for reply in ["Done.\nsolution=true", "Done.\nSOLUTION=TRUE!", "Done. SOLUTION=TRUE"] {
            let extraction = ScanStrategy::LastLine.extract(reply);
            assert!(!extraction.solved, "{reply:?} must not solve");
            assert_eq!(extraction.dialogue, reply);
        }
    }

    #[test]
    fn test_last_line_tolerates_surrounding_whitespace() {
        let extraction = ScanStrategy::LastLine.extract("Heave!\n   SOLUTION=TRUE  \n\n");
        assert_eq!(extraction.dialogue, "Heave!");
        assert!(extraction.solved);
    }

    #[test]
    fn test_marker_only_reply_resolves_nothing() {
        for reply in ["SOLUTION=TRUE", "  SOLUTION=TRUE\n\n"] {
            let extraction = ScanStrategy::LastLine.extract(reply);
            assert!(!extraction.solved, "{reply:?} must not solve");
            assert_eq!(extraction.dialogue, "SOLUTION=TRUE");
        }
    }

    #[test]
    fn test_anywhere_removes_inline_token() {
        let extraction = ScanStrategy::Anywhere.extract("Great news! SOLUTION=TRUE Let's go.");
        assert_eq!(extraction.dialogue, "Great news! Let's go.");
        assert!(extraction.solved);
    }

    #[test]
    fn test_anywhere_removes_every_occurrence_and_marker_lines() {
        let extraction =
            ScanStrategy::Anywhere.extract("SOLUTION=TRUE The crown is ours.\nOnward!\nSOLUTION=TRUE");
        assert_eq!(extraction.dialogue, "The crown is ours.\nOnward!");
        assert!(extraction.solved);
    }

    #[test]
    fn test_anywhere_without_token_resolves_nothing() {
        let extraction = ScanStrategy::Anywhere.extract("  What a strange relic.  ");
        assert_eq!(extraction.dialogue, "What a strange relic.");
        assert!(!extraction.solved);
    }
}
