//! Free-text query parser collaborator
//!
//! The free-text field of a search request is handed untouched to a
//! pluggable parser; its output becomes a full-text match rule. The
//! default implementation passes the text through after trimming.

/// Turns a raw free-text field into a connector query string
pub trait TextQueryParser: Send + Sync {
    fn parse(&self, raw: &str) -> String;
}

/// Default parser: trims and returns the text verbatim
#[derive(Debug, Default)]
pub struct PassthroughParser;

impl TextQueryParser for PassthroughParser {
    fn parse(&self, raw: &str) -> String {
        raw.trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passthrough_trims() {
        assert_eq!(PassthroughParser.parse("  urgent report "), "urgent report");
    }
}
