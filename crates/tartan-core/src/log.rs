//! Append-only trace sinks
//!
//! The evaluator records which rules fired, and why, by appending lines to a
//! [`LogSink`]. Sinks are write-only from the evaluator's side; what happens
//! to the lines afterwards is the caller's business.

use std::fmt;

/// An append-only, ordered sink of text entries
pub trait LogSink {
    /// Append one entry
    fn append(&mut self, entry: &str);
}

/// One element per entry
impl LogSink for Vec<String> {
    fn append(&mut self, entry: &str) {
        self.push(entry.to_string());
    }
}

/// Entries are newline-terminated
impl LogSink for String {
    fn append(&mut self, entry: &str) {
        self.push_str(entry);
        self.push('\n');
    }
}

impl<S: LogSink + ?Sized> LogSink for &mut S {
    fn append(&mut self, entry: &str) {
        (**self).append(entry);
    }
}

/// Owned trace log for callers that just want the lines back
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraceLog {
    entries: Vec<String>,
}

impl TraceLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries in the order they were appended
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing has been appended
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consume the log, returning its entries
    pub fn into_entries(self) -> Vec<String> {
        self.entries
    }
}

impl LogSink for TraceLog {
    fn append(&mut self, entry: &str) {
        self.entries.push(entry.to_string());
    }
}

impl fmt::Display for TraceLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            writeln!(f, "{}", entry)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_two(sink: &mut dyn LogSink) {
        sink.append("first");
        sink.append("second");
    }

    #[test]
    fn test_vec_sink() {
        let mut sink: Vec<String> = Vec::new();
        write_two(&mut sink);
        assert_eq!(sink, vec!["first", "second"]);
    }

    #[test]
    fn test_string_sink_is_newline_terminated() {
        let mut sink = String::from("earlier\n");
        write_two(&mut sink);
        assert_eq!(sink, "earlier\nfirst\nsecond\n");
    }

    #[test]
    fn test_trace_log() {
        let mut log = TraceLog::new();
        assert!(log.is_empty());
        write_two(&mut log);
        assert_eq!(log.len(), 2);
        assert_eq!(log.entries()[1], "second");
        assert_eq!(log.to_string(), "first\nsecond\n");
    }

    #[test]
    fn test_forwarding_through_mut_ref() {
        let mut inner = TraceLog::new();
        {
            let mut outer = &mut inner;
            LogSink::append(&mut outer, "via reference");
        }
        assert_eq!(inner.into_entries(), vec!["via reference"]);
    }
}
