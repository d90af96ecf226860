//! Incremental search over a process log.

use crate::domain::LogLine;

/// Case-insensitive substring search with a wrapping cursor.
#[derive(Debug, Clone, Default)]
pub struct LogSearch {
    query: String,
    needle: String,
    matches: Vec<usize>,
    current: usize,
}

impl LogSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Set the query and recompute matches against `lines`.
    ///
    /// The cursor goes back to the first match.
    pub fn set_query(&mut self, query: &str, lines: &[LogLine]) {
        self.query = query.to_string();
        self.needle = query.to_lowercase();
        self.current = 0;
        self.rescan(lines);
    }

    /// Recompute matches after `lines` grew, keeping the cursor in range.
    pub fn rescan(&mut self, lines: &[LogLine]) {
        self.matches = if self.needle.is_empty() {
            Vec::new()
        } else {
            lines
                .iter()
                .enumerate()
                .filter(|(_, line)| line.text.to_lowercase().contains(&self.needle))
                .map(|(idx, _)| idx)
                .collect()
        };
        if self.current >= self.matches.len() {
            self.current = 0;
        }
    }

    /// Indices of matching lines, in log order.
    pub fn matches(&self) -> &[usize] {
        &self.matches
    }

    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    /// Line index under the cursor.
    pub fn current(&self) -> Option<usize> {
        self.matches.get(self.current).copied()
    }

    /// Position of the cursor among the matches, zero-based.
    pub fn current_position(&self) -> Option<usize> {
        (!self.matches.is_empty()).then_some(self.current)
    }

    /// Move to the next match, wrapping to the first.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<usize> {
        if self.matches.is_empty() {
            return None;
        }
        self.current = (self.current + 1) % self.matches.len();
        self.current()
    }

    /// Move to the previous match, wrapping to the last.
    pub fn prev(&mut self) -> Option<usize> {
        if self.matches.is_empty() {
            return None;
        }
        self.current = self
            .current
            .checked_sub(1)
            .unwrap_or(self.matches.len() - 1);
        self.current()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(texts: &[&str]) -> Vec<LogLine> {
        texts.iter().map(|t| LogLine::stdout(*t)).collect()
    }

    #[test]
    fn test_case_insensitive_matches() {
        let log = lines(&["Compiling", "ERROR: port in use", "ok", "another error"]);
        let mut search = LogSearch::new();
        search.set_query("error", &log);
        assert_eq!(search.matches(), &[1, 3]);
        assert_eq!(search.current(), Some(1));
    }

    #[test]
    fn test_navigation_wraps() {
        let log = lines(&["a1", "b", "a2", "a3"]);
        let mut search = LogSearch::new();
        search.set_query("A", &log);

        assert_eq!(search.next(), Some(2));
        assert_eq!(search.next(), Some(3));
        assert_eq!(search.next(), Some(0));
        assert_eq!(search.prev(), Some(3));
        assert_eq!(search.current_position(), Some(2));
    }

    #[test]
    fn test_empty_query_has_no_matches() {
        let log = lines(&["anything"]);
        let mut search = LogSearch::new();
        search.set_query("", &log);
        assert!(search.matches().is_empty());
        assert_eq!(search.next(), None);
        assert_eq!(search.prev(), None);
        assert_eq!(search.current_position(), None);
    }

    #[test]
    fn test_rescan_picks_up_new_lines() {
        let mut log = lines(&["ready"]);
        let mut search = LogSearch::new();
        search.set_query("warn", &log);
        assert_eq!(search.match_count(), 0);

        log.push(LogLine::stderr("WARN deprecated option"));
        search.rescan(&log);
        assert_eq!(search.current(), Some(1));
    }
}
