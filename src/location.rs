use serde::{Deserialize, Serialize};

/// Sourcecode location.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    pub(super) row: usize,
    pub(super) column: usize,
}

impl Location {
    pub fn fmt_with(
        &self,
        f: &mut std::fmt::Formatter,
        e: &impl std::fmt::Display,
    ) -> std::fmt::Result {
        write!(f, "{} at line {} column {}", e, self.row(), self.column())
    }

    pub fn new(row: usize, column: usize) -> Self {
        Location { row, column }
    }

    /// Current row
    pub fn row(&self) -> usize {
        self.row
    }

    /// Current column
    pub fn column(&self) -> usize {
        self.column
    }
}

/// Maps byte offsets to 1-based line/column locations.
///
/// Built once per detection pass from the text the tree was parsed from, so
/// that violation spans can be reported as human-readable positions.
#[derive(Debug)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self { line_starts }
    }

    pub fn location(&self, offset: usize) -> Location {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next_line) => next_line - 1,
        };
        Location::new(line + 1, offset - self.line_starts[line] + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_index() {
        let index = LineIndex::new("ab\ncd\n\nef");
        assert_eq!(index.location(0), Location::new(1, 1));
        assert_eq!(index.location(1), Location::new(1, 2));
        assert_eq!(index.location(3), Location::new(2, 1));
        assert_eq!(index.location(6), Location::new(3, 1));
        assert_eq!(index.location(7), Location::new(4, 1));
    }
}
