//! Compression of uncovered line numbers into contiguous ranges.

/// An inclusive run of consecutive uncovered lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub start: u32,
    pub end: u32,
}

impl Range {
    /// Fragment anchor for line links: `L3` or `L3-L7`.
    #[must_use]
    pub fn anchor(&self) -> String {
        if self.start == self.end {
            format!("L{}", self.start)
        } else {
            format!("L{}-L{}", self.start, self.end)
        }
    }

    /// Human-readable label: `3` or `3&ndash;7`.
    #[must_use]
    pub fn label(&self) -> String {
        if self.start == self.end {
            self.start.to_string()
        } else {
            format!("{}&ndash;{}", self.start, self.end)
        }
    }
}

/// Collapse line numbers into maximal consecutive ranges. The input need
/// not be sorted or deduplicated.
#[must_use]
pub fn compress(mut lines: Vec<u32>) -> Vec<Range> {
    lines.sort_unstable();
    lines.dedup();

    let mut ranges: Vec<Range> = Vec::new();
    for line in lines {
        match ranges.last_mut() {
            Some(range) if range.end + 1 == line => range.end = line,
            _ => ranges.push(Range {
                start: line,
                end: line,
            }),
        }
    }
    ranges
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compress_empty() {
        assert_eq!(compress(vec![]), vec![]);
    }

    #[test]
    fn test_compress_single() {
        assert_eq!(compress(vec![5]), vec![Range { start: 5, end: 5 }]);
    }

    #[test]
    fn test_compress_mixed() {
        assert_eq!(
            compress(vec![1, 2, 3, 5, 7, 8]),
            vec![
                Range { start: 1, end: 3 },
                Range { start: 5, end: 5 },
                Range { start: 7, end: 8 },
            ]
        );
    }

    #[test]
    fn test_compress_sorts_numerically() {
        // 10 must sort after 2, not between 1 and 2.
        assert_eq!(
            compress(vec![10, 1, 2]),
            vec![Range { start: 1, end: 2 }, Range { start: 10, end: 10 }]
        );
    }

    #[test]
    fn test_compress_dedups() {
        assert_eq!(
            compress(vec![3, 3, 4]),
            vec![Range { start: 3, end: 4 }]
        );
    }

    #[test]
    fn test_anchor_and_label() {
        let single = Range { start: 5, end: 5 };
        assert_eq!(single.anchor(), "L5");
        assert_eq!(single.label(), "5");

        let span = Range { start: 1, end: 3 };
        assert_eq!(span.anchor(), "L1-L3");
        assert_eq!(span.label(), "1&ndash;3");
    }

    #[test]
    fn test_anchor_sequence() {
        let anchors: Vec<String> = compress(vec![1, 2, 3, 5, 7, 8])
            .iter()
            .map(Range::anchor)
            .collect();
        assert_eq!(anchors.join(", "), "L1-L3, L5, L7-L8");
    }
}
