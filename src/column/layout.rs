//! Side-by-side composition of multi-line column blocks.

/// Where shorter blocks get their filler lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Padding {
    /// Blank lines go above the content so last lines line up. Used for
    /// headers, whose bottom row sits right over the data.
    Above,
    /// Blank lines go below the content so first lines line up. Used for
    /// data, whose first row is the one belonging to the time column.
    Below,
}

/// One child's lines and the blank filler matching its width.
pub struct Block {
    pub lines: Vec<String>,
    pub blank: String,
}

/// Joins blocks row by row with a single space between cells.
///
/// The result has as many rows as the tallest block.
pub fn compose(blocks: &[Block], padding: Padding) -> Vec<String> {
    let height = blocks.iter().map(|b| b.lines.len()).max().unwrap_or(0);

    (0..height)
        .map(|row| {
            blocks
                .iter()
                .map(|block| {
                    let offset = match padding {
                        Padding::Above => height - block.lines.len(),
                        Padding::Below => 0,
                    };
                    row.checked_sub(offset)
                        .and_then(|at| block.lines.get(at))
                        .unwrap_or(&block.blank)
                        .as_str()
                })
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(lines: &[&str], width: usize) -> Block {
        Block {
            lines: lines.iter().map(|s| s.to_string()).collect(),
            blank: " ".repeat(width),
        }
    }

    #[test]
    fn test_header_pushes_short_blocks_down() {
        let blocks = [block(&["cons"], 4), block(&["acns", "idle"], 4)];
        assert_eq!(compose(&blocks, Padding::Above), vec!["     acns", "cons idle"]);
    }

    #[test]
    fn test_data_pushes_short_blocks_up() {
        let blocks = [block(&["  12"], 4), block(&["   1", "   2"], 4)];
        assert_eq!(compose(&blocks, Padding::Below), vec!["  12    1", "        2"]);
    }

    #[test]
    fn test_equal_heights() {
        let blocks = [block(&["cons", "conn"], 4), block(&["acns", "idle"], 4)];
        let rows = compose(&blocks, Padding::Above);
        assert_eq!(rows, vec!["cons acns", "conn idle"]);
        assert!(rows.iter().all(|r| r.len() == 9));
    }

    #[test]
    fn test_empty() {
        assert!(compose(&[], Padding::Below).is_empty());
    }
}
