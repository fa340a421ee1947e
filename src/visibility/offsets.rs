// Offset normalization
//
// The report backend counts offsets in Unicode code points. Rust slices by
// UTF-8 byte and the dashboard slices by UTF-16 code unit, so every mention
// offset goes through here before it touches the text.

/// Position of a code point boundary in all three unit systems
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Boundary {
    pub code_point: usize,
    pub byte: usize,
    pub utf16: usize,
}

/// Boundary lookup table for one text, built in a single pass.
#[derive(Debug, Clone)]
pub struct OffsetTable {
    boundaries: Vec<Boundary>,
}

impl OffsetTable {
    pub fn new(text: &str) -> Self {
        let mut boundaries = Vec::with_capacity(text.len() + 1);
        let mut utf16 = 0;
        for (code_point, (byte, ch)) in text.char_indices().enumerate() {
            boundaries.push(Boundary {
                code_point,
                byte,
                utf16,
            });
            utf16 += ch.len_utf16();
        }
        boundaries.push(Boundary {
            code_point: boundaries.len(),
            byte: text.len(),
            utf16,
        });
        Self { boundaries }
    }

    /// Number of code points in the text
    pub fn len(&self) -> usize {
        self.boundaries.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Boundary for a raw backend offset. Negative offsets clamp to the
    /// start, oversize ones to the end.
    pub fn boundary(&self, code_point_offset: i64) -> Boundary {
        let index = usize::try_from(code_point_offset.max(0))
            .unwrap_or(usize::MAX)
            .min(self.len());
        if i64::try_from(index).map_or(true, |i| i != code_point_offset) {
            tracing::debug!(
                offset = code_point_offset,
                clamped = index,
                "mention offset outside response"
            );
        }
        self.boundaries[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Plain walks over the text, checked against the table.
    fn code_point_to_utf16_index(text: &str, code_point_index: usize) -> usize {
        text.chars()
            .take(code_point_index)
            .map(char::len_utf16)
            .sum()
    }

    fn code_point_to_byte_index(text: &str, code_point_index: usize) -> usize {
        text.char_indices()
            .nth(code_point_index)
            .map_or(text.len(), |(byte, _)| byte)
    }

    #[test]
    fn test_bmp_text_is_identity() {
        let table = OffsetTable::new("Nike and Adidas");
        assert_eq!(table.boundary(0).utf16, 0);
        assert_eq!(table.boundary(4).utf16, 4);
        assert_eq!(table.boundary(9).byte, 9);
    }

    #[test]
    fn test_astral_characters_take_two_units() {
        let text = "🎉Nike🎉";
        let table = OffsetTable::new(text);
        assert_eq!(table.boundary(1).utf16, 2);
        assert_eq!(table.boundary(5).utf16, 6);
        assert_eq!(table.boundary(6).utf16, 8);

        let start = table.boundary(1).byte;
        let end = table.boundary(5).byte;
        assert_eq!((start, end), (4, 8));
        assert_eq!(&text[start..end], "Nike");
    }

    #[test]
    fn test_oversize_index_clamps() {
        let text = "é🎉";
        let table = OffsetTable::new(text);
        assert_eq!(table.boundary(100).utf16, 3);
        assert_eq!(table.boundary(100).byte, text.len());
        assert_eq!(OffsetTable::new("").boundary(3).utf16, 0);
    }

    #[test]
    fn test_table_matches_walks() {
        let text = "a🎉bé中𝄞c";
        let table = OffsetTable::new(text);
        assert_eq!(table.len(), text.chars().count());
        for cp in 0..=table.len() + 2 {
            let boundary = table.boundary(cp as i64);
            assert_eq!(boundary.utf16, code_point_to_utf16_index(text, cp));
            assert_eq!(boundary.byte, code_point_to_byte_index(text, cp));
            assert!(text.is_char_boundary(boundary.byte));
        }
    }

    #[test]
    fn test_table_clamps_negative_offsets() {
        let table = OffsetTable::new("abc");
        assert_eq!(table.boundary(-5).byte, 0);
        assert_eq!(table.boundary(i64::MAX).byte, 3);
        assert!(OffsetTable::new("").is_empty());
    }
}
