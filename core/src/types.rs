/// Row/column pair addressing a cell on a board of known column width.
pub type RowCol = (usize, usize);

/// Flat index of `(row, col)` on a board `columns` wide.
pub const fn rc_to_index((row, col): RowCol, columns: usize) -> usize {
    row * columns + col
}

/// Row/column pair of a flat index on a board `columns` wide.
pub const fn index_to_rc(index: usize, columns: usize) -> RowCol {
    (index / columns, index % columns)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_conversion_roundtrip() {
        for index in 0..45 {
            assert_eq!(rc_to_index(index_to_rc(index, 9), 9), index);
        }
    }

    #[test]
    fn index_conversion_examples() {
        assert_eq!(index_to_rc(0, 9), (0, 0));
        assert_eq!(index_to_rc(10, 9), (1, 1));
        assert_eq!(index_to_rc(18, 9), (2, 0));
        assert_eq!(rc_to_index((2, 0), 9), 18);
    }
}
