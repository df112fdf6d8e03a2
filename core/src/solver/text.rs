use crate::cell::Value;
use crate::error::{GameError, Result};

use super::MatchStep;

/// Parses a board dump: digits `1..=9`, whitespace ignored. The digit count
/// must be a non-zero multiple of `columns`.
pub fn parse_board(text: &str, columns: usize) -> Result<Vec<Value>> {
    let mut values = Vec::new();
    for ch in text.chars() {
        if ch.is_whitespace() {
            continue;
        }
        values.push(Value::from_digit(ch).ok_or(GameError::InvalidDigit { digit: ch })?);
    }
    if values.is_empty() || values.len() % columns != 0 {
        return Err(GameError::InvalidBoardShape {
            len: values.len(),
            columns,
        });
    }
    Ok(values)
}

/// Formats one solution as its steps joined by `|`.
pub fn format_solution(steps: &[MatchStep]) -> String {
    steps
        .iter()
        .map(MatchStep::to_string)
        .collect::<Vec<_>>()
        .join("|")
}

/// Formats a batch of solutions, one per line.
pub fn format_solutions(solutions: &[Vec<MatchStep>]) -> String {
    solutions
        .iter()
        .map(|steps| format_solution(steps))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_digits_and_skips_whitespace() {
        let values = parse_board("123 456\n789\n", 9).unwrap();
        assert_eq!(values.len(), 9);
        assert_eq!(values[0], Value::One);
        assert_eq!(values[8], Value::Nine);
    }

    #[test]
    fn rejects_non_digit() {
        let err = parse_board("12345678x", 9).unwrap_err();
        assert_eq!(err, GameError::InvalidDigit { digit: 'x' });
    }

    #[test]
    fn rejects_ragged_shape() {
        let err = parse_board("12345", 9).unwrap_err();
        assert_eq!(err, GameError::InvalidBoardShape { len: 5, columns: 9 });
        let err = parse_board("  \n ", 9).unwrap_err();
        assert_eq!(err, GameError::InvalidBoardShape { len: 0, columns: 9 });
    }

    #[test]
    fn formats_steps_one_based_pipe_joined() {
        let steps = vec![
            MatchStep::from_indices(0, 1, 9),
            MatchStep::from_indices(9, 18, 9),
        ];
        assert_eq!(format_solution(&steps), "1,1,1,2|2,1,3,1");
        assert_eq!(
            format_solutions(&[steps.clone(), steps]),
            "1,1,1,2|2,1,3,1\n1,1,1,2|2,1,3,1"
        );
    }
}
