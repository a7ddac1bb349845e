//! Bracket balancing for multi-line REPL input, on top of the core lexer.

use aoxim_core::lexer::{LexError, Lexer, TokenKind};
use reedline::{ValidationResult, Validator};

/// Nesting depth at the end of `buffer`, or `None` when a string literal is
/// still open.
pub fn calculate_depth(buffer: &str) -> Option<usize> {
    let mut depth: isize = 0;

    for token in Lexer::new(buffer) {
        match token.kind {
            TokenKind::LBrace | TokenKind::LBracket | TokenKind::LParen => depth += 1,
            TokenKind::RBrace | TokenKind::RBracket | TokenKind::RParen => depth -= 1,
            TokenKind::Error(LexError::UnterminatedString(_)) => return None,
            _ => {}
        }
    }

    Some(depth.max(0) as usize)
}

/// Keeps reading lines while brackets are open or a string is unterminated.
pub struct InputValidator;

impl Validator for InputValidator {
    fn validate(&self, line: &str) -> ValidationResult {
        match calculate_depth(line) {
            Some(0) => ValidationResult::Complete,
            _ => ValidationResult::Incomplete,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_balanced_input() {
        assert_eq!(calculate_depth("f(x) = x + 1"), Some(0));
        assert_eq!(calculate_depth("xs = [1, (2, 3)]"), Some(0));
        assert_eq!(calculate_depth("\"{\" + \"(\""), Some(0));
    }

    #[test]
    fn test_open_brackets() {
        assert_eq!(calculate_depth("while True {"), Some(1));
        assert_eq!(calculate_depth("f(g(["), Some(3));
        assert_eq!(calculate_depth("x = 1 # {"), Some(0));
    }

    #[test]
    fn test_extra_closing_brackets_count_as_balanced() {
        assert_eq!(calculate_depth(")}"), Some(0));
    }

    #[test]
    fn test_unterminated_string() {
        assert_eq!(calculate_depth("s = \"abc"), None);
        assert!(matches!(
            InputValidator.validate("s = \"abc"),
            ValidationResult::Incomplete
        ));
        assert!(matches!(InputValidator.validate("1 + 2"), ValidationResult::Complete));
    }
}
