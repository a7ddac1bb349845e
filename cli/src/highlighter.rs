use aoxim_core::lexer::{Lexer, TokenKind};
use nu_ansi_term::{Color, Style};
use reedline::StyledText;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Class {
    Plain,
    Keyword,
    Constant,
    Number,
    String,
    Comment,
    Error,
}

impl Class {
    fn style(self) -> Style {
        let fg = match self {
            Class::Plain => Color::White,
            Class::Keyword => Color::Magenta,
            Class::Constant | Class::Number => Color::Cyan,
            Class::String => Color::Green,
            Class::Comment => Color::DarkGray,
            Class::Error => Color::Red,
        };
        Style::new().fg(fg)
    }

    fn of(kind: &TokenKind<'_>) -> Class {
        match kind {
            TokenKind::True | TokenKind::False | TokenKind::NullPtr => Class::Constant,
            TokenKind::Int(_) | TokenKind::Double(_) => Class::Number,
            TokenKind::Str(_) | TokenKind::Char(_) => Class::String,
            TokenKind::Error(_) => Class::Error,
            kind if kind.is_keyword() => Class::Keyword,
            _ => Class::Plain,
        }
    }
}

/// Colors REPL input by token class.
pub struct Highlighter;

impl Highlighter {
    /// Text between tokens is whitespace, possibly ending in a comment.
    fn push_gap(output: &mut StyledText, gap: &str) {
        if gap.is_empty() {
            return;
        }
        match gap.find('#') {
            Some(hash) => {
                output.push((Class::Plain.style(), gap[..hash].to_string()));
                output.push((Class::Comment.style(), gap[hash..].to_string()));
            }
            None => output.push((Class::Plain.style(), gap.to_string())),
        }
    }
}

impl reedline::Highlighter for Highlighter {
    fn highlight(&self, line: &str, _cursor: usize) -> StyledText {
        let mut output = StyledText::new();
        let mut curr_end = 0;

        for token in Lexer::new(line) {
            let span = token.span.0;
            if span.start < curr_end || span.end > line.len() {
                break;
            }
            Self::push_gap(&mut output, &line[curr_end..span.start]);
            output.push((Class::of(&token.kind).style(), line[span.clone()].to_string()));
            curr_end = span.end;
        }
        Self::push_gap(&mut output, line.get(curr_end..).unwrap_or_default());

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use reedline::Highlighter as _;

    fn classes(line: &str) -> Vec<(Style, String)> {
        Highlighter.highlight(line, 0).buffer
    }

    #[test]
    fn test_highlight_covers_whole_line() {
        let line = "if x > 1 { print(\"big\") } # note";
        let text: String = classes(line).into_iter().map(|(_, s)| s).collect();
        assert_eq!(text, line);
    }

    #[test]
    fn test_highlight_classes() {
        let parts = classes("while True");
        assert_eq!(parts[0], (Class::Keyword.style(), "while".to_string()));
        assert_eq!(parts[2], (Class::Constant.style(), "True".to_string()));

        let parts = classes("x # c");
        assert_eq!(parts.last(), Some(&(Class::Comment.style(), "# c".to_string())));
    }
}
