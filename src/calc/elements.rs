use logos::Logos;

/// Classes of calculator element. The calculator only needs the text, but
/// the class decides where a `-` belongs.
#[derive(Logos, Debug, Copy, Clone, Eq, PartialEq)]
enum ElementKind {
    #[regex(r"[0-9.]+")]
    Number,

    /// A function, constant, or stored equation, with an optional `:id`.
    #[regex(r"[a-z]+(:[0-9]+)?")]
    Word,

    #[regex(r":[0-9]+")]
    Id,

    #[regex(r"[<>=]+")]
    Comparison,

    #[token("-")]
    Minus,

    #[regex(r"[^a-z0-9.:<>=\-]")]
    Other,

    #[error]
    Invalid,
}

/// A `-` is part of the number after it unless it follows a digit or `)`.
fn is_unary(text: &str, at: usize) -> bool {
    text[..at]
        .chars()
        .next_back()
        .map_or(true, |c| !c.is_ascii_digit() && c != ')')
}

/// First char boundary at or after `at`.
fn char_end(text: &str, mut at: usize) -> usize {
    while !text.is_char_boundary(at) {
        at += 1;
    }
    at
}

/// Splits an equation into numbers, words, comparisons and single
/// characters, after lowercasing it and removing all whitespace.
pub fn get_elements(text: &str) -> Vec<String> {
    let stripped: String = text
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    let tokens: Vec<_> = ElementKind::lexer(&stripped).spanned().collect();
    let mut elements = Vec::with_capacity(tokens.len());
    let mut iter = tokens.iter().peekable();
    let mut covered = 0;

    while let Some((kind, span)) = iter.next() {
        // The lexer works on bytes; a multi-byte character is one element.
        if span.start < covered {
            continue;
        }
        if *kind == ElementKind::Minus && is_unary(&stripped, span.start) {
            if let Some((ElementKind::Number, number)) = iter.peek() {
                elements.push(stripped[span.start..number.end].to_owned());
                covered = number.end;
                iter.next();
                continue;
            }
        }
        covered = char_end(&stripped, span.end);
        elements.push(stripped[span.start..covered].to_owned());
    }
    elements
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(text: &str, expected: &[&str]) {
        assert_eq!(get_elements(text), expected, "{}", text);
    }

    #[test]
    fn test_elements() {
        check("1 + 1", &["1", "+", "1"]);
        check(
            "((5 * 4 + 3 / 6) % 6)",
            &["(", "(", "5", "*", "4", "+", "3", "/", "6", ")", "%", "6", ")"],
        );
        check("2d6", &["2", "d", "6"]);
        check("Max(1, 2.5)", &["max", "(", "1", ",", "2.5", ")"]);
        check("1 <> 2 >= 3", &["1", "<>", "2", ">=", "3"]);
        check("str:12 + :4", &["str:12", "+", ":4"]);
        check("xd5", &["xd", "5"]);
    }

    #[test]
    fn test_negative_numbers() {
        check("-5", &["-5"]);
        check("5-3", &["5", "-", "3"]);
        check("5 - -3", &["5", "-", "-3"]);
        check("(1)-3", &["(", "1", ")", "-", "3"]);
        check("max(-1, -.5)", &["max", "(", "-1", ",", "-.5", ")"]);
        check("-(2)", &["-", "(", "2", ")"]);
        check("1d-3", &["1", "d", "-3"]);
    }

    #[test]
    fn test_other_characters() {
        check("1 & 2", &["1", "&", "2"]);
        check("é", &["é"]);
        check("2 × 3", &["2", "×", "3"]);
        check("5✓3€", &["5", "✓", "3", "€"]);
    }
}
