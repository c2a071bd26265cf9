use super::{ast::*, error::InvalidToken, lexer::*};
use crate::common::*;
use crate::config::Limits;

type PResult<T = Node> = Result<T, InvalidToken>;

/// Recursive-descent parser over the precedence ladder
/// comparison < additive < multiplicative < exponent < dice < unary < primary.
///
/// Operators of the same tier fold left, so `10 - 2 - 1` is `(10 - 2) - 1` and
/// `5 = 3 = 3` is `(5 = 3) = 3`.
pub struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token<'a>>,
    index: usize,
    depth: usize,
    limits: Limits,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Self {
        Self::with_limits(source, Limits::default())
    }

    pub fn with_limits(source: &'a str, limits: Limits) -> Self {
        let tokens = tokenize(source)
            .into_iter()
            .filter(|t| t.kind != TokenKind::Whitespace)
            .collect();
        Self {
            source,
            tokens,
            index: 0,
            depth: 0,
            limits,
        }
    }

    pub fn parse(mut self) -> PResult<Expression> {
        if let Some(token) = self.tokens.get(self.limits.max_tokens) {
            return Err(InvalidToken::new("Equation is too long", token, self.source));
        }
        let root = self.parse_node()?;
        if self.peek().is_some() {
            return self.unexpected("Expected an operator");
        }
        Ok(Expression::new(root, self.source))
    }

    fn peek(&self) -> Option<&Token<'a>> {
        self.tokens.get(self.index)
    }

    fn advance(&mut self) -> Option<Token<'a>> {
        let token = self.tokens.get(self.index).cloned();
        if token.is_some() {
            self.index += 1;
        }
        token
    }

    fn matches(&self, kind: TokenKind) -> bool {
        self.peek().map_or(false, |t| t.kind == kind)
    }

    fn matches_any(&self, options: &[TokenKind]) -> bool {
        self.peek().map_or(false, |t| options.contains(&t.kind))
    }

    fn error(&self, message: &str) -> InvalidToken {
        match self.peek() {
            Some(token) => InvalidToken::new(message, token, self.source),
            None => InvalidToken::at_end(message, self.source),
        }
    }

    fn unexpected<T>(&self, message: &str) -> PResult<T> {
        Err(self.error(message))
    }

    fn consume(&mut self, expected: TokenKind, message: &str) -> PResult<Token<'a>> {
        if self.matches(expected) {
            self.advance().ok_or_else(|| self.error(message))
        } else {
            self.unexpected(message)
        }
    }

    fn peek_operator(&self, tier: &[BinaryOperator]) -> Option<BinaryOperator> {
        self.peek()
            .and_then(|t| t.kind.as_binary_op())
            .filter(|op| tier.contains(op))
    }

    fn parse_node(&mut self) -> PResult {
        self.parse_tier(0)
    }

    fn parse_tier(&mut self, tier: usize) -> PResult {
        let ops = match BinaryOperator::TIERS.get(tier) {
            Some(ops) => *ops,
            None => return self.parse_unary(),
        };

        let mut lhs = self.parse_tier(tier + 1)?;

        while let Some(op) = self.peek_operator(ops) {
            self.advance();
            let rhs = self.parse_tier(tier + 1)?;
            lhs = Node::new_binary(op, lhs, rhs);
        }

        Ok(lhs)
    }

    fn parse_unary(&mut self) -> PResult {
        self.depth += 1;
        let result = if self.depth > self.limits.max_depth {
            self.unexpected("Equation is nested too deeply")
        } else if self.matches(TokenKind::Minus) {
            self.advance();
            self.parse_primary().map(Node::new_negate)
        } else {
            self.parse_primary()
        };
        self.depth -= 1;
        result
    }

    fn parse_primary(&mut self) -> PResult {
        match self.peek().map(|t| t.kind) {
            Some(TokenKind::Number) => self.parse_number(),
            Some(TokenKind::LeftParen) => self.parse_group(),
            Some(TokenKind::Dollar) => self.parse_variable(),
            Some(TokenKind::Name) => self.parse_call(),
            _ => self.unexpected("Expected a value"),
        }
    }

    fn parse_number(&mut self) -> PResult {
        let x = match self.peek().map(|t| t.text.parse::<Int>()) {
            Some(Ok(x)) => x,
            _ => return self.unexpected("Number is too large"),
        };
        self.advance();
        Ok(Node::new_literal(x))
    }

    fn parse_group(&mut self) -> PResult {
        self.consume(TokenKind::LeftParen, "Expected '('")?;
        let inner = self.parse_node()?;
        self.consume(TokenKind::RightParen, "Expected ')'")?;
        Ok(Node::new_group(inner))
    }

    fn parse_variable(&mut self) -> PResult {
        self.consume(TokenKind::Dollar, "Expected '$'")?;
        if !self.matches_any(&[TokenKind::Name, TokenKind::Number]) {
            return self.unexpected("Expected name");
        }
        let name = match self.peek() {
            // An index past usize can never be bound, so it falls to `?default`.
            Some(t) if t.kind == TokenKind::Number => {
                VariableName::Positional(t.text.parse().unwrap_or(usize::MAX))
            }
            Some(t) => VariableName::Named(t.text.to_owned()),
            None => return self.unexpected("Expected name"),
        };
        self.advance();

        let default = if self.matches(TokenKind::Question) {
            self.advance();
            Some(self.parse_unary()?)
        } else {
            None
        };

        Ok(Node::new_variable(name, default))
    }

    fn parse_call(&mut self) -> PResult {
        let name = self.consume(TokenKind::Name, "Expected name")?.text;
        self.consume(TokenKind::LeftParen, "Expected '('")?;

        let mut args = Vec::new();
        if !self.matches(TokenKind::RightParen) {
            loop {
                args.push(self.parse_node()?);
                if self.matches(TokenKind::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
        }

        self.consume(TokenKind::RightParen, "Expected ')'")?;
        Ok(Node::new_call(name, args))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use BinaryOperator::*;

    fn parse(s: &str) -> PResult<Expression> {
        Parser::new(s).parse()
    }

    fn check(s: &str, expected: Node) {
        let parsed = parse(s).unwrap();
        assert_eq!(parsed.root, expected);
    }

    fn check_err(s: &str, message: &str, position: usize) {
        let err = parse(s).unwrap_err();
        assert_eq!(err.message, message, "{}", s);
        assert_eq!(err.position, position, "{}", s);
    }

    fn lit(x: Int) -> Node {
        Node::new_literal(x)
    }

    fn bin(l: Node, op: BinaryOperator, r: Node) -> Node {
        Node::new_binary(op, l, r)
    }

    fn var(name: &str) -> Node {
        Node::new_variable(VariableName::Named(name.into()), None)
    }

    #[test]
    fn test_parse_literals() {
        check("32", lit(32));
        check("(5)", Node::new_group(lit(5)));
        check("-5", Node::new_negate(lit(5)));
    }

    #[test]
    fn test_parse_precedence() {
        check("1 + 2 * 3", bin(lit(1), Add, bin(lit(2), Mul, lit(3))));
        check("2d6+1", bin(bin(lit(2), Roll, lit(6)), Add, lit(1)));
        check("2^2d6", bin(lit(2), Pow, bin(lit(2), Roll, lit(6))));
        check("2d6^2", bin(bin(lit(2), Roll, lit(6)), Pow, lit(2)));
        check(
            "1 + 2 < 4",
            bin(bin(lit(1), Add, lit(2)), Lt, lit(4)),
        );
    }

    #[test]
    fn test_parse_left_fold() {
        check("10-2-1", bin(bin(lit(10), Sub, lit(2)), Sub, lit(1)));
        check("100/10/2", bin(bin(lit(100), Div, lit(10)), Div, lit(2)));
        check("2^3^2", bin(bin(lit(2), Pow, lit(3)), Pow, lit(2)));
    }

    #[test]
    fn test_parse_chained_comparison() {
        // Legal, and evaluated left to right; possibly unintended upstream.
        check("5 = 3 = 3", bin(bin(lit(5), Eq, lit(3)), Eq, lit(3)));
    }

    #[test]
    fn test_parse_unary() {
        check("5--3", bin(lit(5), Sub, Node::new_negate(lit(3))));
        check("-$a", Node::new_negate(var("a")));
        check("-2^2", bin(Node::new_negate(lit(2)), Pow, lit(2)));
    }

    #[test]
    fn test_parse_variables() {
        check("$jeff", var("jeff"));
        check(
            "$1",
            Node::new_variable(VariableName::Positional(1), None),
        );
        check(
            "$qwerty?$jeff+$bar",
            bin(
                Node::new_variable(VariableName::Named("qwerty".into()), Some(var("jeff"))),
                Add,
                var("bar"),
            ),
        );
        check(
            "$99999999999999999999999?7",
            Node::new_variable(VariableName::Positional(usize::MAX), Some(lit(7))),
        );
        check(
            "$a?-1",
            Node::new_variable(
                VariableName::Named("a".into()),
                Some(Node::new_negate(lit(1))),
            ),
        );
    }

    #[test]
    fn test_parse_calls() {
        check("bar()", Node::new_call("bar", vec![]));
        check(
            "if(5=5, 3, 4)",
            Node::new_call("if", vec![bin(lit(5), Eq, lit(5)), lit(3), lit(4)]),
        );
        check(
            "max(1+2, min(3, 4))",
            Node::new_call(
                "max",
                vec![
                    bin(lit(1), Add, lit(2)),
                    Node::new_call("min", vec![lit(3), lit(4)]),
                ],
            ),
        );
    }

    #[test]
    fn test_parse_errors() {
        check_err("5++5", "Expected a value", 2);
        check_err("5==5", "Expected a value", 2);
        check_err("((5)+2))", "Expected an operator", 7);
        check_err("foobar", "Expected '('", 6);
        check_err("$+", "Expected name", 1);
        check_err("*", "Expected a value", 0);
        check_err("+5", "Expected a value", 0);
        check_err("()", "Expected a value", 1);
        check_err("", "Expected a value", 0);
        check_err("5 5", "Expected an operator", 2);
        check_err("--5", "Expected a value", 1);
        check_err("max(1,", "Expected a value", 6);
        check_err("99999999999999999999", "Number is too large", 0);
    }

    #[test]
    fn test_depth_guard() {
        let deep = format!("{}1{}", "(".repeat(100), ")".repeat(100));
        let err = parse(&deep).unwrap_err();
        assert_eq!(err.message, "Equation is nested too deeply");

        let limits = Limits {
            max_depth: 200,
            ..Limits::default()
        };
        assert!(Parser::with_limits(&deep, limits).parse().is_ok());
    }

    #[test]
    fn test_token_guard() {
        let long = vec!["1"; 600].join("+");
        let err = parse(&long).unwrap_err();
        assert_eq!(err.message, "Equation is too long");
    }

    #[test]
    fn test_display_round_trip() {
        let parsed = parse("$a?2 + max(1, 2d6) * -3").unwrap();
        assert_eq!(parsed.to_string(), "$a?2 + max(1, 2d6) * -3");
    }
}
