use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;
use tracing::{debug, trace};

use crate::{ast::Node, cursor::Cursor};

/// Integer digits past this count only shift the value, they no longer add to it.
pub const MAX_SIGNIFICANT_DIGITS: usize = 38;

#[derive(Error, Debug, Diagnostic)]
pub enum ParseError {
    #[error("Unexpected character '{token}'")]
    #[diagnostic(
        code(arith::unexpected_character),
        help("expected a number, `(`, `-` or an operator here")
    )]
    UnexpectedCharacter {
        #[source_code]
        src: NamedSource<String>,

        #[label("this character")]
        bad_bit: SourceSpan,

        token: char,
        at: usize,
    },

    #[error("Unexpected end of input")]
    #[diagnostic(
        code(arith::unexpected_eof),
        help("the expression ended while an operand was still expected")
    )]
    UnexpectedEndOfInput {
        #[source_code]
        src: NamedSource<String>,

        #[label("expected an operand after this")]
        bad_bit: SourceSpan,
    },

    #[error("Missing closing parenthesis")]
    #[diagnostic(code(arith::unclosed_paren), help("add a `)` to close the group"))]
    MissingClosingParenthesis {
        #[source_code]
        src: NamedSource<String>,

        #[label("this parenthesis is never closed")]
        open: SourceSpan,
    },
}

impl ParseError {
    /// Byte offset in the source the error points at.
    pub fn offset(&self) -> usize {
        match self {
            ParseError::UnexpectedCharacter { at, .. } => *at,
            ParseError::UnexpectedEndOfInput { bad_bit, .. } => bad_bit.offset() + bad_bit.len(),
            ParseError::MissingClosingParenthesis { open, .. } => open.offset(),
        }
    }
}

/// Recursive-descent parser for
///
/// ```text
/// expression := term { ('+'|'-') term }*
/// term       := factor { ('*'|'/') factor }*
/// factor     := '(' expression ')' | '-' factor | number
/// number     := digit+ ['.' digit*]
/// ```
pub struct Parser<'de> {
    cursor: Cursor<'de>,
}

impl<'de> Parser<'de> {
    pub fn new(filename: Option<&'de str>, whole: &'de str) -> Self {
        Parser {
            cursor: Cursor::new(filename, whole),
        }
    }

    /// Parses the whole input as one expression. Trailing input is an error.
    pub fn parse_expression(mut self) -> Result<Node, ParseError> {
        debug!(input = self.cursor.whole(), "parsing expression");
        let result = self.expression().and_then(|tree| {
            if self.cursor.has_remaining() {
                Err(self.unexpected())
            } else {
                Ok(tree)
            }
        });
        match &result {
            Ok(tree) => debug!(%tree, "parsed expression"),
            Err(e) => debug!(offset = e.offset(), "parse failed: {e}"),
        }
        result
    }

    fn expression(&mut self) -> Result<Node, ParseError> {
        trace!(offset = self.cursor.offset(), "expression");
        let mut lhs = self.term()?;
        while let Some(op) = self.cursor.peek_consume(|c| matches!(c, '+' | '-')) {
            let rhs = Box::new(self.term()?);
            lhs = match op {
                '+' => Node::Add(Box::new(lhs), rhs),
                _ => Node::Subtract(Box::new(lhs), rhs),
            };
        }
        Ok(lhs)
    }

    fn term(&mut self) -> Result<Node, ParseError> {
        trace!(offset = self.cursor.offset(), "term");
        let mut lhs = self.factor()?;
        while let Some(op) = self.cursor.peek_consume(|c| matches!(c, '*' | '/')) {
            let rhs = Box::new(self.factor()?);
            lhs = match op {
                '*' => Node::Multiply(Box::new(lhs), rhs),
                _ => Node::Divide(Box::new(lhs), rhs),
            };
        }
        Ok(lhs)
    }

    fn factor(&mut self) -> Result<Node, ParseError> {
        trace!(offset = self.cursor.offset(), "factor");
        let Some(c) = self
            .cursor
            .peek_consume(|c| matches!(c, '(' | '-' | '0'..='9'))
        else {
            return Err(self.unexpected());
        };

        match c {
            '(' => {
                let open = self.cursor.offset() - 1;
                let inner = self.expression()?;
                if self.cursor.peek_consume(|c| c == ')').is_none() {
                    return Err(ParseError::MissingClosingParenthesis {
                        src: self.cursor.source(),
                        open: SourceSpan::from(open..open + 1),
                    });
                }
                Ok(inner)
            }
            '-' => Ok(Node::negate(self.factor()?)),
            digit => Ok(self.number(digit)),
        }
    }

    /// Accumulates a literal whose first digit has already been consumed.
    fn number(&mut self, first: char) -> Node {
        let mut value = 0.0_f64;
        let mut digits = 0;
        let mut next = Some(first);
        while let Some(c) = next {
            if digits < MAX_SIGNIFICANT_DIGITS {
                value = value * 10.0 + digit_value(c);
                digits += 1;
            } else {
                value *= 10.0;
            }
            next = self.cursor.peek_consume(|c| c.is_ascii_digit());
        }

        // the fraction has no digit cap
        if self.cursor.peek_consume(|c| c == '.').is_some() {
            let mut scale = 1.0_f64;
            while let Some(c) = self.cursor.peek_consume(|c| c.is_ascii_digit()) {
                scale *= 0.1;
                value += digit_value(c) * scale;
            }
        }

        trace!(value, "number");
        Node::Number(value)
    }

    /// Error for the character under the cursor, or for running out of input.
    fn unexpected(&self) -> ParseError {
        let whole = self.cursor.whole();
        let at = self.cursor.offset().min(whole.len());
        match self.cursor.current() {
            Some(token) => ParseError::UnexpectedCharacter {
                src: self.cursor.source(),
                bad_bit: SourceSpan::from(at..at + token.len_utf8()),
                token,
                at,
            },
            None => ParseError::UnexpectedEndOfInput {
                src: self.cursor.source(),
                bad_bit: SourceSpan::from(whole.len().saturating_sub(1)..whole.len()),
            },
        }
    }
}

fn digit_value(c: char) -> f64 {
    f64::from(c as u8 - b'0')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Result<Node, ParseError> {
        Parser::new(None, input).parse_expression()
    }

    fn num(n: f64) -> Node {
        Node::Number(n)
    }

    fn add(lhs: Node, rhs: Node) -> Node {
        Node::Add(Box::new(lhs), Box::new(rhs))
    }

    fn sub(lhs: Node, rhs: Node) -> Node {
        Node::Subtract(Box::new(lhs), Box::new(rhs))
    }

    fn mul(lhs: Node, rhs: Node) -> Node {
        Node::Multiply(Box::new(lhs), Box::new(rhs))
    }

    fn div(lhs: Node, rhs: Node) -> Node {
        Node::Divide(Box::new(lhs), Box::new(rhs))
    }

    #[test]
    fn subtraction_is_left_associative() {
        let tree = parse("1-2-3").unwrap();
        assert_eq!(tree, sub(sub(num(1.0), num(2.0)), num(3.0)));
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let tree = parse("2+3*4").unwrap();
        assert_eq!(tree, add(num(2.0), mul(num(3.0), num(4.0))));
    }

    #[test]
    fn each_operator_builds_its_own_node() {
        assert_eq!(
            parse("8/4-1+2*3").unwrap(),
            add(sub(div(num(8.0), num(4.0)), num(1.0)), mul(num(2.0), num(3.0)))
        );
        assert_eq!(parse("8/4/2").unwrap(), div(div(num(8.0), num(4.0)), num(2.0)));
    }

    #[test]
    fn unary_minus_binds_to_a_factor() {
        let tree = parse("-2*3").unwrap();
        assert_eq!(tree, mul(Node::negate(num(2.0)), num(3.0)));
        assert_eq!(parse("--2").unwrap(), Node::negate(Node::negate(num(2.0))));
    }

    #[test]
    fn parentheses_produce_no_node() {
        assert_eq!(parse("((7))").unwrap(), num(7.0));
        assert_eq!(
            parse("(2+3)*4").unwrap(),
            mul(add(num(2.0), num(3.0)), num(4.0))
        );
    }

    #[test]
    fn decimal_literals() {
        assert_eq!(parse("2.5").unwrap(), num(2.5));
        assert_eq!(parse("2.").unwrap(), num(2.0));
        assert_eq!(parse("0.25").unwrap(), num(0.25));
    }

    #[test]
    fn spaces_are_skipped_everywhere() {
        assert_eq!(parse("  1 +  2 ").unwrap(), parse("1+2").unwrap());
        // digits separated by spaces still form one literal
        assert_eq!(parse("1 2").unwrap(), num(12.0));
        assert_eq!(parse("1 . 5").unwrap(), num(1.5));
    }

    #[test]
    fn integer_digits_past_the_cap_are_zero_filled() {
        let capped = "1".repeat(MAX_SIGNIFICANT_DIGITS);
        let Node::Number(base) = parse(&capped).unwrap() else {
            panic!("expected a number");
        };
        let Node::Number(longer) = parse(&format!("{capped}99")).unwrap() else {
            panic!("expected a number");
        };
        assert_eq!(longer, base * 10.0 * 10.0);
    }

    #[test]
    fn fraction_digits_are_not_capped() {
        let input = format!("0.{}1", "0".repeat(45));
        let Node::Number(value) = parse(&input).unwrap() else {
            panic!("expected a number");
        };
        assert!(value > 0.0);
    }

    #[test]
    fn missing_closing_parenthesis() {
        let err = parse("(1+2").unwrap_err();
        assert!(matches!(err, ParseError::MissingClosingParenthesis { .. }));
        assert_eq!(err.offset(), 0);

        let err = parse("2*(1+(3)").unwrap_err();
        assert!(matches!(err, ParseError::MissingClosingParenthesis { .. }));
        assert_eq!(err.offset(), 2);
    }

    #[test]
    fn unexpected_end_of_input() {
        assert!(matches!(
            parse("1+").unwrap_err(),
            ParseError::UnexpectedEndOfInput { .. }
        ));
        assert!(matches!(
            parse("").unwrap_err(),
            ParseError::UnexpectedEndOfInput { .. }
        ));
        assert!(matches!(
            parse("-   ").unwrap_err(),
            ParseError::UnexpectedEndOfInput { .. }
        ));
    }

    #[test]
    fn unexpected_character() {
        let err = parse("1+@").unwrap_err();
        assert!(matches!(
            err,
            ParseError::UnexpectedCharacter { token: '@', at: 2, .. }
        ));
    }

    #[test]
    fn trailing_input_is_rejected() {
        assert!(matches!(
            parse("1)").unwrap_err(),
            ParseError::UnexpectedCharacter { token: ')', at: 1, .. }
        ));
        assert!(matches!(
            parse("(1) (2)").unwrap_err(),
            ParseError::UnexpectedCharacter { token: '(', at: 4, .. }
        ));
        assert!(matches!(
            parse("1\t").unwrap_err(),
            ParseError::UnexpectedCharacter { token: '\t', at: 1, .. }
        ));
    }

    #[test]
    fn error_offsets_are_bytes() {
        assert!(matches!(
            parse("é").unwrap_err(),
            ParseError::UnexpectedCharacter { token: 'é', at: 0, .. }
        ));
        assert!(matches!(
            parse("1+ é").unwrap_err(),
            ParseError::UnexpectedCharacter { token: 'é', at: 3, .. }
        ));
    }
}
