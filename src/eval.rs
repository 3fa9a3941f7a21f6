use crate::ast::Node;

/// Reduces a tree to its value using IEEE-754 double arithmetic.
///
/// Division by zero is not an error: it produces an infinity or NaN.
pub fn evaluate(node: &Node) -> f64 {
    match node {
        Node::Number(value) => *value,
        Node::Negate(operand) => -evaluate(operand),
        Node::Add(lhs, rhs) => evaluate(lhs) + evaluate(rhs),
        Node::Subtract(lhs, rhs) => evaluate(lhs) - evaluate(rhs),
        Node::Multiply(lhs, rhs) => evaluate(lhs) * evaluate(rhs),
        Node::Divide(lhs, rhs) => evaluate(lhs) / evaluate(rhs),
    }
}

impl Node {
    pub fn evaluate(&self) -> f64 {
        evaluate(self)
    }
}
