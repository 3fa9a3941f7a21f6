use std::fmt::Display;

/// Parsed arithmetic expression. Every child is owned by exactly one parent.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Number(f64),
    Negate(Box<Node>),
    Add(Box<Node>, Box<Node>),
    Subtract(Box<Node>, Box<Node>),
    Multiply(Box<Node>, Box<Node>),
    Divide(Box<Node>, Box<Node>),
}

impl Node {
    pub fn negate(operand: Node) -> Self {
        Node::Negate(Box::new(operand))
    }
}

/// Fully parenthesized canonical form, e.g. `((1 + 2) * -3)`.
impl Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Node::Number(n) => write!(f, "{n}"),
            Node::Negate(operand) => write!(f, "-{operand}"),
            Node::Add(lhs, rhs) => write!(f, "({lhs} + {rhs})"),
            Node::Subtract(lhs, rhs) => write!(f, "({lhs} - {rhs})"),
            Node::Multiply(lhs, rhs) => write!(f, "({lhs} * {rhs})"),
            Node::Divide(lhs, rhs) => write!(f, "({lhs} / {rhs})"),
        }
    }
}

pub fn render(node: &Node) -> String {
    node.to_string()
}
