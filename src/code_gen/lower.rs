//! Rewrites of constructs that have no opcode of their own into ones that do.

use crate::ast::{BinaryOperator, CompoundOperator, Node};

/// `x op= y` into `x = (x op y)`.
pub fn compound_assignment(op: CompoundOperator, name: &Node, value: &Node) -> Node {
    let operation = Node::Binary {
        op: op.into(),
        lhs: Box::new(name.clone()),
        rhs: Box::new(value.clone()),
    };
    Node::Assignment {
        name: Box::new(name.clone()),
        value: Box::new(Node::UnaryExpression(Box::new(operation))),
    }
}

/// `a <= b` into `!(a > b)`, `a >= b` into `!(a < b)` and `a != b` into
/// `!(a == b)`. `None` for operators that have an opcode.
pub fn derived_comparison(op: BinaryOperator, lhs: &Node, rhs: &Node) -> Option<Node> {
    let comparison = Node::Binary {
        op: op.negated_comparison()?,
        lhs: Box::new(lhs.clone()),
        rhs: Box::new(rhs.clone()),
    };
    Some(Node::LogicalNot(Box::new(Node::UnaryExpression(Box::new(
        comparison,
    )))))
}

/// The statements a loop is wrapped with: the counter initialization before
/// it and the guard leading its body.
pub struct LoopGuard {
    pub init: Node,
    pub guard: Node,
}

/// `counter = 0` and `if (counter > 0) { break }`.
pub fn loop_guard(counter: &str) -> LoopGuard {
    let init = Node::Assignment {
        name: Box::new(Node::name(counter)),
        value: Box::new(Node::Integer("0".into())),
    };
    let condition = Node::UnaryExpression(Box::new(Node::Binary {
        op: BinaryOperator::Greater,
        lhs: Box::new(Node::name(counter)),
        rhs: Box::new(Node::Integer("0".into())),
    }));
    let guard = Node::IfStatement {
        conditions: vec![condition],
        bodies: vec![vec![Node::Break]],
    };
    LoopGuard { init, guard }
}

/// A two-way conditional.
#[derive(Debug, PartialEq)]
pub struct Branch<'a> {
    pub condition: &'a Node,
    pub then: &'a [Node],
    pub otherwise: Otherwise<'a>,
}

#[derive(Debug, PartialEq)]
pub enum Otherwise<'a> {
    None,
    Body(&'a [Node]),
    /// An `else if`, encoded as an else arm holding a single conditional.
    Branch(Box<Branch<'a>>),
}

/// Folds an `if`/`else if`/`else` chain into nested two-way branches, from
/// the last arm to the first. `None` if there is no condition at all.
pub fn if_chain<'a>(conditions: &'a [Node], bodies: &'a [Vec<Node>]) -> Option<Branch<'a>> {
    let mut otherwise = match bodies.get(conditions.len()) {
        Some(body) => Otherwise::Body(body),
        None => Otherwise::None,
    };
    let mut branch = None;
    for (condition, then) in conditions.iter().zip(bodies).rev() {
        if let Some(inner) = branch.take() {
            otherwise = Otherwise::Branch(Box::new(inner));
        }
        branch = Some(Branch {
            condition,
            then,
            otherwise: std::mem::replace(&mut otherwise, Otherwise::None),
        });
    }
    branch
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flattens_else_if_chains_from_the_end() {
        let conditions = [Node::name("a"), Node::name("b")];
        let bodies = [
            vec![Node::Integer("1".into())],
            vec![Node::Integer("2".into())],
            vec![Node::Integer("3".into())],
        ];
        let chain = if_chain(&conditions, &bodies).unwrap();

        let inner = Branch {
            condition: &conditions[1],
            then: &bodies[1],
            otherwise: Otherwise::Body(&bodies[2]),
        };
        let outer = Branch {
            condition: &conditions[0],
            then: &bodies[0],
            otherwise: Otherwise::Branch(Box::new(inner)),
        };
        assert_eq!(chain, outer);
    }

    #[test]
    fn single_if_has_no_else() {
        let conditions = [Node::name("a")];
        let bodies = [vec![Node::Break]];
        let chain = if_chain(&conditions, &bodies).unwrap();
        assert_eq!(chain.otherwise, Otherwise::None);
        assert!(if_chain(&[], &[]).is_none());
    }

    #[test]
    fn comparisons_without_opcode_are_negated() {
        let (a, b) = (Node::name("a"), Node::name("b"));
        let lowered = derived_comparison(BinaryOperator::GreaterEquals, &a, &b).unwrap();
        let expected = Node::LogicalNot(Box::new(Node::UnaryExpression(Box::new(Node::Binary {
            op: BinaryOperator::Less,
            lhs: Box::new(a.clone()),
            rhs: Box::new(b.clone()),
        }))));
        assert_eq!(lowered, expected);
        assert!(derived_comparison(BinaryOperator::Less, &a, &b).is_none());
    }
}
