//! Tree walks over compiled expressions.
//!
//! Traversal is an explicit-stack pre-order iterator; every node is yielded
//! exactly once, including construct field values and lambda bodies.

use crate::{
    expr::Expr,
    value::{Value, ValueKind},
};

///
/// Preorder
///

pub struct Preorder<'a> {
    stack: Vec<&'a Expr>,
}

impl<'a> Preorder<'a> {
    pub(crate) fn new(root: &'a Expr) -> Self {
        Self { stack: vec![root] }
    }
}

impl<'a> Iterator for Preorder<'a> {
    type Item = &'a Expr;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        // reversed so the first child is popped next
        self.stack.extend(node.children().into_iter().rev());

        Some(node)
    }
}

/// Returns true if any `Constant` node in the tree carries `kind`, either
/// as its declared kind or as the kind of its value.
///
/// A typed null constant counts: it is still a literal baked into the shape.
#[must_use]
pub fn has_constant_of_kind(expr: &Expr, kind: ValueKind) -> bool {
    expr.preorder().any(|node| {
        matches!(
            node,
            Expr::Constant { value, kind: declared }
                if *declared == kind || value.kind() == Some(kind)
        )
    })
}

/// All constant literals in pre-order, for diagnostics.
#[must_use]
pub fn constants(expr: &Expr) -> Vec<(&Value, ValueKind)> {
    expr.preorder()
        .filter_map(|node| match node {
            Expr::Constant { value, kind } => Some((value, *kind)),
            _ => None,
        })
        .collect()
}
