//! Human-readable rendering of expressions.
//!
//! `|src| EntityDto { id: src.id, user_name: @username }`
//!
//! Parameters render as `@name` so a hoisted slot is visually distinct from
//! an inlined literal.

use crate::expr::Expr;
use std::fmt;

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Variable(name) => f.write_str(name),
            Self::Member { source, name, .. } => write!(f, "{source}.{name}"),
            Self::Constant { value, .. } => write!(f, "{value}"),
            Self::Parameter { name, .. } => write!(f, "@{name}"),
            Self::Construct(construct) => {
                write!(f, "{} {{ ", construct.target())?;
                for (i, (name, expr)) in construct.fields().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{name}: {expr}")?;
                }
                f.write_str(" }")
            }
            Self::Lambda(lambda) => write!(f, "|{}| {}", lambda.param(), lambda.body()),
        }
    }
}
