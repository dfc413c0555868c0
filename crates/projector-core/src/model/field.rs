use crate::{model::ShapeModel, value::ValueKind};

///
/// FieldModel
/// Runtime field metadata used by projection validation and compilation.
///

#[derive(Debug)]
pub struct FieldModel {
    /// Field name as used in source paths and constructed records.
    pub name: &'static str,
    /// Runtime type shape.
    pub kind: FieldKind,
}

impl FieldModel {
    #[must_use]
    pub const fn scalar(name: &'static str, kind: ValueKind) -> Self {
        Self {
            name,
            kind: FieldKind::Scalar(kind),
        }
    }

    #[must_use]
    pub const fn shape(name: &'static str, shape: &'static ShapeModel) -> Self {
        Self {
            name,
            kind: FieldKind::Shape(shape),
        }
    }
}

///
/// FieldKind
///
/// Either a scalar slot or a nested shape that source paths may traverse.
///

#[derive(Clone, Copy)]
pub enum FieldKind {
    Scalar(ValueKind),
    Shape(&'static ShapeModel),
}

impl FieldKind {
    #[must_use]
    pub const fn as_scalar(self) -> Option<ValueKind> {
        match self {
            Self::Scalar(kind) => Some(kind),
            Self::Shape(_) => None,
        }
    }
}

// Nested shapes compare by name; shape names are unique per process.
impl PartialEq for FieldKind {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Scalar(a), Self::Scalar(b)) => a == b,
            (Self::Shape(a), Self::Shape(b)) => a.name == b.name,
            _ => false,
        }
    }
}

impl Eq for FieldKind {}

impl std::hash::Hash for FieldKind {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        match self {
            Self::Scalar(kind) => {
                0u8.hash(state);
                kind.hash(state);
            }
            Self::Shape(shape) => {
                1u8.hash(state);
                shape.name.hash(state);
            }
        }
    }
}

// Shapes may reference each other; debug output stops at the shape name.
impl std::fmt::Debug for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scalar(kind) => f.debug_tuple("Scalar").field(kind).finish(),
            Self::Shape(shape) => f.debug_tuple("Shape").field(&shape.name).finish(),
        }
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scalar(kind) => write!(f, "{kind}"),
            Self::Shape(shape) => f.write_str(shape.name),
        }
    }
}
