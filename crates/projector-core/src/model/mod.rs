//! Runtime shape model.
//!
//! Shapes describe *what exists* on either side of a projection: the input
//! rows a query reads and the destination type it constructs. They are
//! declared as `static` items and live for the whole process.
pub mod field;
pub mod shape;

pub use field::{FieldKind, FieldModel};
pub use shape::{PathError, ShapeError, ShapeModel};
