//! Deterministic shape fingerprinting for compiled expressions.
#![allow(clippy::cast_possible_truncation)]

use crate::{
    expr::Expr,
    model::FieldKind,
    value::{Value, ValueKind},
};
use sha2::{Digest, Sha256};

///
/// ShapeFingerprint
///
/// Stable, deterministic fingerprint of an expression's structure.
/// Parameter slots contribute only their name and kind, never a value.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ShapeFingerprint([u8; 32]);

impl ShapeFingerprint {
    pub(crate) fn from_digest(hasher: Sha256) -> Self {
        let digest = hasher.finalize();
        let mut out = [0u8; 32];
        out.copy_from_slice(&digest);
        Self(out)
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    #[must_use]
    pub fn as_hex(&self) -> String {
        const HEX: &[u8; 16] = b"0123456789abcdef";

        self.0
            .iter()
            .flat_map(|byte| [HEX[usize::from(byte >> 4)], HEX[usize::from(byte & 0x0f)]])
            .map(char::from)
            .collect()
    }
}

impl std::fmt::Display for ShapeFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.as_hex())
    }
}

impl Expr {
    /// Compute a stable fingerprint for this expression tree.
    #[must_use]
    pub fn fingerprint(&self) -> ShapeFingerprint {
        let mut hasher = Sha256::new();
        hasher.update(b"shapefp:v1");
        hash_expr(&mut hasher, self);

        ShapeFingerprint::from_digest(hasher)
    }
}

pub(crate) fn hash_expr(hasher: &mut Sha256, expr: &Expr) {
    match expr {
        Expr::Variable(name) => {
            write_tag(hasher, 0x10);
            write_str(hasher, name);
        }
        Expr::Member { source, name, kind } => {
            write_tag(hasher, 0x11);
            hash_expr(hasher, source);
            write_str(hasher, name);
            write_field_kind(hasher, *kind);
        }
        Expr::Constant { value, kind } => {
            write_tag(hasher, 0x12);
            write_kind(hasher, *kind);
            write_value(hasher, value);
        }
        Expr::Parameter { name, kind } => {
            write_tag(hasher, 0x13);
            write_str(hasher, name);
            write_kind(hasher, *kind);
        }
        Expr::Construct(construct) => {
            write_tag(hasher, 0x14);
            write_str(hasher, construct.target());
            write_u32(hasher, construct.fields().len() as u32);
            for (name, field) in construct.fields() {
                write_str(hasher, name);
                hash_expr(hasher, field);
            }
        }
        Expr::Lambda(lambda) => {
            write_tag(hasher, 0x15);
            write_str(hasher, lambda.param());
            hash_expr(hasher, lambda.body());
        }
    }
}

pub(crate) fn write_value(hasher: &mut Sha256, value: &Value) {
    write_tag(hasher, value.tag().to_u8());
    match value {
        Value::Blob(bytes) => {
            write_u32(hasher, bytes.len() as u32);
            hasher.update(bytes);
        }
        Value::Bool(v) => write_tag(hasher, u8::from(*v)),
        Value::Int(v) => hasher.update(v.to_be_bytes()),
        Value::Null => {}
        Value::Record(record) => {
            write_u32(hasher, record.len() as u32);
            for (name, field) in record.iter() {
                write_str(hasher, name);
                write_value(hasher, field);
            }
        }
        Value::Text(s) => write_str(hasher, s),
        Value::Uint(v) => hasher.update(v.to_be_bytes()),
    }
}

pub(crate) fn write_field_kind(hasher: &mut Sha256, kind: FieldKind) {
    match kind {
        FieldKind::Scalar(kind) => {
            write_tag(hasher, 0x01);
            write_kind(hasher, kind);
        }
        FieldKind::Shape(shape) => {
            write_tag(hasher, 0x02);
            write_str(hasher, shape.name);
        }
    }
}

pub(crate) fn write_kind(hasher: &mut Sha256, kind: ValueKind) {
    write_tag(hasher, kind.tag());
}

pub(crate) fn write_str(hasher: &mut Sha256, value: &str) {
    write_u32(hasher, value.len() as u32);
    hasher.update(value.as_bytes());
}

pub(crate) fn write_u32(hasher: &mut Sha256, value: u32) {
    hasher.update(value.to_be_bytes());
}

pub(crate) fn write_tag(hasher: &mut Sha256, tag: u8) {
    hasher.update([tag]);
}
