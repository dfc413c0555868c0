use crate::value::ValueKind;

///
/// BindingSignature
///
/// Ordered parameter names and kinds. Carries no values, so two tables
/// with the same signature compile to the same shape.
///

#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct BindingSignature {
    slots: Vec<(String, ValueKind)>,
}

impl BindingSignature {
    #[must_use]
    pub const fn new() -> Self {
        Self { slots: Vec::new() }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ValueKind)> {
        self.slots.iter().map(|(name, kind)| (name.as_str(), *kind))
    }

    #[must_use]
    pub fn kind_of(&self, name: &str) -> Option<ValueKind> {
        self.slots
            .iter()
            .find_map(|(slot, kind)| (slot == name).then_some(*kind))
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.kind_of(name).is_some()
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, ValueKind)> for BindingSignature {
    fn from_iter<I: IntoIterator<Item = (K, ValueKind)>>(iter: I) -> Self {
        Self {
            slots: iter
                .into_iter()
                .map(|(name, kind)| (name.into(), kind))
                .collect(),
        }
    }
}

impl std::fmt::Display for BindingSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("(")?;
        for (i, (name, kind)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "@{name}: {kind}")?;
        }
        f.write_str(")")
    }
}
