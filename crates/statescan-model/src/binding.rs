use statescan_core::Name;

/// A dependency-injection binding key: a bound type, optionally disambiguated
/// by a qualifier's simple name. Unqualified keys only compare equal to
/// other unqualified keys of the same type.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct BindingKey {
    pub canonical_type: Name,
    pub qualifier: Option<Name>,
}

impl BindingKey {
    pub fn unqualified(canonical_type: impl Into<Name>) -> Self {
        Self {
            canonical_type: canonical_type.into(),
            qualifier: None,
        }
    }

    pub fn qualified(canonical_type: impl Into<Name>, qualifier: impl Into<Name>) -> Self {
        Self {
            canonical_type: canonical_type.into(),
            qualifier: Some(qualifier.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unqualified_keys_of_same_type_are_equal() {
        assert_eq!(
            BindingKey::unqualified("com.example.Repo"),
            BindingKey::unqualified("com.example.Repo")
        );
    }

    #[test]
    fn qualified_and_unqualified_keys_differ() {
        assert_ne!(
            BindingKey::unqualified("com.example.Repo"),
            BindingKey::qualified("com.example.Repo", "Primary")
        );
    }
}
