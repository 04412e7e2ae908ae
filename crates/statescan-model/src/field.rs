use indexmap::IndexSet;
use statescan_core::Name;

use crate::access::AccessFlags;
use crate::mutability;

/// A single field declared on a class.
#[derive(Clone, Debug)]
pub struct FieldNode {
    pub name: Name,
    /// Raw on-disk descriptor, e.g. `Ljava/util/Map;` or `I`.
    pub descriptor: Name,
    pub access: AccessFlags,
    pub annotations: IndexSet<Name>,
}

impl FieldNode {
    pub fn new(name: impl Into<Name>, descriptor: impl Into<Name>, access: AccessFlags) -> Self {
        Self {
            name: name.into(),
            descriptor: descriptor.into(),
            access,
            annotations: IndexSet::new(),
        }
    }

    pub fn is_static(&self) -> bool {
        self.access.is_static()
    }

    pub fn is_final(&self) -> bool {
        self.access.is_final()
    }

    pub fn is_private(&self) -> bool {
        self.access.is_private()
    }

    pub fn is_volatile(&self) -> bool {
        self.access.is_volatile()
    }

    /// The canonical type of this field, or `None` for a primitive.
    pub fn canonical_type(&self) -> Option<String> {
        statescan_core::canonical(self.descriptor.as_str())
    }

    /// True if this field's declared type is a known logging facade.
    pub fn is_logger(&self) -> bool {
        self.canonical_type()
            .is_some_and(|ty| mutability::is_logger(&ty))
    }

    /// True for a `static final` field of a type considered immutable once
    /// assigned (everything except the known-mutable families below).
    pub fn is_constant(&self) -> bool {
        self.is_static() && self.is_final() && !self.is_potentially_mutable_type()
    }

    /// True for a non-final static field: mutation is visible process-wide.
    pub fn is_static_mutable(&self) -> bool {
        self.is_static() && !self.is_final()
    }

    fn is_potentially_mutable_type(&self) -> bool {
        match self.canonical_type() {
            Some(ty) => {
                mutability::is_mutable_collection(&ty)
                    || mutability::is_atomic(&ty)
                    || mutability::is_cache(&ty)
                    || mutability::is_thread_local(&ty)
            }
            None => false,
        }
    }

    /// True if this field can hold observably mutable state: it is either
    /// non-final, or its declared type belongs to a known-mutable family.
    /// Logger-typed fields are never considered mutable regardless of
    /// finality, since they hold no request-scoped state.
    pub fn is_potentially_mutable(&self) -> bool {
        if self.is_logger() {
            return false;
        }
        !self.is_final() || self.is_potentially_mutable_type()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::{ACC_FINAL, ACC_STATIC};

    #[test]
    fn non_final_field_is_mutable() {
        let field = FieldNode::new("count", "I", AccessFlags(ACC_STATIC));
        assert!(field.is_potentially_mutable());
        assert!(field.is_static_mutable());
        assert!(!field.is_constant());
    }

    #[test]
    fn final_primitive_is_constant() {
        let field = FieldNode::new("MAX", "I", AccessFlags(ACC_STATIC | ACC_FINAL));
        assert!(field.is_constant());
        assert!(!field.is_potentially_mutable());
    }

    #[test]
    fn final_mutable_collection_is_still_mutable() {
        let field = FieldNode::new(
            "cache",
            "Ljava/util/HashMap;",
            AccessFlags(ACC_STATIC | ACC_FINAL),
        );
        assert!(field.is_potentially_mutable());
        assert!(!field.is_constant());
    }

    #[test]
    fn logger_is_never_mutable() {
        let field = FieldNode::new(
            "log",
            "Lorg/slf4j/Logger;",
            AccessFlags(ACC_STATIC | ACC_FINAL),
        );
        assert!(!field.is_potentially_mutable());
    }
}
