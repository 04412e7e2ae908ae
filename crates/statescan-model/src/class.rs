use indexmap::IndexSet;
use statescan_core::Name;

use crate::field::FieldNode;
use crate::method::MethodNode;

/// A single decoded class, immutable once constructed by the decoder.
#[derive(Clone, Debug)]
pub struct ClassNode {
    pub name: Name,
    pub superclass: Option<Name>,
    pub interfaces: IndexSet<Name>,
    pub annotations: IndexSet<Name>,
    pub fields: Vec<FieldNode>,
    pub methods: Vec<MethodNode>,
    pub is_interface: bool,
    pub is_abstract: bool,
    pub is_enum: bool,
    pub is_project: bool,
    pub source_file: Option<Name>,
}

impl ClassNode {
    pub fn new(name: impl Into<Name>) -> Self {
        Self {
            name: name.into(),
            superclass: None,
            interfaces: IndexSet::new(),
            annotations: IndexSet::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            is_interface: false,
            is_abstract: false,
            is_enum: false,
            is_project: false,
            source_file: None,
        }
    }

    pub fn method_named(&self, name: &str) -> Option<&MethodNode> {
        self.methods.iter().find(|method| method.name.as_str() == name)
    }

    pub fn has_annotation_simple_name(&self, simple_name: &str) -> bool {
        self.annotations
            .iter()
            .any(|annotation| simple_name_of(annotation.as_str()) == simple_name)
    }

    /// An enum `$VALUES` synthetic field, or an enum constant field whose
    /// declared type equals the owning class — both excluded from the
    /// static-state detector since they are not mutable application state.
    pub fn is_enum_synthetic_or_constant_field(&self, field: &FieldNode) -> bool {
        if !self.is_enum {
            return false;
        }
        if field.name.as_str() == "$VALUES" {
            return true;
        }
        field
            .canonical_type()
            .is_some_and(|ty| ty == self.name.as_str())
    }
}

pub fn simple_name_of(dotted: &str) -> &str {
    dotted.rsplit('.').next().unwrap_or(dotted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::AccessFlags;
    use crate::field::FieldNode;

    #[test]
    fn enum_values_field_is_synthetic() {
        let mut class = ClassNode::new("com.example.Color");
        class.is_enum = true;
        let field = FieldNode::new("$VALUES", "[Lcom/example/Color;", AccessFlags(0x0008));
        assert!(class.is_enum_synthetic_or_constant_field(&field));
    }

    #[test]
    fn non_enum_class_never_synthetic() {
        let class = ClassNode::new("com.example.Widget");
        let field = FieldNode::new("$VALUES", "I", AccessFlags(0));
        assert!(!class.is_enum_synthetic_or_constant_field(&field));
    }

    #[test]
    fn simple_name_strips_package() {
        assert_eq!(simple_name_of("com.google.inject.Singleton"), "Singleton");
        assert_eq!(simple_name_of("Singleton"), "Singleton");
    }
}
