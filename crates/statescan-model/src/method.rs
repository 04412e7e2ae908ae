use indexmap::IndexSet;
use statescan_core::Name;

use crate::access::AccessFlags;

/// A structural reference to a method: owner class, name and descriptor.
/// Equality is purely structural, independent of where the reference
/// originated.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct MethodRef {
    pub owner: Name,
    pub name: Name,
    pub descriptor: Name,
}

impl MethodRef {
    pub fn new(owner: impl Into<Name>, name: impl Into<Name>, descriptor: impl Into<Name>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            descriptor: descriptor.into(),
        }
    }
}

/// A structural reference to a field: owner class, name and descriptor.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct FieldRef {
    pub owner: Name,
    pub name: Name,
    pub descriptor: Name,
}

impl FieldRef {
    pub fn new(owner: impl Into<Name>, name: impl Into<Name>, descriptor: impl Into<Name>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            descriptor: descriptor.into(),
        }
    }
}

/// How an invocation instruction dispatches to its target.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum InvokeKind {
    Virtual,
    Special,
    Static,
    Interface,
    Dynamic,
}

/// A constant value carried by a `Literal` stack tag.
#[derive(Clone, Debug, PartialEq)]
pub enum LiteralValue {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    Class(Name),
    Null,
}

/// A tagged operand-stack entry, as produced by the bounded simulator that
/// walks a method's instruction stream.
#[derive(Clone, Debug, PartialEq)]
pub enum StackTag {
    This,
    Field { name: Name, ty: Option<String> },
    Param { index: u16, ty: Option<String> },
    Local { index: u16, ty: Option<String> },
    NewObject { ty: String },
    Literal(LiteralValue),
    Computed { ty: Option<String> },
}

/// One call site inside a method body: the resolved target, its dispatch
/// kind, and the receiver/argument tags recovered by the stack simulator.
#[derive(Clone, Debug, PartialEq)]
pub struct Invocation {
    pub target: MethodRef,
    pub kind: InvokeKind,
    /// `None` for `invokestatic`.
    pub receiver: Option<StackTag>,
    pub arguments: Vec<StackTag>,
    pub bytecode_offset: u32,
}

/// One field access inside a method body.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldAccess {
    pub target: FieldRef,
    pub receiver: Option<StackTag>,
    pub is_write: bool,
}

/// A single method declared on a class.
#[derive(Clone, Debug)]
pub struct MethodNode {
    pub name: Name,
    pub descriptor: Name,
    pub access: AccessFlags,
    pub invocations: Vec<Invocation>,
    pub field_accesses: Vec<FieldAccess>,
    pub class_constants: IndexSet<Name>,
    pub annotations: IndexSet<Name>,
}

impl MethodNode {
    pub fn new(name: impl Into<Name>, descriptor: impl Into<Name>, access: AccessFlags) -> Self {
        Self {
            name: name.into(),
            descriptor: descriptor.into(),
            access,
            invocations: Vec::new(),
            field_accesses: Vec::new(),
            class_constants: IndexSet::new(),
            annotations: IndexSet::new(),
        }
    }

    pub fn is_constructor(&self) -> bool {
        self.name.as_str() == "<init>"
    }

    pub fn is_static_initializer(&self) -> bool {
        self.name.as_str() == "<clinit>"
    }

    pub fn is_configure_method(&self) -> bool {
        self.name.as_str() == "configure" && self.descriptor.as_str() == "()V"
    }

    /// True if this method carries a recognized provider annotation
    /// (`@Provides`, `@Produces`, `@Bean`, by simple name).
    pub fn is_provider_method(&self) -> bool {
        const PROVIDER_ANNOTATIONS: &[&str] = &["Provides", "Produces", "Bean"];
        self.annotations.iter().any(|annotation| {
            let simple = annotation
                .as_str()
                .rsplit('.')
                .next()
                .unwrap_or(annotation.as_str());
            PROVIDER_ANNOTATIONS.contains(&simple)
        })
    }

    /// The structural set of method targets invoked from this method body,
    /// as required by the call graph's caller index.
    pub fn invocation_targets(&self) -> impl Iterator<Item = &MethodRef> {
        self.invocations.iter().map(|invocation| &invocation.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::AccessFlags;

    #[test]
    fn recognizes_lifecycle_methods() {
        let ctor = MethodNode::new("<init>", "()V", AccessFlags(0));
        assert!(ctor.is_constructor());

        let clinit = MethodNode::new("<clinit>", "()V", AccessFlags(0));
        assert!(clinit.is_static_initializer());

        let configure = MethodNode::new("configure", "()V", AccessFlags(0));
        assert!(configure.is_configure_method());
    }

    #[test]
    fn provider_annotation_by_simple_name() {
        let mut method = MethodNode::new("build", "()Ljava/lang/String;", AccessFlags(0));
        method.annotations.insert(Name::new("com.google.inject.Provides"));
        assert!(method.is_provider_method());
    }
}
