//! Shared data model: the frozen node types produced by the decoder, the
//! binding and path types produced by the DI parser and path finder, and the
//! finding types produced by the detector framework.

mod access;
mod binding;
mod class;
mod field;
mod finding;
mod method;
mod mutability;
mod path;

pub use access::{AccessFlags, ACC_ABSTRACT, ACC_ENUM, ACC_FINAL, ACC_INTERFACE, ACC_PRIVATE,
    ACC_PUBLIC, ACC_STATIC, ACC_VOLATILE};
pub use binding::BindingKey;
pub use class::{simple_name_of, ClassNode};
pub use field::FieldNode;
pub use finding::{Finding, RiskLevel, ScanMeta, ScanReport, ScopeSource, StateType};
pub use method::{
    FieldAccess, Invocation, InvokeKind, LiteralValue, MethodNode, MethodRef, FieldRef, StackTag,
};
pub use mutability::{is_atomic, is_cache, is_logger, is_mutable_collection, is_thread_local};
pub use path::{EdgeKind, LeafCategory, PathStep, StatefulPath};
