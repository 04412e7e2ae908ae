#![forbid(unsafe_code)]

mod annotation;
mod bytecode;
mod classfile;
mod constant_pool;
mod decode;
mod error;
mod reader;

pub use crate::annotation::{Annotation, ConstValue, ElementValue};
pub use crate::bytecode::{decode_body, DecodedBody};
pub use crate::classfile::{
    ClassFile, ClassMember, CodeAttribute, InnerClassInfo, LocalVariableEntry,
};
pub use crate::constant_pool::{ConstantPool, CpInfo};
pub use crate::decode::decode_class;
pub use crate::error::{Error, Result};
