//! Converts a parsed [`ClassFile`] into the shared [`ClassNode`] model.
//!
//! This is the class decoder of the pipeline: header, fields, methods, and
//! (via [`crate::bytecode`]) each method's invocation and field-access sets.

use statescan_core::internal_to_canonical;
use statescan_model::{
    AccessFlags, ClassNode, FieldNode, MethodNode, ACC_ABSTRACT, ACC_ENUM, ACC_INTERFACE,
};

use crate::annotation::Annotation;
use crate::bytecode::decode_body;
use crate::classfile::{ClassFile, ClassMember};
use crate::constant_pool::ConstantPool;
use crate::error::Result;

/// Decodes `bytes` as a single class artifact into a `ClassNode`.
///
/// `is_project` is left `false`; the project scanner assigns it once the
/// class's fully-qualified name can be checked against the configured
/// include/exclude prefixes.
pub fn decode_class(bytes: &[u8]) -> Result<ClassNode> {
    let class_file = ClassFile::parse(bytes)?;
    Ok(to_class_node(&class_file))
}

fn to_class_node(class_file: &ClassFile) -> ClassNode {
    let name = internal_to_canonical(&class_file.this_class);
    let mut node = ClassNode::new(name);

    node.superclass = class_file
        .super_class
        .as_deref()
        .map(|s| internal_to_canonical(s).into());
    node.interfaces = class_file
        .interfaces
        .iter()
        .map(|i| internal_to_canonical(i).into())
        .collect();
    node.annotations = annotation_names(&class_file.runtime_visible_annotations)
        .chain(annotation_names(&class_file.runtime_invisible_annotations))
        .collect();

    let flags = AccessFlags(class_file.access_flags);
    node.is_interface = flags.has(ACC_INTERFACE);
    node.is_abstract = flags.has(ACC_ABSTRACT);
    node.is_enum = flags.has(ACC_ENUM);
    node.source_file = None;

    node.fields = class_file.fields.iter().map(to_field_node).collect();
    node.methods = class_file
        .methods
        .iter()
        .map(|member| to_method_node(member, &class_file.constant_pool))
        .collect();

    node
}

fn annotation_names(annotations: &[Annotation]) -> impl Iterator<Item = statescan_core::Name> + '_ {
    annotations.iter().map(|annotation| {
        let canonical_name = annotation
            .type_internal_name
            .as_deref()
            .map(internal_to_canonical)
            .unwrap_or_else(|| annotation.type_descriptor.clone());
        canonical_name.into()
    })
}

fn to_field_node(member: &ClassMember) -> FieldNode {
    let mut field = FieldNode::new(
        member.name.clone(),
        member.descriptor.clone(),
        AccessFlags(member.access_flags),
    );
    field.annotations = annotation_names(&member.runtime_visible_annotations)
        .chain(annotation_names(&member.runtime_invisible_annotations))
        .collect();
    field
}

fn to_method_node(member: &ClassMember, cp: &ConstantPool) -> MethodNode {
    let mut method = MethodNode::new(
        member.name.clone(),
        member.descriptor.clone(),
        AccessFlags(member.access_flags),
    );
    method.annotations = annotation_names(&member.runtime_visible_annotations)
        .chain(annotation_names(&member.runtime_invisible_annotations))
        .collect();

    if let Some(code) = &member.code {
        let is_static = AccessFlags(member.access_flags).is_static();
        // A method body that fails to decode (a genuinely malformed
        // instruction stream) leaves the method with empty invocation and
        // field-access sets rather than aborting the whole class.
        if let Ok(body) = decode_body(code, cp, &member.descriptor, is_static) {
            method.invocations = body.invocations;
            method.field_accesses = body.field_accesses;
            method.class_constants = body
                .class_constants
                .into_iter()
                .map(Into::into)
                .collect();
        }
    }

    method
}
