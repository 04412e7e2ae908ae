//! Annotation-driven bean-discovery binding parser.
//!
//! A class is a *bean* if it carries a recognized scope/stereotype
//! annotation. Each bean is recorded as an implementation of its declared
//! interfaces and of every abstract supertype present in the decoded set;
//! its provider-annotated methods contribute further bindings keyed by
//! declared return type.

use statescan_core::Name;
use statescan_model::{simple_name_of, BindingKey, ClassNode};

use crate::declarative::{BindingMap, ClassTable};
use crate::frameworks::{is_bean_scope_annotation, is_framework_infrastructure};
use crate::qualifier::qualifier_of;

pub fn is_bean(class: &ClassNode) -> bool {
    class
        .annotations
        .iter()
        .any(|annotation| is_bean_scope_annotation(simple_name_of(annotation.as_str())))
}

/// The first of `class`'s annotations recognized as a bean scope/stereotype,
/// for attribution in findings. `None` if `class` is not a bean.
pub fn bean_scope_annotation_of(class: &ClassNode) -> Option<Name> {
    class
        .annotations
        .iter()
        .find(|annotation| is_bean_scope_annotation(simple_name_of(annotation.as_str())))
        .cloned()
}

pub fn parse_bean(class: &ClassNode, classes: &ClassTable, bindings: &mut BindingMap) {
    for interface in &class.interfaces {
        let key = BindingKey::unqualified(interface.clone());
        bindings.entry(key).or_default().insert(class.name.clone());
    }

    for ancestor in abstract_supertypes(class, classes) {
        let key = BindingKey::unqualified(ancestor.name.clone());
        bindings.entry(key).or_default().insert(class.name.clone());
    }

    for method in &class.methods {
        if !method.is_provider_method() {
            continue;
        }
        let Some(return_type) = statescan_core::return_type(method.descriptor.as_str()) else {
            continue;
        };
        let key = match qualifier_of(&method.annotations) {
            Some(qualifier) => BindingKey::qualified(return_type, qualifier),
            None => BindingKey::unqualified(return_type),
        };
        let entry = bindings.entry(key).or_default();
        entry.insert(class.name.clone());
        for constant in method
            .class_constants
            .iter()
            .filter(|c| !is_framework_infrastructure(c.as_str()))
        {
            entry.insert(constant.clone());
        }
    }
}

fn abstract_supertypes<'a>(class: &'a ClassNode, classes: &'a ClassTable) -> Vec<&'a ClassNode> {
    let mut ancestors = Vec::new();
    let mut current = class.superclass.as_ref().and_then(|name| classes.get(name));
    while let Some(ancestor) = current {
        if ancestor.is_abstract {
            ancestors.push(ancestor);
        }
        current = ancestor.superclass.as_ref().and_then(|name| classes.get(name));
    }
    ancestors
}
