//! Declarative-module binding parser.
//!
//! A class is a *module* if it descends (directly or transitively) from a
//! recognized binder base, or implements a recognized module interface.
//! Each module's `configure()` invocation stream is mined for `bind(A).to(B)`
//! style call chains and provider methods.

use indexmap::{IndexMap, IndexSet};
use statescan_core::Name;
use statescan_model::{BindingKey, ClassNode};

use crate::frameworks::{is_binder_base, is_framework_infrastructure, is_module_interface};
use crate::qualifier::qualifier_of;

pub type ClassTable = IndexMap<Name, ClassNode>;
pub type BindingMap = IndexMap<BindingKey, IndexSet<Name>>;
/// Implementation class name -> the declarative module that bound it.
/// Populated only by `parse_module`; bean-discovered bindings have no
/// module to attribute and never appear here.
pub type ModuleOrigins = IndexMap<Name, Name>;

pub fn is_module(class: &ClassNode, classes: &ClassTable) -> bool {
    if class
        .interfaces
        .iter()
        .any(|iface| is_module_interface(iface.as_str()))
    {
        return true;
    }
    let mut current = class.superclass.as_ref();
    while let Some(super_name) = current {
        if is_binder_base(super_name.as_str()) {
            return true;
        }
        current = classes
            .get(super_name)
            .and_then(|parent| parent.superclass.as_ref());
    }
    false
}

/// Parses every declarative module reachable from `class`, merging bindings
/// into `bindings`. `visited` guards against `install()` cycles between
/// modules.
pub fn parse_module(
    class: &ClassNode,
    classes: &ClassTable,
    bindings: &mut BindingMap,
    origins: &mut ModuleOrigins,
    visited: &mut IndexSet<Name>,
) {
    if !visited.insert(class.name.clone()) {
        return;
    }
    let module_name = class.name.clone();

    for chain_class in module_chain(class, classes) {
        if let Some(configure) = chain_class.method_named("configure") {
            if configure.descriptor.as_str() == "()V" {
                parse_configure_method(configure, classes, bindings, origins, &module_name, visited);
            }
        }

        for method in &chain_class.methods {
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
            entry.insert(chain_class.name.clone());
            origins.entry(chain_class.name.clone()).or_insert_with(|| module_name.clone());
            for constant in &chain_class_constants(method) {
                entry.insert((*constant).clone());
                origins.entry((*constant).clone()).or_insert_with(|| module_name.clone());
            }
        }
    }
}

fn parse_configure_method(
    configure: &statescan_model::MethodNode,
    classes: &ClassTable,
    bindings: &mut BindingMap,
    origins: &mut ModuleOrigins,
    module_name: &Name,
    visited: &mut IndexSet<Name>,
) {
    let has_bind = configure
        .invocations
        .iter()
        .any(|inv| inv.target.name.as_str() == "bind");
    let has_to = configure.invocations.iter().any(|inv| {
        matches!(inv.target.name.as_str(), "to" | "toInstance")
    });

    if has_bind && has_to {
        let constants: Vec<&Name> = chain_class_constants(configure);
        let mut i = 0;
        while i + 1 < constants.len() {
            let key = BindingKey::unqualified(constants[i].clone());
            bindings.entry(key).or_default().insert(constants[i + 1].clone());
            origins.entry(constants[i + 1].clone()).or_insert_with(|| module_name.clone());
            i += 2;
        }
    }

    let has_install = configure
        .invocations
        .iter()
        .any(|inv| inv.target.name.as_str() == "install");
    if has_install {
        for constant in chain_class_constants(configure) {
            if let Some(referenced) = classes.get(constant) {
                if is_module(referenced, classes) {
                    parse_module(referenced, classes, bindings, origins, visited);
                }
            }
        }
    }
}

/// `method`'s class constants, filtered of DI-framework infrastructure
/// references, in declaration order.
fn chain_class_constants(method: &statescan_model::MethodNode) -> Vec<&Name> {
    method
        .class_constants
        .iter()
        .filter(|constant| !is_framework_infrastructure(constant.as_str()))
        .collect()
}

/// The module's own inheritance chain up to (but excluding) the recognized
/// binder base, ordered parent-first.
fn module_chain<'a>(class: &'a ClassNode, classes: &'a ClassTable) -> Vec<&'a ClassNode> {
    let mut chain = Vec::new();
    let mut current = Some(class);
    while let Some(c) = current {
        chain.push(c);
        let Some(super_name) = &c.superclass else { break };
        if is_binder_base(super_name.as_str()) {
            break;
        }
        current = classes.get(super_name);
    }
    chain.reverse();
    chain
}

#[cfg(test)]
mod tests {
    use super::*;
    use statescan_model::{AccessFlags, Invocation, InvokeKind, MethodNode, MethodRef};

    fn module_class(name: &str) -> ClassNode {
        let mut class = ClassNode::new(name);
        class.superclass = Some(Name::new("com.google.inject.AbstractModule"));
        class
    }

    #[test]
    fn detects_module_by_binder_base() {
        let classes = ClassTable::new();
        let class = module_class("com.example.AppModule");
        assert!(is_module(&class, &classes));
    }

    #[test]
    fn bind_to_chain_produces_unqualified_binding() {
        let mut class = module_class("com.example.AppModule");
        let mut configure = MethodNode::new("configure", "()V", AccessFlags(0));
        configure.invocations.push(Invocation {
            target: MethodRef::new("com.google.inject.binder.AnnotatedBindingBuilder", "bind", "()V"),
            kind: InvokeKind::Virtual,
            receiver: None,
            arguments: Vec::new(),
            bytecode_offset: 0,
        });
        configure.invocations.push(Invocation {
            target: MethodRef::new("com.google.inject.binder.LinkedBindingBuilder", "to", "()V"),
            kind: InvokeKind::Virtual,
            receiver: None,
            arguments: Vec::new(),
            bytecode_offset: 3,
        });
        configure
            .class_constants
            .insert(Name::new("com.example.Repository"));
        configure
            .class_constants
            .insert(Name::new("com.example.JdbcRepository"));
        class.methods.push(configure);

        let classes = ClassTable::new();
        let mut bindings = BindingMap::new();
        let mut origins = ModuleOrigins::new();
        let mut visited = IndexSet::new();
        parse_module(&class, &classes, &mut bindings, &mut origins, &mut visited);

        let key = BindingKey::unqualified("com.example.Repository");
        assert!(bindings.get(&key).unwrap().contains("com.example.JdbcRepository"));
        assert_eq!(origins.get("com.example.JdbcRepository").unwrap().as_str(), "com.example.AppModule");
    }

    #[test]
    fn multiple_bindings_pair_two_at_a_time_without_overlap() {
        let mut class = module_class("com.example.AppModule");
        let mut configure = MethodNode::new("configure", "()V", AccessFlags(0));
        configure.invocations.push(Invocation {
            target: MethodRef::new("com.google.inject.binder.AnnotatedBindingBuilder", "bind", "()V"),
            kind: InvokeKind::Virtual,
            receiver: None,
            arguments: Vec::new(),
            bytecode_offset: 0,
        });
        configure.invocations.push(Invocation {
            target: MethodRef::new("com.google.inject.binder.LinkedBindingBuilder", "to", "()V"),
            kind: InvokeKind::Virtual,
            receiver: None,
            arguments: Vec::new(),
            bytecode_offset: 3,
        });
        for name in [
            "com.example.Repository",
            "com.example.JdbcRepository",
            "com.example.Notifier",
            "com.example.EmailNotifier",
        ] {
            configure.class_constants.insert(Name::new(name));
        }
        class.methods.push(configure);

        let classes = ClassTable::new();
        let mut bindings = BindingMap::new();
        let mut origins = ModuleOrigins::new();
        let mut visited = IndexSet::new();
        parse_module(&class, &classes, &mut bindings, &mut origins, &mut visited);

        let repository_key = BindingKey::unqualified("com.example.Repository");
        assert!(bindings.get(&repository_key).unwrap().contains("com.example.JdbcRepository"));
        let notifier_key = BindingKey::unqualified("com.example.Notifier");
        assert!(bindings.get(&notifier_key).unwrap().contains("com.example.EmailNotifier"));

        // The middle pairing must not appear: "JdbcRepository" is an
        // implementation, not an interface with its own binding.
        let spurious_key = BindingKey::unqualified("com.example.JdbcRepository");
        assert!(bindings.get(&spurious_key).is_none());
    }
}
