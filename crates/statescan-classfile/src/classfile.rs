use crate::annotation::Annotation;
use crate::constant_pool::ConstantPool;
use crate::error::{Error, Result};
use crate::reader::Reader;

#[derive(Debug, Clone)]
pub struct ClassFile {
    pub minor_version: u16,
    pub major_version: u16,
    pub access_flags: u16,
    pub this_class: String,
    pub super_class: Option<String>,
    pub interfaces: Vec<String>,
    pub fields: Vec<ClassMember>,
    pub methods: Vec<ClassMember>,
    pub signature: Option<String>,
    pub runtime_visible_annotations: Vec<Annotation>,
    pub runtime_invisible_annotations: Vec<Annotation>,
    pub inner_classes: Vec<InnerClassInfo>,
    /// Retained so callers can resolve constant-pool indices referenced
    /// from raw `Code` attribute bytes after parsing has finished.
    pub constant_pool: ConstantPool,
}

#[derive(Debug, Clone)]
pub struct ClassMember {
    pub access_flags: u16,
    pub name: String,
    pub descriptor: String,
    pub signature: Option<String>,
    pub runtime_visible_annotations: Vec<Annotation>,
    pub runtime_invisible_annotations: Vec<Annotation>,
    pub code: Option<CodeAttribute>,
}

/// The raw `Code` attribute of a method: its instruction stream plus enough
/// of the local-variable debug table to name locals in the stack simulator.
/// Stack-map frames and line numbers are not retained.
#[derive(Debug, Clone)]
pub struct CodeAttribute {
    pub max_stack: u16,
    pub max_locals: u16,
    pub code: Vec<u8>,
    pub local_variables: Vec<LocalVariableEntry>,
}

#[derive(Debug, Clone)]
pub struct LocalVariableEntry {
    pub start_pc: u16,
    pub length: u16,
    pub name: String,
    pub descriptor: String,
    pub index: u16,
}

impl CodeAttribute {
    /// The name bound to local slot `index` at `pc`, if the debug table
    /// covers that range.
    pub fn local_name_at(&self, index: u16, pc: u32) -> Option<&str> {
        self.local_variables.iter().find_map(|entry| {
            let start = entry.start_pc as u32;
            let end = start + entry.length as u32;
            if entry.index == index && pc >= start && pc < end {
                Some(entry.name.as_str())
            } else {
                None
            }
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InnerClassInfo {
    pub inner_class: String,
    pub outer_class: Option<String>,
    pub inner_name: Option<String>,
    pub access_flags: u16,
}

impl ClassFile {
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(bytes);
        let magic = reader.read_u4()?;
        if magic != 0xCAFEBABE {
            return Err(Error::InvalidMagic(magic));
        }

        let minor_version = reader.read_u2()?;
        let major_version = reader.read_u2()?;
        let cp = ConstantPool::parse(&mut reader)?;

        let access_flags = reader.read_u2()?;
        let this_class = cp.get_class_name(reader.read_u2()?)?;
        let super_class_idx = reader.read_u2()?;
        let super_class = if super_class_idx == 0 {
            None
        } else {
            Some(cp.get_class_name(super_class_idx)?)
        };

        let interfaces_count = reader.read_u2()? as usize;
        let mut interfaces = Vec::with_capacity(interfaces_count);
        for _ in 0..interfaces_count {
            interfaces.push(cp.get_class_name(reader.read_u2()?)?);
        }

        let fields_count = reader.read_u2()? as usize;
        let mut fields = Vec::with_capacity(fields_count);
        for _ in 0..fields_count {
            fields.push(parse_member(&mut reader, &cp)?);
        }

        let methods_count = reader.read_u2()? as usize;
        let mut methods = Vec::with_capacity(methods_count);
        for _ in 0..methods_count {
            methods.push(parse_member(&mut reader, &cp)?);
        }

        let class_attrs = parse_attributes(&mut reader, &cp, AttributeTarget::Class)?;

        reader.ensure_empty()?;

        Ok(Self {
            minor_version,
            major_version,
            access_flags,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            signature: class_attrs.signature,
            runtime_visible_annotations: class_attrs.runtime_visible_annotations,
            runtime_invisible_annotations: class_attrs.runtime_invisible_annotations,
            inner_classes: class_attrs.inner_classes,
            constant_pool: cp,
        })
    }
}

fn parse_member(reader: &mut Reader<'_>, cp: &ConstantPool) -> Result<ClassMember> {
    let access_flags = reader.read_u2()?;
    let name = cp.get_utf8(reader.read_u2()?)?.to_string();
    let descriptor = cp.get_utf8(reader.read_u2()?)?.to_string();

    let attrs = parse_attributes(reader, cp, AttributeTarget::Member)?;
    Ok(ClassMember {
        access_flags,
        name,
        descriptor,
        signature: attrs.signature,
        runtime_visible_annotations: attrs.runtime_visible_annotations,
        runtime_invisible_annotations: attrs.runtime_invisible_annotations,
        code: attrs.code,
    })
}

#[derive(Default)]
struct ParsedAttributes {
    signature: Option<String>,
    runtime_visible_annotations: Vec<Annotation>,
    runtime_invisible_annotations: Vec<Annotation>,
    inner_classes: Vec<InnerClassInfo>,
    code: Option<CodeAttribute>,
}

enum AttributeTarget {
    Class,
    Member,
}

fn parse_attributes(
    reader: &mut Reader<'_>,
    cp: &ConstantPool,
    target: AttributeTarget,
) -> Result<ParsedAttributes> {
    let attributes_count = reader.read_u2()? as usize;
    let mut parsed = ParsedAttributes::default();
    for _ in 0..attributes_count {
        let name_index = reader.read_u2()?;
        let length = reader.read_u4()? as usize;
        let info = reader.read_bytes(length)?;
        let name = cp.get_utf8(name_index)?;

        let mut sub = Reader::new(info);
        match name {
            "Signature" => {
                let sig_index = sub.read_u2()?;
                parsed.signature = Some(cp.get_utf8(sig_index)?.to_string());
                sub.ensure_empty()?;
            }
            "RuntimeVisibleAnnotations" => {
                let num = sub.read_u2()? as usize;
                let mut anns = Vec::with_capacity(num);
                for _ in 0..num {
                    anns.push(Annotation::parse(&mut sub, cp)?);
                }
                parsed.runtime_visible_annotations.extend(anns);
                sub.ensure_empty()?;
            }
            "RuntimeInvisibleAnnotations" => {
                let num = sub.read_u2()? as usize;
                let mut anns = Vec::with_capacity(num);
                for _ in 0..num {
                    anns.push(Annotation::parse(&mut sub, cp)?);
                }
                parsed.runtime_invisible_annotations.extend(anns);
                sub.ensure_empty()?;
            }
            "InnerClasses" if matches!(target, AttributeTarget::Class) => {
                let num = sub.read_u2()? as usize;
                let mut inners = Vec::with_capacity(num);
                for _ in 0..num {
                    let inner_class_info_index = sub.read_u2()?;
                    let outer_class_info_index = sub.read_u2()?;
                    let inner_name_index = sub.read_u2()?;
                    let inner_access_flags = sub.read_u2()?;

                    let inner_class = cp.get_class_name(inner_class_info_index)?;
                    let outer_class = if outer_class_info_index == 0 {
                        None
                    } else {
                        Some(cp.get_class_name(outer_class_info_index)?)
                    };
                    let inner_name = if inner_name_index == 0 {
                        None
                    } else {
                        Some(cp.get_utf8(inner_name_index)?.to_string())
                    };

                    inners.push(InnerClassInfo {
                        inner_class,
                        outer_class,
                        inner_name,
                        access_flags: inner_access_flags,
                    });
                }
                parsed.inner_classes.extend(inners);
                sub.ensure_empty()?;
            }
            "Code" if matches!(target, AttributeTarget::Member) => {
                parsed.code = Some(parse_code_attribute(&mut sub, cp)?);
            }
            _ => {
                // Unknown attribute: intentionally skipped.
            }
        }
    }

    Ok(parsed)
}

fn parse_code_attribute(reader: &mut Reader<'_>, cp: &ConstantPool) -> Result<CodeAttribute> {
    let max_stack = reader.read_u2()?;
    let max_locals = reader.read_u2()?;
    let code_length = reader.read_u4()? as usize;
    let code = reader.read_bytes(code_length)?.to_vec();

    let exception_table_length = reader.read_u2()? as usize;
    for _ in 0..exception_table_length {
        // start_pc, end_pc, handler_pc, catch_type
        reader.read_u2()?;
        reader.read_u2()?;
        reader.read_u2()?;
        reader.read_u2()?;
    }

    let mut local_variables = Vec::new();
    let attributes_count = reader.read_u2()? as usize;
    for _ in 0..attributes_count {
        let name_index = reader.read_u2()?;
        let length = reader.read_u4()? as usize;
        let info = reader.read_bytes(length)?;
        let name = cp.get_utf8(name_index)?;

        if name == "LocalVariableTable" {
            let mut sub = Reader::new(info);
            let num = sub.read_u2()? as usize;
            for _ in 0..num {
                let start_pc = sub.read_u2()?;
                let length = sub.read_u2()?;
                let name_index = sub.read_u2()?;
                let descriptor_index = sub.read_u2()?;
                let index = sub.read_u2()?;
                local_variables.push(LocalVariableEntry {
                    start_pc,
                    length,
                    name: cp.get_utf8(name_index)?.to_string(),
                    descriptor: cp.get_utf8(descriptor_index)?.to_string(),
                    index,
                });
            }
            sub.ensure_empty()?;
        }
        // Other nested attributes (StackMapTable, LineNumberTable, ...) are
        // intentionally skipped: the simulator is not flow-sensitive and
        // findings only carry an optional source line.
    }

    Ok(CodeAttribute {
        max_stack,
        max_locals,
        code,
        local_variables,
    })
}
