//! Bounded, non-flow-sensitive operand-stack simulator for `Code` bodies.
//!
//! Walks the instruction stream in a single linear pass (no control-flow
//! joins) tagging each stack entry with where it came from, so call sites
//! can be attributed to a receiver (field / parameter / local / `this` /
//! freshly constructed object) and its arguments tagged the same way.

use indexmap::IndexSet;
use statescan_core::{canonical, parameter_types};
use statescan_model::{
    FieldAccess, FieldRef, Invocation, InvokeKind, LiteralValue, MethodRef, StackTag,
};

use crate::classfile::CodeAttribute;
use crate::constant_pool::{CpInfo, ConstantPool};
use crate::error::Result;

/// Decoded contents of one method body: its call sites, field accesses, and
/// the set of class constants it loads (used by the DI-binding parser's
/// class-constant pairing heuristic).
#[derive(Debug, Default, Clone)]
pub struct DecodedBody {
    pub invocations: Vec<Invocation>,
    pub field_accesses: Vec<FieldAccess>,
    pub class_constants: IndexSet<String>,
}

/// Simulates `code` and returns its decoded call sites, field accesses and
/// class-constant references.
///
/// `is_static` and `param_descriptor` seed the local-variable table: slot 0
/// holds `this` for instance methods, followed by one slot per declared
/// parameter (two for `long`/`double`).
pub fn decode_body(
    code: &CodeAttribute,
    cp: &ConstantPool,
    method_descriptor: &str,
    is_static: bool,
) -> Result<DecodedBody> {
    let mut sim = Simulator::new(code, cp, method_descriptor, is_static);
    sim.run()?;
    Ok(sim.body)
}

struct Simulator<'a> {
    code: &'a [u8],
    cp: &'a ConstantPool,
    locals: Vec<Option<StackTag>>,
    stack: Vec<StackTag>,
    body: DecodedBody,
}

impl<'a> Simulator<'a> {
    fn new(code: &'a CodeAttribute, cp: &'a ConstantPool, method_descriptor: &str, is_static: bool) -> Self {
        let mut locals: Vec<Option<StackTag>> = Vec::new();
        if !is_static {
            locals.push(Some(StackTag::This));
        }
        if let Some(params) = parameter_types(method_descriptor) {
            for param in params {
                let ty = canonical(&param);
                let wide = param == "J" || param == "D";
                locals.push(Some(StackTag::Param {
                    index: locals.len() as u16,
                    ty,
                }));
                if wide {
                    locals.push(None);
                }
            }
        }

        Self {
            code: &code.code,
            cp,
            locals,
            stack: Vec::new(),
            body: DecodedBody::default(),
        }
    }

    fn local(&self, index: u16) -> StackTag {
        self.locals
            .get(index as usize)
            .and_then(|slot| slot.clone())
            .unwrap_or(StackTag::Local { index, ty: None })
    }

    fn set_local(&mut self, index: u16, tag: StackTag) {
        if self.locals.len() <= index as usize {
            self.locals.resize(index as usize + 1, None);
        }
        self.locals[index as usize] = Some(tag);
    }

    fn pop(&mut self) -> StackTag {
        self.stack.pop().unwrap_or(StackTag::Computed { ty: None })
    }

    fn push(&mut self, tag: StackTag) {
        self.stack.push(tag);
    }

    fn run(&mut self) -> Result<()> {
        let mut pc: usize = 0;
        while pc < self.code.len() {
            let opcode = self.code[pc];
            let consumed = self.step(pc, opcode)?;
            pc += consumed;
        }
        Ok(())
    }

    /// Executes the instruction at `pc` and returns its total length
    /// (including the opcode byte itself) so the caller can advance.
    fn step(&mut self, pc: usize, opcode: u8) -> Result<usize> {
        match opcode {
            0x00 => Ok(1), // nop
            0x01 => {
                self.push(StackTag::Literal(LiteralValue::Null));
                Ok(1)
            }
            0x02..=0x08 => {
                // iconst_m1 .. iconst_5
                let value = opcode as i32 - 0x03;
                self.push(StackTag::Literal(LiteralValue::Int(value)));
                Ok(1)
            }
            0x09 | 0x0a => {
                self.push(StackTag::Literal(LiteralValue::Long((opcode - 0x09) as i64)));
                Ok(1)
            }
            0x0b..=0x0d => {
                self.push(StackTag::Literal(LiteralValue::Float((opcode - 0x0b) as f32)));
                Ok(1)
            }
            0x0e | 0x0f => {
                self.push(StackTag::Literal(LiteralValue::Double((opcode - 0x0e) as f64)));
                Ok(1)
            }
            0x10 => {
                let value = self.byte_at(pc + 1) as i8 as i32;
                self.push(StackTag::Literal(LiteralValue::Int(value)));
                Ok(2)
            }
            0x11 => {
                let value = self.u16_at(pc + 1) as i16 as i32;
                self.push(StackTag::Literal(LiteralValue::Int(value)));
                Ok(3)
            }
            0x12 => {
                let index = self.byte_at(pc + 1) as u16;
                self.push(self.loadable_tag(index));
                Ok(2)
            }
            0x13 | 0x14 => {
                let index = self.u16_at(pc + 1);
                self.push(self.loadable_tag(index));
                Ok(3)
            }
            // *load, short forms
            0x15..=0x19 => {
                let index = self.byte_at(pc + 1) as u16;
                self.push(self.local(index));
                Ok(2)
            }
            0x1a..=0x2d => {
                let (kind_index, slot) = ((opcode - 0x1a) / 4, (opcode - 0x1a) % 4);
                let _ = kind_index;
                self.push(self.local(slot as u16));
                Ok(1)
            }
            // array loads: ..., arrayref, index => ..., value
            0x2e..=0x35 => {
                self.pop();
                self.pop();
                self.push(StackTag::Computed { ty: None });
                Ok(1)
            }
            // *store, short forms
            0x36..=0x3a => {
                let index = self.byte_at(pc + 1) as u16;
                let value = self.pop();
                self.set_local(index, value);
                Ok(2)
            }
            0x3b..=0x4e => {
                let slot = (opcode - 0x3b) % 4;
                let value = self.pop();
                self.set_local(slot as u16, value);
                Ok(1)
            }
            // array stores: ..., arrayref, index, value => ...
            0x4f..=0x56 => {
                self.pop();
                self.pop();
                self.pop();
                Ok(1)
            }
            0x57 => {
                self.pop();
                Ok(1)
            }
            0x58 => {
                self.pop();
                self.pop();
                Ok(1)
            }
            0x59 => {
                let top = self.pop();
                self.push(top.clone());
                self.push(top);
                Ok(1)
            }
            0x5a => {
                let top = self.pop();
                let second = self.pop();
                self.push(top.clone());
                self.push(second);
                self.push(top);
                Ok(1)
            }
            0x5b => {
                let top = self.pop();
                let second = self.pop();
                let third = self.pop();
                self.push(top.clone());
                self.push(third);
                self.push(second);
                self.push(top);
                Ok(1)
            }
            0x5c => {
                let top = self.pop();
                let second = self.pop();
                self.push(second.clone());
                self.push(top.clone());
                self.push(second);
                self.push(top);
                Ok(1)
            }
            0x5d | 0x5e => {
                // dup2_x1 / dup2_x2: approximate by re-pushing the top two
                // values once more ahead of themselves (arity preserved; the
                // exact ordering below the duplicated pair is not load
                // bearing for any detector).
                let top = self.pop();
                let second = self.pop();
                self.push(top.clone());
                self.push(second.clone());
                self.push(top);
                self.push(second);
                Ok(1)
            }
            0x5f => {
                let top = self.pop();
                let second = self.pop();
                self.push(top);
                self.push(second);
                Ok(1)
            }
            // new: pushed lazily, realized on the matching `dup`/constructor call.
            0xbb => {
                let index = self.u16_at(pc + 1);
                let ty = self.cp.get_class_name(index).unwrap_or_default();
                self.push(StackTag::NewObject {
                    ty: canonical(&format!("L{ty};")).unwrap_or(ty),
                });
                Ok(3)
            }
            0xb4 => {
                // getfield: ..., objectref => ..., value
                let index = self.u16_at(pc + 1);
                let (owner, name, descriptor) = self.cp.get_member_ref(index)?;
                let receiver = self.pop();
                self.body.field_accesses.push(FieldAccess {
                    target: FieldRef::new(owner, name.clone(), descriptor.clone()),
                    receiver: Some(receiver),
                    is_write: false,
                });
                self.push(StackTag::Field {
                    name: name.into(),
                    ty: canonical(&descriptor),
                });
                Ok(3)
            }
            0xb5 => {
                // putfield: ..., objectref, value => ...
                let index = self.u16_at(pc + 1);
                let (owner, name, descriptor) = self.cp.get_member_ref(index)?;
                let value = self.pop();
                let receiver = self.pop();
                let _ = value;
                self.body.field_accesses.push(FieldAccess {
                    target: FieldRef::new(owner, name, descriptor),
                    receiver: Some(receiver),
                    is_write: true,
                });
                Ok(3)
            }
            0xb2 => {
                // getstatic: ... => ..., value
                let index = self.u16_at(pc + 1);
                let (owner, name, descriptor) = self.cp.get_member_ref(index)?;
                self.body.field_accesses.push(FieldAccess {
                    target: FieldRef::new(owner, name.clone(), descriptor.clone()),
                    receiver: None,
                    is_write: false,
                });
                self.push(StackTag::Field {
                    name: name.into(),
                    ty: canonical(&descriptor),
                });
                Ok(3)
            }
            0xb3 => {
                // putstatic: ..., value => ...
                let index = self.u16_at(pc + 1);
                let (owner, name, descriptor) = self.cp.get_member_ref(index)?;
                self.pop();
                self.body.field_accesses.push(FieldAccess {
                    target: FieldRef::new(owner, name, descriptor),
                    receiver: None,
                    is_write: true,
                });
                Ok(3)
            }
            0xb6 | 0xb7 | 0xb8 | 0xb9 => self.invoke(pc, opcode),
            0xba => {
                // invokedynamic: treated as a static-kind call with a
                // synthetic owner; its arguments are still popped by arity.
                let index = self.u16_at(pc + 1);
                let (_, name, descriptor) = self
                    .cp
                    .get_member_ref(index)
                    .unwrap_or_else(|_| ("<indy>".to_string(), "<indy>".to_string(), "()V".to_string()));
                let arg_count = parameter_types(&descriptor).map(|p| p.len()).unwrap_or(0);
                let mut arguments = Vec::with_capacity(arg_count);
                for _ in 0..arg_count {
                    arguments.push(self.pop());
                }
                arguments.reverse();
                self.body.invocations.push(Invocation {
                    target: MethodRef::new("<dynamic>", name, descriptor.clone()),
                    kind: InvokeKind::Dynamic,
                    receiver: None,
                    arguments,
                    bytecode_offset: pc as u32,
                });
                if let Some(ret) = statescan_core::return_type(&descriptor) {
                    self.push(StackTag::Computed { ty: Some(ret) });
                } else if !descriptor.ends_with('V') {
                    self.push(StackTag::Computed { ty: None });
                }
                Ok(5)
            }
            0xc0 | 0xc1 => {
                // checkcast / instanceof: stack depth unchanged for
                // checkcast (the object is re-typed in place); instanceof
                // replaces the object with a boolean.
                let index = self.u16_at(pc + 1);
                let ty = self.cp.get_class_name(index).ok();
                if opcode == 0xc1 {
                    self.pop();
                    self.push(StackTag::Computed { ty: None });
                } else if let Some(top) = self.stack.last_mut() {
                    if let StackTag::Computed { ty: slot } = top {
                        *slot = ty.and_then(|t| canonical(&format!("L{t};")));
                    }
                }
                Ok(3)
            }
            // returns and athrow: the simulator is not flow-sensitive, so
            // the stack is simply cleared at any exit point.
            0xac..=0xb1 | 0xbf => {
                self.stack.clear();
                Ok(1)
            }
            0xaa | 0xab => self.switch_length(pc, opcode),
            0x84 => Ok(3), // iinc: opcode, index, const
            0xbc => {
                // newarray: ..., count => ..., arrayref
                self.pop();
                self.push(StackTag::Computed { ty: None });
                Ok(2)
            }
            0xbd => {
                // anewarray: ..., count => ..., arrayref
                self.pop();
                self.push(StackTag::Computed { ty: None });
                Ok(3)
            }
            0xbe => {
                // arraylength: ..., arrayref => ..., length
                self.pop();
                self.push(StackTag::Computed { ty: Some("int".to_string()) });
                Ok(1)
            }
            0xc4 => self.wide_length(pc),
            0xc5 => {
                self.u16_at(pc + 1);
                let dims = self.byte_at(pc + 3);
                for _ in 0..dims {
                    self.pop();
                }
                self.push(StackTag::Computed { ty: None });
                Ok(4)
            }
            _ => Ok(generic_instruction_length(self.code, pc, opcode)),
        }
    }

    fn invoke(&mut self, pc: usize, opcode: u8) -> Result<usize> {
        let index = self.u16_at(pc + 1);
        let (owner, name, descriptor) = self.cp.get_member_ref(index)?;
        let kind = match opcode {
            0xb6 => InvokeKind::Virtual,
            0xb7 => InvokeKind::Special,
            0xb8 => InvokeKind::Static,
            0xb9 => InvokeKind::Interface,
            _ => unreachable!(),
        };

        let arg_count = parameter_types(&descriptor).map(|p| p.len()).unwrap_or(0);
        let mut arguments = Vec::with_capacity(arg_count);
        for _ in 0..arg_count {
            arguments.push(self.pop());
        }
        arguments.reverse();

        let receiver = if matches!(kind, InvokeKind::Static) {
            None
        } else {
            Some(self.pop())
        };

        self.body.invocations.push(Invocation {
            target: MethodRef::new(owner, name, descriptor.clone()),
            kind,
            receiver,
            arguments,
            bytecode_offset: pc as u32,
        });

        if let Some(ret) = statescan_core::return_type(&descriptor) {
            self.push(StackTag::Computed { ty: Some(ret) });
        } else if !descriptor.ends_with('V') {
            self.push(StackTag::Computed { ty: None });
        }

        Ok(if opcode == 0xb9 { 5 } else { 3 })
    }

    fn loadable_tag(&mut self, index: u16) -> StackTag {
        match self.cp.get_loadable(index) {
            Ok(CpInfo::Class { .. }) => {
                if let Ok(name) = self.cp.get_class_name(index) {
                    let canonical_name = canonical(&format!("L{name};")).unwrap_or(name);
                    self.body.class_constants.insert(canonical_name.clone());
                    StackTag::Literal(LiteralValue::Class(canonical_name.into()))
                } else {
                    StackTag::Computed { ty: None }
                }
            }
            Ok(CpInfo::String { .. }) => StackTag::Literal(LiteralValue::String(String::new())),
            Ok(CpInfo::Integer(value)) => StackTag::Literal(LiteralValue::Int(*value)),
            Ok(CpInfo::Float(value)) => StackTag::Literal(LiteralValue::Float(*value)),
            Ok(CpInfo::Long(value)) => StackTag::Literal(LiteralValue::Long(*value)),
            Ok(CpInfo::Double(value)) => StackTag::Literal(LiteralValue::Double(*value)),
            _ => StackTag::Computed { ty: None },
        }
    }

    fn byte_at(&self, pos: usize) -> u8 {
        self.code.get(pos).copied().unwrap_or(0)
    }

    fn u16_at(&self, pos: usize) -> u16 {
        u16::from_be_bytes([self.byte_at(pos), self.byte_at(pos + 1)])
    }

    fn wide_length(&mut self, pc: usize) -> Result<usize> {
        let modified_opcode = self.byte_at(pc + 1);
        if modified_opcode == 0x84 {
            Ok(6) // wide iinc
        } else {
            let index = self.u16_at(pc + 2);
            match modified_opcode {
                0x15..=0x19 => self.push(self.local(index)),
                0x36..=0x3a => {
                    let value = self.pop();
                    self.set_local(index, value);
                }
                _ => {}
            }
            Ok(4)
        }
    }

    fn switch_length(&mut self, pc: usize, opcode: u8) -> Result<usize> {
        self.pop();
        // Pad so the default-offset word starts at an address divisible by
        // four, measured from the start of the code array (not from `pc`).
        let mut cursor = pc + 1;
        while cursor % 4 != 0 {
            cursor += 1;
        }
        let default_offset_end = cursor + 4;
        if opcode == 0xaa {
            let low_end = default_offset_end + 4;
            let high_end = low_end + 4;
            let low = i32::from_be_bytes([
                self.byte_at(default_offset_end),
                self.byte_at(default_offset_end + 1),
                self.byte_at(default_offset_end + 2),
                self.byte_at(default_offset_end + 3),
            ]);
            let high = i32::from_be_bytes([
                self.byte_at(low_end),
                self.byte_at(low_end + 1),
                self.byte_at(low_end + 2),
                self.byte_at(low_end + 3),
            ]);
            let count = (high - low + 1).max(0) as usize;
            Ok(high_end + count * 4 - pc)
        } else {
            let count = u32::from_be_bytes([
                self.byte_at(default_offset_end),
                self.byte_at(default_offset_end + 1),
                self.byte_at(default_offset_end + 2),
                self.byte_at(default_offset_end + 3),
            ]) as usize;
            Ok(default_offset_end + 4 + count * 8 - pc)
        }
    }
}

/// Length (in bytes, including the opcode) of instructions not individually
/// stack-simulated above: arithmetic, conversions, comparisons, branches and
/// the remaining fixed-width forms.
fn generic_instruction_length(code: &[u8], pc: usize, opcode: u8) -> usize {
    match opcode {
        0x60..=0x83 => 1,                               // arithmetic / conversions
        0x85..=0x98 => 1,                                // further conversions / compares
        0x99..=0xa7 => 3,                                // if_*, goto
        0xa8 => 3,                                       // jsr
        0xa9 => 2,                                       // ret
        0xc6 | 0xc7 => 3,                                // ifnull, ifnonnull
        0xc8 | 0xc9 => 5,                                // goto_w, jsr_w
        0xca => 1,                                       // breakpoint
        0xcb..=0xfd => 1,                                // reserved/unassigned
        0xfe | 0xff => 1,                                // impdep1/2
        _ => {
            let _ = code;
            let _ = pc;
            1
        }
    }
}
