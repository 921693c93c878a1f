//! Basic-block IR: the boundary handed to a code generator.
//!
//! Module layout:
//! - (this file): types, instructions, blocks and their textual form
//! - `builder`: insertion cursor and structured conditional helpers
//! - `verify`: well-formedness checks on a finished function

pub mod builder;
pub mod verify;

pub use builder::{if_else, if_then, BlockId, IrBuilder};
pub use verify::{verify_function, verify_module};

use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IrError {
    #[error("no insertion block is set")]
    NoInsertionPoint,

    #[error("block '{block}' is already terminated")]
    BlockSealed { block: String },

    #[error("block '{block}' has no terminator")]
    UnterminatedBlock { block: String },

    #[error("block '{block}' branches to unknown block '{target}'")]
    UnknownTarget { block: String, target: String },

    #[error("block name '{name}' is used more than once")]
    DuplicateBlock { name: String },

    #[error("function '{function}' has no blocks")]
    EmptyFunction { function: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    I1,
    I32,
    F32,
}

impl Type {
    pub fn is_float(self) -> bool {
        matches!(self, Type::F32)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::I1 => write!(f, "i1"),
            Type::I32 => write!(f, "i32"),
            Type::F32 => write!(f, "float"),
        }
    }
}

/// SSA register holding the result of one instruction.
#[derive(Debug, Clone, PartialEq)]
pub struct Reg {
    pub name: String,
    pub ty: Type,
}

/// Stack storage produced by `alloca`; always used through a pointer.
#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    pub name: String,
    pub ty: Type,
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    ConstI32(i32),
    ConstF32(f32),
    ConstBool(bool),
    Reg(Reg),
}

impl Value {
    pub fn ty(&self) -> Type {
        match self {
            Value::ConstI32(_) => Type::I32,
            Value::ConstF32(_) => Type::F32,
            Value::ConstBool(_) => Type::I1,
            Value::Reg(reg) => reg.ty,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::ConstI32(n) => write!(f, "{n}"),
            // Floats are printed as the hex bits of the widened double
            Value::ConstF32(x) => write!(f, "0x{:016X}", f64::from(*x).to_bits()),
            Value::ConstBool(b) => write!(f, "{b}"),
            Value::Reg(reg) => write!(f, "%{}", reg.name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    SDiv,
    SRem,
    FAdd,
    FSub,
    FMul,
    FDiv,
    FRem,
    And,
    Or,
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinaryOp::Add => "add",
            BinaryOp::Sub => "sub",
            BinaryOp::Mul => "mul",
            BinaryOp::SDiv => "sdiv",
            BinaryOp::SRem => "srem",
            BinaryOp::FAdd => "fadd",
            BinaryOp::FSub => "fsub",
            BinaryOp::FMul => "fmul",
            BinaryOp::FDiv => "fdiv",
            BinaryOp::FRem => "frem",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntPredicate {
    Eq,
    Ne,
    Slt,
    Sle,
    Sgt,
    Sge,
}

impl fmt::Display for IntPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IntPredicate::Eq => "eq",
            IntPredicate::Ne => "ne",
            IntPredicate::Slt => "slt",
            IntPredicate::Sle => "sle",
            IntPredicate::Sgt => "sgt",
            IntPredicate::Sge => "sge",
        };
        write!(f, "{s}")
    }
}

/// Ordered predicates: false whenever either operand is NaN.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloatPredicate {
    Oeq,
    One,
    Olt,
    Ole,
    Ogt,
    Oge,
}

impl fmt::Display for FloatPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FloatPredicate::Oeq => "oeq",
            FloatPredicate::One => "one",
            FloatPredicate::Olt => "olt",
            FloatPredicate::Ole => "ole",
            FloatPredicate::Ogt => "ogt",
            FloatPredicate::Oge => "oge",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastOp {
    SIToFP,
    FPToSI,
    ZExt,
    UIToFP,
}

impl fmt::Display for CastOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CastOp::SIToFP => "sitofp",
            CastOp::FPToSI => "fptosi",
            CastOp::ZExt => "zext",
            CastOp::UIToFP => "uitofp",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Instr {
    Alloca {
        dest: Slot,
    },
    Load {
        dest: Reg,
        src: Slot,
    },
    Store {
        value: Value,
        dest: Slot,
    },
    Binary {
        dest: Reg,
        op: BinaryOp,
        lhs: Value,
        rhs: Value,
    },
    ICmp {
        dest: Reg,
        pred: IntPredicate,
        lhs: Value,
        rhs: Value,
    },
    FCmp {
        dest: Reg,
        pred: FloatPredicate,
        lhs: Value,
        rhs: Value,
    },
    Cast {
        dest: Reg,
        op: CastOp,
        value: Value,
    },
}

impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instr::Alloca { dest } => write!(f, "{dest} = alloca {}", dest.ty),
            Instr::Load { dest, src } => {
                write!(f, "%{} = load {}, {}* {src}", dest.name, dest.ty, src.ty)
            }
            Instr::Store { value, dest } => {
                write!(f, "store {} {value}, {}* {dest}", value.ty(), dest.ty)
            }
            Instr::Binary { dest, op, lhs, rhs } => {
                write!(f, "%{} = {op} {} {lhs}, {rhs}", dest.name, lhs.ty())
            }
            Instr::ICmp {
                dest,
                pred,
                lhs,
                rhs,
            } => write!(f, "%{} = icmp {pred} {} {lhs}, {rhs}", dest.name, lhs.ty()),
            Instr::FCmp {
                dest,
                pred,
                lhs,
                rhs,
            } => write!(f, "%{} = fcmp {pred} {} {lhs}, {rhs}", dest.name, lhs.ty()),
            Instr::Cast { dest, op, value } => write!(
                f,
                "%{} = {op} {} {value} to {}",
                dest.name,
                value.ty(),
                dest.ty
            ),
        }
    }
}

/// Control transfer ending a block. Targets are block names.
#[derive(Debug, Clone, PartialEq)]
pub enum Terminator {
    Br {
        target: String,
    },
    CondBr {
        cond: Value,
        then_target: String,
        else_target: String,
    },
    Ret(Option<Value>),
}

impl Terminator {
    pub fn targets(&self) -> Vec<&str> {
        match self {
            Terminator::Br { target } => vec![target.as_str()],
            Terminator::CondBr {
                then_target,
                else_target,
                ..
            } => vec![then_target.as_str(), else_target.as_str()],
            Terminator::Ret(_) => Vec::new(),
        }
    }
}

impl fmt::Display for Terminator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Terminator::Br { target } => write!(f, "br label %{target}"),
            Terminator::CondBr {
                cond,
                then_target,
                else_target,
            } => write!(
                f,
                "br i1 {cond}, label %{then_target}, label %{else_target}"
            ),
            Terminator::Ret(Some(value)) => write!(f, "ret {} {value}", value.ty()),
            Terminator::Ret(None) => write!(f, "ret void"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BasicBlock {
    pub name: String,
    pub instrs: Vec<Instr>,
    pub terminator: Option<Terminator>,
}

impl fmt::Display for BasicBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}:", self.name)?;
        for instr in &self.instrs {
            writeln!(f, "  {instr}")?;
        }
        if let Some(term) = &self.terminator {
            writeln!(f, "  {term}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    pub ret: Type,
    pub blocks: Vec<BasicBlock>,
}

impl Function {
    pub fn block(&self, name: &str) -> Option<&BasicBlock> {
        self.blocks.iter().find(|b| b.name == name)
    }

    pub fn instructions(&self) -> impl Iterator<Item = &Instr> {
        self.blocks.iter().flat_map(|b| b.instrs.iter())
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "define {} @{}() {{", self.ret, self.name)?;
        for (i, block) in self.blocks.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{block}")?;
        }
        writeln!(f, "}}")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub name: String,
    pub functions: Vec<Function>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            functions: Vec::new(),
        }
    }

    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|func| func.name == name)
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "; ModuleID = \"{}\"", self.name)?;
        for func in &self.functions {
            writeln!(f)?;
            write!(f, "{func}")?;
        }
        Ok(())
    }
}
