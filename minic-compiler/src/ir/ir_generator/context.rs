use crate::backend::{
    CastOp, FloatPredicate, Function, IntPredicate, IrBuilder, Slot, Type, Value,
};
use crate::ir::ast::PrimitiveType;
use crate::ir::symbol_table::SymbolTable;
use crate::{CompileError, SemanticErrorKind};

/// Operand stack entry.
///
/// Identifiers push their storage; the load is deferred until a consumer
/// needs the value.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Value(Value),
    Storage(Slot),
}

/// State of one lowering pass. Dropped when the pass ends.
pub struct Gen {
    pub builder: IrBuilder,
    pub symbols: SymbolTable,
    stack: Vec<Operand>,
}

impl AsMut<IrBuilder> for Gen {
    fn as_mut(&mut self) -> &mut IrBuilder {
        &mut self.builder
    }
}

impl Gen {
    pub fn new(function_name: &str) -> Self {
        Self {
            builder: IrBuilder::new(function_name, Type::I32),
            symbols: SymbolTable::new(),
            stack: Vec::new(),
        }
    }

    /// Hand back the function; every pushed operand must have been consumed.
    pub fn finish(self) -> Result<Function, CompileError> {
        if !self.stack.is_empty() {
            return Err(CompileError::Internal(format!(
                "{} operand(s) left on the stack after lowering",
                self.stack.len()
            )));
        }
        Ok(self.builder.finish())
    }

    pub fn make_error(
        &self,
        kind: SemanticErrorKind,
        name: &str,
        message: String,
    ) -> CompileError {
        CompileError::Semantic {
            kind,
            name: name.to_string(),
            message,
        }
    }

    // ── Operand stack ──

    pub fn push(&mut self, operand: Operand) {
        self.stack.push(operand);
    }

    pub fn push_value(&mut self, value: Value) {
        self.stack.push(Operand::Value(value));
    }

    pub fn pop(&mut self) -> Result<Operand, CompileError> {
        self.stack
            .pop()
            .ok_or_else(|| CompileError::Internal("operand stack underflow".to_string()))
    }

    /// Pop and load if the operand is still in memory.
    pub fn pop_value(&mut self) -> Result<Value, CompileError> {
        let operand = self.pop()?;
        self.materialize(operand)
    }

    /// Pop the two operands of a binary consumer, left first in the result.
    pub fn pop_pair(&mut self) -> Result<(Value, Value), CompileError> {
        let rhs = self.pop()?;
        let lhs = self.pop()?;
        let lhs = self.materialize(lhs)?;
        let rhs = self.materialize(rhs)?;
        Ok((lhs, rhs))
    }

    pub fn materialize(&mut self, operand: Operand) -> Result<Value, CompileError> {
        match operand {
            Operand::Value(v) => Ok(v),
            Operand::Storage(slot) => Ok(self.builder.load(&slot)?),
        }
    }

    // ── Types and conversions ──

    pub fn ir_type(ty: PrimitiveType) -> Type {
        match ty {
            PrimitiveType::Int => Type::I32,
            PrimitiveType::Float => Type::F32,
        }
    }

    /// Convert `value` to `to`. Constants are folded.
    pub fn coerce(&mut self, value: Value, to: Type) -> Result<Value, CompileError> {
        let from = value.ty();
        if from == to {
            return Ok(value);
        }
        let converted = match (value, to) {
            (Value::ConstI32(n), Type::F32) => Value::ConstF32(n as f32),
            (Value::ConstF32(x), Type::I32) => Value::ConstI32(x as i32),
            (Value::ConstBool(b), Type::I32) => Value::ConstI32(i32::from(b)),
            (Value::ConstBool(b), Type::F32) => Value::ConstF32(if b { 1.0 } else { 0.0 }),
            (value, Type::I1) => return self.to_bool(value),
            (value, Type::F32) if from == Type::I1 => {
                self.builder.cast(CastOp::UIToFP, value, Type::F32)?
            }
            (value, Type::F32) => self.builder.cast(CastOp::SIToFP, value, Type::F32)?,
            (value, Type::I32) if from == Type::I1 => {
                self.builder.cast(CastOp::ZExt, value, Type::I32)?
            }
            (value, Type::I32) => self.builder.cast(CastOp::FPToSI, value, Type::I32)?,
        };
        Ok(converted)
    }

    /// Booleans pass through; numbers compare unequal to zero.
    pub fn to_bool(&mut self, value: Value) -> Result<Value, CompileError> {
        let truth = match value {
            Value::ConstI32(n) => Value::ConstBool(n != 0),
            Value::ConstF32(x) => Value::ConstBool(x != 0.0),
            value => match value.ty() {
                Type::I1 => value,
                Type::I32 => {
                    self.builder
                        .icmp_signed(IntPredicate::Ne, value, Value::ConstI32(0))?
                }
                Type::F32 => {
                    self.builder
                        .fcmp_ordered(FloatPredicate::One, value, Value::ConstF32(0.0))?
                }
            },
        };
        Ok(truth)
    }

    /// Booleans become 0/1 integers so they can take part in arithmetic.
    pub fn widen_bool(&mut self, value: Value) -> Result<Value, CompileError> {
        if value.ty() == Type::I1 {
            self.coerce(value, Type::I32)
        } else {
            Ok(value)
        }
    }
}
