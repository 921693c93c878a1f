use super::context::{Gen, Operand};
use crate::backend::{BinaryOp, FloatPredicate, IntPredicate, Type, Value};
use crate::ir::ast::{BinOp, Expr, Literal, LogicOp, RelOp};
use crate::{CompileError, SemanticErrorKind};

impl Gen {
    /// Lower `e`, leaving exactly one operand on the stack.
    pub fn lower_expr(&mut self, e: &Expr) -> Result<(), CompileError> {
        match e {
            Expr::Literal(lit) => self.lower_literal(lit),
            Expr::Binary { op, lhs, rhs } => {
                self.lower_expr(lhs)?;
                self.lower_expr(rhs)?;
                let (l, r) = self.pop_pair()?;
                let v = self.lower_arith(*op, l, r)?;
                self.push_value(v);
                Ok(())
            }
            Expr::Relational { op, lhs, rhs } => {
                self.lower_expr(lhs)?;
                self.lower_expr(rhs)?;
                let (l, r) = self.pop_pair()?;
                let v = self.lower_compare(*op, l, r)?;
                self.push_value(v);
                Ok(())
            }
            Expr::Logical { op, lhs, rhs } => {
                // both sides are always evaluated
                self.lower_expr(lhs)?;
                self.lower_expr(rhs)?;
                let (l, r) = self.pop_pair()?;
                let l = self.to_bool(l)?;
                let r = self.to_bool(r)?;
                let op = match op {
                    LogicOp::And => BinaryOp::And,
                    LogicOp::Or => BinaryOp::Or,
                };
                let v = self.builder.binary(op, l, r)?;
                self.push_value(v);
                Ok(())
            }
        }
    }

    fn lower_literal(&mut self, lit: &Literal) -> Result<(), CompileError> {
        match lit {
            // Wider constants wrap to 32 bits
            Literal::Int(n) => self.push_value(Value::ConstI32(*n as i32)),
            Literal::Float(x) => self.push_value(Value::ConstF32(*x as f32)),
            Literal::Id(name) => {
                let Some(info) = self.symbols.lookup(name) else {
                    return Err(self.make_error(
                        SemanticErrorKind::UndeclaredIdentifier,
                        name,
                        format!("use of undeclared identifier '{name}'"),
                    ));
                };
                let slot = info.slot.clone();
                self.push(Operand::Storage(slot));
            }
        }
        Ok(())
    }

    /// Mixed operands are computed in float.
    fn lower_arith(&mut self, op: BinOp, l: Value, r: Value) -> Result<Value, CompileError> {
        let l = self.widen_bool(l)?;
        let r = self.widen_bool(r)?;

        if l.ty().is_float() || r.ty().is_float() {
            let l = self.coerce(l, Type::F32)?;
            let r = self.coerce(r, Type::F32)?;
            let op = match op {
                BinOp::Add => BinaryOp::FAdd,
                BinOp::Sub => BinaryOp::FSub,
                BinOp::Mul => BinaryOp::FMul,
                BinOp::Div => BinaryOp::FDiv,
                BinOp::Rem => BinaryOp::FRem,
            };
            return Ok(self.builder.binary(op, l, r)?);
        }

        let op = match op {
            BinOp::Add => BinaryOp::Add,
            BinOp::Sub => BinaryOp::Sub,
            BinOp::Mul => BinaryOp::Mul,
            BinOp::Div => BinaryOp::SDiv,
            BinOp::Rem => BinaryOp::SRem,
        };
        Ok(self.builder.binary(op, l, r)?)
    }

    /// Signed `icmp` for integers, ordered `fcmp` once a float is involved.
    fn lower_compare(&mut self, op: RelOp, l: Value, r: Value) -> Result<Value, CompileError> {
        let l = self.widen_bool(l)?;
        let r = self.widen_bool(r)?;

        if l.ty().is_float() || r.ty().is_float() {
            let l = self.coerce(l, Type::F32)?;
            let r = self.coerce(r, Type::F32)?;
            let pred = match op {
                RelOp::Lt => FloatPredicate::Olt,
                RelOp::Le => FloatPredicate::Ole,
                RelOp::Gt => FloatPredicate::Ogt,
                RelOp::Ge => FloatPredicate::Oge,
                RelOp::Eq => FloatPredicate::Oeq,
                RelOp::Ne => FloatPredicate::One,
            };
            return Ok(self.builder.fcmp_ordered(pred, l, r)?);
        }

        let pred = match op {
            RelOp::Lt => IntPredicate::Slt,
            RelOp::Le => IntPredicate::Sle,
            RelOp::Gt => IntPredicate::Sgt,
            RelOp::Ge => IntPredicate::Sge,
            RelOp::Eq => IntPredicate::Eq,
            RelOp::Ne => IntPredicate::Ne,
        };
        Ok(self.builder.icmp_signed(pred, l, r)?)
    }
}
