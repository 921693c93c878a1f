use std::collections::HashMap;

use super::{
    BasicBlock, BinaryOp, CastOp, FloatPredicate, Function, Instr, IntPredicate, IrError, Reg,
    Slot, Terminator, Type, Value,
};

/// Handle to a block of the function under construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockId(usize);

/// Emits instructions at the end of the current block.
///
/// Names are unique across blocks, slots and registers: a repeated base
/// name gets a `.N` suffix, and unnamed registers are numbered `.N`.
pub struct IrBuilder {
    function: Function,
    current: Option<BlockId>,
    names: HashMap<String, usize>,
    next_temp: usize,
}

impl IrBuilder {
    pub fn new(name: impl Into<String>, ret: Type) -> Self {
        Self {
            function: Function {
                name: name.into(),
                ret,
                blocks: Vec::new(),
            },
            current: None,
            names: HashMap::new(),
            next_temp: 0,
        }
    }

    fn unique_name(&mut self, base: &str) -> String {
        match self.names.get_mut(base) {
            None => {
                self.names.insert(base.to_string(), 0);
                base.to_string()
            }
            Some(count) => {
                *count += 1;
                let name = format!("{base}.{count}");
                // a user name could collide with a generated suffix
                if self.names.contains_key(&name) {
                    return self.unique_name(base);
                }
                self.names.insert(name.clone(), 0);
                name
            }
        }
    }

    fn temp(&mut self, ty: Type) -> Reg {
        self.next_temp += 1;
        Reg {
            name: format!(".{}", self.next_temp),
            ty,
        }
    }

    pub fn append_block(&mut self, name: &str) -> BlockId {
        let name = self.unique_name(name);
        self.function.blocks.push(BasicBlock {
            name,
            instrs: Vec::new(),
            terminator: None,
        });
        BlockId(self.function.blocks.len() - 1)
    }

    pub fn position_at_end(&mut self, block: BlockId) {
        self.current = Some(block);
    }

    pub fn block_name(&self, block: BlockId) -> Option<&str> {
        self.function.blocks.get(block.0).map(|b| b.name.as_str())
    }

    /// Whether the current block already ends in a control transfer.
    pub fn is_terminated(&self) -> bool {
        self.current
            .and_then(|id| self.function.blocks.get(id.0))
            .is_some_and(|b| b.terminator.is_some())
    }

    fn open_block(&mut self) -> Result<&mut BasicBlock, IrError> {
        let id = self.current.ok_or(IrError::NoInsertionPoint)?;
        let block = self
            .function
            .blocks
            .get_mut(id.0)
            .ok_or(IrError::NoInsertionPoint)?;
        if block.terminator.is_some() {
            return Err(IrError::BlockSealed {
                block: block.name.clone(),
            });
        }
        Ok(block)
    }

    fn emit(&mut self, instr: Instr) -> Result<(), IrError> {
        self.open_block()?.instrs.push(instr);
        Ok(())
    }

    fn terminate(&mut self, term: Terminator) -> Result<(), IrError> {
        self.open_block()?.terminator = Some(term);
        Ok(())
    }

    fn target(&self, block: BlockId) -> Result<String, IrError> {
        self.block_name(block)
            .map(str::to_string)
            .ok_or(IrError::NoInsertionPoint)
    }

    // ── Instructions ──

    pub fn alloca(&mut self, name: &str, ty: Type) -> Result<Slot, IrError> {
        // Check before reserving the name so a failed emit leaves no trace.
        self.open_block()?;
        let slot = Slot {
            name: self.unique_name(name),
            ty,
        };
        self.emit(Instr::Alloca { dest: slot.clone() })?;
        Ok(slot)
    }

    pub fn load(&mut self, src: &Slot) -> Result<Value, IrError> {
        let dest = self.temp(src.ty);
        self.emit(Instr::Load {
            dest: dest.clone(),
            src: src.clone(),
        })?;
        Ok(Value::Reg(dest))
    }

    pub fn store(&mut self, value: Value, dest: &Slot) -> Result<(), IrError> {
        self.emit(Instr::Store {
            value,
            dest: dest.clone(),
        })
    }

    /// Result type follows the left operand.
    pub fn binary(&mut self, op: BinaryOp, lhs: Value, rhs: Value) -> Result<Value, IrError> {
        let dest = self.temp(lhs.ty());
        self.emit(Instr::Binary {
            dest: dest.clone(),
            op,
            lhs,
            rhs,
        })?;
        Ok(Value::Reg(dest))
    }

    pub fn icmp_signed(
        &mut self,
        pred: IntPredicate,
        lhs: Value,
        rhs: Value,
    ) -> Result<Value, IrError> {
        let dest = self.temp(Type::I1);
        self.emit(Instr::ICmp {
            dest: dest.clone(),
            pred,
            lhs,
            rhs,
        })?;
        Ok(Value::Reg(dest))
    }

    pub fn fcmp_ordered(
        &mut self,
        pred: FloatPredicate,
        lhs: Value,
        rhs: Value,
    ) -> Result<Value, IrError> {
        let dest = self.temp(Type::I1);
        self.emit(Instr::FCmp {
            dest: dest.clone(),
            pred,
            lhs,
            rhs,
        })?;
        Ok(Value::Reg(dest))
    }

    pub fn cast(&mut self, op: CastOp, value: Value, to: Type) -> Result<Value, IrError> {
        let dest = self.temp(to);
        self.emit(Instr::Cast {
            dest: dest.clone(),
            op,
            value,
        })?;
        Ok(Value::Reg(dest))
    }

    // ── Terminators ──

    pub fn branch(&mut self, target: BlockId) -> Result<(), IrError> {
        let target = self.target(target)?;
        self.terminate(Terminator::Br { target })
    }

    pub fn cbranch(
        &mut self,
        cond: Value,
        then_block: BlockId,
        else_block: BlockId,
    ) -> Result<(), IrError> {
        let then_target = self.target(then_block)?;
        let else_target = self.target(else_block)?;
        self.terminate(Terminator::CondBr {
            cond,
            then_target,
            else_target,
        })
    }

    pub fn ret(&mut self, value: Option<Value>) -> Result<(), IrError> {
        self.terminate(Terminator::Ret(value))
    }

    pub fn finish(self) -> Function {
        self.function
    }
}

impl AsMut<IrBuilder> for IrBuilder {
    fn as_mut(&mut self) -> &mut IrBuilder {
        self
    }
}

/// Run `then` in a new `if.then` block when `cond` holds; continue at `if.end`.
///
/// The closure receives the whole lowering context so it can emit nested
/// statements. A fall-through branch to `if.end` is added only when the
/// body left its last block open.
pub fn if_then<C, E, F>(ctx: &mut C, cond: Value, then: F) -> Result<(), E>
where
    C: AsMut<IrBuilder>,
    E: From<IrError>,
    F: FnOnce(&mut C) -> Result<(), E>,
{
    let builder = ctx.as_mut();
    let then_bb = builder.append_block("if.then");
    let end_bb = builder.append_block("if.end");
    builder.cbranch(cond, then_bb, end_bb)?;

    builder.position_at_end(then_bb);
    then(ctx)?;
    close_into(ctx.as_mut(), end_bb)?;

    ctx.as_mut().position_at_end(end_bb);
    Ok(())
}

/// Two-armed form of [`if_then`]: `if.then` and `if.else` both rejoin at `if.end`.
pub fn if_else<C, E, T, O>(ctx: &mut C, cond: Value, then: T, otherwise: O) -> Result<(), E>
where
    C: AsMut<IrBuilder>,
    E: From<IrError>,
    T: FnOnce(&mut C) -> Result<(), E>,
    O: FnOnce(&mut C) -> Result<(), E>,
{
    let builder = ctx.as_mut();
    let then_bb = builder.append_block("if.then");
    let else_bb = builder.append_block("if.else");
    let end_bb = builder.append_block("if.end");
    builder.cbranch(cond, then_bb, else_bb)?;

    builder.position_at_end(then_bb);
    then(ctx)?;
    close_into(ctx.as_mut(), end_bb)?;

    ctx.as_mut().position_at_end(else_bb);
    otherwise(ctx)?;
    close_into(ctx.as_mut(), end_bb)?;

    ctx.as_mut().position_at_end(end_bb);
    Ok(())
}

fn close_into(builder: &mut IrBuilder, target: BlockId) -> Result<(), IrError> {
    if builder.is_terminated() {
        return Ok(());
    }
    builder.branch(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_names_are_deduplicated() {
        let mut b = IrBuilder::new("f", Type::I32);
        let first = b.append_block("if.then");
        let second = b.append_block("if.then");
        assert_eq!(b.block_name(first), Some("if.then"));
        assert_eq!(b.block_name(second), Some("if.then.1"));
    }

    #[test]
    fn sealed_blocks_reject_instructions() {
        let mut b = IrBuilder::new("f", Type::I32);
        let entry = b.append_block("entry");
        b.position_at_end(entry);
        b.ret(Some(Value::ConstI32(0))).unwrap();

        let err = b.alloca("x", Type::I32).unwrap_err();
        assert_eq!(
            err,
            IrError::BlockSealed {
                block: "entry".into()
            }
        );
    }

    #[test]
    fn emitting_without_a_block_fails() {
        let mut b = IrBuilder::new("f", Type::I32);
        assert_eq!(
            b.ret(None).unwrap_err(),
            IrError::NoInsertionPoint
        );
    }

    #[test]
    fn if_then_rejoins_at_end_block() {
        let mut b = IrBuilder::new("f", Type::I32);
        let entry = b.append_block("entry");
        b.position_at_end(entry);
        if_then(&mut b, Value::ConstBool(true), |b: &mut IrBuilder| {
            b.alloca("x", Type::I32).map(|_| ())
        })
        .unwrap();
        b.ret(Some(Value::ConstI32(0))).unwrap();

        let func = b.finish();
        let names: Vec<_> = func.blocks.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, ["entry", "if.then", "if.end"]);
        assert_eq!(
            func.blocks[1].terminator,
            Some(Terminator::Br {
                target: "if.end".into()
            })
        );
    }
}
