use super::context::Gen;
use crate::backend::{if_else, if_then, Value};
use crate::ir::ast::{Assignment, Declaration, Expr, Program, Statement};
use crate::ir::symbol_table::SymbolInfo;
use crate::{CompileError, SemanticErrorKind};

impl Gen {
    pub fn lower_program(&mut self, p: &Program) -> Result<(), CompileError> {
        let entry = self.builder.append_block("entry");
        self.builder.position_at_end(entry);

        for d in &p.declarations {
            self.lower_declaration(d)?;
        }
        self.lower_block(&p.statements)?;

        self.builder.ret(Some(Value::ConstI32(0)))?;
        Ok(())
    }

    pub fn lower_block(&mut self, body: &[Statement]) -> Result<(), CompileError> {
        body.iter().try_for_each(|s| self.lower_stmt(s))
    }

    pub fn lower_stmt(&mut self, s: &Statement) -> Result<(), CompileError> {
        match s {
            Statement::Declaration(d) => self.lower_declaration(d),
            Statement::Assignment(a) => self.lower_assignment(a),
            Statement::If { cond, body } => {
                let c = self.lower_condition(cond)?;
                if_then(self, c, |g: &mut Gen| g.lower_block(body))
            }
            Statement::IfElse {
                cond,
                then_body,
                else_body,
            } => {
                let c = self.lower_condition(cond)?;
                if_else(
                    self,
                    c,
                    |g: &mut Gen| g.lower_block(then_body),
                    |g: &mut Gen| g.lower_block(else_body),
                )
            }
            Statement::While { cond, body } => self.lower_loop("while", cond, body, None),
            Statement::For {
                init,
                cond,
                step,
                body,
            } => {
                self.lower_declaration(init)?;
                self.lower_loop("for", cond, body, Some(step))
            }
            Statement::Block(body) => self.lower_block(body),
            Statement::Empty => Ok(()),
        }
    }

    pub fn lower_declaration(&mut self, d: &Declaration) -> Result<(), CompileError> {
        if let Some(existing) = self.symbols.lookup(&d.id) {
            return Err(self.make_error(
                SemanticErrorKind::Redeclaration,
                &d.id,
                format!("'{}' already declared as {}", d.id, existing.ty),
            ));
        }

        let ty = Gen::ir_type(d.ty);
        let slot = self.builder.alloca(&d.id, ty)?;
        let info = SymbolInfo {
            slot: slot.clone(),
            ty: d.ty,
        };
        if let Err(existing) = self.symbols.declare(d.id.clone(), info) {
            return Err(self.make_error(
                SemanticErrorKind::Redeclaration,
                &d.id,
                format!("'{}' already declared as {}", d.id, existing.ty),
            ));
        }

        if let Some(init) = &d.initializer {
            self.lower_expr(init)?;
            let value = self.pop_value()?;
            let value = self.coerce(value, ty)?;
            self.builder.store(value, &slot)?;
        }
        Ok(())
    }

    pub fn lower_assignment(&mut self, a: &Assignment) -> Result<(), CompileError> {
        let Some(info) = self.symbols.lookup(&a.id) else {
            return Err(self.make_error(
                SemanticErrorKind::UndeclaredIdentifier,
                &a.id,
                format!("assignment to undeclared variable '{}'", a.id),
            ));
        };
        let slot = info.slot.clone();

        self.lower_expr(&a.value)?;
        let value = self.pop_value()?;
        let value = self.coerce(value, slot.ty)?;
        self.builder.store(value, &slot)?;
        Ok(())
    }

    /// Evaluate `cond` and reduce it to an `i1`.
    pub fn lower_condition(&mut self, cond: &Expr) -> Result<Value, CompileError> {
        self.lower_expr(cond)?;
        let value = self.pop_value()?;
        self.to_bool(value)
    }

    /// `head` re-evaluates the condition on every iteration; `step`, when
    /// present, runs at the end of every pass through the body.
    fn lower_loop(
        &mut self,
        kind: &str,
        cond: &Expr,
        body: &[Statement],
        step: Option<&Assignment>,
    ) -> Result<(), CompileError> {
        let head = self.builder.append_block(&format!("{kind}.head"));
        let body_bb = self.builder.append_block(&format!("{kind}.body"));
        let exit = self.builder.append_block(&format!("{kind}.exit"));

        self.builder.branch(head)?;

        self.builder.position_at_end(head);
        let c = self.lower_condition(cond)?;
        self.builder.cbranch(c, body_bb, exit)?;

        self.builder.position_at_end(body_bb);
        self.lower_block(body)?;
        if let Some(step) = step {
            self.lower_assignment(step)?;
        }
        if !self.builder.is_terminated() {
            self.builder.branch(head)?;
        }

        self.builder.position_at_end(exit);
        Ok(())
    }
}
