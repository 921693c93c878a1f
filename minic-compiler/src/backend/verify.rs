use std::collections::HashSet;

use super::{Function, IrError, Module};

/// Check that a function is a well-formed block graph: at least one block,
/// unique block names, every block terminated, every branch target defined.
pub fn verify_function(func: &Function) -> Result<(), IrError> {
    if func.blocks.is_empty() {
        return Err(IrError::EmptyFunction {
            function: func.name.clone(),
        });
    }

    let mut names = HashSet::new();
    for block in &func.blocks {
        if !names.insert(block.name.as_str()) {
            return Err(IrError::DuplicateBlock {
                name: block.name.clone(),
            });
        }
    }

    for block in &func.blocks {
        let term = block
            .terminator
            .as_ref()
            .ok_or_else(|| IrError::UnterminatedBlock {
                block: block.name.clone(),
            })?;

        if let Some(target) = term.targets().into_iter().find(|t| !names.contains(t)) {
            return Err(IrError::UnknownTarget {
                block: block.name.clone(),
                target: target.to_string(),
            });
        }
    }

    Ok(())
}

pub fn verify_module(module: &Module) -> Result<(), IrError> {
    module.functions.iter().try_for_each(verify_function)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BasicBlock, Terminator, Type};

    fn block(name: &str, terminator: Option<Terminator>) -> BasicBlock {
        BasicBlock {
            name: name.into(),
            instrs: Vec::new(),
            terminator,
        }
    }

    fn func(blocks: Vec<BasicBlock>) -> Function {
        Function {
            name: "main".into(),
            ret: Type::I32,
            blocks,
        }
    }

    #[test]
    fn accepts_single_returning_block() {
        let f = func(vec![block("entry", Some(Terminator::Ret(None)))]);
        assert_eq!(verify_function(&f), Ok(()));
    }

    #[test]
    fn rejects_missing_terminator() {
        let f = func(vec![block("entry", None)]);
        assert_eq!(
            verify_function(&f),
            Err(IrError::UnterminatedBlock {
                block: "entry".into()
            })
        );
    }

    #[test]
    fn rejects_dangling_branch() {
        let f = func(vec![block(
            "entry",
            Some(Terminator::Br {
                target: "nowhere".into(),
            }),
        )]);
        assert!(matches!(
            verify_function(&f),
            Err(IrError::UnknownTarget { .. })
        ));
    }

    #[test]
    fn rejects_duplicate_names_and_empty_functions() {
        let ret = Some(Terminator::Ret(None));
        let f = func(vec![block("a", ret.clone()), block("a", ret)]);
        assert!(matches!(
            verify_function(&f),
            Err(IrError::DuplicateBlock { .. })
        ));
        assert!(matches!(
            verify_function(&func(Vec::new())),
            Err(IrError::EmptyFunction { .. })
        ));
    }
}
