use crate::backend::Slot;
use crate::ir::ast::PrimitiveType;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct SymbolInfo {
    /// Stack storage allocated for the variable
    pub slot: Slot,
    pub ty: PrimitiveType,
}

/// Flat table for the single function body: no nested scopes, no shadowing.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    symbols: HashMap<String, SymbolInfo>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a symbol; returns the existing entry if the name is taken
    pub fn declare(&mut self, name: String, info: SymbolInfo) -> Result<(), SymbolInfo> {
        if let Some(existing) = self.symbols.get(&name) {
            return Err(existing.clone());
        }

        self.symbols.insert(name, info);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<&SymbolInfo> {
        self.symbols.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Type;

    fn info(name: &str) -> SymbolInfo {
        SymbolInfo {
            slot: Slot {
                name: name.into(),
                ty: Type::I32,
            },
            ty: PrimitiveType::Int,
        }
    }

    #[test]
    fn second_declaration_returns_first() {
        let mut table = SymbolTable::new();
        assert!(table.declare("x".into(), info("x")).is_ok());
        let existing = table.declare("x".into(), info("x.1")).unwrap_err();
        assert_eq!(existing.slot.name, "x");
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn lookup_misses_unknown_names() {
        let table = SymbolTable::new();
        assert!(table.lookup("y").is_none());
        assert!(!table.contains("y"));
        assert!(table.is_empty());
    }
}
