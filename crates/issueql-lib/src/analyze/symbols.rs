//! Variable symbol table.
//!
//! One global table spans every open document. Entries are kept in
//! insertion order; lookups scan from the back so the most recently added
//! definition shadows earlier ones with the same name. Updating a
//! document's contribution is atomic: readers never observe a state where
//! the document's old symbols are gone and its new ones not yet added.

use rowan::TextRange;

use crate::parser::{Root, VarDef};

/// Stable handle for one open document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentId(u32);

impl DocumentId {
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }
}

/// One variable definition, as seen by lookups.
#[derive(Debug, Clone)]
pub struct SymbolInfo {
    /// Variable name including the `$` sigil.
    pub name: String,
    pub doc: DocumentId,
    /// Range of the name token at the definition site.
    pub range: TextRange,
    pub def: VarDef,
}

#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    entries: Vec<SymbolInfo>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces `doc`'s entries with the definitions found in `root`.
    ///
    /// The fresh entries are collected before the old ones are removed, so a
    /// parse that panics can never leave the table half-updated.
    pub fn update(&mut self, doc: DocumentId, root: &Root) {
        let fresh: Vec<SymbolInfo> = root
            .var_defs()
            .filter_map(|def| {
                let token = def.name_token()?;
                Some(SymbolInfo {
                    name: token.text().to_string(),
                    doc,
                    range: token.text_range(),
                    def,
                })
            })
            .collect();
        self.entries.retain(|entry| entry.doc != doc);
        self.entries.extend(fresh);
    }

    pub fn remove_document(&mut self, doc: DocumentId) {
        self.entries.retain(|entry| entry.doc != doc);
    }

    /// The winning definition for `name` (`$` sigil included).
    pub fn get(&self, name: &str) -> Option<&SymbolInfo> {
        self.entries.iter().rev().find(|entry| entry.name == name)
    }

    /// Every definition of `name`, shadowed ones included.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a SymbolInfo> {
        self.entries.iter().filter(move |entry| entry.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SymbolInfo> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
