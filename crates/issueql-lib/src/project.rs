//! Open-document registry.
//!
//! A project owns every open query document plus the shared symbol table.
//! Any edit re-parses the changed document and re-runs validation and
//! compilation over all of them, because a definition in one document can
//! be referenced from any other. Trees are small, so the whole-project
//! refresh is cheaper than tracking fine-grained dependencies.

use indexmap::IndexMap;
use rowan::{TextRange, TextSize};

use crate::analyze::{DocumentId, SymbolInfo, SymbolTable, validate};
use crate::compile::{CompiledQuery, compile_document};
use crate::diagnostics::Diagnostics;
use crate::parser::{Parse, Root, SyntaxKind, VarRef, parse};

#[derive(Debug, Clone)]
pub struct Document {
    text: String,
    parse: Parse,
    parse_diagnostics: Diagnostics,
    /// Parse diagnostics plus validation and compilation diagnostics.
    diagnostics: Diagnostics,
}

impl Document {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn parse(&self) -> &Parse {
        &self.parse
    }

    pub fn root(&self) -> Root {
        self.parse.root()
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }
}

#[derive(Debug, Default)]
pub struct Project {
    next_id: u32,
    documents: IndexMap<DocumentId, Document>,
    symbols: SymbolTable,
}

impl Project {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a new document and returns its handle.
    pub fn open(&mut self, text: impl Into<String>) -> DocumentId {
        let id = DocumentId::new(self.next_id);
        self.next_id += 1;
        self.set_text(id, text.into());
        tracing::debug!(doc = id.raw(), "document opened");
        id
    }

    /// Replaces a document's text wholesale.
    pub fn update(&mut self, id: DocumentId, text: impl Into<String>) {
        if !self.documents.contains_key(&id) {
            tracing::debug!(doc = id.raw(), "update for unknown document ignored");
            return;
        }
        self.set_text(id, text.into());
    }

    pub fn close(&mut self, id: DocumentId) {
        if self.documents.shift_remove(&id).is_some() {
            self.symbols.remove_document(id);
            self.refresh_diagnostics();
            tracing::debug!(doc = id.raw(), "document closed");
        }
    }

    fn set_text(&mut self, id: DocumentId, text: String) {
        let (parse, parse_diagnostics) = parse(&text);
        self.symbols.update(id, &parse.root());
        let document = Document {
            text,
            parse,
            parse_diagnostics: parse_diagnostics.clone(),
            diagnostics: parse_diagnostics,
        };
        self.documents.insert(id, document);
        self.refresh_diagnostics();
    }

    /// Re-runs validation and compilation over every open document against
    /// the current symbol table.
    fn refresh_diagnostics(&mut self) {
        let symbols = &self.symbols;
        for document in self.documents.values_mut() {
            let root = document.parse.root();
            let mut diagnostics = document.parse_diagnostics.clone();
            diagnostics.extend(validate(&root, symbols));
            let (_, compile_diagnostics) = compile_document(&root, symbols);
            diagnostics.extend(compile_diagnostics);
            document.diagnostics = diagnostics;
        }
    }

    pub fn document(&self, id: DocumentId) -> Option<&Document> {
        self.documents.get(&id)
    }

    pub fn documents(&self) -> impl Iterator<Item = (DocumentId, &Document)> {
        self.documents.iter().map(|(id, doc)| (*id, doc))
    }

    pub fn diagnostics(&self, id: DocumentId) -> Option<&Diagnostics> {
        self.documents.get(&id).map(Document::diagnostics)
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Compiles every query line of one document.
    pub fn compile(&self, id: DocumentId) -> Option<(Vec<CompiledQuery>, Diagnostics)> {
        let document = self.documents.get(&id)?;
        Some(compile_document(&document.parse.root(), &self.symbols))
    }

    /// The definition behind the variable name at `offset`, for hover and
    /// go-to-definition. Works on both references and definition sites.
    pub fn definition_at(&self, id: DocumentId, offset: TextSize) -> Option<&SymbolInfo> {
        let document = self.documents.get(&id)?;
        let token = document
            .parse
            .syntax()
            .token_at_offset(offset)
            .find(|t| t.kind() == SyntaxKind::VariableName)?;
        self.symbols.get(token.text())
    }

    /// Every definition site and reference of `name` across all documents:
    /// per document, definition sites first, then references.
    pub fn references(&self, name: &str) -> Vec<(DocumentId, TextRange)> {
        let mut found = Vec::new();
        for (&id, document) in &self.documents {
            let root = document.parse.root();
            for def in root.var_defs() {
                if let Some(token) = def.name_token() {
                    if token.text() == name {
                        found.push((id, token.text_range()));
                    }
                }
            }
            for node in document.parse.syntax().descendants() {
                if let Some(var_ref) = VarRef::cast(node) {
                    if var_ref.name() == name {
                        found.push((id, var_ref.range()));
                    }
                }
            }
        }
        found
    }
}
