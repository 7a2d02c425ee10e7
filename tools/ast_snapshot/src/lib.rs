//! A recorded translation unit: the declaration tree as produced by a libclang front end, the
//! answers to its type queries, and the raw preprocessing tokens of every file it read.
//!
//! The declaration tree borrows the node shape of clang's `-ast-dump=json` output (`id`, `kind`,
//! `inner`) so it can be deserialized with [clang_ast], but the node kinds and fields are its own:
//! records are split into `StructDecl` and `UnionDecl` instead of clang's `RecordDecl` with
//! `tagUsed`, and each declaration carries a full type object with layout in place of
//! `qualType`.

mod index;

pub use index::{AstIndex, SnapshotCursor};

use clang_ast::Node;
use define_scanner::Token;
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A type as the front end reported it.
#[derive(Clone, Debug, Deserialize)]
pub struct CType {
    /// `clang_getTypeSpelling`, e.g. `struct point` or `unsigned int`.
    pub spelling: String,
    /// `clang_getTypeKindSpelling`, e.g. `UInt`, `Elaborated`, `LValueReference`.
    pub kind: String,
    /// Raw `clang_Type_getSizeOf` result; negative values are layout errors.
    pub size: i64,
    /// Raw `clang_Type_getAlignOf` result; negative values are layout errors.
    pub align: i64,
    /// The declaration of this type (`clang_getTypeDeclaration`), if it has one.
    #[serde(rename = "declId")]
    pub decl_id: Option<clang_ast::Id>,
    /// The element type of array types.
    #[serde(rename = "elementType")]
    pub element_type: Option<Box<CType>>,
}

/// The declarations relevant to type extraction. Every other node kind is kept as [Decl::Other]
/// so the tree can still be walked.
#[derive(Debug, Deserialize)]
pub enum Decl {
    TranslationUnitDecl,
    TypedefDecl {
        name: String,
        #[serde(rename = "underlyingType")]
        underlying_type: CType,
    },
    StructDecl {
        name: Option<String>,
    },
    UnionDecl {
        name: Option<String>,
    },
    EnumDecl {
        name: Option<String>,
    },
    FieldDecl {
        name: Option<String>,
        #[serde(rename = "type")]
        ty: CType,
    },
    EnumConstantDecl {
        name: String,
        #[serde(rename = "type")]
        ty: CType,
        value: i64,
    },
    /// Every other node (functions, variables, type references, ...).
    Other {
        kind: Option<String>,
    },
}

impl Decl {
    /// Returns the name of this declaration, or `""` if it has none.
    pub fn name(&self) -> &str {
        match self {
            Decl::TypedefDecl { name, .. } | Decl::EnumConstantDecl { name, .. } => name.as_str(),
            Decl::StructDecl { name }
            | Decl::UnionDecl { name }
            | Decl::EnumDecl { name }
            | Decl::FieldDecl { name, .. } => name.as_deref().unwrap_or_default(),
            Decl::TranslationUnitDecl | Decl::Other { .. } => "",
        }
    }
}

/// The token stream of one file pulled in by the translation unit.
#[derive(Debug, Deserialize)]
pub struct IncludedFile {
    pub file: PathBuf,
    pub tokens: Vec<Token>,
}

/// Diagnostic severity, as `clang_getDiagnosticSeverity` reports it.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Ord, PartialEq, PartialOrd)]
pub enum Severity {
    Ignored,
    Note,
    Warning,
    Error,
    Fatal,
}

#[derive(Debug, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("failed to read AST snapshot {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed AST snapshot: {0}")]
    Json(#[from] serde_json::Error),
    #[error("type {spelling:?} refers to declaration {id} which is not in the snapshot")]
    DanglingDeclaration { id: clang_ast::Id, spelling: String },
}

/// A recorded translation unit.
#[derive(Debug, Deserialize)]
pub struct AstSnapshot {
    /// The main file of the translation unit.
    pub file: PathBuf,
    pub ast: Node<Decl>,
    /// Tokens of the main file.
    #[serde(default)]
    pub tokens: Vec<Token>,
    #[serde(default)]
    pub includes: Vec<IncludedFile>,
    #[serde(default)]
    pub diagnostics: Vec<Diagnostic>,
}

impl AstSnapshot {
    /// Reads a snapshot from a JSON file.
    pub fn load(path: &Path) -> Result<AstSnapshot, SnapshotError> {
        let file = File::open(path).map_err(|source| SnapshotError::Io {
            path: path.into(),
            source,
        })?;
        let snapshot: AstSnapshot = serde_json::from_reader(BufReader::new(file))?;
        debug!(
            "Loaded snapshot of {} ({} tokens, {} included files, {} diagnostics)",
            snapshot.file.display(),
            snapshot.tokens.len(),
            snapshot.includes.len(),
            snapshot.diagnostics.len()
        );
        Ok(snapshot)
    }

    /// Parses a snapshot from a JSON string.
    pub fn from_json(json: &str) -> Result<AstSnapshot, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Diagnostics at `Error` severity or above.
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|diagnostic| diagnostic.severity >= Severity::Error)
    }

    /// The token streams to scan for `#define`s: the main file first, then (optionally) every
    /// included file in the order the front end recorded them.
    pub fn token_streams(&self, include_files: bool) -> Vec<(&Path, &[Token])> {
        let mut streams = vec![(self.file.as_path(), self.tokens.as_slice())];
        if include_files {
            streams.extend(
                self.includes
                    .iter()
                    .map(|include| (include.file.as_path(), include.tokens.as_slice())),
            );
        }
        streams
    }
}
