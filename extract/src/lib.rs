//! Extracts a type database from an AST snapshot. This is normally used through the `typedb`
//! binary, but is exposed as a library crate as well.

pub mod cli;

use ast_snapshot::{AstIndex, AstSnapshot, SnapshotError};
use define_scanner::scan_defines;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use type_tree::build_types;
use typedb_core::codec::EncodeError;
use typedb_core::config::Config;
use typedb_core::{LoadError, TypeDatabase};

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("no AST snapshot given")]
    NoInput,
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error("{} error(s) in translation unit {}, first: {first}", count, file.display())]
    TranslationUnit {
        file: PathBuf,
        count: usize,
        first: String,
    },
    #[error("failed to write type database {}: {source}", path.display())]
    Write { path: PathBuf, source: EncodeError },
    #[error("failed to read type database {}: {source}", path.display())]
    Read { path: PathBuf, source: LoadError },
}

/// Builds the type database for an already loaded snapshot.
///
/// Refuses to continue if the snapshot recorded any error diagnostics, since the declaration tree
/// of a broken translation unit is incomplete.
pub fn extract_snapshot(
    snapshot: &AstSnapshot,
    config: &Config,
) -> Result<TypeDatabase, ExtractError> {
    let errors: Vec<_> = snapshot.errors().collect();
    for error in &errors {
        warn!("{}: {:?}: {}", snapshot.file.display(), error.severity, error.message);
    }
    if let Some(first) = errors.first() {
        return Err(ExtractError::TranslationUnit {
            file: snapshot.file.clone(),
            count: errors.len(),
            first: first.message.clone(),
        });
    }

    let mut defines = Vec::new();
    for (file, tokens) in snapshot.token_streams(config.scan_included_files) {
        let found = scan_defines(tokens);
        debug!("{} #defines in {}", found.len(), file.display());
        defines.extend(found);
    }

    let index = AstIndex::new(snapshot)?;
    let types = build_types(&index, config.dedup);
    Ok(TypeDatabase { types, defines })
}

/// Loads the snapshot named by `config.input` and builds its type database.
pub fn extract(config: &Config) -> Result<TypeDatabase, ExtractError> {
    if config.input.as_os_str().is_empty() {
        return Err(ExtractError::NoInput);
    }
    info!("Extracting types from {}", config.input.display());
    let snapshot = AstSnapshot::load(&config.input)?;
    extract_snapshot(&snapshot, config)
}

/// Performs a complete extraction run: builds the database and writes it to `config.output`.
pub fn run(config: &Config) -> Result<TypeDatabase, ExtractError> {
    let db = extract(config)?;
    for define in &db.defines {
        debug!("{define}");
    }
    debug!("Type database:\n{db}");
    db.materialize(&config.output)
        .map_err(|source| ExtractError::Write {
            path: config.output.clone(),
            source,
        })?;
    info!(
        "Wrote {} root types ({} records) and {} #defines to {}",
        db.types.len(),
        db.record_count(),
        db.defines.len(),
        config.output.display()
    );
    Ok(db)
}

/// Reads a type database and renders it in human-readable form.
pub fn dump(path: &Path) -> Result<String, ExtractError> {
    let db = TypeDatabase::load(path).map_err(|source| ExtractError::Read {
        path: path.into(),
        source,
    })?;
    Ok(db.to_string())
}
