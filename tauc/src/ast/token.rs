//! Per-file token arenas with lazy location resolution.
//!
//! Tokens store only a kind and a byte position; row/column/length are
//! computed on demand by re-scanning the owning file's source buffer,
//! trading CPU for memory since most tokens are never located (only the
//! ones attached to a diagnostic are).

use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};

/// Opaque, non-owning handle to a token allocated from a [`TokenRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TokenId {
    file: FileId,
    index: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct FileId(u32);

/// Lexical token kind. The lexer itself is an external collaborator; this
/// enum is the seam it is expected to produce.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Ident,
    IntLit,
    FloatLit,
    StringLit,
    CharLit,
    Keyword(&'static str),
    Punct(&'static str),
    Eof,
}

#[derive(Debug, Clone, Copy)]
pub struct BytePos(pub u32);

#[derive(Debug, Clone)]
struct TokenRecord {
    kind: TokenKind,
    pos: BytePos,
}

struct FileArena {
    path: PathBuf,
    src: String,
    tokens: Vec<TokenRecord>,
}

/// A resolved, human-facing source location: 1-based row/column plus the
/// token's textual length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub path: PathBuf,
    pub line: u32,
    pub column: u32,
    pub len: u32,
}

/// Per-compilation token storage, partitioned per source file.
#[derive(Default)]
pub struct TokenRegistry {
    files: Vec<FileArena>,
    by_path_hash: FxHashMap<u64, FileId>,
}

fn path_hash(path: &Path) -> u64 {
    use std::hash::{Hash, Hasher};
    let mut hasher = rustc_hash::FxHasher::default();
    path.hash(&mut hasher);
    hasher.finish()
}

impl TokenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a source file, idempotent on the path's hash. Returns the
    /// same [`FileId`]-backed arena on repeated calls for the same path.
    pub fn register_file(&mut self, path: impl Into<PathBuf>, src: impl Into<String>) -> FileId {
        let path = path.into();
        let hash = path_hash(&path);
        if let Some(&id) = self.by_path_hash.get(&hash) {
            return id;
        }
        let id = FileId(self.files.len() as u32);
        self.files.push(FileArena {
            path,
            src: src.into(),
            tokens: Vec::new(),
        });
        self.by_path_hash.insert(hash, id);
        id
    }

    /// Allocates a token from the given file's arena and returns a
    /// non-owning handle to it.
    pub fn token_init(&mut self, file: FileId, kind: TokenKind, pos: BytePos) -> TokenId {
        let arena = &mut self.files[file.0 as usize];
        let index = arena.tokens.len() as u32;
        arena.tokens.push(TokenRecord { kind, pos });
        TokenId { file, index }
    }

    pub fn kind(&self, tok: TokenId) -> &TokenKind {
        &self.files[tok.file.0 as usize].tokens[tok.index as usize].kind
    }

    /// Scans the owning file's source buffer to resolve the token's
    /// human-facing location. O(position) in the worst case; callers are
    /// expected to call this only when emitting a diagnostic.
    pub fn locate(&self, tok: TokenId) -> SourceLocation {
        let arena = &self.files[tok.file.0 as usize];
        let record = &arena.tokens[tok.index as usize];
        let target = record.pos.0 as usize;

        let mut line = 1u32;
        let mut col = 1u32;
        for (byte_idx, ch) in arena.src.char_indices() {
            if byte_idx >= target {
                break;
            }
            if ch == '\n' {
                line += 1;
                col = 1;
            } else {
                col += 1;
            }
        }

        let len = self.token_text(tok).map(str::len).unwrap_or(0) as u32;

        SourceLocation {
            path: arena.path.clone(),
            line,
            column: col,
            len,
        }
    }

    /// Returns `(path, source-text)` for the file owning `tok`.
    pub fn path_and_src(&self, tok: TokenId) -> (&Path, &str) {
        let arena = &self.files[tok.file.0 as usize];
        (arena.path.as_path(), arena.src.as_str())
    }

    fn token_text(&self, tok: TokenId) -> Option<&str> {
        let arena = &self.files[tok.file.0 as usize];
        let record = &arena.tokens[tok.index as usize];
        let start = record.pos.0 as usize;
        // Token length isn't stored; a real lexer would record an end
        // position or length alongside `pos`. Lacking that, the dump/locate
        // callers only need a best-effort slice for diagnostics, so we
        // scan to the next whitespace/punctuation boundary.
        let rest = arena.src.get(start..)?;
        let end = rest
            .find(|c: char| c.is_whitespace())
            .unwrap_or(rest.len());
        rest.get(..end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_file_is_idempotent_on_path() {
        let mut reg = TokenRegistry::new();
        let a = reg.register_file("main.tau", "fun main() {}");
        let b = reg.register_file("main.tau", "ignored second source");
        assert_eq!(a, b);
    }

    #[test]
    fn locate_computes_line_and_column() {
        let mut reg = TokenRegistry::new();
        let file = reg.register_file("main.tau", "var x: i32 = 0\nvar y: i32 = 1");
        let tok = reg.token_init(file, TokenKind::Ident, BytePos(20));
        let loc = reg.locate(tok);
        assert_eq!(loc.line, 2);
        assert_eq!(loc.column, 5);
    }
}
