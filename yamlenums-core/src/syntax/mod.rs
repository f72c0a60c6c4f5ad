//! Go source syntax: just enough of the language to find enum constants.
//!
//! ```text
//! source text ──► lexer.rs ──► tokens ──► parser.rs ──► ast::SourceFile
//!                 (semicolon               (const / type decls,
//!                  insertion)               everything else skipped)
//! ```

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod token;

pub use ast::{ConstDecl, ConstSpec, Expr, Ident, SourceFile, TypeExpr, TypeName, TypeSpec};
pub use lexer::{parse_int_literal, LexError, Lexer};
pub use parser::parse_file;
pub use token::{Pos, Token, TokenKind};
