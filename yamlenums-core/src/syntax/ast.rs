//! Declaration-level syntax tree for one Go source file.
//!
//! Only what enum discovery needs is kept: the package clause, `const`
//! declarations with their expressions, and `type` declarations. Function
//! bodies, variables and imports are skipped by the parser.

use std::fmt;
use std::path::PathBuf;

use super::token::Pos;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub name: String,
    pub pos: Pos,
}

impl Ident {
    pub fn is_blank(&self) -> bool {
        self.name == "_"
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub package: Ident,
    pub consts: Vec<ConstDecl>,
    pub types: Vec<TypeSpec>,
}

/// One `const` declaration: a single spec or a parenthesized group.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstDecl {
    pub pos: Pos,
    pub specs: Vec<ConstSpec>,
}

/// `A, B T = x, y` — one line of a const group.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstSpec {
    pub names: Vec<Ident>,
    pub ty: Option<TypeName>,
    pub values: Vec<Expr>,
    /// Zero-based position of the spec inside its group.
    pub iota: u32,
}

/// A type reference as it may appear in a const spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeName {
    Local(String),
    Qualified { package: String, name: String },
}

impl TypeName {
    /// The name a `-type` flag would use to select this type; qualified
    /// names never match a local type.
    pub fn local(&self) -> Option<&str> {
        match self {
            Self::Local(name) => Some(name),
            Self::Qualified { .. } => None,
        }
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(name) => f.write_str(name),
            Self::Qualified { package, name } => write!(f, "{}.{}", package, name),
        }
    }
}

/// `type Name Underlying` or `type Name = Aliased`.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeSpec {
    pub name: Ident,
    pub alias: bool,
    pub underlying: TypeExpr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    Named(TypeName),
    /// Struct, slice, map, func, generic and every other composite shape,
    /// described by its leading token.
    Composite(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Neg,
    Not,
    Complement,
    Deref,
    Addr,
    Recv,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Quo,
    Rem,
    And,
    Or,
    Xor,
    Shl,
    Shr,
    AndNot,
    LAnd,
    LOr,
    Eql,
    Neq,
    Lss,
    Leq,
    Gtr,
    Geq,
}

impl BinaryOp {
    /// Go operator precedence, 5 binds tightest.
    pub fn precedence(&self) -> u8 {
        match self {
            Self::Mul | Self::Quo | Self::Rem | Self::Shl | Self::Shr | Self::And | Self::AndNot => 5,
            Self::Add | Self::Sub | Self::Or | Self::Xor => 4,
            Self::Eql | Self::Neq | Self::Lss | Self::Leq | Self::Gtr | Self::Geq => 3,
            Self::LAnd => 2,
            Self::LOr => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Quo => "/",
            Self::Rem => "%",
            Self::And => "&",
            Self::Or => "|",
            Self::Xor => "^",
            Self::Shl => "<<",
            Self::Shr => ">>",
            Self::AndNot => "&^",
            Self::LAnd => "&&",
            Self::LOr => "||",
            Self::Eql => "==",
            Self::Neq => "!=",
            Self::Lss => "<",
            Self::Leq => "<=",
            Self::Gtr => ">",
            Self::Geq => ">=",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Int(String),
    Float(String),
    Imag(String),
    Rune(u32),
    Str(String),
    Ident(Ident),
    Selector(Box<Expr>, Ident),
    Paren(Box<Expr>),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Call(Box<Expr>, Vec<Expr>),
    /// Syntactically valid but never a constant we can evaluate
    /// (composite literals, index expressions, function literals...).
    Opaque(String),
}

impl Expr {
    /// Identifiers this expression refers to, in source order.
    pub fn referenced_idents(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_idents(&mut out);
        out
    }

    fn collect_idents<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Ident(ident) => out.push(&ident.name),
            // Only the package part of `pkg.Name` could be local, and it never names a constant.
            Self::Selector(..) => {}
            Self::Paren(inner) | Self::Unary(_, inner) => inner.collect_idents(out),
            Self::Binary(_, lhs, rhs) => {
                lhs.collect_idents(out);
                rhs.collect_idents(out);
            }
            Self::Call(func, args) => {
                func.collect_idents(out);
                for arg in args {
                    arg.collect_idents(out);
                }
            }
            Self::Int(_)
            | Self::Float(_)
            | Self::Imag(_)
            | Self::Rune(_)
            | Self::Str(_)
            | Self::Opaque(_) => {}
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(text) | Self::Float(text) | Self::Imag(text) => f.write_str(text),
            Self::Rune(v) => match char::from_u32(*v) {
                Some(c) => write!(f, "{:?}", c),
                None => write!(f, "'\\U{:08x}'", v),
            },
            Self::Str(s) => write!(f, "\"{}\"", s),
            Self::Ident(ident) => f.write_str(&ident.name),
            Self::Selector(base, field) => write!(f, "{}.{}", base, field.name),
            Self::Paren(inner) => write!(f, "({})", inner),
            Self::Unary(op, inner) => {
                let sym = match op {
                    UnaryOp::Plus => "+",
                    UnaryOp::Neg => "-",
                    UnaryOp::Not => "!",
                    UnaryOp::Complement => "^",
                    UnaryOp::Deref => "*",
                    UnaryOp::Addr => "&",
                    UnaryOp::Recv => "<-",
                };
                write!(f, "{}{}", sym, inner)
            }
            Self::Binary(op, lhs, rhs) => write!(f, "{} {} {}", lhs, op.as_str(), rhs),
            Self::Call(func, args) => {
                write!(f, "{}(", func)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_str(")")
            }
            Self::Opaque(what) => write!(f, "<{}>", what),
        }
    }
}
