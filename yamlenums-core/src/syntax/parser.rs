//! Declaration-level Go parser.
//!
//! Parses the package clause, `const` and `type` declarations in full and
//! skips every other top-level declaration (imports, `var`, `func`) by
//! scanning to the next semicolon at bracket depth zero.

use std::path::Path;

use super::ast::{
    BinaryOp, ConstDecl, ConstSpec, Expr, Ident, SourceFile, TypeExpr, TypeName, TypeSpec, UnaryOp,
};
use super::lexer::Lexer;
use super::token::{Keyword, Pos, Punct, Token, TokenKind};
use crate::error::{YamlenumsError, YamlenumsResult};

/// Lex and parse one Go source file.
pub fn parse_file(path: &Path, source: &str) -> YamlenumsResult<SourceFile> {
    let tokens = Lexer::new(source)
        .tokenize()
        .map_err(|e| YamlenumsError::parse_at(path, e.message, e.pos.line, e.pos.column))?;
    Parser::new(path, tokens).parse_source_file()
}

struct Parser<'a> {
    path: &'a Path,
    tokens: Vec<Token>,
    index: usize,
}

impl<'a> Parser<'a> {
    fn new(path: &'a Path, tokens: Vec<Token>) -> Self {
        Self {
            path,
            tokens,
            index: 0,
        }
    }

    // ------------------------------------------------------------------
    // Token cursor
    // ------------------------------------------------------------------

    fn peek(&self) -> &TokenKind {
        self.peek_at(0)
    }

    fn peek_at(&self, n: usize) -> &TokenKind {
        let last = self.tokens.len().saturating_sub(1);
        self.tokens
            .get((self.index + n).min(last))
            .map(|t| &t.kind)
            .unwrap_or(&TokenKind::Eof)
    }

    fn pos(&self) -> Pos {
        self.tokens
            .get(self.index)
            .or_else(|| self.tokens.last())
            .map(|t| t.pos)
            .unwrap_or_default()
    }

    fn advance(&mut self) -> TokenKind {
        let kind = self.peek().clone();
        if self.index < self.tokens.len() {
            self.index += 1;
        }
        kind
    }

    fn at_punct(&self, p: Punct) -> bool {
        *self.peek() == TokenKind::Punct(p)
    }

    fn error(&self, message: impl Into<String>) -> YamlenumsError {
        let pos = self.pos();
        YamlenumsError::parse_at(self.path, message, pos.line, pos.column)
    }

    fn unexpected(&self, context: &str) -> YamlenumsError {
        self.error(format!("syntax error: unexpected {} {}", self.peek(), context))
    }

    fn expect_punct(&mut self, p: Punct, context: &str) -> YamlenumsResult<()> {
        if self.at_punct(p) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(&format!("{}, expected '{}'", context, p.as_str())))
        }
    }

    fn expect_ident(&mut self, context: &str) -> YamlenumsResult<Ident> {
        let pos = self.pos();
        match self.peek() {
            TokenKind::Ident(name) => {
                let name = name.clone();
                self.advance();
                Ok(Ident { name, pos })
            }
            _ => Err(self.unexpected(&format!("{}, expected name", context))),
        }
    }

    /// A declaration ends at `;` or end of file.
    fn expect_decl_end(&mut self) -> YamlenumsResult<()> {
        match self.peek() {
            TokenKind::Semicolon => {
                self.advance();
                Ok(())
            }
            TokenKind::Eof => Ok(()),
            _ => Err(self.unexpected("after top level declaration")),
        }
    }

    // ------------------------------------------------------------------
    // Declarations
    // ------------------------------------------------------------------

    fn parse_source_file(mut self) -> YamlenumsResult<SourceFile> {
        if *self.peek() != TokenKind::Keyword(Keyword::Package) {
            return Err(self.error("expected 'package', found ".to_string() + &self.peek().to_string()));
        }
        self.advance();
        let package = self.expect_ident("in package clause")?;
        if package.is_blank() {
            return Err(self.error("invalid package name _"));
        }
        self.expect_decl_end()?;

        let mut consts = Vec::new();
        let mut types = Vec::new();

        loop {
            match self.peek() {
                TokenKind::Eof => break,
                TokenKind::Semicolon => {
                    self.advance();
                }
                TokenKind::Keyword(Keyword::Const) => consts.push(self.parse_const_decl()?),
                TokenKind::Keyword(Keyword::Type) => types.extend(self.parse_type_decl()?),
                TokenKind::Keyword(Keyword::Import | Keyword::Var | Keyword::Func) => {
                    self.skip_decl()?
                }
                _ => return Err(self.error("syntax error: non-declaration statement outside function body")),
            }
        }

        Ok(SourceFile {
            path: self.path.to_path_buf(),
            package,
            consts,
            types,
        })
    }

    /// Skip a declaration whose contents are irrelevant.
    fn skip_decl(&mut self) -> YamlenumsResult<()> {
        self.advance();
        let mut depth = 0usize;
        loop {
            match self.peek() {
                TokenKind::Eof if depth == 0 => return Ok(()),
                TokenKind::Eof => return Err(self.error("syntax error: unexpected EOF")),
                TokenKind::Semicolon if depth == 0 => {
                    self.advance();
                    return Ok(());
                }
                TokenKind::Punct(Punct::LParen | Punct::LBrack | Punct::LBrace) => depth += 1,
                TokenKind::Punct(Punct::RParen | Punct::RBrack | Punct::RBrace) => {
                    if depth == 0 {
                        return Err(self.unexpected("in declaration"));
                    }
                    depth -= 1;
                }
                _ => {}
            }
            self.advance();
        }
    }

    fn parse_const_decl(&mut self) -> YamlenumsResult<ConstDecl> {
        let pos = self.pos();
        self.advance();
        let mut specs = Vec::new();

        if self.at_punct(Punct::LParen) {
            self.advance();
            loop {
                match self.peek() {
                    TokenKind::Punct(Punct::RParen) => {
                        self.advance();
                        break;
                    }
                    TokenKind::Semicolon => {
                        self.advance();
                        continue;
                    }
                    _ => {}
                }
                let spec = self.parse_const_spec(specs.len() as u32)?;
                specs.push(spec);
                match self.peek() {
                    TokenKind::Semicolon => {
                        self.advance();
                    }
                    TokenKind::Punct(Punct::RParen) => {}
                    _ => return Err(self.unexpected("in const declaration, expected ';' or ')'")),
                }
            }
        } else {
            specs.push(self.parse_const_spec(0)?);
        }

        self.expect_decl_end()?;
        Ok(ConstDecl { pos, specs })
    }

    fn parse_const_spec(&mut self, iota: u32) -> YamlenumsResult<ConstSpec> {
        let mut names = vec![self.expect_ident("in const declaration")?];
        while self.at_punct(Punct::Comma) {
            self.advance();
            names.push(self.expect_ident("in const declaration")?);
        }

        let ty = match self.peek() {
            TokenKind::Ident(_) => Some(self.parse_type_name()?),
            TokenKind::Punct(Punct::Assign | Punct::RParen) | TokenKind::Semicolon | TokenKind::Eof => None,
            _ => return Err(self.unexpected("in const declaration")),
        };

        let mut values = Vec::new();
        if self.at_punct(Punct::Assign) {
            self.advance();
            values = self.parse_expr_list()?;
        }

        let first = &names[0];
        if values.is_empty() && (ty.is_some() || iota == 0) {
            return Err(YamlenumsError::parse_at(
                self.path,
                "missing init expr for const declaration",
                first.pos.line,
                first.pos.column,
            ));
        }
        if !values.is_empty() && values.len() != names.len() {
            let message = if values.len() < names.len() {
                "missing init expr for const declaration"
            } else {
                "extra init expr"
            };
            return Err(YamlenumsError::parse_at(
                self.path,
                message,
                first.pos.line,
                first.pos.column,
            ));
        }

        Ok(ConstSpec {
            names,
            ty,
            values,
            iota,
        })
    }

    fn parse_type_name(&mut self) -> YamlenumsResult<TypeName> {
        let first = self.expect_ident("in type")?;
        if self.at_punct(Punct::Dot) {
            self.advance();
            let second = self.expect_ident("in qualified type")?;
            return Ok(TypeName::Qualified {
                package: first.name,
                name: second.name,
            });
        }
        Ok(TypeName::Local(first.name))
    }

    fn parse_type_decl(&mut self) -> YamlenumsResult<Vec<TypeSpec>> {
        self.advance();
        let mut specs = Vec::new();

        if self.at_punct(Punct::LParen) {
            self.advance();
            loop {
                match self.peek() {
                    TokenKind::Punct(Punct::RParen) => {
                        self.advance();
                        break;
                    }
                    TokenKind::Semicolon => {
                        self.advance();
                        continue;
                    }
                    _ => {}
                }
                specs.push(self.parse_type_spec()?);
                match self.peek() {
                    TokenKind::Semicolon => {
                        self.advance();
                    }
                    TokenKind::Punct(Punct::RParen) => {}
                    _ => return Err(self.unexpected("in type declaration, expected ';' or ')'")),
                }
            }
        } else {
            specs.push(self.parse_type_spec()?);
        }

        self.expect_decl_end()?;
        Ok(specs)
    }

    fn is_spec_end(kind: &TokenKind) -> bool {
        matches!(
            kind,
            TokenKind::Semicolon | TokenKind::Eof | TokenKind::Punct(Punct::RParen)
        )
    }

    fn parse_type_spec(&mut self) -> YamlenumsResult<TypeSpec> {
        let name = self.expect_ident("in type declaration")?;
        let alias = self.at_punct(Punct::Assign);
        if alias {
            self.advance();
        }

        let simple_local = matches!(self.peek(), TokenKind::Ident(_)) && Self::is_spec_end(self.peek_at(1));
        let simple_qualified = matches!(self.peek(), TokenKind::Ident(_))
            && *self.peek_at(1) == TokenKind::Punct(Punct::Dot)
            && matches!(self.peek_at(2), TokenKind::Ident(_))
            && Self::is_spec_end(self.peek_at(3));

        let underlying = if simple_local || simple_qualified {
            TypeExpr::Named(self.parse_type_name()?)
        } else {
            let shape = match self.peek() {
                TokenKind::Keyword(kw) => kw.as_str().to_string(),
                TokenKind::Punct(p) => p.as_str().to_string(),
                TokenKind::Ident(name) => name.clone(),
                other => return Err(self.error(format!("syntax error: unexpected {} in type declaration", other))),
            };
            self.skip_type_expr()?;
            TypeExpr::Composite(shape)
        };

        Ok(TypeSpec {
            name,
            alias,
            underlying,
        })
    }

    /// Skip to the end of a type spec: `;` or the group's `)` at depth zero.
    fn skip_type_expr(&mut self) -> YamlenumsResult<()> {
        let mut depth = 0usize;
        loop {
            match self.peek() {
                TokenKind::Eof if depth > 0 => return Err(self.error("syntax error: unexpected EOF in type")),
                kind if depth == 0 && Self::is_spec_end(kind) => return Ok(()),
                TokenKind::Punct(Punct::LParen | Punct::LBrack | Punct::LBrace) => depth += 1,
                TokenKind::Punct(Punct::RParen | Punct::RBrack | Punct::RBrace) => {
                    if depth == 0 {
                        return Err(self.unexpected("in type"));
                    }
                    depth -= 1;
                }
                _ => {}
            }
            self.advance();
        }
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn parse_expr_list(&mut self) -> YamlenumsResult<Vec<Expr>> {
        let mut exprs = vec![self.parse_expr()?];
        while self.at_punct(Punct::Comma) {
            self.advance();
            exprs.push(self.parse_expr()?);
        }
        Ok(exprs)
    }

    fn parse_expr(&mut self) -> YamlenumsResult<Expr> {
        self.parse_binary(1)
    }

    fn binary_op(kind: &TokenKind) -> Option<BinaryOp> {
        let TokenKind::Punct(p) = kind else {
            return None;
        };
        Some(match p {
            Punct::Add => BinaryOp::Add,
            Punct::Sub => BinaryOp::Sub,
            Punct::Mul => BinaryOp::Mul,
            Punct::Quo => BinaryOp::Quo,
            Punct::Rem => BinaryOp::Rem,
            Punct::And => BinaryOp::And,
            Punct::Or => BinaryOp::Or,
            Punct::Xor => BinaryOp::Xor,
            Punct::Shl => BinaryOp::Shl,
            Punct::Shr => BinaryOp::Shr,
            Punct::AndNot => BinaryOp::AndNot,
            Punct::LAnd => BinaryOp::LAnd,
            Punct::LOr => BinaryOp::LOr,
            Punct::Eql => BinaryOp::Eql,
            Punct::Neq => BinaryOp::Neq,
            Punct::Lss => BinaryOp::Lss,
            Punct::Leq => BinaryOp::Leq,
            Punct::Gtr => BinaryOp::Gtr,
            Punct::Geq => BinaryOp::Geq,
            _ => return None,
        })
    }

    fn parse_binary(&mut self, min_prec: u8) -> YamlenumsResult<Expr> {
        let mut lhs = self.parse_unary()?;
        while let Some(op) = Self::binary_op(self.peek()) {
            let prec = op.precedence();
            if prec < min_prec {
                break;
            }
            self.advance();
            let rhs = self.parse_binary(prec + 1)?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> YamlenumsResult<Expr> {
        let op = match self.peek() {
            TokenKind::Punct(Punct::Add) => UnaryOp::Plus,
            TokenKind::Punct(Punct::Sub) => UnaryOp::Neg,
            TokenKind::Punct(Punct::Not) => UnaryOp::Not,
            TokenKind::Punct(Punct::Xor) => UnaryOp::Complement,
            TokenKind::Punct(Punct::Mul) => UnaryOp::Deref,
            TokenKind::Punct(Punct::And) => UnaryOp::Addr,
            TokenKind::Punct(Punct::Arrow) => UnaryOp::Recv,
            _ => return self.parse_primary(),
        };
        self.advance();
        let operand = self.parse_unary()?;
        Ok(Expr::Unary(op, Box::new(operand)))
    }

    fn parse_primary(&mut self) -> YamlenumsResult<Expr> {
        let mut expr = self.parse_operand()?;
        loop {
            match self.peek() {
                TokenKind::Punct(Punct::Dot) => {
                    self.advance();
                    if self.at_punct(Punct::LParen) {
                        self.skip_balanced()?;
                        expr = Expr::Opaque("type assertion".into());
                    } else {
                        let field = self.expect_ident("in selector")?;
                        expr = Expr::Selector(Box::new(expr), field);
                    }
                }
                TokenKind::Punct(Punct::LParen) => {
                    self.advance();
                    let mut args = Vec::new();
                    while !self.at_punct(Punct::RParen) {
                        args.push(self.parse_expr()?);
                        if self.at_punct(Punct::Ellipsis) {
                            self.advance();
                        }
                        if self.at_punct(Punct::Comma) {
                            self.advance();
                        } else {
                            break;
                        }
                    }
                    self.expect_punct(Punct::RParen, "in argument list")?;
                    expr = Expr::Call(Box::new(expr), args);
                }
                TokenKind::Punct(Punct::LBrack) => {
                    self.skip_balanced()?;
                    expr = Expr::Opaque("index expression".into());
                }
                TokenKind::Punct(Punct::LBrace) => {
                    self.skip_balanced()?;
                    expr = Expr::Opaque("composite literal".into());
                }
                _ => return Ok(expr),
            }
        }
    }

    fn parse_operand(&mut self) -> YamlenumsResult<Expr> {
        let pos = self.pos();
        let expr = match self.peek() {
            TokenKind::Int(text) => Expr::Int(text.clone()),
            TokenKind::Float(text) => Expr::Float(text.clone()),
            TokenKind::Imag(text) => Expr::Imag(text.clone()),
            TokenKind::Rune(v) => Expr::Rune(*v),
            TokenKind::Str(s) => Expr::Str(s.clone()),
            TokenKind::Ident(name) => Expr::Ident(Ident {
                name: name.clone(),
                pos,
            }),
            TokenKind::Punct(Punct::LParen) => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect_punct(Punct::RParen, "in parenthesized expression")?;
                return Ok(Expr::Paren(Box::new(inner)));
            }
            TokenKind::Keyword(Keyword::Func) => {
                self.skip_type_operand()?;
                if self.at_punct(Punct::LBrace) {
                    self.skip_balanced()?;
                    return Ok(Expr::Opaque("function literal".into()));
                }
                return Ok(Expr::Opaque("function type".into()));
            }
            TokenKind::Keyword(Keyword::Map | Keyword::Chan | Keyword::Struct | Keyword::Interface)
            | TokenKind::Punct(Punct::LBrack) => {
                self.skip_type_operand()?;
                return Ok(Expr::Opaque("composite type".into()));
            }
            _ => return Err(self.unexpected("in expression")),
        };
        self.advance();
        Ok(expr)
    }

    /// Skip a type used as an operand, stopping before the `{` of a
    /// composite literal or function body, or the `(` of a conversion.
    fn skip_type_operand(&mut self) -> YamlenumsResult<()> {
        match self.peek() {
            TokenKind::Keyword(Keyword::Struct | Keyword::Interface) => {
                self.advance();
                if self.at_punct(Punct::LBrace) {
                    self.skip_balanced()?;
                }
                return Ok(());
            }
            TokenKind::Keyword(Keyword::Func) => {
                self.advance();
                if self.at_punct(Punct::LParen) {
                    self.skip_balanced()?;
                }
                if self.at_punct(Punct::LParen) {
                    return self.skip_balanced();
                }
            }
            TokenKind::Keyword(_) => {
                self.advance();
            }
            _ => {}
        }

        let mut depth = 0usize;
        loop {
            match self.peek() {
                TokenKind::Eof => return Err(self.error("syntax error: unexpected EOF in type")),
                TokenKind::Punct(Punct::LBrace | Punct::LParen) if depth == 0 => return Ok(()),
                TokenKind::Punct(Punct::LParen | Punct::LBrack | Punct::LBrace) => depth += 1,
                TokenKind::Punct(Punct::RParen | Punct::RBrack | Punct::RBrace) => {
                    if depth == 0 {
                        return Ok(());
                    }
                    depth -= 1;
                }
                TokenKind::Semicolon | TokenKind::Punct(Punct::Comma) if depth == 0 => return Ok(()),
                _ => {}
            }
            self.advance();
        }
    }

    /// Skip a bracketed group starting at the current opening token.
    fn skip_balanced(&mut self) -> YamlenumsResult<()> {
        let mut depth = 0usize;
        loop {
            match self.peek() {
                TokenKind::Eof => return Err(self.error("syntax error: unexpected EOF, expected closing bracket")),
                TokenKind::Punct(Punct::LParen | Punct::LBrack | Punct::LBrace) => depth += 1,
                TokenKind::Punct(Punct::RParen | Punct::RBrack | Punct::RBrace) => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        self.advance();
                        return Ok(());
                    }
                }
                _ => {}
            }
            self.advance();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn parse(src: &str) -> SourceFile {
        parse_file(&PathBuf::from("test.go"), src).unwrap()
    }

    fn parse_err(src: &str) -> YamlenumsError {
        parse_file(&PathBuf::from("test.go"), src).unwrap_err()
    }

    const PILL: &str = r#"
package painkiller

import "fmt"

type Pill int

const (
	Placebo Pill = iota
	Aspirin
	Ibuprofen
	Paracetamol
	Acetaminophen = Paracetamol
)

func (p Pill) Describe() string {
	if p == Placebo {
		return "nothing"
	}
	return fmt.Sprint(int(p))
}
"#;

    #[test]
    fn test_parse_pill_package() {
        let file = parse(PILL);
        assert_eq!(file.package.name, "painkiller");
        assert_eq!(file.types.len(), 1);
        assert_eq!(file.types[0].name.name, "Pill");
        assert_eq!(
            file.types[0].underlying,
            TypeExpr::Named(TypeName::Local("int".into()))
        );

        assert_eq!(file.consts.len(), 1);
        let specs = &file.consts[0].specs;
        assert_eq!(specs.len(), 5);
        assert_eq!(specs[0].ty, Some(TypeName::Local("Pill".into())));
        assert_eq!(specs[1].names[0].name, "Aspirin");
        assert!(specs[1].values.is_empty());
        assert_eq!(specs[4].iota, 4);
        assert_eq!(specs[4].values[0].to_string(), "Paracetamol");
    }

    #[test]
    fn test_operator_precedence() {
        let file = parse("package p\nconst X = 1 << 2 + 3 * 4 &^ 1\n");
        let expr = &file.consts[0].specs[0].values[0];
        assert_eq!(
            *expr,
            Expr::Binary(
                BinaryOp::Add,
                Box::new(Expr::Binary(
                    BinaryOp::Shl,
                    Box::new(Expr::Int("1".into())),
                    Box::new(Expr::Int("2".into())),
                )),
                Box::new(Expr::Binary(
                    BinaryOp::AndNot,
                    Box::new(Expr::Binary(
                        BinaryOp::Mul,
                        Box::new(Expr::Int("3".into())),
                        Box::new(Expr::Int("4".into())),
                    )),
                    Box::new(Expr::Int("1".into())),
                )),
            )
        );
    }

    #[test]
    fn test_multi_name_specs_and_conversions() {
        let file = parse("package p\nconst (\n\tA, B = iota, -iota\n\tC, D\n\tE Flag = Flag(1) << 3\n)\n");
        let specs = &file.consts[0].specs;
        assert_eq!(specs[0].names.len(), 2);
        assert_eq!(specs[1].names[1].name, "D");
        assert_eq!(specs[2].values[0].to_string(), "Flag(1) << 3");
    }

    #[test]
    fn test_type_declarations() {
        let file = parse(
            "package p\ntype (\n\tA uint8\n\tB = A\n\tC struct {\n\t\tx int\n\t}\n\tD time.Duration\n\tE []string\n)\ntype F[T any] int\n",
        );
        assert_eq!(file.types.len(), 6);
        assert!(file.types[1].alias);
        assert_eq!(file.types[2].underlying, TypeExpr::Composite("struct".into()));
        assert_eq!(
            file.types[3].underlying,
            TypeExpr::Named(TypeName::Qualified {
                package: "time".into(),
                name: "Duration".into()
            })
        );
        assert_eq!(file.types[4].underlying, TypeExpr::Composite("[".into()));
        assert_eq!(file.types[5].underlying, TypeExpr::Composite("[".into()));
    }

    #[test]
    fn test_skips_vars_funcs_and_imports() {
        let file = parse(
            "package p\nimport (\n\t\"fmt\"\n\tyaml \"gopkg.in/yaml.v3\"\n)\nvar m = map[string]int{\n\t\"a\": 1,\n}\nfunc f() {\n\tfor {\n\t}\n}\nconst Z = 1\n",
        );
        assert_eq!(file.consts.len(), 1);
        assert_eq!(file.consts[0].specs[0].names[0].name, "Z");
    }

    #[test]
    fn test_opaque_expressions_parse() {
        let file = parse("package p\nconst (\n\tN = len([3]int{})\n\tS = \"abc\"\n\tF = 1.5\n)\n");
        let specs = &file.consts[0].specs;
        assert!(matches!(specs[0].values[0], Expr::Call(..)));
        assert!(matches!(specs[1].values[0], Expr::Str(_)));
        assert!(matches!(specs[2].values[0], Expr::Float(_)));
    }

    #[test]
    fn test_missing_init_expr() {
        let err = parse_err("package p\nconst (\n\tA Pill\n)\n");
        assert!(err.to_string().contains("missing init expr"));
        assert!(err.to_string().contains("test.go:3:2"));
    }

    #[test]
    fn test_extra_init_expr() {
        let err = parse_err("package p\nconst A = 1, 2\n");
        assert!(err.to_string().contains("extra init expr"));
    }

    #[test]
    fn test_missing_package_clause() {
        let err = parse_err("const A = 1\n");
        assert!(err.is_parse_failure());
        assert!(err.to_string().contains("expected 'package'"));
    }

    #[test]
    fn test_statement_outside_function() {
        let err = parse_err("package p\nx := 1\n");
        assert!(err.to_string().contains("non-declaration statement"));
    }

    #[test]
    fn test_unbalanced_function_body() {
        let err = parse_err("package p\nfunc f() {\n");
        assert!(err.to_string().contains("unexpected EOF"));
    }
}
