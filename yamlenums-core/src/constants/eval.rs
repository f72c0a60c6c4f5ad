//! Constant expression evaluation.
//!
//! A closed evaluator over the node kinds enum declarations use: integer
//! and rune literals, `iota`, references to other package constants,
//! parentheses, unary `+ - ^`, the integer binary operators and conversions
//! to integer types. Every other node is rejected with an
//! `UnsupportedExpression` error naming the constant.
//!
//! Untyped values are exact within `i128`. Once a value has an integer
//! kind, every intermediate result is range-checked against it, matching
//! the compile-time overflow rules of Go.

use crate::error::{YamlenumsError, YamlenumsResult};
use crate::syntax::ast::{BinaryOp, UnaryOp};
use crate::syntax::{parse_int_literal, Expr};

use super::int_kind::{IntKind, TypeResolution};

/// An evaluated constant. `kind` is `None` for untyped constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstValue {
    pub value: i128,
    pub kind: Option<IntKind>,
}

impl ConstValue {
    pub fn untyped(value: i128) -> Self {
        Self { value, kind: None }
    }

    pub fn typed(value: i128, kind: IntKind) -> Self {
        Self {
            value,
            kind: Some(kind),
        }
    }
}

/// What the evaluator can see of the surrounding package.
pub trait EvalScope {
    /// Value of an already evaluated package constant.
    fn constant(&self, name: &str) -> Option<ConstValue>;

    /// Resolve a type name appearing in a conversion.
    fn resolve_type(&self, name: &str) -> TypeResolution;
}

/// Check that `value` fits `kind` and tag it.
pub fn convert(name: &str, value: i128, kind: IntKind) -> YamlenumsResult<ConstValue> {
    if kind.contains(value) {
        Ok(ConstValue::typed(value, kind))
    } else {
        Err(YamlenumsError::overflow(
            name,
            format!("constant {} overflows {}", value, kind),
        ))
    }
}

/// Evaluates the expression of one constant.
pub struct Evaluator<'a> {
    scope: &'a dyn EvalScope,
    name: &'a str,
    iota: u32,
}

impl<'a> Evaluator<'a> {
    pub fn new(scope: &'a dyn EvalScope, name: &'a str, iota: u32) -> Self {
        Self { scope, name, iota }
    }

    pub fn eval(&self, expr: &Expr) -> YamlenumsResult<ConstValue> {
        match expr {
            Expr::Int(text) => parse_int_literal(text)
                .and_then(|v| i128::try_from(v).ok())
                .map(ConstValue::untyped)
                .ok_or_else(|| self.overflow(format!("integer literal {} overflows", text))),
            Expr::Rune(code) => Ok(ConstValue::untyped(i128::from(*code))),
            Expr::Float(text) => Err(self.unsupported(format!("float literal {}", text))),
            Expr::Imag(text) => Err(self.unsupported(format!("imaginary literal {}", text))),
            Expr::Str(_) => Err(self.unsupported(format!("string literal {}", expr))),
            Expr::Ident(ident) => self.lookup(&ident.name),
            Expr::Selector(..) => Err(self.unsupported(format!(
                "reference to {} from another package",
                expr
            ))),
            Expr::Paren(inner) => self.eval(inner),
            Expr::Unary(op, operand) => self.unary(*op, operand, expr),
            Expr::Binary(op, lhs, rhs) => self.binary(*op, lhs, rhs, expr),
            Expr::Call(func, args) => self.call(func, args, expr),
            Expr::Opaque(what) => Err(self.unsupported(what.clone())),
        }
    }

    fn lookup(&self, ident: &str) -> YamlenumsResult<ConstValue> {
        if let Some(value) = self.scope.constant(ident) {
            return Ok(value);
        }
        match ident {
            "iota" => Ok(ConstValue::untyped(i128::from(self.iota))),
            "true" | "false" => Err(self.unsupported(format!("boolean constant {}", ident))),
            "nil" => Err(self.unsupported("nil")),
            _ => Err(self.unsupported(format!("{} is not a constant of this package", ident))),
        }
    }

    fn unary(&self, op: UnaryOp, operand: &Expr, whole: &Expr) -> YamlenumsResult<ConstValue> {
        let v = self.eval(operand)?;
        let value = match op {
            UnaryOp::Plus => v.value,
            UnaryOp::Neg => v
                .value
                .checked_neg()
                .ok_or_else(|| self.overflow("constant overflow"))?,
            UnaryOp::Complement => match v.kind {
                Some(kind) if !kind.is_signed() => !v.value & kind.max(),
                _ => !v.value,
            },
            UnaryOp::Not | UnaryOp::Deref | UnaryOp::Addr | UnaryOp::Recv => {
                return Err(self.unsupported(format!("operator in {}", whole)));
            }
        };
        self.finish(value, v.kind)
    }

    fn binary(
        &self,
        op: BinaryOp,
        lhs: &Expr,
        rhs: &Expr,
        whole: &Expr,
    ) -> YamlenumsResult<ConstValue> {
        if matches!(
            op,
            BinaryOp::LAnd
                | BinaryOp::LOr
                | BinaryOp::Eql
                | BinaryOp::Neq
                | BinaryOp::Lss
                | BinaryOp::Leq
                | BinaryOp::Gtr
                | BinaryOp::Geq
        ) {
            return Err(self.unsupported(format!("boolean expression {}", whole)));
        }

        let l = self.eval(lhs)?;
        let r = self.eval(rhs)?;

        if matches!(op, BinaryOp::Shl | BinaryOp::Shr) {
            return self.shift(op, l, r);
        }

        let kind = match (l.kind, r.kind) {
            (Some(a), Some(b)) if a != b => {
                return Err(self.unsupported(format!(
                    "mismatched types {} and {} in {}",
                    a, b, whole
                )));
            }
            (Some(k), _) | (_, Some(k)) => Some(k),
            (None, None) => None,
        };

        let (a, b) = (l.value, r.value);
        let value = match op {
            BinaryOp::Add => a.checked_add(b),
            BinaryOp::Sub => a.checked_sub(b),
            BinaryOp::Mul => a.checked_mul(b),
            BinaryOp::Quo | BinaryOp::Rem => {
                if b == 0 {
                    return Err(self.overflow("division by zero"));
                }
                if op == BinaryOp::Quo {
                    a.checked_div(b)
                } else {
                    a.checked_rem(b)
                }
            }
            BinaryOp::And => Some(a & b),
            BinaryOp::Or => Some(a | b),
            BinaryOp::Xor => Some(a ^ b),
            BinaryOp::AndNot => Some(a & !b),
            _ => None,
        }
        .ok_or_else(|| self.overflow("constant overflow"))?;

        self.finish(value, kind)
    }

    fn shift(&self, op: BinaryOp, l: ConstValue, r: ConstValue) -> YamlenumsResult<ConstValue> {
        if r.value < 0 {
            return Err(self.overflow(format!("invalid negative shift count {}", r.value)));
        }
        let value = if op == BinaryOp::Shl {
            let count = u32::try_from(r.value).unwrap_or(u32::MAX);
            if l.value == 0 {
                0
            } else if count >= 127 {
                return Err(self.overflow("shift count too large"));
            } else {
                let shifted = l.value << count;
                if shifted >> count != l.value {
                    return Err(self.overflow("constant shift overflow"));
                }
                shifted
            }
        } else {
            let count = u32::try_from(r.value).unwrap_or(u32::MAX).min(127);
            l.value >> count
        };
        self.finish(value, l.kind)
    }

    fn call(&self, func: &Expr, args: &[Expr], whole: &Expr) -> YamlenumsResult<ConstValue> {
        let target = match func {
            Expr::Ident(ident) => ident.name.as_str(),
            Expr::Paren(inner) => return self.call(inner, args, whole),
            _ => return Err(self.unsupported(format!("call {}", whole))),
        };
        if args.len() != 1 {
            return Err(self.unsupported(format!("call {}", whole)));
        }
        let kind = match self.scope.resolve_type(target) {
            TypeResolution::Integer(kind) => kind,
            TypeResolution::Other(underlying) => {
                return Err(self.unsupported(format!(
                    "conversion to non-integer type {} ({})",
                    target, underlying
                )));
            }
            TypeResolution::Undeclared => {
                return Err(self.unsupported(format!("call {}", whole)));
            }
        };
        let v = self.eval(&args[0])?;
        convert(self.name, v.value, kind)
    }

    fn finish(&self, value: i128, kind: Option<IntKind>) -> YamlenumsResult<ConstValue> {
        match kind {
            Some(kind) => convert(self.name, value, kind),
            None => Ok(ConstValue::untyped(value)),
        }
    }

    fn unsupported(&self, detail: impl Into<String>) -> YamlenumsError {
        YamlenumsError::unsupported(self.name, detail)
    }

    fn overflow(&self, detail: impl Into<String>) -> YamlenumsError {
        YamlenumsError::overflow(self.name, detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse_file;
    use std::collections::HashMap;
    use std::path::Path;

    #[derive(Default)]
    struct MapScope {
        values: HashMap<String, ConstValue>,
        types: HashMap<String, TypeResolution>,
    }

    impl EvalScope for MapScope {
        fn constant(&self, name: &str) -> Option<ConstValue> {
            self.values.get(name).copied()
        }

        fn resolve_type(&self, name: &str) -> TypeResolution {
            if let Some(res) = self.types.get(name) {
                return res.clone();
            }
            IntKind::from_basic(name)
                .map(TypeResolution::Integer)
                .unwrap_or(TypeResolution::Undeclared)
        }
    }

    fn expr(src: &str) -> Expr {
        let file = parse_file(Path::new("e.go"), &format!("package p\nconst X = {}\n", src)).unwrap();
        file.consts[0].specs[0].values[0].clone()
    }

    fn eval_in(scope: &MapScope, src: &str, iota: u32) -> YamlenumsResult<ConstValue> {
        Evaluator::new(scope, "X", iota).eval(&expr(src))
    }

    fn eval(src: &str) -> YamlenumsResult<i128> {
        eval_in(&MapScope::default(), src, 0).map(|v| v.value)
    }

    #[test]
    fn test_literals_and_arithmetic() {
        assert_eq!(eval("0x10 + 0b11 + 0o7 + 010").unwrap(), 16 + 3 + 7 + 8);
        assert_eq!(eval("1_000 * 3 - 1").unwrap(), 2999);
        assert_eq!(eval("'a'").unwrap(), 97);
        assert_eq!(eval("-7 / 2").unwrap(), -3);
        assert_eq!(eval("-7 % 2").unwrap(), -1);
        assert_eq!(eval("(1 + 2) * 3").unwrap(), 9);
        assert_eq!(eval("0xF0 &^ 0x30").unwrap(), 0xC0);
        assert_eq!(eval("6 ^ 3 | 8").unwrap(), 13);
    }

    #[test]
    fn test_iota_and_shifts() {
        let scope = MapScope::default();
        assert_eq!(eval_in(&scope, "1 << iota", 4).unwrap().value, 16);
        assert_eq!(eval_in(&scope, "iota * 10 + 1", 3).unwrap().value, 31);
        assert_eq!(eval("256 >> 4").unwrap(), 16);
        assert_eq!(eval("-1 >> 200").unwrap(), -1);
        assert!(eval("1 << 127").is_err());
        assert_eq!(eval("0 << 500").unwrap(), 0);
    }

    #[test]
    fn test_complement_respects_kind() {
        assert_eq!(eval("^0").unwrap(), -1);
        assert_eq!(eval("^uint8(0)").unwrap(), 255);
        assert_eq!(eval("^int8(0)").unwrap(), -1);
        assert_eq!(eval("^uint16(1)").unwrap(), 0xFFFE);
    }

    #[test]
    fn test_typed_overflow() {
        let err = eval("uint8(255) + 1").unwrap_err();
        assert!(matches!(err, YamlenumsError::Overflow { .. }));
        assert!(err.to_string().contains("overflows uint8"));
        assert!(eval("int8(-128)").is_ok());
        assert!(eval("uint(-1)").is_err());
    }

    #[test]
    fn test_undefined_arithmetic() {
        assert!(eval("1 / 0").unwrap_err().to_string().contains("division by zero"));
        assert!(eval("1 % (2 - 2)").is_err());
        assert!(eval("1 << -1").unwrap_err().to_string().contains("negative shift"));
    }

    #[test]
    fn test_references_and_named_conversions() {
        let mut scope = MapScope::default();
        scope
            .values
            .insert("Paracetamol".into(), ConstValue::typed(3, IntKind::Int));
        scope
            .types
            .insert("Pill".into(), TypeResolution::Integer(IntKind::Int));
        scope
            .types
            .insert("Name".into(), TypeResolution::Other("string".into()));

        let v = eval_in(&scope, "Paracetamol", 0).unwrap();
        assert_eq!(v, ConstValue::typed(3, IntKind::Int));
        assert_eq!(eval_in(&scope, "Pill(7) + 1", 0).unwrap().value, 8);
        assert!(matches!(
            eval_in(&scope, "Name(1)", 0),
            Err(YamlenumsError::UnsupportedExpression { .. })
        ));
    }

    #[test]
    fn test_mismatched_kinds() {
        let err = eval("int8(1) + uint8(1)").unwrap_err();
        assert!(err.to_string().contains("mismatched types"));
    }

    #[test]
    fn test_unsupported_forms() {
        for src in [
            "1.5",
            "\"s\"",
            "true",
            "a == b",
            "len(\"abc\")",
            "time.Second",
            "Undefined + 1",
            "[]int{1}[0]",
            "!x",
        ] {
            let err = eval(src).unwrap_err();
            assert!(
                matches!(err, YamlenumsError::UnsupportedExpression { ref name, .. } if name == "X"),
                "{} gave {:?}",
                src,
                err
            );
        }
    }
}
