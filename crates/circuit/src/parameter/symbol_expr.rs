// This code is part of Qiskit.
//
// (C) Copyright IBM 2023, 2024
//
// This code is licensed under the Apache License, Version 2.0. You may
// obtain a copy of this license in the LICENSE.txt file in the root directory
// of this source tree or at http://www.apache.org/licenses/LICENSE-2.0.
//
// Any modifications or derivative works of this code must retain this
// copyright notice, and modified files need to carry a notice indicating
// that they have been altered from the originals.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Add, Div, Mul, Neg, Sub};
use std::sync::Arc;

use hashbrown::{HashMap, HashSet};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Symbol {
    name: String,   // the name of the symbol
    pub uuid: Uuid, // the unique identifier
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.uuid == other.uuid
    }
}

impl Eq for Symbol {}

impl PartialOrd for Symbol {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Symbol {
    fn cmp(&self, other: &Self) -> Ordering {
        (&self.name, self.uuid).cmp(&(&other.name, other.uuid))
    }
}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (&self.name, self.uuid).hash(state);
    }
}

impl Symbol {
    pub fn new(name: &str, uuid: Option<Uuid>) -> Self {
        Self {
            name: name.to_string(),
            uuid: uuid.unwrap_or_else(Uuid::new_v4),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// node types of expression tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SymbolExpr {
    Symbol(Arc<Symbol>),
    Value(f64),
    Unary {
        op: UnaryOp,
        expr: Arc<SymbolExpr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Arc<SymbolExpr>,
        rhs: Arc<SymbolExpr>,
    },
}

/// definition of unary operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Neg,
}

/// definition of binary operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl UnaryOp {
    fn apply(self, val: f64) -> f64 {
        match self {
            UnaryOp::Neg => -val,
        }
    }
}

impl BinaryOp {
    fn apply(self, lhs: f64, rhs: f64) -> f64 {
        match self {
            BinaryOp::Add => lhs + rhs,
            BinaryOp::Sub => lhs - rhs,
            BinaryOp::Mul => lhs * rhs,
            BinaryOp::Div => lhs / rhs,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
        }
    }
}

// Constant subtrees are folded eagerly so that fully-bound expressions collapse to a value.
#[inline(always)]
fn _binary(op: BinaryOp, lhs: SymbolExpr, rhs: SymbolExpr) -> SymbolExpr {
    let value = |e: &SymbolExpr| match e {
        SymbolExpr::Value(v) => Some(*v),
        _ => None,
    };
    match (op, value(&lhs), value(&rhs)) {
        (_, Some(l), Some(r)) => SymbolExpr::Value(op.apply(l, r)),
        (BinaryOp::Add | BinaryOp::Sub, _, Some(r)) if r == 0.0 => lhs,
        (BinaryOp::Mul | BinaryOp::Div, _, Some(r)) if r == 1.0 => lhs,
        (BinaryOp::Add, Some(l), _) if l == 0.0 => rhs,
        (BinaryOp::Sub, Some(l), _) if l == 0.0 => _neg(rhs),
        (BinaryOp::Mul, Some(l), _) if l == 1.0 => rhs,
        _ => SymbolExpr::Binary {
            op,
            lhs: Arc::new(lhs),
            rhs: Arc::new(rhs),
        },
    }
}

#[inline(always)]
fn _neg(expr: SymbolExpr) -> SymbolExpr {
    match expr {
        SymbolExpr::Value(v) => SymbolExpr::Value(-v),
        SymbolExpr::Unary {
            op: UnaryOp::Neg,
            expr,
        } => expr.as_ref().clone(),
        _ => SymbolExpr::Unary {
            op: UnaryOp::Neg,
            expr: Arc::new(expr),
        },
    }
}

impl fmt::Display for SymbolExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymbolExpr::Symbol(s) => write!(f, "{}", s.name()),
            SymbolExpr::Value(v) => write!(f, "{}", v),
            SymbolExpr::Unary { op, expr } => match op {
                UnaryOp::Neg => match expr.as_ref() {
                    SymbolExpr::Binary { .. } => write!(f, "-({})", expr),
                    _ => write!(f, "-{}", expr),
                },
            },
            SymbolExpr::Binary { op, lhs, rhs } => {
                let needs_parens = |e: &SymbolExpr, is_rhs: bool| match e {
                    SymbolExpr::Binary { op: inner, .. } => {
                        let additive = matches!(inner, BinaryOp::Add | BinaryOp::Sub);
                        match op {
                            BinaryOp::Add => false,
                            BinaryOp::Sub => is_rhs && additive,
                            BinaryOp::Mul => additive,
                            BinaryOp::Div => additive || is_rhs,
                        }
                    }
                    _ => false,
                };
                let operand = |e: &SymbolExpr, is_rhs: bool| {
                    if needs_parens(e, is_rhs) {
                        format!("({})", e)
                    } else {
                        e.to_string()
                    }
                };
                write!(f, "{} {} {}", operand(lhs, false), op.symbol(), operand(rhs, true))
            }
        }
    }
}

impl SymbolExpr {
    /// bind value to symbol node
    pub fn bind(&self, maps: &HashMap<&Symbol, f64>) -> SymbolExpr {
        match self {
            SymbolExpr::Symbol(e) => match maps.get(e.as_ref()) {
                Some(v) => SymbolExpr::Value(*v),
                None => self.clone(),
            },
            SymbolExpr::Value(e) => SymbolExpr::Value(*e),
            SymbolExpr::Unary { op, expr } => match expr.bind(maps) {
                SymbolExpr::Value(v) => SymbolExpr::Value(op.apply(v)),
                bound => SymbolExpr::Unary {
                    op: *op,
                    expr: Arc::new(bound),
                },
            },
            SymbolExpr::Binary { op, lhs, rhs } => _binary(*op, lhs.bind(maps), rhs.bind(maps)),
        }
    }

    /// evaluate the expression, returning `None` if any symbol is still unbound
    pub fn eval(&self) -> Option<f64> {
        match self {
            SymbolExpr::Symbol(_) => None,
            SymbolExpr::Value(e) => Some(*e),
            SymbolExpr::Unary { op, expr } => expr.eval().map(|v| op.apply(v)),
            SymbolExpr::Binary { op, lhs, rhs } => Some(op.apply(lhs.eval()?, rhs.eval()?)),
        }
    }

    /// collect every symbol that appears in the expression
    pub fn symbols(&self) -> HashSet<Symbol> {
        let mut out = HashSet::new();
        self.collect_symbols(&mut out);
        out
    }

    fn collect_symbols(&self, out: &mut HashSet<Symbol>) {
        match self {
            SymbolExpr::Symbol(e) => {
                out.insert(e.as_ref().clone());
            }
            SymbolExpr::Value(_) => (),
            SymbolExpr::Unary { expr, .. } => expr.collect_symbols(out),
            SymbolExpr::Binary { lhs, rhs, .. } => {
                lhs.collect_symbols(out);
                rhs.collect_symbols(out);
            }
        }
    }

    pub fn is_value(&self) -> bool {
        matches!(self, SymbolExpr::Value(_))
    }
}

impl From<f64> for SymbolExpr {
    fn from(value: f64) -> Self {
        SymbolExpr::Value(value)
    }
}

impl From<Symbol> for SymbolExpr {
    fn from(value: Symbol) -> Self {
        SymbolExpr::Symbol(Arc::new(value))
    }
}

macro_rules! impl_binary_op {
    ($trait:ident, $method:ident, $op:expr) => {
        impl $trait for SymbolExpr {
            type Output = SymbolExpr;
            fn $method(self, rhs: Self) -> SymbolExpr {
                _binary($op, self, rhs)
            }
        }

        impl $trait for &SymbolExpr {
            type Output = SymbolExpr;
            fn $method(self, rhs: Self) -> SymbolExpr {
                _binary($op, self.clone(), rhs.clone())
            }
        }
    };
}

impl_binary_op!(Add, add, BinaryOp::Add);
impl_binary_op!(Sub, sub, BinaryOp::Sub);
impl_binary_op!(Mul, mul, BinaryOp::Mul);
impl_binary_op!(Div, div, BinaryOp::Div);

impl Neg for SymbolExpr {
    type Output = SymbolExpr;
    fn neg(self) -> SymbolExpr {
        _neg(self)
    }
}

impl Neg for &SymbolExpr {
    type Output = SymbolExpr;
    fn neg(self) -> SymbolExpr {
        _neg(self.clone())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn symbol(name: &str) -> (Symbol, SymbolExpr) {
        let symbol = Symbol::new(name, None);
        let expr = SymbolExpr::from(symbol.clone());
        (symbol, expr)
    }

    #[test]
    fn constants_fold() {
        let expr = SymbolExpr::Value(1.5) + SymbolExpr::Value(2.0);
        assert_eq!(expr, SymbolExpr::Value(3.5));
        assert_eq!(-SymbolExpr::Value(2.0), SymbolExpr::Value(-2.0));
    }

    #[test]
    fn double_negation_cancels() {
        let (_, a) = symbol("a");
        assert_eq!(-(-a.clone()), a);
    }

    #[test]
    fn bind_and_eval() {
        let (a, a_expr) = symbol("a");
        let (b, b_expr) = symbol("b");
        let expr = &(&a_expr * &SymbolExpr::Value(2.0)) - &b_expr;
        assert_eq!(expr.eval(), None);

        let partial = expr.bind(&HashMap::from([(&a, 3.0)]));
        assert_eq!(partial.symbols(), HashSet::from([b.clone()]));
        assert_eq!(partial.eval(), None);

        let full = partial.bind(&HashMap::from([(&b, 1.0)]));
        assert_eq!(full, SymbolExpr::Value(5.0));
        assert_eq!(full.eval(), Some(5.0));
    }

    #[test]
    fn symbols_are_distinguished_by_uuid() {
        let first = Symbol::new("theta", None);
        let second = Symbol::new("theta", None);
        assert_ne!(first, second);
        assert_eq!(first, first.clone());
    }

    #[test]
    fn display() {
        let (_, phi) = symbol("phi");
        let expr = &phi - &SymbolExpr::Value(0.5);
        assert_eq!(expr.to_string(), "phi - 0.5");
        assert_eq!((-phi.clone()).to_string(), "-phi");
        let product = &(&phi + &SymbolExpr::Value(1.0)) * &SymbolExpr::Value(2.0);
        assert_eq!(product.to_string(), "(phi + 1) * 2");
    }
}
