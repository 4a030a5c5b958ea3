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

use std::fmt;

use hashbrown::{HashMap, HashSet};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::symbol_expr::{Symbol, SymbolExpr};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterError {
    #[error("Encountered unbound parameter.")]
    UnboundParameter,
    #[error("Division by zero.")]
    ZeroDivisionError,
    #[error("Binding to infinite value.")]
    BindingInf,
    #[error("Binding to NaN.")]
    BindingNaN,
    #[error("Cannot bind Parameter {0:?} not present in expression")]
    UnknownParameter(Symbol),
}

/// A symbolic expression over named parameters that have not been resolved to a number yet.
///
/// Expressions are immutable; every arithmetic operation and every bind produces a new one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParameterExpression {
    expr: SymbolExpr,
}

impl ParameterExpression {
    pub fn new(expr: SymbolExpr) -> Self {
        Self { expr }
    }

    /// A new expression made of a single fresh parameter called `name`.
    pub fn parameter(name: &str) -> Self {
        Self::from_symbol(Symbol::new(name, None))
    }

    pub fn from_symbol(symbol: Symbol) -> Self {
        Self {
            expr: SymbolExpr::from(symbol),
        }
    }

    pub fn expr(&self) -> &SymbolExpr {
        &self.expr
    }

    /// The set of parameters this expression still depends on.
    pub fn parameters(&self) -> HashSet<Symbol> {
        self.expr.symbols()
    }

    pub fn is_bound(&self) -> bool {
        self.expr.is_value()
    }

    /// Convert to a real number, failing if any parameter is still unbound.
    pub fn try_to_value(&self) -> Result<f64, ParameterError> {
        let value = self.expr.eval().ok_or(ParameterError::UnboundParameter)?;
        if value.is_infinite() {
            return Err(ParameterError::ZeroDivisionError);
        }
        Ok(value)
    }

    /// Assign numeric values to (some of) the parameters of this expression.
    pub fn bind(&self, map: &HashMap<Symbol, f64>) -> Result<Self, ParameterError> {
        let known = self.parameters();
        let mut bindings = HashMap::with_capacity(map.len());
        for (symbol, value) in map {
            if !known.contains(symbol) {
                return Err(ParameterError::UnknownParameter(symbol.clone()));
            }
            if value.is_nan() {
                return Err(ParameterError::BindingNaN);
            }
            if value.is_infinite() {
                return Err(ParameterError::BindingInf);
            }
            bindings.insert(symbol, *value);
        }
        Ok(Self::new(self.expr.bind(&bindings)))
    }

    pub fn add_value(&self, rhs: f64) -> Self {
        if rhs < 0. {
            return self.sub_value(-rhs);
        }
        Self::new(&self.expr + &SymbolExpr::Value(rhs))
    }

    pub fn sub_value(&self, rhs: f64) -> Self {
        Self::new(&self.expr - &SymbolExpr::Value(rhs))
    }

    pub fn mul_value(&self, rhs: f64) -> Self {
        Self::new(&self.expr * &SymbolExpr::Value(rhs))
    }

    pub fn neg(&self) -> Self {
        Self::new(-&self.expr)
    }
}

impl fmt::Display for ParameterExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expr)
    }
}
