// Copyright 2024 OctoFHIR Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Operator catalogue and call signatures

use std::fmt;

/// Every chained call an expression may make
///
/// The catalogue is fixed: a call name outside this set is rejected when the
/// expression is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `plus(x)`
    Plus,
    /// `times(x)`
    Times,
    /// `div(x)`
    Div,
    /// `pow(x)`
    Pow,
    /// `gt(x)`
    Gt,
    /// `lt(x)`
    Lt,
    /// `ge(x)`
    Ge,
    /// `le(x)`
    Le,
    /// `eq(x?)`
    Eq,
    /// `and(x)`
    And,
    /// `or(x)`
    Or,
    /// `not()`
    Not,
    /// `matches(regex)`
    Matches,
    /// `isValidJson()`
    IsValidJson,
    /// `isNull()`
    IsNull,
    /// `age()`
    Age,
    /// `unit(name)`
    Unit,
    /// `toUnit(name)`
    ToUnit,
    /// `map(table, default?, null?)` or `map(callback)`
    Map,
    /// `group(thresholds)`
    Group,
    /// `attr(name)`
    Attr,
    /// `value()`, the explicit unwrap
    Value,
}

/// Arity bounds for an operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatorSignature {
    /// Name as written in expressions
    pub name: &'static str,
    /// Minimum number of arguments
    pub min_arity: usize,
    /// Maximum number of arguments
    pub max_arity: usize,
}

impl OperatorSignature {
    const fn new(name: &'static str, min_arity: usize, max_arity: usize) -> Self {
        Self {
            name,
            min_arity,
            max_arity,
        }
    }

    /// Check whether `count` arguments are accepted
    pub fn accepts(&self, count: usize) -> bool {
        (self.min_arity..=self.max_arity).contains(&count)
    }

    /// Human-readable arity, e.g. `1` or `1 to 3`
    pub fn arity_description(&self) -> String {
        if self.min_arity == self.max_arity {
            self.min_arity.to_string()
        } else {
            format!("{} to {}", self.min_arity, self.max_arity)
        }
    }
}

impl Operator {
    /// All operators in catalogue order
    pub const ALL: [Operator; 22] = [
        Operator::Plus,
        Operator::Times,
        Operator::Div,
        Operator::Pow,
        Operator::Gt,
        Operator::Lt,
        Operator::Ge,
        Operator::Le,
        Operator::Eq,
        Operator::And,
        Operator::Or,
        Operator::Not,
        Operator::Matches,
        Operator::IsValidJson,
        Operator::IsNull,
        Operator::Age,
        Operator::Unit,
        Operator::ToUnit,
        Operator::Map,
        Operator::Group,
        Operator::Attr,
        Operator::Value,
    ];

    /// Look up an operator by the name used in expressions
    pub fn from_name(name: &str) -> Option<Operator> {
        Self::ALL.into_iter().find(|op| op.name() == name)
    }

    /// Name as written in expressions
    pub fn name(self) -> &'static str {
        self.signature().name
    }

    /// Arity bounds for this operator
    pub fn signature(self) -> OperatorSignature {
        match self {
            Operator::Plus => OperatorSignature::new("plus", 1, 1),
            Operator::Times => OperatorSignature::new("times", 1, 1),
            Operator::Div => OperatorSignature::new("div", 1, 1),
            Operator::Pow => OperatorSignature::new("pow", 1, 1),
            Operator::Gt => OperatorSignature::new("gt", 1, 1),
            Operator::Lt => OperatorSignature::new("lt", 1, 1),
            Operator::Ge => OperatorSignature::new("ge", 1, 1),
            Operator::Le => OperatorSignature::new("le", 1, 1),
            // eq() with no argument compares against absent
            Operator::Eq => OperatorSignature::new("eq", 0, 1),
            Operator::And => OperatorSignature::new("and", 1, 1),
            Operator::Or => OperatorSignature::new("or", 1, 1),
            Operator::Not => OperatorSignature::new("not", 0, 0),
            Operator::Matches => OperatorSignature::new("matches", 1, 1),
            Operator::IsValidJson => OperatorSignature::new("isValidJson", 0, 0),
            Operator::IsNull => OperatorSignature::new("isNull", 0, 0),
            Operator::Age => OperatorSignature::new("age", 0, 0),
            Operator::Unit => OperatorSignature::new("unit", 1, 1),
            Operator::ToUnit => OperatorSignature::new("toUnit", 1, 1),
            Operator::Map => OperatorSignature::new("map", 1, 3),
            Operator::Group => OperatorSignature::new("group", 1, 1),
            Operator::Attr => OperatorSignature::new("attr", 1, 1),
            Operator::Value => OperatorSignature::new("value", 0, 0),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
