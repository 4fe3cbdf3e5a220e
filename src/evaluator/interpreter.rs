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

//! Tree-walking interpreter

use std::sync::Arc;

use super::context::EvaluationContext;
use super::result::EvaluationResult;
use crate::ast::{BinaryOperator, ExpressionNode, LiteralValue, MethodCallData};
use crate::error::{MagmaError, Result};
use crate::model::{Entity, MagmaValue, Value, resolve};
use crate::registry::{CategoryTable, Operator, strict_equals};

/// Evaluate `node` in `context`
///
/// Missing data never fails: it flows through as an absent value. Errors
/// are reserved for malformed arguments, invalid paths and unsupported unit
/// conversions.
pub fn evaluate_node(
    node: &ExpressionNode,
    context: &EvaluationContext<'_>,
) -> Result<EvaluationResult> {
    match node {
        ExpressionNode::Literal(literal) => Ok(EvaluationResult::Raw(literal_value(literal))),

        ExpressionNode::Array(items) => {
            let values = items
                .iter()
                .map(|item| evaluate_node(item, context).map(EvaluationResult::into_value))
                .collect::<Result<Vec<_>>>()?;
            Ok(EvaluationResult::Raw(Value::List(values)))
        }

        ExpressionNode::Object(entries) => {
            let entity = entries
                .iter()
                .map(|(key, value)| {
                    evaluate_node(value, context).map(|v| (key.clone(), v.into_value()))
                })
                .collect::<Result<Entity>>()?;
            Ok(EvaluationResult::Raw(Value::Entity(Arc::new(entity))))
        }

        // a regex outside matches() stands for its pattern text
        ExpressionNode::Regex(regex) => Ok(EvaluationResult::Raw(Value::String(
            regex.source.clone(),
        ))),

        ExpressionNode::Accessor(path) => {
            let path = match evaluate_node(path, context)?.into_value() {
                Value::String(path) => path,
                other => {
                    return Err(MagmaError::invalid_argument(
                        "$",
                        format!("attribute path must be a string, got {}", other.type_name()),
                    ));
                }
            };
            Ok(EvaluationResult::Wrapped(resolve(context.entity, &path)?))
        }

        ExpressionNode::Variable(name) => match context.get_variable(name) {
            Some(value) => Ok(EvaluationResult::Wrapped(value.clone())),
            None => {
                log::trace!("unbound callback parameter '{name}' evaluates to absent");
                Ok(EvaluationResult::Wrapped(MagmaValue::Absent))
            }
        },

        ExpressionNode::Lambda(_) => Err(MagmaError::invalid_argument(
            Operator::Map.name(),
            "callbacks can only be passed to map()",
        )),

        ExpressionNode::BinaryOp(data) => {
            let left = evaluate_node(&data.left, context)?.into_value();
            let right = evaluate_node(&data.right, context)?.into_value();
            let equal = strict_equals(&left, &right);
            let result = match data.op {
                BinaryOperator::StrictEqual => equal,
                BinaryOperator::StrictNotEqual => !equal,
            };
            Ok(EvaluationResult::Raw(Value::Boolean(result)))
        }

        ExpressionNode::MethodCall(call) => {
            let receiver = evaluate_node(&call.base, context)?.into_wrapped();
            call_operator(call, receiver, context)
        }
    }
}

fn literal_value(literal: &LiteralValue) -> Value {
    match literal {
        LiteralValue::Null => Value::Null,
        LiteralValue::Boolean(b) => Value::Boolean(*b),
        LiteralValue::Number(n) => Value::Number(*n),
        LiteralValue::String(s) => Value::String(s.clone()),
    }
}

fn call_operator(
    call: &MethodCallData,
    receiver: MagmaValue,
    context: &EvaluationContext<'_>,
) -> Result<EvaluationResult> {
    let operator = call.operator;
    log::trace!("calling {operator}() on {:?} value", receiver.kind());

    let operand = |index: usize| -> Result<MagmaValue> {
        evaluate_node(argument(call, index)?, context).map(EvaluationResult::into_wrapped)
    };

    let result = match operator {
        Operator::Plus => receiver.plus(operand(0)?),
        Operator::Times => receiver.times(operand(0)?),
        Operator::Div => receiver.div(operand(0)?),
        Operator::Pow => receiver.pow(operand(0)?),
        Operator::Gt => receiver.gt(operand(0)?),
        Operator::Lt => receiver.lt(operand(0)?),
        Operator::Ge => receiver.ge(operand(0)?),
        Operator::Le => receiver.le(operand(0)?),
        Operator::Eq => match call.args.first() {
            Some(_) => receiver.eq(operand(0)?),
            None => receiver.eq(MagmaValue::Absent),
        },
        Operator::And => receiver.and(operand(0)?),
        Operator::Or => receiver.or(operand(0)?),
        Operator::Not => receiver.not(),
        Operator::Matches => match argument(call, 0)? {
            ExpressionNode::Regex(regex) => receiver.matches(&regex.regex),
            pattern => receiver.matches_pattern(&string_argument(operator, pattern, context)?)?,
        },
        Operator::IsValidJson => receiver.is_valid_json(),
        Operator::IsNull => receiver.is_null(),
        Operator::Age => receiver.age_at(context.now),
        Operator::Unit => receiver.unit(&string_argument(operator, argument(call, 0)?, context)?),
        Operator::ToUnit => receiver.to_unit_with(
            &string_argument(operator, argument(call, 0)?, context)?,
            context.units,
        )?,
        Operator::Map => match argument(call, 0)? {
            ExpressionNode::Lambda(lambda) => receiver.try_map(|item| {
                let scope = context.with_variable(lambda.param.as_str(), item);
                evaluate_node(&lambda.body, &scope).map(EvaluationResult::into_wrapped)
            })?,
            table => {
                let table = category_table(table, context)?;
                let default = optional_value(call, 1, context)?;
                let null_value = optional_value(call, 2, context)?;
                receiver.map_table(&table, default, null_value)
            }
        },
        Operator::Group => receiver.group(&thresholds(argument(call, 0)?, context)?),
        Operator::Attr => receiver.attr(&string_argument(operator, argument(call, 0)?, context)?)?,
        Operator::Value => return Ok(EvaluationResult::Raw(receiver.value())),
    };

    Ok(EvaluationResult::Wrapped(result))
}

fn argument(call: &MethodCallData, index: usize) -> Result<&ExpressionNode> {
    call.args.get(index).ok_or_else(|| {
        MagmaError::invalid_argument(
            call.operator.name(),
            format!("missing argument {}", index + 1),
        )
    })
}

fn string_argument(
    operator: Operator,
    node: &ExpressionNode,
    context: &EvaluationContext<'_>,
) -> Result<String> {
    match evaluate_node(node, context)?.into_value() {
        Value::String(s) => Ok(s),
        other => Err(MagmaError::invalid_argument(
            operator.name(),
            format!("expected a string, got {}", other.type_name()),
        )),
    }
}

fn optional_value(
    call: &MethodCallData,
    index: usize,
    context: &EvaluationContext<'_>,
) -> Result<Option<Value>> {
    call.args
        .get(index)
        .map(|node| evaluate_node(node, context).map(EvaluationResult::into_value))
        .transpose()
}

fn category_table(node: &ExpressionNode, context: &EvaluationContext<'_>) -> Result<CategoryTable> {
    match evaluate_node(node, context)?.into_value() {
        Value::Entity(entity) => Ok(entity.attributes().clone()),
        other => Err(MagmaError::invalid_argument(
            Operator::Map.name(),
            format!("expected a mapping object or a callback, got {}", other.type_name()),
        )),
    }
}

fn thresholds(node: &ExpressionNode, context: &EvaluationContext<'_>) -> Result<Vec<f64>> {
    let invalid = |found: &str| {
        MagmaError::invalid_argument(
            Operator::Group.name(),
            format!("expected a list of numbers, got {found}"),
        )
    };
    match evaluate_node(node, context)?.into_value() {
        Value::List(items) => items
            .iter()
            .map(|item| item.as_number().ok_or_else(|| invalid(item.type_name())))
            .collect(),
        other => Err(invalid(other.type_name())),
    }
}
