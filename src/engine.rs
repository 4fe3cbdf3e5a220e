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

//! Expression engine - the main entry point for compiling and evaluating expressions

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Local};

use crate::ast::ExpressionNode;
use crate::error::Result;
use crate::evaluator::{EvaluationContext, EvaluationResult, evaluate_node};
use crate::model::{DEFAULT_IDENTITY_ATTRIBUTE, Entity, UnitTable};
use crate::parser::parse_with_context;

/// Settings shared by every expression an engine compiles
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Conversion rules consulted by `toUnit()`
    pub units: UnitTable,

    /// Attribute that carries an entity's identity when loading JSON
    pub identity_attribute: String,

    /// Fixed evaluation instant for `age()`; `None` uses the wall clock
    pub now: Option<DateTime<FixedOffset>>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            units: UnitTable::builtin(),
            identity_attribute: DEFAULT_IDENTITY_ATTRIBUTE.to_string(),
            now: None,
        }
    }
}

impl EngineConfig {
    /// Replace the unit table
    pub fn with_units(mut self, units: UnitTable) -> Self {
        self.units = units;
        self
    }

    /// Pin the evaluation instant
    pub fn with_now(mut self, now: DateTime<FixedOffset>) -> Self {
        self.now = Some(now);
        self
    }

    /// Change the identity attribute used by [`MagmaEngine::evaluate_json`]
    pub fn with_identity_attribute(mut self, name: impl Into<String>) -> Self {
        self.identity_attribute = name.into();
        self
    }

    fn instant(&self) -> DateTime<FixedOffset> {
        self.now.unwrap_or_else(|| Local::now().fixed_offset())
    }
}

/// Main engine for parsing and evaluating expressions
///
/// Cloning is cheap; clones share one configuration.
#[derive(Debug, Clone, Default)]
pub struct MagmaEngine {
    config: Arc<EngineConfig>,
}

impl MagmaEngine {
    /// Create an engine with the builtin unit table
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with a custom configuration
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// The engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Parse and validate an expression for repeated evaluation
    pub fn compile(&self, expression: &str) -> Result<CompiledExpression> {
        let ast = parse_with_context(expression)?;
        log::debug!(
            "compiled expression of {} nodes: {expression}",
            ast.node_count()
        );
        Ok(CompiledExpression {
            source: expression.to_string(),
            ast,
            config: Arc::clone(&self.config),
        })
    }

    /// Compile and evaluate an expression against one entity
    pub fn evaluate(&self, expression: &str, entity: &Entity) -> Result<EvaluationResult> {
        self.compile(expression)?.evaluate(entity)
    }

    /// Compile and evaluate an expression at a fixed instant
    pub fn evaluate_at(
        &self,
        expression: &str,
        entity: &Entity,
        now: DateTime<FixedOffset>,
    ) -> Result<EvaluationResult> {
        self.compile(expression)?.evaluate_at(entity, now)
    }

    /// Evaluate against an entity given as a JSON object
    pub fn evaluate_json(
        &self,
        expression: &str,
        json: &serde_json::Value,
    ) -> Result<EvaluationResult> {
        let compiled = self.compile(expression)?;
        let entity = Entity::from_json(json, &self.config.identity_attribute)?;
        compiled.evaluate(&entity)
    }
}

/// A parsed expression bound to its engine configuration
///
/// Holds no per-evaluation state, so one compiled expression can be shared
/// across threads and evaluated against many entities.
#[derive(Debug, Clone)]
pub struct CompiledExpression {
    source: String,
    ast: ExpressionNode,
    config: Arc<EngineConfig>,
}

impl CompiledExpression {
    /// The expression text this was compiled from
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The parsed tree
    pub fn ast(&self) -> &ExpressionNode {
        &self.ast
    }

    /// Evaluate against `entity` at the configured instant
    pub fn evaluate(&self, entity: &Entity) -> Result<EvaluationResult> {
        self.evaluate_at(entity, self.config.instant())
    }

    /// Evaluate against `entity` at `now`
    pub fn evaluate_at(
        &self,
        entity: &Entity,
        now: DateTime<FixedOffset>,
    ) -> Result<EvaluationResult> {
        let context = EvaluationContext::new(entity, &self.config.units, now);
        evaluate_node(&self.ast, &context).inspect_err(|err| {
            log::debug!("evaluation of '{}' failed: {err}", self.source);
        })
    }
}
