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

//! End-to-end evaluation of expressions against entity records

use chrono::{DateTime, FixedOffset, TimeZone};
use magma_script::{
    EngineConfig, Entity, EvaluationResult, MagmaEngine, MagmaError, MagmaValue, Value,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn now() -> DateTime<FixedOffset> {
    FixedOffset::east_opt(0)
        .unwrap()
        .with_ymd_and_hms(2024, 3, 1, 8, 0, 0)
        .unwrap()
}

fn engine() -> MagmaEngine {
    MagmaEngine::with_config(EngineConfig::default().with_now(now()))
}

fn eval(expression: &str, entity: &Entity) -> Value {
    engine()
        .evaluate(expression, entity)
        .unwrap_or_else(|e| panic!("{expression}: {e}"))
        .into_value()
}

fn cookie(id: i32, name: &str) -> Entity {
    Entity::new()
        .with_identity(id)
        .with_attribute("_idValue", id)
        .with_attribute("name", name)
}

fn cookies() -> Entity {
    Entity::new()
        .with_attribute("cookie", cookie(1, "Chocolate chip"))
        .with_attribute(
            "cookies",
            Value::List(vec![
                cookie(1, "Chocolate chip").into(),
                cookie(2, "Strawberry").into(),
                cookie(3, "Banana").into(),
            ]),
        )
}

fn record() -> Entity {
    Entity::new()
        .with_attribute("a", 3)
        .with_attribute("b", 2)
        .with_attribute("height", 180)
        .with_attribute("myProp", Value::Null)
        .with_attribute("name", "abcdef")
        .with_attribute("json", r#"{"x": [1, 2]}"#)
        .with_attribute("notJson", "{x: 1")
        .with_attribute("dob", "2006-03-01")
        .with_attribute("yes", true)
        .with_attribute("no", false)
        .with_attribute("gender", Entity::new().with_identity("m"))
}

#[rstest]
#[case("$('a').plus($('b')).value()", Value::Number(5.0))]
#[case("$('a').plus(10).value()", Value::Number(13.0))]
#[case("$('a').times($('b')).value()", Value::Number(6.0))]
#[case("$('a').div($('b')).value()", Value::Number(1.5))]
#[case("$('a').pow(3).value()", Value::Number(27.0))]
#[case("$('myProp').plus(1).value()", Value::Null)]
#[case("$('myProp').div(2).value()", Value::Null)]
fn test_arithmetic(#[case] expression: &str, #[case] expected: Value) {
    assert_eq!(eval(expression, &record()), expected);
}

#[test]
fn test_large_power_stays_finite() {
    let result = eval("$('height').pow(100).value()", &record());
    let expected = 180f64.powi(100);
    let actual = result.as_number().unwrap();
    assert!(((actual - expected) / expected).abs() < 1e-9);
}

#[rstest]
#[case("$('height').gt(100).value()", true)]
#[case("$('height').lt(100).value()", false)]
#[case("$('height').ge(180).value()", true)]
#[case("$('height').le(179).value()", false)]
#[case("$('myProp').gt(1).value()", false)]
#[case("$('myProp').lt(1).value()", false)]
#[case("$('myProp').ge(1).value()", false)]
#[case("$('myProp').le(1).value()", false)]
#[case("$('myProp').eq(3).value()", false)]
#[case("$('myProp').eq().value()", false)]
#[case("$('name').eq('abcdef').value()", true)]
#[case("$('name').eq('b').value()", false)]
#[case("$('gender').eq('m').value()", true)]
fn test_comparison(#[case] expression: &str, #[case] expected: bool) {
    assert_eq!(eval(expression, &record()), Value::Boolean(expected));
}

#[rstest]
#[case("$('yes').and($('yes')).value()", Value::Boolean(true))]
#[case("$('yes').and($('no')).value()", Value::Boolean(false))]
#[case("$('no').or($('yes')).value()", Value::Boolean(true))]
#[case("$('no').or($('no')).value()", Value::Boolean(false))]
#[case("$('myProp').or($('yes')).value()", Value::Boolean(true))]
#[case("$('yes').not().value()", Value::Boolean(false))]
#[case("$('no').not().value()", Value::Boolean(true))]
#[case("$('myProp').not().value()", Value::Null)]
fn test_logic(#[case] expression: &str, #[case] expected: Value) {
    assert_eq!(eval(expression, &record()), expected);
}

#[rstest]
#[case("$('name').matches(/abc/).value()", true)]
#[case("$('name').matches(/efg/).value()", false)]
#[case("$('name').matches(/ABC/i).value()", true)]
#[case("$('name').matches('^abc').value()", true)]
#[case("$('myProp').matches(/abc/).value()", false)]
#[case("$('json').isValidJson().value()", true)]
#[case("$('notJson').isValidJson().value()", false)]
#[case("$('myProp').isValidJson().value()", false)]
#[case("$('myProp').isNull().value()", true)]
#[case("$('missing').isNull().value()", true)]
#[case("$('name').isNull().value()", false)]
fn test_string_and_presence(#[case] expression: &str, #[case] expected: bool) {
    assert_eq!(eval(expression, &record()), Value::Boolean(expected));
}

#[test]
fn test_age_and_group() {
    let entity = record();
    assert_eq!(eval("$('dob').age().value()", &entity), Value::Number(18.0));
    assert_eq!(eval("$('myProp').age().value()", &entity), Value::Null);
    assert_eq!(
        eval("$('dob').age().group([18, 35, 50, 75]).value()", &entity),
        Value::from("18-35")
    );
    assert_eq!(
        eval("$('height').group([18, 35, 50, 75]).value()", &entity),
        Value::from("75+")
    );
}

#[test]
fn test_age_defaults_to_wall_clock() {
    let entity = Entity::new().with_attribute("dob", "1900-01-01");
    let age = MagmaEngine::new()
        .evaluate("$('dob').age().value()", &entity)
        .unwrap()
        .into_value();
    assert!(age.as_number().unwrap() >= 124.0);
}

#[rstest]
#[case("$('a').map({1: 2, 3: 4}, 0, 5).value()", Value::Number(4.0))]
#[case("$('b').map({1: 2, 3: 4}, 0, 5).value()", Value::Number(0.0))]
#[case("$('myProp').map({1: 2, 3: 4}, 0, 5).value()", Value::Number(5.0))]
#[case("$('b').map({1: 2, 3: 4}).value()", Value::Null)]
#[case("$('gender').map({m: 'Male', f: 'Female'}).value()", Value::from("Male"))]
fn test_categorical_map(#[case] expression: &str, #[case] expected: Value) {
    assert_eq!(eval(expression, &record()), expected);
}

#[test]
fn test_unit_conversion() {
    let entity = record();
    assert_eq!(
        eval("$('height').unit('cm').toUnit('m').value()", &entity),
        Value::Number(1.8)
    );
    let back = eval("$('height').unit('cm').toUnit('m').toUnit('cm').value()", &entity);
    assert!((back.as_number().unwrap() - 180.0).abs() < 1e-9);
    assert_eq!(
        eval("$('myProp').unit('cm').toUnit('m').value()", &entity),
        Value::Null
    );
}

#[test]
fn test_entity_identity() {
    let entity = cookies();
    assert_eq!(eval("$('cookie').value()", &entity), Value::Number(1.0));
    assert_eq!(
        eval("$('cookie').value() === 1", &entity),
        Value::Boolean(true)
    );
    assert_eq!(
        eval("$('cookie.name').value()", &entity),
        Value::from("Chocolate chip")
    );
    assert_eq!(
        eval("$('cookie').attr('name').value()", &entity),
        Value::from("Chocolate chip")
    );
    assert_eq!(eval("$('cookie.missing.deeper').value()", &entity), Value::Null);
}

#[rstest]
#[case("$('cookies').map(cookie => cookie.value()).value()")]
#[case("$('cookies').map((cookie) => { return cookie.value(); }).value()")]
#[case("$('cookies').map(function (cookie) { return cookie.value(); }).value()")]
fn test_map_callback_forms(#[case] expression: &str) {
    assert_eq!(
        eval(expression, &cookies()),
        Value::List(vec![Value::from(1), Value::from(2), Value::from(3)])
    );
}

#[test]
fn test_map_callback_attributes() {
    assert_eq!(
        eval("$('cookies').map(c => c.attr('name')).value()", &cookies()),
        Value::List(vec![
            Value::from("Chocolate chip"),
            Value::from("Strawberry"),
            Value::from("Banana")
        ])
    );
    assert_eq!(
        eval("$('cookie').map(c => c.value()).value()", &cookies()),
        Value::Null
    );
}

#[test]
fn test_raw_and_wrapped_results() {
    let result = engine().evaluate("$('height').plus(100)", &record()).unwrap();
    assert!(!result.is_raw());
    assert_eq!(result.as_wrapped(), Some(&MagmaValue::wrap(280)));

    let result = engine()
        .evaluate("$('name').value() === 'abcdef'", &record())
        .unwrap();
    assert_eq!(result, EvaluationResult::Raw(Value::Boolean(true)));
    assert_eq!(result.as_raw(), Some(&Value::Boolean(true)));
    assert_eq!(result.as_wrapped(), None);
}

#[test]
fn test_evaluate_json() {
    let record = serde_json::json!({
        "height": 180,
        "cookie": { "_idValue": 7, "name": "Oat" }
    });
    let engine = engine();
    assert_eq!(
        engine
            .evaluate_json("$('cookie').value()", &record)
            .unwrap()
            .to_json(),
        serde_json::json!(7)
    );
    assert_eq!(
        engine
            .evaluate_json("$('height').unit('cm').toUnit('m').value()", &record)
            .unwrap()
            .to_json(),
        serde_json::json!(1.8)
    );
}

#[test]
fn test_structural_errors() {
    let entity = record();
    let engine = engine();

    assert!(matches!(
        engine.evaluate("$('a').bogus()", &entity),
        Err(MagmaError::UnknownOperator { name, .. }) if name == "bogus"
    ));

    match engine.evaluate("$('a').plus(1", &entity) {
        Err(MagmaError::ExpressionSyntax { snippet, .. }) => {
            assert!(snippet.contains("plus(1"));
        }
        other => panic!("expected a syntax error, got {other:?}"),
    }

    assert!(matches!(
        engine.evaluate("$('a').toUnit('m')", &entity),
        Err(MagmaError::UnsupportedConversion { .. })
    ));
    assert!(matches!(
        engine.evaluate("$('height').unit('cm').toUnit('kg')", &entity),
        Err(MagmaError::UnsupportedConversion { from, to }) if from == "cm" && to == "kg"
    ));
    assert!(matches!(
        engine.evaluate("$('')", &entity),
        Err(MagmaError::InvalidPath { .. })
    ));
    assert!(matches!(
        engine.evaluate("$('a..b')", &entity),
        Err(MagmaError::InvalidPath { .. })
    ));
}

#[test]
fn test_concurrent_evaluation_of_one_compiled_expression() {
    let compiled = engine()
        .compile("$('n').times(2).gt(10).value()")
        .unwrap();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|n| {
                let compiled = &compiled;
                scope.spawn(move || {
                    let entity = Entity::new().with_attribute("n", n);
                    compiled.evaluate(&entity).unwrap().into_value()
                })
            })
            .collect();

        for (n, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.join().unwrap(), Value::Boolean(n * 2 > 10));
        }
    });
}

#[test]
fn test_convenience_evaluate() {
    let entity = Entity::new().with_attribute("height", 180);
    assert_eq!(
        magma_script::evaluate("$('height').gt(100).value()", &entity)
            .unwrap()
            .into_value(),
        Value::Boolean(true)
    );
}

#[test]
fn test_long_chains_fail_cleanly() {
    let entity = Entity::new().with_attribute("a", true);
    let engine = MagmaEngine::new();

    let too_long = format!("$('a'){}", ".not()".repeat(3_000));
    assert!(matches!(
        engine.evaluate(&too_long, &entity),
        Err(MagmaError::ExpressionSyntax { .. })
    ));

    let allowed = format!("$('a'){}.value()", ".not()".repeat(100));
    assert_eq!(
        engine.evaluate(&allowed, &entity).unwrap().into_value(),
        Value::Boolean(true)
    );
}
