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

//! Tokenizer, parser and evaluation throughput

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use magma_script::parser::{parse, tokenizer::Tokenizer};
use magma_script::{Entity, MagmaEngine, Value};
use std::hint::black_box;

/// Expressions of increasing complexity
const TEST_EXPRESSIONS: &[(&str, &str)] = &[
    ("simple", "$('height').value()"),
    ("chain", "$('height').unit('cm').toUnit('m').times(2).gt(3).value()"),
    ("binning", "$('dob').age().group([18, 35, 50, 75]).value()"),
    ("table", "$('gender').map({ m: 'Male', f: 'Female' }, 'Other', 'Unknown').value()"),
    ("callback", "$('items').map(item => item.attr('score').times(10)).value()"),
];

fn sample_entity(items: usize) -> Entity {
    let list = (0..items)
        .map(|i| {
            Value::from(
                Entity::new()
                    .with_identity(i as i64)
                    .with_attribute("score", i as i64),
            )
        })
        .collect::<Vec<_>>();

    Entity::new()
        .with_attribute("height", 180)
        .with_attribute("dob", "1984-07-21")
        .with_attribute("gender", Entity::new().with_identity("f"))
        .with_attribute("items", Value::List(list))
}

fn benchmark_tokenizer(c: &mut Criterion) {
    let mut group = c.benchmark_group("tokenizer");
    for (name, expression) in TEST_EXPRESSIONS {
        group.throughput(Throughput::Bytes(expression.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), expression, |b, expr| {
            b.iter(|| {
                let mut tokenizer = Tokenizer::new(black_box(expr));
                let mut token_count = 0;
                while let Ok(Some(_)) = tokenizer.next_token() {
                    token_count += 1;
                }
                black_box(token_count)
            })
        });
    }
    group.finish();
}

fn benchmark_parser(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser");
    for (name, expression) in TEST_EXPRESSIONS {
        group.bench_with_input(BenchmarkId::from_parameter(name), expression, |b, expr| {
            b.iter(|| black_box(parse(black_box(expr))))
        });
    }
    group.finish();
}

fn benchmark_evaluation(c: &mut Criterion) {
    let engine = MagmaEngine::new();
    let entity = sample_entity(16);

    let mut group = c.benchmark_group("evaluate");
    for (name, expression) in TEST_EXPRESSIONS {
        let compiled = engine.compile(expression).expect("benchmark expression compiles");
        group.bench_with_input(BenchmarkId::new("compiled", name), &compiled, |b, compiled| {
            b.iter(|| black_box(compiled.evaluate(black_box(&entity))))
        });
        group.bench_with_input(BenchmarkId::new("one_shot", name), expression, |b, expr| {
            b.iter(|| black_box(engine.evaluate(black_box(expr), &entity)))
        });
    }
    group.finish();
}

fn benchmark_map_callback_scaling(c: &mut Criterion) {
    let engine = MagmaEngine::new();
    let compiled = engine
        .compile("$('items').map(item => item.attr('score').times(10)).value()")
        .expect("benchmark expression compiles");

    let mut group = c.benchmark_group("map_callback");
    for size in [10, 100, 1000] {
        let entity = sample_entity(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &entity, |b, entity| {
            b.iter(|| black_box(compiled.evaluate(entity)))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    benchmark_tokenizer,
    benchmark_parser,
    benchmark_evaluation,
    benchmark_map_callback_scaling
);
criterion_main!(benches);
