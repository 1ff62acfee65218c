// Copyright 2025 Cowboy AI, LLC.

use async_trait::async_trait;
use cim_result::{
    Behavior, DispatchContext, Error, Mediator, MediatorConfig, Next, Outcome, OutcomeExt,
    Request, RequestHandler, Validator,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tokio::runtime::Runtime;

struct Increment(u64);

impl Request for Increment {
    type Output = u64;
}

struct IncrementHandler;

#[async_trait]
impl RequestHandler<Increment> for IncrementHandler {
    async fn handle(&self, request: Increment, _ctx: &DispatchContext) -> Outcome<u64> {
        Ok(request.0 + 1)
    }
}

struct PassThrough;

#[async_trait]
impl Behavior<Increment> for PassThrough {
    async fn handle(
        &self,
        request: Increment,
        _ctx: &DispatchContext,
        next: Next<'_, Increment>,
    ) -> Outcome<u64> {
        next.run(request).await
    }
}

fn setup_runtime() -> Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

fn mediator_with(behaviors: usize, cache_plans: bool) -> Mediator {
    let config = MediatorConfig {
        trace_dispatch: false,
        cache_plans,
        ..MediatorConfig::default()
    };
    let mut builder = Mediator::builder().handler(IncrementHandler).config(config);
    for _ in 0..behaviors {
        builder = builder.behavior(PassThrough);
    }
    builder.build().unwrap()
}

fn benchmark_dispatch_depth(c: &mut Criterion) {
    let rt = setup_runtime();
    let mut group = c.benchmark_group("dispatch_depth");

    for behaviors in [0, 1, 4, 16] {
        let mediator = mediator_with(behaviors, true);
        group.bench_with_input(BenchmarkId::from_parameter(behaviors), &behaviors, |b, _| {
            b.iter(|| rt.block_on(mediator.send(black_box(Increment(1)))).unwrap())
        });
    }

    group.finish();
}

fn benchmark_plan_cache(c: &mut Criterion) {
    let rt = setup_runtime();
    let mut group = c.benchmark_group("plan_cache");

    for cache_plans in [true, false] {
        let mediator = mediator_with(4, cache_plans);
        group.bench_with_input(
            BenchmarkId::from_parameter(cache_plans),
            &cache_plans,
            |b, _| b.iter(|| rt.block_on(mediator.send(black_box(Increment(1)))).unwrap()),
        );
    }

    group.finish();
}

fn benchmark_validation_chain(c: &mut Criterion) {
    c.bench_function("validation_chain_8_rules", |b| {
        b.iter(|| {
            let mut validator = Validator::new(Ok::<_, Error>(black_box(42u64)));
            for limit in 0..8u64 {
                validator = validator.rule(move |v: &u64| *v > limit, "below limit");
            }
            validator.validate().discard()
        })
    });
}

criterion_group!(
    benches,
    benchmark_dispatch_depth,
    benchmark_plan_cache,
    benchmark_validation_chain
);
criterion_main!(benches);
