//! Dispatch overhead: baseline slot call vs. dispatcher pass-through vs. the
//! full instrumented path.

use std::hint::black_box;
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion};

use framehook::{CallbackParts, EvalFn, EvaluatorSlot, Frame, Registry, ThreadContext, Value};

fn noop_parts() -> CallbackParts {
    CallbackParts::new(
        Arc::new(|_| Ok(())),
        Arc::new(|_| Ok(())),
        Arc::new(|_, _, _| Ok(())),
    )
}

fn bench_dispatch(c: &mut Criterion) {
    let default_eval: EvalFn =
        Arc::new(|_ctx, frame, _throw| Ok(frame.peek_from_top(0).unwrap_or(Value::None)));
    let slot = EvaluatorSlot::new(Arc::clone(&default_eval));
    let registry = Registry::new(Arc::clone(&slot), default_eval);
    let ctx = ThreadContext::new();

    c.bench_function("slot_baseline", |b| {
        let frame = Frame::new("bench.src", vec![Value::Int(1)]);
        b.iter(|| slot.evaluate(&ctx, black_box(&frame), false))
    });

    registry
        .install(Some(noop_parts()))
        .expect("bench registration");
    registry.set_skip(["skipped.src".to_string()].into());

    c.bench_function("dispatcher_skip_passthrough", |b| {
        let frame = Frame::new("skipped.src", vec![Value::Int(1)]);
        b.iter(|| slot.evaluate(&ctx, black_box(&frame), false))
    });

    c.bench_function("instrumented", |b| {
        let frame = Frame::new("bench.src", vec![Value::Int(1)]);
        b.iter(|| slot.evaluate(&ctx, black_box(&frame), false))
    });

    registry.install(None).expect("bench teardown");
}

criterion_group!(benches, bench_dispatch);
criterion_main!(benches);
