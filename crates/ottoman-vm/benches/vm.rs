use criterion::{Criterion, black_box, criterion_group, criterion_main};
use ottoman_vm::{LuaRuntime, Runtime, RuntimeConfig};
use serde_json::{Value, json};

fn bench_call(c: &mut Criterion) {
    let rt = LuaRuntime::create(&RuntimeConfig::default()).unwrap();
    rt.register("emit", |_| Ok(Value::Null)).unwrap();
    let map = rt
        .compile("map", "emit(doc.category, doc.amount)", &["doc"])
        .unwrap();
    let docs: Vec<Value> = (0..1_000)
        .map(|i| json!({"_id": format!("d{i}"), "category": i % 7, "amount": i}))
        .collect();

    c.bench_function("map_1k_docs", |b| {
        b.iter(|| {
            for doc in &docs {
                black_box(rt.call(&map, std::slice::from_ref(doc)).unwrap());
            }
        })
    });
}

fn bench_compile(c: &mut Criterion) {
    let rt = LuaRuntime::create(&RuntimeConfig::default()).unwrap();
    c.bench_function("compile_block", |b| {
        b.iter(|| {
            black_box(
                rt.compile(
                    "map",
                    "if doc.type == 'post' then emit(doc.author, 1) end",
                    &["doc"],
                )
                .unwrap(),
            )
        })
    });
}

criterion_group!(benches, bench_call, bench_compile);
criterion_main!(benches);
