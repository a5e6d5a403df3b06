use banish::crypto::hash::sha1_digest;
use banish::{Signature, SignatureStore, SqliteRegistry};
use criterion::{criterion_group, criterion_main, Criterion};

fn make_signatures(n: usize) -> Vec<Signature> {
    (0..n)
        .map(|i| {
            let content = format!("file-{i}");
            Signature::new(sha1_digest(content.as_bytes()), content.len() as u64)
        })
        .collect()
}

fn bench_put(c: &mut Criterion) {
    let sigs = make_signatures(1000);
    c.bench_function("registry_put_1000", |b| {
        b.iter(|| {
            let mut db = SqliteRegistry::in_memory().unwrap();
            for sig in &sigs {
                db.put(sig).unwrap();
            }
        })
    });
}

fn bench_put_all(c: &mut Criterion) {
    let sigs = make_signatures(1000);
    c.bench_function("registry_put_all_1000", |b| {
        b.iter(|| {
            let mut db = SqliteRegistry::in_memory().unwrap();
            db.put_all(&sigs).unwrap();
        })
    });
}

fn bench_contains(c: &mut Criterion) {
    let sigs = make_signatures(10_000);
    let mut db = SqliteRegistry::in_memory().unwrap();
    db.put_all(&sigs).unwrap();
    let probe = sigs[5_000];
    c.bench_function("registry_contains_10k", |b| {
        b.iter(|| db.contains(&probe).unwrap())
    });
}

fn bench_list_all(c: &mut Criterion) {
    let sigs = make_signatures(10_000);
    let mut db = SqliteRegistry::in_memory().unwrap();
    db.put_all(&sigs).unwrap();
    c.bench_function("registry_list_all_10k", |b| b.iter(|| db.list_all().unwrap()));
}

criterion_group!(benches, bench_put, bench_put_all, bench_contains, bench_list_all);
criterion_main!(benches);
