// Matcher and backend benchmarks
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use debounced_search::models::{Dataset, Person};
use debounced_search::search::{InMemoryBackend, SearchBackend};
use std::time::Duration;
use tokio::runtime::Runtime;

const FIRST_NAMES: [&str; 8] = [
    "Tarek", "Omar", "Ammar", "Nisreen", "Aya", "Ada", "Alan", "Grace",
];
const LAST_NAMES: [&str; 4] = ["Hendi", "Lovelace", "Turing", "Hopper"];

fn synthetic_dataset(size: usize) -> Dataset {
    (0..size)
        .map(|i| {
            Person::new(
                format!("{}{}", FIRST_NAMES[i % FIRST_NAMES.len()], i),
                LAST_NAMES[i % LAST_NAMES.len()],
            )
        })
        .collect()
}

fn person_matches(c: &mut Criterion) {
    let person = Person::new("Nisreen", "Hendi");
    let mut group = c.benchmark_group("person_matches");

    for query in ["n", "Hendi", "nisreen hendi", "NH", "xyz"] {
        group.bench_with_input(BenchmarkId::from_parameter(query), query, |b, query| {
            b.iter(|| person.matches(black_box(query)));
        });
    }
    group.finish();
}

fn dataset_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dataset_filter");

    for size in [100usize, 1_000, 10_000] {
        let dataset = synthetic_dataset(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &dataset, |b, dataset| {
            b.iter(|| dataset.filter(|person| person.matches(black_box("ada"))));
        });
    }
    group.finish();
}

fn in_memory_backend(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let backend = InMemoryBackend::new(Duration::ZERO);
    let dataset = synthetic_dataset(1_000);

    c.bench_function("in_memory_backend_search_1000", |b| {
        b.to_async(&rt)
            .iter(|| async { backend.search(&dataset, black_box("lovelace")).await });
    });
}

criterion_group!(benches, person_matches, dataset_filter, in_memory_backend);
criterion_main!(benches);
