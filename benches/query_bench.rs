use autotrends::record::{MANUFACTURER, MODEL_YEAR, REAL_WORLD_MPG, VEHICLE_TYPE};
use autotrends::{DatasetLoader, FieldMap, MemoryBackend, QueryEngine};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tempfile::TempDir;

const MAKERS: [&str; 8] = [
    "Ford", "Honda", "Toyota", "Kia", "BMW", "Tesla", "Mazda", "Hyundai",
];
const TYPES: [&str; 5] = ["Sedan", "Truck", "SUV", "Van", "Minivan"];

fn dataset(rng: &mut SmallRng, rows: usize) -> Vec<FieldMap> {
    (0..rows)
        .map(|_| {
            let mut row = FieldMap::new();
            row.insert(MANUFACTURER.to_string(), MAKERS[rng.gen_range(0..MAKERS.len())].to_string());
            row.insert(MODEL_YEAR.to_string(), rng.gen_range(1975..2024).to_string());
            row.insert(VEHICLE_TYPE.to_string(), TYPES[rng.gen_range(0..TYPES.len())].to_string());
            row.insert(REAL_WORLD_MPG.to_string(), format!("{:.1}", rng.gen_range(10.0..60.0)));
            row
        })
        .collect()
}

fn query_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("query");
    let mut rng = SmallRng::seed_from_u64(7);
    for rows in [250usize, 2000].iter() {
        let backend = MemoryBackend::new();
        DatasetLoader::new(backend.clone())
            .load(dataset(&mut rng, *rows))
            .expect("load");
        let query = QueryEngine::new(backend);

        group.bench_with_input(BenchmarkId::new("distinct_years", rows), rows, |b, _| {
            b.iter(|| query.distinct_years().expect("years"))
        });
        group.bench_with_input(BenchmarkId::new("records_for_year", rows), rows, |b, _| {
            b.iter(|| query.records_for_year("2001").expect("records"))
        });
    }
    group.finish();
}

fn load_bench(c: &mut Criterion) {
    let mut rng = SmallRng::seed_from_u64(11);
    let rows = dataset(&mut rng, 1000);
    let mut group = c.benchmark_group("load");
    group.bench_function("memory", |b| {
        let loader = DatasetLoader::new(MemoryBackend::new());
        b.iter(|| loader.load(rows.clone()).expect("load"))
    });
    group.bench_function("sled", |b| {
        let temp_dir = TempDir::new().expect("unable to create temporary working directory");
        let loader = DatasetLoader::new(
            autotrends::SledBackend::open(temp_dir.path()).expect("open sled"),
        );
        b.iter(|| loader.load(rows.clone()).expect("load"))
    });
    group.finish();
}

criterion_group!(benches, query_bench, load_bench);
criterion_main!(benches);
