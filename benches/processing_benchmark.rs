use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use weather_insights::analyzers::{group_aggregate, location_table, top_n, Direction, GroupKey, Grouping, TimeBucket};
use weather_insights::models::{Continent, Dataset, Measure};
use weather_insights::processors::{FilterEngine, FilterSpec, FilteredView};
use weather_insights::readers::ObservationReader;

const COUNTRIES: [&str; 8] = [
    "India",
    "Japan",
    "France",
    "Brazil",
    "Egypt",
    "Australia",
    "Canada",
    "Germany",
];

// Synthetic snapshot with `rows` observations spread over 8 countries and 30 days
fn create_snapshot_csv(rows: usize) -> String {
    let mut csv = String::from(
        "country,location_name,latitude,longitude,last_updated,temperature_celsius,humidity,wind_mph,precip_mm,air_quality_PM2.5,air_quality_PM10,air_quality_us-epa-index,condition_text\n",
    );

    for i in 0..rows {
        let country = COUNTRIES[i % COUNTRIES.len()];
        let day = 1 + (i % 30);
        csv.push_str(&format!(
            "{},Station {},{:.2},{:.2},{:02}-05-2024 {:02}:{:02},{:.1},{},{:.1},{:.1},{:.1},{:.1},{},{}\n",
            country,
            i % 500,
            -60.0 + (i % 120) as f64,
            -170.0 + (i % 340) as f64,
            day,
            i % 24,
            (i * 7) % 60,
            -5.0 + (i % 45) as f64 * 0.9,
            20 + i % 75,
            (i % 30) as f64 * 1.3,
            (i % 10) as f64 * 0.4,
            (i % 300) as f64 * 0.8,
            (i % 450) as f64,
            1 + i % 6,
            if i % 3 == 0 { "Sunny" } else { "Partly cloudy" },
        ));
    }

    csv
}

fn load_dataset(rows: usize) -> Dataset {
    ObservationReader::new()
        .read_from_reader(create_snapshot_csv(rows).as_bytes(), "bench.csv")
        .unwrap()
}

fn benchmark_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("load");

    for size in [1_000, 10_000].iter() {
        let csv = create_snapshot_csv(*size);
        group.bench_with_input(BenchmarkId::new("read_csv", size), &csv, |b, csv| {
            b.iter(|| {
                let dataset = ObservationReader::new()
                    .read_from_reader(black_box(csv.as_bytes()), "bench.csv")
                    .unwrap();
                black_box(dataset.len())
            })
        });
    }

    group.finish();
}

fn benchmark_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter");
    let dataset = load_dataset(10_000);
    let engine = FilterEngine::new(&dataset);

    let spec = FilterSpec::new()
        .with_continents([Continent::Asia, Continent::Europe])
        .with_range(Measure::Temperature, 10.0, 30.0)
        .with_max_aqi(4);

    group.bench_function("apply", |b| b.iter(|| black_box(engine.apply(black_box(&spec)).unwrap().len())));
    group.bench_function("options", |b| b.iter(|| black_box(engine.options(black_box(&spec)))));

    group.finish();
}

fn benchmark_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate");
    let dataset = load_dataset(10_000);
    let view = FilteredView::all(&dataset);
    let measures = [Measure::Temperature, Measure::Humidity, Measure::PrecipMm];

    group.bench_function("by_country", |b| {
        b.iter(|| black_box(group_aggregate(&view, Grouping::by(GroupKey::Country), &measures)))
    });
    group.bench_function("by_country_per_day", |b| {
        b.iter(|| {
            black_box(group_aggregate(
                &view,
                Grouping::bucketed(GroupKey::Country, TimeBucket::Day),
                &measures,
            ))
        })
    });
    group.bench_function("top_10", |b| {
        b.iter(|| black_box(top_n(&view, Measure::Temperature, 10, Direction::Largest).len()))
    });
    group.bench_function("location_table", |b| b.iter(|| black_box(location_table(&view, None).len())));

    group.finish();
}

criterion_group!(benches, benchmark_load, benchmark_filter, benchmark_aggregate);
criterion_main!(benches);
