use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use stepseq::{Event, EventStore, NoteEvent, TimeUnit};

fn note(pitch: u8) -> Event {
    Event::Note(NoteEvent::new(pitch, 100, TimeUnit::beats(1)))
}

/// Benchmark ordered insertion (the piano-roll edit path)
fn bench_store_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("store_insert");

    for size in [256u64, 1024, 4096] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| {
                let mut store = EventStore::new();
                for i in 0..size {
                    store.add(
                        (i % 16) as u8,
                        TimeUnit::from_units(i * 64),
                        note((i % 128) as u8),
                    );
                }
                black_box(store.len())
            });
        });
    }
    group.finish();
}

/// Benchmark range scans (the playback materialization path)
fn bench_store_range_scan(c: &mut Criterion) {
    let mut store = EventStore::new();
    for i in 0..4096u64 {
        store.add((i % 16) as u8, TimeUnit::from_units(i * 16), note((i % 128) as u8));
    }

    c.bench_function("store_range_scan", |b| {
        b.iter(|| {
            let start = TimeUnit::from_units(8_192);
            let stop = TimeUnit::from_units(40_960);
            black_box(store.iterate(Some(start), Some(stop)).count())
        });
    });
}

criterion_group!(benches, bench_store_insert, bench_store_range_scan);
criterion_main!(benches);
