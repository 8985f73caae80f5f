//! Benchmarks for bcl_faults hot paths
//!
//! Covers construction, hierarchy matching, log formatting, record
//! persistence and the fault journal.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use bcl_faults::{
    Fault, FaultBuilder, FaultJournal, FaultKind, FaultRecord, KindSet, LocalDataStoreManager,
    ResultExt,
};

fn sample_chain(depth: usize) -> Fault {
    let mut fault = Fault::new(FaultKind::DllNotFound);
    for _ in 0..depth {
        fault = Fault::with_cause(FaultKind::TypeInitialization, "Loader failed.", fault);
    }
    fault
}

// ============================================================================
// CONSTRUCTION
// ============================================================================

fn bench_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("construction");

    group.bench_function("default_message", |b| {
        b.iter(|| Fault::new(black_box(FaultKind::Timeout)))
    });

    group.bench_function("static_message", |b| {
        b.iter(|| Fault::with_message(black_box(FaultKind::Format), "Unexpected token."))
    });

    group.bench_function("formatted_message", |b| {
        b.iter(|| {
            Fault::with_message(
                FaultKind::Format,
                format!("Unexpected token at {}", black_box(42)),
            )
        })
    });

    group.bench_function("param_interpolation", |b| {
        b.iter(|| Fault::argument_null(black_box("texture")))
    });

    group.bench_function("builder_full", |b| {
        b.iter(|| {
            FaultBuilder::new(FaultKind::ArgumentOutOfRange)
                .message("Index must be less than the count.")
                .param("index")
                .cause(Fault::new(FaultKind::Overflow))
                .build()
        })
    });

    group.finish();
}

// ============================================================================
// HIERARCHY
// ============================================================================

fn bench_hierarchy(c: &mut Criterion) {
    let mut group = c.benchmark_group("hierarchy");
    let handlers = KindSet::catching(FaultKind::MemberAccess);

    group.bench_function("is_a_deepest", |b| {
        b.iter(|| black_box(FaultKind::MissingField).is_a(black_box(FaultKind::Exception)))
    });

    group.bench_function("kind_set_contains", |b| {
        b.iter(|| handlers.contains(black_box(FaultKind::MissingMethod)))
    });

    group.bench_function("catching_build", |b| {
        b.iter(|| KindSet::catching(black_box(FaultKind::System)))
    });

    group.bench_function("result_catch", |b| {
        b.iter(|| {
            let result: bcl_faults::Result<u32> = Err(Fault::new(FaultKind::DivideByZero));
            result.catch(FaultKind::Arithmetic, |_| Ok(0))
        })
    });

    group.finish();
}

// ============================================================================
// LOGGING AND RECORDS
// ============================================================================

fn bench_logging(c: &mut Criterion) {
    let mut group = c.benchmark_group("logging");

    for depth in [0usize, 4, 16] {
        let fault = sample_chain(depth);
        group.bench_with_input(BenchmarkId::new("write_to", depth), &fault, |b, fault| {
            let mut buffer = String::with_capacity(1024);
            b.iter(|| {
                buffer.clear();
                fault.log().write_to(&mut buffer).unwrap();
                black_box(buffer.len())
            })
        });
    }

    let long = Fault::with_message(FaultKind::Format, "x".repeat(8192));
    group.bench_function("write_to_truncated", |b| {
        let mut buffer = String::with_capacity(2048);
        b.iter(|| {
            buffer.clear();
            long.log().write_to(&mut buffer).unwrap();
        })
    });

    group.finish();
}

fn bench_records(c: &mut Criterion) {
    let mut group = c.benchmark_group("records");
    let fault = sample_chain(4);
    let records = fault.to_records();
    let lines: Vec<String> = records.iter().map(ToString::to_string).collect();

    group.bench_function("flatten", |b| b.iter(|| black_box(&fault).to_records()));
    group.bench_function("rebuild", |b| {
        b.iter(|| Fault::from_records(black_box(&records)))
    });
    group.bench_function("parse_lines", |b| {
        b.iter(|| {
            lines
                .iter()
                .map(|line| FaultRecord::parse_line(line))
                .collect::<bcl_faults::Result<Vec<_>>>()
        })
    });

    group.finish();
}

// ============================================================================
// JOURNAL AND SLOTS
// ============================================================================

fn bench_journal(c: &mut Criterion) {
    let mut group = c.benchmark_group("journal");

    for capacity in [100usize, 1000, 10_000] {
        let journal = FaultJournal::new(capacity, 1024);
        let fault = sample_chain(2);
        group.bench_with_input(BenchmarkId::new("record", capacity), &capacity, |b, _| {
            b.iter(|| journal.record(&fault, false))
        });
    }

    let journal = FaultJournal::new(1000, 1024);
    for i in 0..1000 {
        journal.record(&Fault::with_message(FaultKind::Format, format!("r{}", i)), false);
    }
    group.bench_function("get_recent_10", |b| b.iter(|| journal.get_recent(10)));
    group.bench_function("get_filtered", |b| {
        b.iter(|| journal.get_filtered(|e| e.kind.is_a(FaultKind::System)))
    });

    group.finish();
}

fn bench_slots(c: &mut Criterion) {
    let mut group = c.benchmark_group("data_slots");
    let manager = LocalDataStoreManager::new();

    group.bench_function("allocate_release", |b| {
        b.iter(|| drop(manager.allocate_slot()))
    });

    let slot = manager.allocate_slot();
    group.bench_function("set_get", |b| {
        b.iter(|| {
            manager.set_data(&slot, black_box(7u64)).unwrap();
            manager.get_data::<u64>(&slot).unwrap()
        })
    });

    group.finish();
}

// ============================================================================
// BENCHMARK GROUPS
// ============================================================================

criterion_group!(construction_benches, bench_construction);

criterion_group!(hierarchy_benches, bench_hierarchy);

criterion_group!(logging_benches, bench_logging, bench_records);

criterion_group!(storage_benches, bench_journal, bench_slots);

criterion_main!(
    construction_benches,
    hierarchy_benches,
    logging_benches,
    storage_benches,
);
