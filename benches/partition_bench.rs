//! Partitioning throughput benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use genome_windows::{GenomePartition, LiftEntry};

fn synthetic_genome() -> (Vec<(String, u64)>, Vec<LiftEntry>) {
    let mut sizes = Vec::new();
    let mut lift = Vec::new();
    for chrom in 0..24 {
        let name = format!("chr{chrom}");
        let length = 50_000_000 + chrom * 1_000_000;
        // Ungapped 100 kb blocks separated by alternating short and long gaps.
        let mut start = 0;
        let mut block = 0;
        while start + 100_000 <= length {
            lift.push(LiftEntry::new(name.clone(), start, start + 100_000));
            start += 100_000 + if block % 2 == 0 { 5 } else { 5_000 };
            block += 1;
        }
        sizes.push((name, length));
    }
    for scaffold in 0..2_000 {
        sizes.push((format!("chrUn_{scaffold}"), 20_000 + scaffold * 10));
    }
    (sizes, lift)
}

fn benchmark_partition(c: &mut Criterion) {
    let (sizes, lift) = synthetic_genome();

    c.bench_function("partition_24_chromosomes", |b| {
        b.iter(|| {
            let partition = GenomePartition::builder()
                .window_size(1_000_000)
                .overlap(10_000)
                .max_gap(100)
                .min_unplaced_size(1_000)
                .unplaced(["chrUn_*"])
                .lift(lift.clone())
                .build(sizes.clone())
                .expect("synthetic genome partitions");
            black_box(partition.windows().len());
        });
    });

    let partition = GenomePartition::builder()
        .window_size(1_000_000)
        .overlap(10_000)
        .unplaced(["chrUn_*"])
        .build(sizes.clone())
        .expect("synthetic genome partitions");
    c.bench_function("window_specs", |b| {
        b.iter(|| black_box(partition.specs()));
    });
}

criterion_group!(benches, benchmark_partition);
criterion_main!(benches);
