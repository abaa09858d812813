use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use kwscan::{partition, KeywordSet, ThreadScanner};
use std::{fs::File, io::Write, path::PathBuf};
use tempfile::tempdir;

fn create_test_files(
    dir: &tempfile::TempDir,
    file_count: usize,
    lines_per_file: usize,
) -> std::io::Result<Vec<PathBuf>> {
    let mut paths = Vec::with_capacity(file_count);
    for i in 0..file_count {
        let file_path = dir.path().join(format!("test_{}.txt", i));
        let mut file = File::create(&file_path)?;
        for j in 0..lines_per_file {
            let keyword = match (i + j) % 4 {
                0 => "python",
                1 => "Threading",
                2 => "MULTIPROCESSING",
                _ => "error",
            };
            writeln!(file, "Line {} in file {} mentions {}", j, i, keyword)?;
        }
        paths.push(file_path);
    }
    Ok(paths)
}

fn bench_thread_workers(c: &mut Criterion) {
    let dir = tempdir().unwrap();
    let files = create_test_files(&dir, 64, 200).unwrap();
    let keywords = KeywordSet::new(["python", "threading", "multiprocessing", "Error"]);
    let scanner = ThreadScanner::new();

    let mut group = c.benchmark_group("thread_scan");
    for workers in [1, 2, 4, 8] {
        group.bench_with_input(BenchmarkId::from_parameter(workers), &workers, |b, &w| {
            b.iter(|| scanner.scan(black_box(&files), &keywords, w).unwrap())
        });
    }
    group.finish();
}

fn bench_partition(c: &mut Criterion) {
    c.bench_function("partition_10k_into_16", |b| {
        b.iter(|| partition(black_box(10_000), black_box(16)).unwrap())
    });
}

criterion_group!(benches, bench_thread_workers, bench_partition);
criterion_main!(benches);
