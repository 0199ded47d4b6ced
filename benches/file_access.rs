use arrayfile::config::CsvOptions;
use arrayfile::{CsvFile, Encoding, LineAccess, TextFile};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::io::Write;
use tempfile::NamedTempFile;

fn create_test_file(size_kb: usize) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
    let target_size = size_kb * 1024;
    let mut current_size = 0;
    let mut line_num = 0;

    while current_size < target_size {
        let log_line = format!(
            "[2024-09-02T10:{}:{}] INFO: Request {} user_{}\n",
            (line_num / 3600) % 24,
            (line_num / 60) % 60,
            line_num,
            line_num % 1000
        );
        temp_file.write_all(log_line.as_bytes()).unwrap();
        current_size += log_line.len();
        line_num += 1;
    }

    temp_file.flush().unwrap();
    temp_file
}

fn create_csv_file(rows: usize) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
    writeln!(temp_file, "id,user,message").unwrap();
    for row in 0..rows {
        writeln!(temp_file, "{row},user_{},\"request {row}, ok\"", row % 1000).unwrap();
    }
    temp_file.flush().unwrap();
    temp_file
}

fn size_label(size_kb: usize) -> String {
    if size_kb < 1024 {
        format!("{}KB", size_kb)
    } else {
        format!("{}MB", size_kb / 1024)
    }
}

fn bench_index_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("index_build");
    group.sample_size(10);
    group.measurement_time(std::time::Duration::from_secs(5));

    for &size_kb in &[50, 5000, 60000] {
        let temp_file = create_test_file(size_kb);
        let text = TextFile::open(temp_file.path()).unwrap();

        group.bench_with_input(
            BenchmarkId::new("rebuild", size_label(size_kb)),
            &text,
            |b, text| {
                b.iter(|| black_box(text.rebuild_index().unwrap()));
            },
        );
    }

    group.finish();
}

fn bench_random_access(c: &mut Criterion) {
    let mut group = c.benchmark_group("random_access");
    group.sample_size(20);

    let temp_file = create_test_file(20000);
    let text = TextFile::open(temp_file.path()).unwrap();
    let len = text.len().unwrap() as isize;
    // Fixed stride so runs are comparable
    let positions: Vec<isize> = (0..1000).map(|i| (i * 7919) % len).collect();

    group.bench_function("get", |b| {
        b.iter(|| {
            for &index in &positions {
                black_box(text.get(index).unwrap());
            }
        });
    });

    group.bench_function("get_negative", |b| {
        b.iter(|| {
            for &index in &positions {
                black_box(text.get(-index - 1).unwrap());
            }
        });
    });

    group.finish();
}

fn bench_iteration(c: &mut Criterion) {
    let mut group = c.benchmark_group("iteration");
    group.sample_size(10);
    group.measurement_time(std::time::Duration::from_secs(5));

    let temp_file = create_test_file(5000);
    let text = TextFile::open(temp_file.path()).unwrap();
    let len = text.len().unwrap();

    group.bench_function("full_pass", |b| {
        b.iter(|| black_box(text.iter().unwrap().count()));
    });

    group.bench_function("mapped_range", |b| {
        b.iter(|| black_box(text.iter_range(0, len).unwrap().count()));
    });

    group.finish();
}

fn bench_records(c: &mut Criterion) {
    let mut group = c.benchmark_group("records");
    group.sample_size(10);

    let temp_file = create_csv_file(100_000);
    let options = CsvOptions::default().with_header(true);
    let data = CsvFile::with_options(temp_file.path(), &options, Encoding::Utf8).unwrap();
    let len = data.len().unwrap() as isize;

    group.bench_function("get", |b| {
        b.iter(|| {
            for index in (0..len).step_by(97) {
                black_box(data.get(index).unwrap());
            }
        });
    });

    group.bench_function("full_pass", |b| {
        b.iter(|| black_box(data.iter().unwrap().count()));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_index_build,
    bench_random_access,
    bench_iteration,
    bench_records
);
criterion_main!(benches);
