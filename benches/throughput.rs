//! Throughput benchmarks

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use std::hint::black_box;

use nmeascope_core::core::protocol::checksum;
use nmeascope_core::Parser;

const GGA_BODY: &str = "GPGGA,074844.199,3652.514,N,00225.679,W,1,12,1.0,0.0,M,0.0,M,,";

fn checksum_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("checksum");
    group.throughput(Throughput::Bytes(GGA_BODY.len() as u64));

    group.bench_function("calculate", |b| {
        b.iter(|| black_box(checksum::calculate(black_box(GGA_BODY))))
    });

    group.bench_function("verify", |b| {
        b.iter(|| black_box(checksum::verify(black_box(GGA_BODY), black_box("79"))))
    });

    group.finish();
}

fn parser_benchmark(c: &mut Criterion) {
    let generator = Parser::new().unwrap();
    let stream: String = ["GPGGA", "GPRMC", "GPGSV", "HEHDT", "IIMWV", "GPVTG", "SDDPT", "GPZDA"]
        .iter()
        .cycle()
        .take(256)
        .filter_map(|id| generator.fake_sentence(id))
        .collect();
    let noisy = stream.replace("\r\n$GPRMC", "\r\n#garbage$GPR$MC");

    let mut group = c.benchmark_group("parser");
    group.throughput(Throughput::Bytes(stream.len() as u64));

    group.bench_function("parse_data", |b| {
        let mut parser = Parser::new().unwrap();
        b.iter(|| black_box(parser.parse_data(black_box(&stream))))
    });

    group.bench_function("parse_data_chunked", |b| {
        let mut parser = Parser::with_options(true, 1024).unwrap();
        b.iter(|| {
            let mut count = 0;
            for chunk in stream.as_bytes().chunks(64) {
                // generated frames are ASCII
                let text = std::str::from_utf8(chunk).unwrap();
                count += parser.parse_data(black_box(text)).len();
            }
            black_box(count)
        })
    });

    group.bench_function("parse_data_noisy", |b| {
        let mut parser = Parser::new().unwrap();
        b.iter(|| black_box(parser.parse_data(black_box(&noisy))))
    });

    group.finish();
}

criterion_group!(benches, checksum_benchmark, parser_benchmark);
criterion_main!(benches);
