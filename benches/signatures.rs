//! Benchmarks for signature decoding, encoding and rendering.
//!
//! - Method signatures (simple, generic, varargs, function pointers)
//! - Field, property, local variable and specification signatures
//! - Deeply nested types close to the depth limit
//! - Encoding and text rendering of decoded trees
//! - Parallel batch decoding

extern crate cilsig;

use cilsig::metadata::signatures::{
    encode_method_signature, parse_field_signature, parse_local_var_signature,
    parse_method_signature, parse_method_signatures_parallel, parse_method_spec_signature,
    parse_property_signature, parse_type_spec_signature, UnresolvedTokens,
};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;

/// Method signatures of increasing complexity.
fn bench_method_signatures(c: &mut Criterion) {
    let cases: [(&str, &[u8]); 7] = [
        // void Method()
        ("void_no_params", &[0x00, 0x00, 0x01]),
        // int Method(int a, string b, bool c)
        ("primitives", &[0x00, 0x03, 0x08, 0x08, 0x0E, 0x02]),
        // T Method<T>(T item)
        ("generic", &[0x30, 0x01, 0x01, 0x1E, 0x00, 0x1E, 0x00]),
        // void Method(ref int a, ref string b)
        ("byref", &[0x00, 0x02, 0x01, 0x10, 0x08, 0x10, 0x0E]),
        // vararg void Method(int, ..., string, double)
        ("vararg", &[0x05, 0x03, 0x01, 0x08, 0x41, 0x0E, 0x0D]),
        // void Method(method int32 *(string))
        ("fnptr", &[0x00, 0x01, 0x01, 0x1B, 0x00, 0x01, 0x08, 0x0E]),
        // void Method(Dictionary<string, List<int>>)
        (
            "nested_generic",
            &[
                0x00, 0x01, 0x01, 0x15, 0x12, 0x2A, 0x02, 0x0E, 0x15, 0x12, 0x49, 0x01, 0x08,
            ],
        ),
    ];

    let mut group = c.benchmark_group("sig_method");
    for (name, signature) in cases {
        group.bench_with_input(BenchmarkId::from_parameter(name), signature, |b, sig| {
            b.iter(|| black_box(parse_method_signature(black_box(sig)).unwrap()));
        });
    }
    group.finish();
}

/// A method with many parameters of mixed types.
fn bench_method_signature_many_params(c: &mut Criterion) {
    let mut signature = vec![0x00, 0x80, 0x80, 0x01];
    for index in 0..0x80u8 {
        match index % 4 {
            0 => signature.push(0x08),
            1 => signature.push(0x0E),
            2 => signature.extend([0x1D, 0x0A]),
            _ => signature.extend([0x12, 0x49]),
        }
    }

    c.bench_function("sig_method_128_params", |b| {
        b.iter(|| black_box(parse_method_signature(black_box(&signature)).unwrap()));
    });
}

/// The non-method signature kinds.
fn bench_other_signatures(c: &mut Criterion) {
    c.bench_function("sig_field_modreq", |b| {
        let signature = [0x06, 0x1F, 0x42, 0x08];
        b.iter(|| black_box(parse_field_signature(black_box(&signature)).unwrap()));
    });

    c.bench_function("sig_property_indexer", |b| {
        let signature = [0x28, 0x01, 0x0E, 0x08];
        b.iter(|| black_box(parse_property_signature(black_box(&signature)).unwrap()));
    });

    c.bench_function("sig_locals_mixed", |b| {
        let signature = [0x07, 0x05, 0x08, 0x0E, 0x10, 0x08, 0x45, 0x0F, 0x08, 0x16];
        b.iter(|| black_box(parse_local_var_signature(black_box(&signature)).unwrap()));
    });

    c.bench_function("sig_typespec_array", |b| {
        let signature = [0x14, 0x08, 0x02, 0x02, 0x04, 0x04, 0x02, 0x00, 0x00];
        b.iter(|| black_box(parse_type_spec_signature(black_box(&signature)).unwrap()));
    });

    c.bench_function("sig_methodspec_nested_generic", |b| {
        let signature = [0x0A, 0x01, 0x15, 0x12, 0x49, 0x01, 0x08];
        b.iter(|| black_box(parse_method_spec_signature(black_box(&signature)).unwrap()));
    });
}

/// A type nested right up to the default depth limit, and one that trips it.
fn bench_depth_limit(c: &mut Criterion) {
    let mut deepest = vec![0x1D; 99];
    deepest.push(0x08);
    let mut too_deep = vec![0x1D; 100];
    too_deep.push(0x08);

    c.bench_function("sig_typespec_depth_99", |b| {
        b.iter(|| black_box(parse_type_spec_signature(black_box(&deepest)).unwrap()));
    });
    c.bench_function("sig_typespec_depth_exceeded", |b| {
        b.iter(|| black_box(parse_type_spec_signature(black_box(&too_deep)).unwrap_err()));
    });
}

/// Encoding and rendering of an already decoded signature.
fn bench_encode_and_render(c: &mut Criterion) {
    let signature = [
        0x20, 0x03, 0x15, 0x12, 0x2A, 0x02, 0x0E, 0x08, 0x10, 0x08, 0x1D, 0x0E, 0x12, 0x49,
    ];
    let method = parse_method_signature(&signature).unwrap();

    c.bench_function("sig_encode_method", |b| {
        b.iter(|| black_box(encode_method_signature(black_box(&method)).unwrap()));
    });
    c.bench_function("sig_display_method", |b| {
        b.iter(|| black_box(black_box(&method).to_string()));
    });
    c.bench_function("sig_parameter_type_names", |b| {
        b.iter(|| black_box(black_box(&method).parameter_type_names(&UnresolvedTokens)));
    });
}

/// Sequential vs. parallel decoding of a batch of blobs.
fn bench_batch(c: &mut Criterion) {
    let blobs: Vec<Vec<u8>> = (0..4096u32)
        .map(|index| {
            let count = (index % 16) as u8;
            let mut blob = vec![0x20, count, 0x01];
            for _ in 0..count {
                blob.extend([0x15, 0x12, 0x49, 0x01, 0x08]);
            }
            blob
        })
        .collect();
    let slices: Vec<&[u8]> = blobs.iter().map(Vec::as_slice).collect();

    let mut group = c.benchmark_group("sig_batch");
    group.throughput(Throughput::Elements(slices.len() as u64));
    group.bench_function("sequential", |b| {
        b.iter(|| {
            let results: Vec<_> = slices
                .iter()
                .map(|blob| parse_method_signature(blob))
                .collect();
            black_box(results)
        });
    });
    group.bench_function("parallel", |b| {
        b.iter(|| black_box(parse_method_signatures_parallel(black_box(&slices))));
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_method_signatures,
    bench_method_signature_many_params,
    bench_other_signatures,
    bench_depth_limit,
    bench_encode_and_render,
    bench_batch,
);
criterion_main!(benches);
