use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dcf_codec::{Flags, Type, Writer};

fn encode_scalar_frame() -> Vec<u8> {
    let mut w = Writer::new(1, Flags::NO_CRC);
    w.write_u32(42).unwrap();
    w.write_u64(0xDEAD_BEEF_0000_1111).unwrap();
    w.write_f64(3.14159).unwrap();
    w.write_string("benchmark payload").unwrap();
    w.finish().unwrap().to_vec()
}

fn encode_array_frame(count: u32) -> Vec<u8> {
    let mut w = Writer::new(1, Flags::NO_CRC);
    w.array_begin(Type::U32, count).unwrap();
    for i in 0..count {
        w.write_u32(i).unwrap();
    }
    w.array_end().unwrap();
    w.finish().unwrap().to_vec()
}

fn bench_writer(c: &mut Criterion) {
    c.bench_function("writer_scalar_frame", |b| {
        b.iter(|| black_box(encode_scalar_frame()));
    });

    c.bench_function("writer_array_1000_u32_with_crc", |b| {
        b.iter(|| {
            let mut w = Writer::new(1, 0);
            w.array_begin(Type::U32, 1000).unwrap();
            for i in 0..1000u32 {
                w.write_u32(i).unwrap();
            }
            w.array_end().unwrap();
            black_box(w.finish().unwrap());
        });
    });

    c.bench_function("writer_array_1000_u32_no_crc", |b| {
        b.iter(|| black_box(encode_array_frame(1000)));
    });
}

criterion_group!(benches, bench_writer);
criterion_main!(benches);
