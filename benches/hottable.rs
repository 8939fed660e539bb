//! Benchmarks for hot-table row lookup.
//!
//! Builds a CLR 4.0 hot stream with one contiguous table and one bucketed table and measures
//! single lookups as well as parallel lookups from several threads on the shared index.

extern crate dotmeta;

use criterion::{criterion_group, criterion_main, Criterion};
use dotmeta::{
    file::cursor::SliceCursor,
    metadata::{
        streams::hot::{HotTableGeneration, HotTableStream, HOT_HEAP_DIR_SIZE},
        tables::{TableDescriptor, TableId},
    },
    OffsetMask,
};
use rayon::prelude::*;
use std::hint::black_box;

const BASE: usize = 0;
const ROW_SIZE: u32 = 8;
const SHIFT: u16 = 4;

/// MethodDef is stored whole (1024 rows), MemberRef sparse (every 7th rid of 4096)
fn build_stream() -> (Vec<u8>, Vec<u32>) {
    let mut data = vec![0u8; BASE + HOT_HEAP_DIR_SIZE as usize];
    let put_i32 = |data: &mut Vec<u8>, at: usize, value: i32| {
        data[at..at + 4].copy_from_slice(&value.to_le_bytes());
    };

    // Contiguous table, 22 byte header
    let header = data.len();
    put_i32(&mut data, BASE + 4 + TableId::MethodDef as usize * 4, (header - BASE) as i32);
    data.resize(header + 24, 0);
    let pos_data = data.len();
    data.resize(pos_data + 1024 * ROW_SIZE as usize, 0xAB);
    data[header..header + 4].copy_from_slice(&1024u32.to_le_bytes());
    for field in 1..4 {
        put_i32(&mut data, header + 4 + field * 4, (pos_data - header) as i32);
    }

    // Bucketed table
    let hot: Vec<u32> = (1..4096).filter(|rid| rid % 7 == 0).collect();
    let mask = (1u32 << SHIFT) - 1;
    let header = data.len();
    put_i32(&mut data, BASE + 4 + TableId::MemberRef as usize * 4, (header - BASE) as i32);
    data.resize(header + 24, 0);
    data[header..header + 4].copy_from_slice(&(hot.len() as u32).to_le_bytes());
    data[header + 20..header + 22].copy_from_slice(&SHIFT.to_le_bytes());

    let ordered: Vec<u32> = (0..=mask)
        .flat_map(|bucket| hot.iter().copied().filter(move |rid| rid & mask == bucket))
        .collect();

    let pos_table1 = data.len();
    let mut start = 0u16;
    for bucket in 0..=mask {
        let count = hot.iter().filter(|rid| *rid & mask == bucket).count() as u16;
        data.extend_from_slice(&start.to_le_bytes());
        data.extend_from_slice(&(start + count).to_le_bytes());
        start += count;
    }
    let pos_table2 = data.len();
    data.extend(ordered.iter().map(|rid| (rid >> SHIFT) as u8));
    let pos_indexes = data.len();
    for index in 0..ordered.len() as u16 {
        data.extend_from_slice(&index.to_le_bytes());
    }
    let pos_data = data.len();
    data.resize(pos_data + ordered.len() * ROW_SIZE as usize, 0xCD);

    for (field, pos) in [pos_table1, pos_table2, pos_indexes, pos_data].into_iter().enumerate() {
        put_i32(&mut data, header + 4 + field * 4, (pos - header) as i32);
    }

    (data, hot)
}

fn bench_lookup(c: &mut Criterion) {
    let (data, hot_rids) = build_stream();
    let mut hot = HotTableStream::new(HotTableGeneration::Clr40, SliceCursor::new(data), BASE as u64);
    hot.initialize(OffsetMask::Bits32).unwrap();

    let whole = TableDescriptor::new(TableId::MethodDef, ROW_SIZE, 1024);
    let sparse = TableDescriptor::new(TableId::MemberRef, ROW_SIZE, 4096);

    c.bench_function("hot_whole_table", |b| {
        b.iter(|| black_box(hot.get_row_offset(&whole, black_box(517)).unwrap()));
    });

    c.bench_function("hot_bucket_hit", |b| {
        b.iter(|| black_box(hot.get_row_offset(&sparse, black_box(hot_rids[200])).unwrap()));
    });

    c.bench_function("hot_bucket_miss", |b| {
        b.iter(|| black_box(hot.get_row_offset(&sparse, black_box(4001)).unwrap()));
    });

    c.bench_function("hot_parallel_lookups", |b| {
        b.iter(|| {
            let found = (1..4096u32)
                .into_par_iter()
                .filter(|rid| hot.get_row_offset(&sparse, *rid).unwrap().is_some())
                .count();
            black_box(found)
        });
    });
}

criterion_group!(benches, bench_lookup);
criterion_main!(benches);
