//! Memory resource benchmarks

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use nos_memory_resource::{
    get_default_resource, heap_backed_resource, set_default_resource, MemoryResource, MonotonicResource,
    PolymorphicAllocator, PoolResource,
};

fn bench_heap_allocation(c: &mut Criterion) {
    let alloc = PolymorphicAllocator::<u64>::new(heap_backed_resource());
    c.bench_function("heap_allocate_deallocate_64", |b| {
        b.iter(|| {
            let block = alloc.allocate(black_box(8)).unwrap();
            unsafe { alloc.deallocate(block, 8) };
        })
    });
}

fn bench_pool_allocation(c: &mut Criterion) {
    let pool = PoolResource::from_static(vec![0u8; 64 * 1024].leak(), 64, 16).unwrap();
    let alloc = PolymorphicAllocator::<u64>::new(&pool);
    c.bench_function("pool_allocate_deallocate_64", |b| {
        b.iter(|| {
            let block = alloc.allocate(black_box(8)).unwrap();
            unsafe { alloc.deallocate(block, 8) };
        })
    });
}

fn bench_monotonic_allocation(c: &mut Criterion) {
    let mut arena = MonotonicResource::from_static(vec![0u8; 1024 * 1024].leak()).unwrap();
    c.bench_function("monotonic_allocate_1000x64", |b| {
        b.iter(|| {
            {
                let r: &dyn MemoryResource = &arena;
                for _ in 0..1000 {
                    black_box(r.allocate(64, 8).unwrap());
                }
            }
            arena.release();
        })
    });
}

fn bench_default_resource(c: &mut Criterion) {
    c.bench_function("get_default_resource", |b| b.iter(|| black_box(get_default_resource())));
    c.bench_function("set_default_resource", |b| {
        b.iter(|| set_default_resource(black_box(Some(heap_backed_resource()))))
    });
    c.bench_function("default_allocator_construction", |b| {
        b.iter(|| black_box(PolymorphicAllocator::<u32>::default()))
    });
}

fn bench_resource_equality(c: &mut Criterion) {
    let a = PolymorphicAllocator::<u32>::new(heap_backed_resource());
    let b = PolymorphicAllocator::<f64>::default();
    c.bench_function("allocator_equality", |bench| bench.iter(|| black_box(a) == black_box(b)));
}

criterion_group!(
    benches,
    bench_heap_allocation,
    bench_pool_allocation,
    bench_monotonic_allocation,
    bench_default_resource,
    bench_resource_equality
);

criterion_main!(benches);
