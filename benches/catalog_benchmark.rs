//! Performance benchmarks for the catalog pipeline
//!
//! This benchmark suite measures:
//! - Listing statement assembly and fingerprinting
//! - Listing encode/decode across listing sizes
//! - Cached vs store-backed listing reads through the service
//!
//! Run with: cargo bench
//! View results: open target/criterion/report/index.html

use chrono::{TimeZone, Utc};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use product_catalog::backend::InMemoryBackend;
use product_catalog::key::ListKey;
use product_catalog::query::{build_list_query, PlaceholderStyle, QueryTemplate};
use product_catalog::row::ProductRow;
use product_catalog::serialization::{decode_products, encode_products};
use product_catalog::store::InMemoryStore;
use product_catalog::{
    Product, ProductListQuery, ProductService, Products, RequestContext, SqlProductRepository,
};
use std::hint::black_box;
use uuid::Uuid;

// ============================================================================
// Fixtures
// ============================================================================

fn listing(len: usize) -> Products {
    (0..len)
        .map(|i| Product {
            id: Uuid::from_u128(i as u128 + 1),
            category_id: Uuid::from_u128(0xc1),
            supplier_id: Uuid::from_u128(0x51),
            unit_id: Uuid::from_u128(0x01),
            name: format!("Product {:05}", i),
            description: Some("Benchmark fixture".to_string()),
            base_price: 1000.0 + i as f64,
            stock: i as i64,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            created_by: "SYSTEM".to_string(),
            updated_at: None,
            updated_by: None,
        })
        .collect()
}

// ============================================================================
// Query Benchmarks
// ============================================================================

fn query_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("query");

    let bare = ProductListQuery::default();
    let full = ProductListQuery::new("kangkung", "Sayur", "base_price", "desc");

    group.bench_function("build_list_bare", |b| {
        b.iter(|| {
            build_list_query(
                &QueryTemplate::LIST_PRODUCTS,
                black_box(&bare),
                PlaceholderStyle::Dollar,
            )
        })
    });

    group.bench_function("build_list_full", |b| {
        b.iter(|| {
            build_list_query(
                &QueryTemplate::LIST_PRODUCTS,
                black_box(&full),
                PlaceholderStyle::Dollar,
            )
        })
    });

    group.bench_function("fingerprint", |b| {
        b.iter(|| ListKey::fingerprint(black_box(&full)))
    });

    group.finish();
}

// ============================================================================
// Serialization Benchmarks
// ============================================================================

fn serialization_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("serialization");

    for len in [1usize, 20, 200].iter() {
        let products = listing(*len);
        let bytes = encode_products(&products).expect("Failed to encode");

        group
            .throughput(Throughput::Elements(*len as u64))
            .bench_with_input(BenchmarkId::new("encode", len), &products, |b, p| {
                b.iter(|| encode_products(black_box(p)))
            });

        group
            .throughput(Throughput::Elements(*len as u64))
            .bench_with_input(BenchmarkId::new("decode", len), &bytes, |b, bytes| {
                b.iter(|| decode_products(black_box(bytes)))
            });
    }

    group.finish();
}

// ============================================================================
// Service Benchmarks
// ============================================================================

fn service_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("service");
    let rt = tokio::runtime::Runtime::new().expect("Failed to create Tokio runtime");

    let store = InMemoryStore::new();
    rt.block_on(async {
        for p in listing(50) {
            store.insert_row(ProductRow::from(&p)).await;
        }
    });

    // Cached path: the first call fills the cache
    let cached = ProductService::new(
        InMemoryBackend::new(),
        SqlProductRepository::new(store.clone()),
    );
    let ctx = RequestContext::background();
    rt.block_on(async {
        cached
            .get_list_product(&ctx, "", "", "name", "asc")
            .await
            .expect("Failed to warm cache");
    });

    group.bench_function("get_list_cached", |b| {
        b.to_async(&rt).iter(|| async {
            cached
                .get_list_product(&ctx, "", "", black_box("name"), "asc")
                .await
                .expect("listing failed")
        });
    });

    // Store path: the entry is evicted before every read
    let uncached = ProductService::new(InMemoryBackend::new(), SqlProductRepository::new(store));
    let query = ProductListQuery::new("", "", "name", "asc");
    group.bench_function("get_list_store", |b| {
        b.to_async(&rt).iter(|| async {
            uncached
                .expander()
                .evict(&ctx, &query)
                .await
                .expect("evict failed");
            uncached
                .get_list_product(&ctx, "", "", "name", "asc")
                .await
                .expect("listing failed")
        });
    });

    group.finish();
}

// ============================================================================
// Benchmark Registration
// ============================================================================

criterion_group!(
    benches,
    query_benchmarks,
    serialization_benchmarks,
    service_benchmarks
);
criterion_main!(benches);
