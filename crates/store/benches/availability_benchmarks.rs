use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use std::sync::Arc;

use chrono::Utc;
use hubcycle_cache::{AvailabilityCache, CacheKey, ReadPolicy};
use hubcycle_catalog::{Enterprise, Product, ProductId, StockLevel, Unit, UnitId, VariantUnit};
use hubcycle_core::{EnterpriseId, EntityId, Money};
use hubcycle_distribution::{
    DistributionResolver, Exchange, ExchangeId, OrderCycle, OrderCycleId,
};
use hubcycle_fees::{EnterpriseFee, FeeCalculation, FeeCalculator, FeeId, FeeType};
use hubcycle_store::InMemoryMarket;

struct Setup {
    market: Arc<InMemoryMarket>,
    cache: Arc<AvailabilityCache<Arc<InMemoryMarket>>>,
    key: CacheKey,
    first_unit: UnitId,
    shop: EnterpriseId,
    cycle: OrderCycleId,
}

/// One cycle distributing `unit_count` single-variant products to one shop,
/// with a vendor fee and a coordinator fee attached to the supply chain.
fn setup(unit_count: usize) -> Setup {
    let market = Arc::new(InMemoryMarket::new());
    let cache = Arc::new(AvailabilityCache::new(
        Arc::clone(&market),
        ReadPolicy::WaitForFresh,
    ));
    market.register_sink(cache.clone());

    let vendor = EnterpriseId::new();
    let hub = EnterpriseId::new();
    let shop = EnterpriseId::new();
    market.insert_enterprise(Enterprise::new(vendor, "vendor"));
    market.insert_enterprise(Enterprise::new(hub, "hub"));
    market.insert_enterprise(Enterprise::new(shop, "shop"));

    let mut units = Vec::with_capacity(unit_count);
    for i in 0..unit_count {
        let product = ProductId::new(EntityId::new());
        let unit = UnitId::new(EntityId::new());
        market
            .create_product(
                Product::new(product, format!("product {i}"), vendor, VariantUnit::Items, unit),
                Unit::new(
                    unit,
                    product,
                    VariantUnit::Items,
                    Money::from_cents(1000),
                    None,
                    None,
                    StockLevel::on_hand(10),
                    true,
                )
                .unwrap(),
            )
            .unwrap();
        units.push(unit);
    }

    let now = Utc::now();
    let cycle = OrderCycleId::new(EntityId::new());
    market
        .insert_order_cycle(OrderCycle::new(
            cycle,
            "bench cycle",
            hub,
            now - chrono::Duration::hours(1),
            now + chrono::Duration::days(7),
        ))
        .unwrap();

    let packing = FeeId::new(EntityId::new());
    market
        .insert_fee(EnterpriseFee::new(
            packing,
            vendor,
            "packing",
            FeeType::Packing,
            FeeCalculation::FlatRate(Money::from_cents(123)),
        ))
        .unwrap();
    let admin = FeeId::new(EntityId::new());
    market
        .insert_fee(EnterpriseFee::new(
            admin,
            hub,
            "admin",
            FeeType::Admin,
            FeeCalculation::FlatPercent { basis_points: 250 },
        ))
        .unwrap();

    market
        .insert_exchange(
            Exchange::incoming(ExchangeId::new(EntityId::new()), cycle, vendor, hub)
                .with_units(units.iter().copied())
                .with_fees([packing]),
        )
        .unwrap();
    market
        .insert_exchange(
            Exchange::outgoing(ExchangeId::new(EntityId::new()), cycle, hub, shop)
                .with_units(units.iter().copied())
                .with_fees([admin]),
        )
        .unwrap();

    Setup {
        market,
        cache,
        key: CacheKey::new(shop, cycle),
        first_unit: units[0],
        shop,
        cycle,
    }
}

fn bench_availability_reads(c: &mut Criterion) {
    let mut group = c.benchmark_group("availability_reads");
    group.sample_size(1000);

    group.bench_function("cached_hit", |b| {
        let s = setup(100);
        s.cache.read(s.key).unwrap();
        b.iter(|| black_box(s.cache.read(black_box(s.key)).unwrap()));
    });

    for unit_count in [10, 100, 1000].iter() {
        group.throughput(Throughput::Elements(*unit_count as u64));
        group.bench_with_input(
            BenchmarkId::new("rebuild_after_invalidation", unit_count),
            unit_count,
            |b, &count| {
                let s = setup(count);
                s.cache.read(s.key).unwrap();
                b.iter(|| {
                    s.cache.invalidate_unit(s.first_unit).unwrap();
                    black_box(s.cache.read(s.key).unwrap());
                });
            },
        );
    }

    group.finish();
}

fn bench_cached_vs_direct_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("cached_vs_direct_resolution");

    group.bench_function("cached", |b| {
        let s = setup(500);
        s.cache.read(s.key).unwrap();
        b.iter(|| black_box(s.cache.read(s.key).unwrap()));
    });

    group.bench_function("direct_resolver", |b| {
        let s = setup(500);
        b.iter(|| {
            let resolver = DistributionResolver::new(&s.market);
            black_box(resolver.visible_units(s.shop, s.cycle).unwrap());
        });
    });

    group.finish();
}

fn bench_write_read_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("mutation_to_fresh_read");
    group.sample_size(500);

    group.bench_function("set_stock_then_read", |b| {
        let s = setup(100);
        s.cache.read(s.key).unwrap();
        let mut level = 10;
        b.iter(|| {
            level = if level == 10 { 9 } else { 10 };
            s.market
                .set_stock(s.first_unit, StockLevel::on_hand(level))
                .unwrap();
            black_box(s.cache.read(s.key).unwrap());
        });
    });

    group.finish();
}

fn bench_fee_aggregation(c: &mut Criterion) {
    let mut group = c.benchmark_group("fee_aggregation");
    group.sample_size(1000);

    group.bench_function("fees_for_two_fee_chain", |b| {
        let s = setup(100);
        let calculator = FeeCalculator::new(&s.market);
        b.iter(|| {
            black_box(
                calculator
                    .fees_for(black_box(s.first_unit), s.shop, s.cycle)
                    .unwrap(),
            )
        });
    });

    group.bench_function("price_with_fees", |b| {
        let s = setup(100);
        let calculator = FeeCalculator::new(&s.market);
        b.iter(|| {
            black_box(
                calculator
                    .price_with_fees(s.first_unit, s.shop, s.cycle)
                    .unwrap(),
            )
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_availability_reads,
    bench_cached_vs_direct_resolution,
    bench_write_read_cycle,
    bench_fee_aggregation
);
criterion_main!(benches);
