//! Criterion benchmarks for a full fee-distribution cycle.

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use parking_lot::Mutex;

use sluice_core::constants::COIN;
use sluice_core::error::LedgerError;
use sluice_core::traits::{DebtLedger, LiquidityOracle, OracleFund, StabilityPoolLedger};
use sluice_core::types::Amount;
use sluice_router::{AllocationParams, DripPipeline, FeeRouter, GlobalFeeRouter, GlobalRouterParams};

const T0: u64 = 1_700_000_000;

struct FixedLedgers {
    debt: Mutex<Amount>,
    deposits: Mutex<Amount>,
    liquidity: Mutex<Amount>,
    oracle_balance: Mutex<Amount>,
}

impl DebtLedger for FixedLedgers {
    fn entire_system_debt(&self) -> Result<Amount, LedgerError> {
        Ok(*self.debt.lock())
    }
}

impl StabilityPoolLedger for FixedLedgers {
    fn total_deposits(&self) -> Result<Amount, LedgerError> {
        Ok(*self.deposits.lock())
    }
}

impl LiquidityOracle for FixedLedgers {
    fn liquidity_reserve(&self) -> Result<Amount, LedgerError> {
        Ok(*self.liquidity.lock())
    }
}

impl OracleFund for FixedLedgers {
    fn balance(&self) -> Result<Amount, LedgerError> {
        Ok(*self.oracle_balance.lock())
    }
}

fn pipeline() -> DripPipeline {
    let ledgers = Arc::new(FixedLedgers {
        debt: Mutex::new(2_000_000 * COIN),
        deposits: Mutex::new(700_000 * COIN),
        liquidity: Mutex::new(500_000 * COIN),
        oracle_balance: Mutex::new(2_000 * COIN),
    });
    let fee = FeeRouter::new(
        ledgers.clone(),
        ledgers.clone(),
        AllocationParams::stability_pool(),
        T0,
    )
    .unwrap();
    let global = GlobalFeeRouter::new(
        ledgers.clone(),
        ledgers.clone(),
        ledgers.clone(),
        GlobalRouterParams::default(),
        T0,
    )
    .unwrap();
    DripPipeline::new(fee, global)
}

fn bench_drip(c: &mut Criterion) {
    let p = pipeline();
    let mut now = T0;

    c.bench_function("drip_cycle", |b| {
        b.iter(|| {
            now += 3_600;
            p.drip(black_box(1_000 * COIN), now).unwrap()
        })
    });
}

fn bench_view(c: &mut Criterion) {
    let p = pipeline();

    c.bench_function("pipeline_view", |b| b.iter(|| p.view().unwrap()));
}

criterion_group!(benches, bench_drip, bench_view);
criterion_main!(benches);
