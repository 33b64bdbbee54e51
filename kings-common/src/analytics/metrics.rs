use crate::data::types::{DataError, DataResult, StateRecord};

/// Whether a metric is read straight off a record or computed from it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    Basic,
    Derived,
}

/// A numeric column analysed on every state record.
///
/// Catalog order is display order, so new metrics go at the end of their list.
#[derive(Clone, Copy)]
pub struct MetricDef {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: MetricKind,
    compute: fn(&StateRecord) -> f64,
}

impl MetricDef {
    const fn basic(key: &'static str, label: &'static str, read: fn(&StateRecord) -> f64) -> Self {
        Self {
            key,
            label,
            kind: MetricKind::Basic,
            compute: read,
        }
    }

    const fn derived(
        key: &'static str,
        label: &'static str,
        formula: fn(&StateRecord) -> f64,
    ) -> Self {
        Self {
            key,
            label,
            kind: MetricKind::Derived,
            compute: formula,
        }
    }

    pub fn value(&self, record: &StateRecord) -> f64 {
        (self.compute)(record)
    }

    pub fn is_derived(&self) -> bool {
        self.kind == MetricKind::Derived
    }
}

impl std::fmt::Debug for MetricDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricDef")
            .field("key", &self.key)
            .field("label", &self.label)
            .field("kind", &self.kind)
            .finish()
    }
}

impl PartialEq for MetricDef {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

/// `numerator / denominator`, or 0 when the denominator is not positive
pub fn ratio_or_zero(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

pub fn transaction_speed(r: &StateRecord) -> f64 {
    ratio_or_zero(r.tx_count as f64, r.total_sol_volume)
}

pub fn average_transaction_size(r: &StateRecord) -> f64 {
    ratio_or_zero(r.total_sol_volume, r.tx_count as f64)
}

pub fn buy_sell_ratio_count(r: &StateRecord) -> f64 {
    ratio_or_zero(r.buy_count as f64, r.sell_count as f64)
}

pub fn buy_sell_ratio_volume(r: &StateRecord) -> f64 {
    ratio_or_zero(r.buy_volume, r.sell_volume)
}

pub fn maker_holder_ratio(r: &StateRecord) -> f64 {
    ratio_or_zero(r.maker_count as f64, r.holder_count as f64)
}

static BASIC_METRICS: [MetricDef; 10] = [
    MetricDef::basic("buyCount", "Buy Count", |r| r.buy_count as f64),
    MetricDef::basic("sellCount", "Sell Count", |r| r.sell_count as f64),
    MetricDef::basic("txCount", "Transaction Count", |r| r.tx_count as f64),
    MetricDef::basic("totalSolVolume", "Total SOL Volume", |r| r.total_sol_volume),
    MetricDef::basic("buyVolume", "Buy Volume", |r| r.buy_volume),
    MetricDef::basic("sellVolume", "Sell Volume", |r| r.sell_volume),
    MetricDef::basic("realSolReserves", "Real SOL Reserves", |r| r.real_sol_reserves),
    MetricDef::basic("makerCount", "Maker Count", |r| r.maker_count as f64),
    MetricDef::basic("holderCount", "Holder Count", |r| r.holder_count as f64),
    MetricDef::basic("timeBeforeState", "Time Before State", |r| r.time_before_state),
];

static DERIVED_METRICS: [MetricDef; 5] = [
    MetricDef::derived("transactionSpeed", "Transaction Speed", transaction_speed),
    MetricDef::derived("averageTransactionSize", "Avg Transaction Size", average_transaction_size),
    MetricDef::derived("buySellRatioCount", "Buy/Sell Ratio (Count)", buy_sell_ratio_count),
    MetricDef::derived("buySellRatioVolume", "Buy/Sell Ratio (Volume)", buy_sell_ratio_volume),
    MetricDef::derived("makerHolderRatio", "Maker/Holder Ratio", maker_holder_ratio),
];

pub fn list_basic_metrics() -> &'static [MetricDef] {
    &BASIC_METRICS
}

pub fn list_derived_metrics() -> &'static [MetricDef] {
    &DERIVED_METRICS
}

/// Basic metrics followed by derived metrics
pub fn catalog() -> impl Iterator<Item = &'static MetricDef> {
    BASIC_METRICS.iter().chain(DERIVED_METRICS.iter())
}

pub fn get_metric(key: &str) -> DataResult<&'static MetricDef> {
    catalog()
        .find(|m| m.key == key)
        .ok_or_else(|| DataError::UnknownMetric(key.to_string()))
}
