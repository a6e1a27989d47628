use lazy_static::lazy_static;
use prometheus::{
    register_int_counter, register_int_counter_vec, register_int_gauge, IntCounter, IntCounterVec,
    IntGauge,
};

lazy_static! {
    pub static ref REGISTRY_OPERATIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "agentreg_operations_total",
        "Total number of registry operations by outcome",
        &["operation", "status"]
    ).unwrap();

    pub static ref REGISTERED_AGENTS: IntGauge = register_int_gauge!(
        "agentreg_agents_total",
        "Number of agents registered in the ledger"
    ).unwrap();

    pub static ref RATINGS_ACCEPTED_TOTAL: IntCounter = register_int_counter!(
        "agentreg_ratings_accepted_total",
        "Total number of ratings committed to the ledger"
    ).unwrap();

    pub static ref RATING_VALUES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "agentreg_rating_value_total",
        "Committed ratings by value",
        &["value"]
    ).unwrap();

    pub static ref STORAGE_ERRORS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "agentreg_storage_errors_total",
        "Errors raised by a ledger storage backend",
        &["backend", "operation"]
    ).unwrap();
}

pub const STATUS_SUCCESS: &str = "success";

/// Count one finished operation. `status` is `success` or an error kind.
pub fn record_operation(operation: &str, status: &str) {
    REGISTRY_OPERATIONS_TOTAL
        .with_label_values(&[operation, status])
        .inc();
}

pub fn record_rating_accepted(value: u8) {
    RATINGS_ACCEPTED_TOTAL.inc();
    RATING_VALUES_TOTAL
        .with_label_values(&[&value.to_string()])
        .inc();
}

pub fn set_registered_agents(count: u64) {
    REGISTERED_AGENTS.set(i64::try_from(count).unwrap_or(i64::MAX));
}
