#[path = "e2e/scenario.rs"]
mod scenario;

#[path = "e2e/referential_integrity.rs"]
mod referential_integrity;

#[path = "e2e/snapshot_audit.rs"]
mod snapshot_audit;

#[path = "e2e/concurrency.rs"]
mod concurrency;
