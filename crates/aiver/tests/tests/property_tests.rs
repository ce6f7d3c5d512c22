#[path = "property/acyclicity.rs"]
mod acyclicity;

#[path = "property/digests.rs"]
mod digests;
