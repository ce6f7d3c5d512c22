#[path = "adversarial/tampered_snapshot.rs"]
mod tampered_snapshot;

#[path = "adversarial/injected_edges.rs"]
mod injected_edges;
