use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, warn};

use crate::error::LedgerError;
use crate::topology::Adjacency;
use crate::types::Digest;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Color {
    Gray,
    Black,
}

/// Outcome of an acyclicity check.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AcyclicityReport {
    Acyclic {
        nodes_visited: usize,
        edges_traversed: usize,
    },
    /// `digest` was reached again while still on the traversal path.
    /// `path` runs from `digest` along child edges back to `digest`.
    Cycle { digest: Digest, path: Vec<Digest> },
}

impl AcyclicityReport {
    pub fn is_acyclic(&self) -> bool {
        matches!(self, Self::Acyclic { .. })
    }

    pub fn cycle_digest(&self) -> Option<Digest> {
        match self {
            Self::Acyclic { .. } => None,
            Self::Cycle { digest, .. } => Some(*digest),
        }
    }
}

/// Cancellation hook for long validations: the flag is polled once every
/// `interval` newly visited digests.
#[derive(Clone, Copy)]
pub struct CancelCheck<'a> {
    pub flag: &'a AtomicBool,
    pub interval: usize,
}

/// Three-color depth-first cycle detector over forward adjacency.
///
/// White digests are absent from the color map, gray ones are on the current
/// path, black ones are finished. Traversal starts from every digest in the
/// graph, so disconnected components are all covered. The work stack is a
/// `Vec`; graph depth never reaches the call stack.
pub struct AcyclicityValidator;

impl AcyclicityValidator {
    pub fn check(graph: Adjacency<'_>) -> AcyclicityReport {
        match Self::run(graph, |_| Ok::<(), Infallible>(())) {
            Ok(report) => report,
            Err(never) => match never {},
        }
    }

    pub fn check_cancellable(
        graph: Adjacency<'_>,
        cancel: CancelCheck<'_>,
    ) -> Result<AcyclicityReport, LedgerError> {
        let interval = cancel.interval.max(1);
        Self::run(graph, |visited| {
            if visited % interval == 0 && cancel.flag.load(Ordering::Relaxed) {
                return Err(LedgerError::Cancelled);
            }
            Ok(())
        })
    }

    fn run<E>(
        graph: Adjacency<'_>,
        mut poll: impl FnMut(usize) -> Result<(), E>,
    ) -> Result<AcyclicityReport, E> {
        poll(0)?;

        let universe = graph.universe();
        let mut color: HashMap<Digest, Color> = HashMap::with_capacity(universe.len());
        let mut visited = 0usize;
        let mut edges = 0usize;

        for start in universe {
            if color.contains_key(&start) {
                continue;
            }
            color.insert(start, Color::Gray);
            visited += 1;
            poll(visited)?;

            // (digest, index of the next child to explore)
            let mut stack: Vec<(Digest, usize)> = vec![(start, 0)];
            while let Some(&(current, next)) = stack.last() {
                let Some(&child) = graph.children_of(&current).get(next) else {
                    color.insert(current, Color::Black);
                    stack.pop();
                    continue;
                };
                if let Some(top) = stack.last_mut() {
                    top.1 += 1;
                }
                edges += 1;

                match color.get(&child) {
                    None => {
                        color.insert(child, Color::Gray);
                        visited += 1;
                        poll(visited)?;
                        stack.push((child, 0));
                    }
                    Some(Color::Gray) => {
                        let from = stack.iter().position(|(d, _)| *d == child).unwrap_or(0);
                        let mut path: Vec<Digest> = stack[from..].iter().map(|(d, _)| *d).collect();
                        path.push(child);
                        warn!(digest = %child, path_len = path.len(), "Cycle detected");
                        return Ok(AcyclicityReport::Cycle {
                            digest: child,
                            path,
                        });
                    }
                    Some(Color::Black) => {}
                }
            }
        }

        debug!(
            nodes_visited = visited,
            edges_traversed = edges,
            "Acyclicity check passed"
        );
        Ok(AcyclicityReport::Acyclic {
            nodes_visited: visited,
            edges_traversed: edges,
        })
    }
}

/// Result of a structural integrity audit.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrityReport {
    pub valid: bool,
    pub checks_performed: usize,
    pub checks_passed: usize,
    pub errors: Vec<String>,
}

impl IntegrityReport {
    pub(crate) fn start() -> Self {
        Self {
            valid: true,
            ..Default::default()
        }
    }

    pub(crate) fn record(&mut self, ok: bool, error: impl FnOnce() -> String) {
        self.checks_performed += 1;
        if ok {
            self.checks_passed += 1;
        } else {
            self.valid = false;
            self.errors.push(error());
        }
    }
}
