//! Scoped worker pool for evaluating a batch of lines.
//!
//! The batch is split into contiguous chunks, one per worker. Every line is
//! scanned with its own stack and results come back in input order.

use std::num::NonZeroUsize;
use std::thread;

use tracing::debug;

use crate::evaluator::evaluate;
use crate::grammar::Grammar;
use crate::protocol::DataLine;

/// Fixed-size pool of evaluation workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalPool {
    workers: usize,
}

impl EvalPool {
    /// Create a pool with `workers` threads. `0` means one per available core.
    pub fn new(workers: usize) -> Self {
        let workers = if workers == 0 {
            thread::available_parallelism().map_or(1, NonZeroUsize::get)
        } else {
            workers
        };
        debug!(workers, "EvalPool created");
        Self { workers }
    }

    /// Evaluate `lines` under `grammar`, returning verdicts in input order.
    pub fn evaluate(&self, grammar: &Grammar, lines: &[DataLine]) -> Vec<bool> {
        if lines.is_empty() {
            return Vec::new();
        }
        if self.workers <= 1 || lines.len() == 1 {
            return lines.iter().map(|l| evaluate(grammar, &l.text)).collect();
        }

        let chunk_size = lines.len().div_ceil(self.workers);
        thread::scope(|scope| {
            let handles: Vec<_> = lines
                .chunks(chunk_size)
                .map(|chunk| {
                    scope.spawn(move || {
                        chunk
                            .iter()
                            .map(|l| evaluate(grammar, &l.text))
                            .collect::<Vec<bool>>()
                    })
                })
                .collect();

            let mut verdicts = Vec::with_capacity(lines.len());
            for handle in handles {
                let chunk = handle
                    .join()
                    .unwrap_or_else(|payload| std::panic::resume_unwind(payload));
                verdicts.extend(chunk);
            }
            verdicts
        })
    }
}

impl Default for EvalPool {
    fn default() -> Self {
        Self::new(0)
    }
}
