//! Session driver: protocol gate -> evaluator -> formatter -> writer.

use std::io::{BufRead, Write};

use tracing::{debug, info};

use crate::error::Result;
use crate::evaluator::evaluate;
use crate::format::OutputVariant;
use crate::grammar::Grammar;
use crate::pool::EvalPool;
use crate::protocol::{DataLine, ProtocolGate};

/// Lines gathered before handing a batch to the pool.
const BATCH_SIZE: usize = 4096;

/// Counters reported at the end of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    /// Declared test case count (`0` if the header was never read).
    pub cases: usize,
    /// Data lines evaluated and written.
    pub processed: usize,
    /// How many of those were balanced.
    pub balanced: usize,
    /// Input ended before every declared line arrived.
    pub truncated: bool,
}

/// One validation run over an input stream.
#[derive(Debug, Clone)]
pub struct Session {
    grammar: Grammar,
    variant: OutputVariant,
    jobs: usize,
}

impl Session {
    /// Sequential session: each line is written as soon as it is evaluated.
    pub fn new(grammar: Grammar, variant: OutputVariant) -> Self {
        Self {
            grammar,
            variant,
            jobs: 1,
        }
    }

    /// Evaluate with `jobs` workers. `1` keeps the sequential path, `0` uses
    /// every available core.
    #[must_use]
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    /// Read the protocol from `input` and write one verdict line per data
    /// line to `output`.
    ///
    /// Lines already written stay written if a later header turns out to be
    /// malformed; the error is returned after flushing them.
    pub fn run<R: BufRead, W: Write>(&self, input: R, mut output: W) -> Result<Summary> {
        let mut gate = ProtocolGate::new(input);
        let mut summary = Summary::default();

        debug!(variant = %self.variant, jobs = self.jobs, "session started");
        let result = if self.jobs == 1 {
            self.run_sequential(&mut gate, &mut output, &mut summary)
        } else {
            self.run_pooled(&mut gate, &mut output, &mut summary)
        };
        output.flush()?;

        summary.cases = gate.declared_cases().unwrap_or(0);
        summary.truncated = gate.truncated();
        result?;

        info!(
            cases = summary.cases,
            processed = summary.processed,
            balanced = summary.balanced,
            truncated = summary.truncated,
            "session finished"
        );
        Ok(summary)
    }

    fn run_sequential<R: BufRead, W: Write>(
        &self,
        gate: &mut ProtocolGate<R>,
        output: &mut W,
        summary: &mut Summary,
    ) -> Result<()> {
        while let Some(line) = gate.next_line()? {
            let verdict = evaluate(&self.grammar, &line.text);
            self.emit(output, summary, line.index, verdict)?;
        }
        Ok(())
    }

    fn run_pooled<R: BufRead, W: Write>(
        &self,
        gate: &mut ProtocolGate<R>,
        output: &mut W,
        summary: &mut Summary,
    ) -> Result<()> {
        let pool = EvalPool::new(self.jobs);
        let mut batch: Vec<DataLine> = Vec::with_capacity(BATCH_SIZE);

        loop {
            let end = match gate.next_line() {
                Ok(Some(line)) => {
                    batch.push(line);
                    None
                }
                Ok(None) => Some(Ok(())),
                Err(e) => Some(Err(e)),
            };

            if end.is_some() || batch.len() == BATCH_SIZE {
                let verdicts = pool.evaluate(&self.grammar, &batch);
                for (line, verdict) in batch.drain(..).zip(verdicts) {
                    self.emit(output, summary, line.index, verdict)?;
                }
            }
            if let Some(end) = end {
                return end;
            }
        }
    }

    fn emit<W: Write>(
        &self,
        output: &mut W,
        summary: &mut Summary,
        index: usize,
        verdict: bool,
    ) -> Result<()> {
        writeln!(output, "{}", self.variant.render(index, verdict))?;
        summary.processed += 1;
        if verdict {
            summary.balanced += 1;
        }
        Ok(())
    }
}
