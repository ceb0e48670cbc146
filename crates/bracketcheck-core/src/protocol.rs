//! Line protocol gate.
//!
//! Input layout:
//!
//! ```text
//! T            number of test cases
//! N            data lines in case 1
//! <N lines>
//! N            data lines in case 2
//! <N lines>
//! ...
//! ```
//!
//! The gate yields exactly the declared data lines and never reads past the
//! last one. If the stream ends early the gate stops quietly and marks the
//! session as truncated.

use std::io::BufRead;

use tracing::{debug, warn};

use crate::error::{Error, Result};

/// One data line handed to the evaluator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLine {
    /// 1-based position among all data lines of the session.
    pub index: usize,
    /// Line content without its terminator.
    pub text: String,
}

/// Reads the header and then exactly the declared number of data lines.
#[derive(Debug)]
pub struct ProtocolGate<R> {
    reader: R,
    /// Physical lines consumed so far, used in error messages.
    lines_read: usize,
    declared_cases: Option<usize>,
    cases_started: usize,
    remaining_in_case: usize,
    processed: usize,
    truncated: bool,
    finished: bool,
}

impl<R: BufRead> ProtocolGate<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            lines_read: 0,
            declared_cases: None,
            cases_started: 0,
            remaining_in_case: 0,
            processed: 0,
            truncated: false,
            finished: false,
        }
    }

    /// Next data line, or `None` once every declared line has been yielded or
    /// the stream ran dry.
    pub fn next_line(&mut self) -> Result<Option<DataLine>> {
        if self.finished {
            return Ok(None);
        }
        match self.advance() {
            Ok(None) => {
                self.finished = true;
                Ok(None)
            }
            Ok(Some(line)) => Ok(Some(line)),
            Err(e) => {
                self.finished = true;
                Err(e)
            }
        }
    }

    fn advance(&mut self) -> Result<Option<DataLine>> {
        let cases = match self.declared_cases {
            Some(cases) => cases,
            None => {
                let cases = self.read_header()?;
                debug!(cases, "read test case count");
                self.declared_cases = Some(cases);
                cases
            }
        };

        while self.remaining_in_case == 0 {
            if self.cases_started == cases {
                debug!(processed = self.processed, "all declared lines consumed");
                return Ok(None);
            }
            if self.cases_started > 0 && self.at_eof()? {
                return Ok(self.mark_truncated());
            }
            self.remaining_in_case = self.read_header()?;
            self.cases_started += 1;
            debug!(
                case = self.cases_started,
                lines = self.remaining_in_case,
                "read case line count"
            );
        }

        let Some(text) = self.read_data_line()? else {
            return Ok(self.mark_truncated());
        };
        self.remaining_in_case -= 1;
        self.processed += 1;
        Ok(Some(DataLine {
            index: self.processed,
            text,
        }))
    }

    fn mark_truncated(&mut self) -> Option<DataLine> {
        warn!(
            processed = self.processed,
            missing = self.remaining_in_case,
            "input ended before all declared lines were read"
        );
        self.truncated = true;
        None
    }

    fn at_eof(&mut self) -> Result<bool> {
        Ok(self.reader.fill_buf()?.is_empty())
    }

    fn read_header(&mut self) -> Result<usize> {
        let line_no = self.lines_read + 1;
        let bytes = self.read_raw_line()?.unwrap_or_default();
        let Ok(line) = String::from_utf8(bytes) else {
            return Err(Error::InputFormat {
                line: line_no,
                value: "<invalid utf-8>".into(),
            });
        };
        line.trim().parse().map_err(|_| Error::InputFormat {
            line: line_no,
            value: line,
        })
    }

    /// Data lines are evaluated whatever their bytes; invalid UTF-8 becomes
    /// U+FFFD.
    fn read_data_line(&mut self) -> Result<Option<String>> {
        Ok(self
            .read_raw_line()?
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned()))
    }

    /// One physical line without its `\n` or `\r\n` terminator. A lone
    /// trailing `\r` at end of input is stripped as well.
    fn read_raw_line(&mut self) -> Result<Option<Vec<u8>>> {
        let mut buf = Vec::new();
        if self.reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(None);
        }
        self.lines_read += 1;
        if buf.last() == Some(&b'\n') {
            buf.pop();
        }
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
        Ok(Some(buf))
    }

    /// Data lines yielded so far.
    pub const fn processed(&self) -> usize {
        self.processed
    }

    /// Whether the stream ended before all declared lines arrived.
    pub const fn truncated(&self) -> bool {
        self.truncated
    }

    /// The test case count from the first header line, once read.
    pub const fn declared_cases(&self) -> Option<usize> {
        self.declared_cases
    }

    /// Give back the reader, positioned right after the last consumed line.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: BufRead> Iterator for ProtocolGate<R> {
    type Item = Result<DataLine>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_line().transpose()
    }
}
