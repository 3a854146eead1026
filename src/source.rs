//! Newline-delimited JSON record source.
//!
//! One record per line; blank lines are skipped. Lines are decoded lazily so an
//! unbounded stdin works. I/O and JSON syntax errors end the stream and are
//! returned by `finish`, separate from schema validation.

use crate::Result;
use anyhow::{Context, anyhow};
use serde_json::Value;
use std::fs::File;
use std::io::{self, BufRead, BufReader};

pub struct Records<R> {
    reader: R,
    path: String,
    line: usize,
    buf: String,
    error: Option<anyhow::Error>,
}

/// Open `path` for reading; "-" means stdin.
pub fn open(path: &str) -> Result<Records<Box<dyn BufRead>>> {
    let reader: Box<dyn BufRead> = if path == "-" {
        Box::new(BufReader::new(io::stdin()))
    } else {
        let file = File::open(path).with_context(|| format!("open input file {}", path))?;
        Box::new(BufReader::new(file))
    };
    Ok(Records::new(reader, path))
}

impl<R: BufRead> Records<R> {
    pub fn new(reader: R, path: &str) -> Self {
        Self {
            reader,
            path: if path == "-" {
                "<stdin>".to_string()
            } else {
                path.to_string()
            },
            line: 0,
            buf: String::new(),
            error: None,
        }
    }

    /// Line number of the most recently read line (1-based).
    pub fn line(&self) -> usize {
        self.line
    }

    /// Surface the error that ended the stream early, if any.
    pub fn finish(self) -> Result<()> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl<R: BufRead> Iterator for Records<R> {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        if self.error.is_some() {
            return None;
        }

        loop {
            self.buf.clear();
            let read = match self.reader.read_line(&mut self.buf) {
                Ok(n) => n,
                Err(err) => {
                    self.error = Some(
                        anyhow!(err).context(format!("read error at {}:{}", self.path, self.line + 1)),
                    );
                    return None;
                }
            };
            if read == 0 {
                return None;
            }
            self.line += 1;

            let text = self.buf.trim();
            if text.is_empty() {
                continue;
            }

            match serde_json::from_str(text) {
                Ok(value) => return Some(value),
                Err(err) => {
                    self.error = Some(anyhow!(err).context(format!(
                        "record parse error at {}:{}: cannot decode JSON",
                        self.path, self.line
                    )));
                    return None;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::io::Cursor;

    #[test]
    fn reads_one_record_per_line_skipping_blanks() {
        let text = "{\"type\":\"control\",\"command\":\"snapshot\"}\n\n   \n{\"type\":\"control\",\"command\":\"reset\"}\n";
        let mut records = Records::new(Cursor::new(text), "events.jsonl");

        assert_eq!(records.next(), Some(json!({"type": "control", "command": "snapshot"})));
        assert_eq!(records.line(), 1);
        assert_eq!(records.next(), Some(json!({"type": "control", "command": "reset"})));
        assert_eq!(records.line(), 4);
        assert_eq!(records.next(), None);
        assert!(records.finish().is_ok());
    }

    #[test]
    fn last_line_without_newline_is_read() {
        let mut records = Records::new(Cursor::new("{\"a\":1}"), "-");
        assert_eq!(records.next(), Some(json!({"a": 1})));
        assert_eq!(records.next(), None);
    }

    #[test]
    fn bad_json_stops_the_stream_with_location() {
        let text = "{\"a\":1}\n{not json\n{\"b\":2}\n";
        let mut records = Records::new(Cursor::new(text), "events.jsonl");

        assert_eq!(records.next(), Some(json!({"a": 1})));
        assert_eq!(records.next(), None);
        assert_eq!(records.next(), None);

        let err = records.finish().unwrap_err();
        assert!(
            err.to_string().contains("events.jsonl:2"),
            "unexpected error: {}",
            err
        );
    }

    #[test]
    fn stdin_is_named_in_errors() {
        let mut records = Records::new(Cursor::new("nope\n"), "-");
        assert_eq!(records.next(), None);
        assert!(records.finish().unwrap_err().to_string().contains("<stdin>:1"));
    }
}
