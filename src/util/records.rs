use std::{collections::VecDeque, pin::Pin};

use futures::{stream, Stream, StreamExt, TryStreamExt};
use serde_json::Value;

use crate::{
    model::{
        config::{OutputShape, ResourceType},
        error::BlobstoreError,
    },
    services::get::BlobStream,
};

pub type RecordStream = Pin<Box<dyn Stream<Item = Result<Value, BlobstoreError>> + Send>>;

/// Decodes a blob body into JSON records according to `resource_type`.
pub fn records(bytes: BlobStream, resource_type: ResourceType) -> RecordStream {
    match resource_type {
        ResourceType::Json => document_records(bytes),
        ResourceType::Jsonl => line_records(bytes),
    }
}

/// Formats records as a single JSON array or as one record per line.
pub fn render(records: &[Value], shape: OutputShape) -> String {
    match shape {
        OutputShape::Array => format!("{}\n", Value::Array(records.to_vec())),
        OutputShape::Lines => records
            .iter()
            .map(|record| format!("{}\n", record))
            .collect(),
    }
}

// A whole-document blob has to be buffered before it can be parsed.
fn document_records(bytes: BlobStream) -> RecordStream {
    stream::once(async move {
        let document = bytes
            .try_fold(Vec::new(), |mut document, chunk| async move {
                document.extend_from_slice(&chunk);
                Ok(document)
            })
            .await?;

        let value: Value = serde_json::from_slice(&document)
            .map_err(|err| BlobstoreError::Decode(err.to_string()))?;

        Ok::<_, BlobstoreError>(match value {
            Value::Array(values) => values,
            value => vec![value],
        })
    })
    .map_ok(|values| stream::iter(values.into_iter().map(Ok::<Value, BlobstoreError>)))
    .try_flatten()
    .boxed()
}

struct LineDecoder {
    bytes: BlobStream,
    buffer: Vec<u8>,
    // Bytes of `buffer` already known to hold no newline.
    scanned: usize,
    ready: VecDeque<Result<Value, BlobstoreError>>,
    line: usize,
    finished: bool,
}

impl LineDecoder {
    fn drain_lines(&mut self, at_end: bool) {
        let mut start = 0;
        while let Some(offset) = self.buffer[self.scanned..].iter().position(|b| *b == b'\n') {
            let end = self.scanned + offset;
            self.scanned = end + 1;
            self.line += 1;

            let record = decode_line(&self.buffer[start..end], self.line);
            start = end + 1;
            if !self.push(record) {
                return;
            }
        }

        self.buffer.drain(..start);
        self.scanned = self.buffer.len();

        if at_end && !self.buffer.is_empty() {
            self.line += 1;
            let record = decode_line(&self.buffer, self.line);
            self.buffer.clear();
            self.scanned = 0;
            self.push(record);
        }
    }

    fn push(&mut self, record: Option<Result<Value, BlobstoreError>>) -> bool {
        match record {
            None => true,
            Some(Ok(value)) => {
                self.ready.push_back(Ok(value));
                true
            }
            Some(Err(err)) => {
                self.ready.push_back(Err(err));
                self.finished = true;
                self.buffer.clear();
                self.scanned = 0;
                false
            }
        }
    }
}

// Blank lines decode to nothing.
fn decode_line(line: &[u8], line_no: usize) -> Option<Result<Value, BlobstoreError>> {
    let line = line.trim_ascii();
    if line.is_empty() {
        return None;
    }

    Some(
        serde_json::from_slice(line)
            .map_err(|err| BlobstoreError::Decode(format!("line {}: {}", line_no, err))),
    )
}

fn line_records(bytes: BlobStream) -> RecordStream {
    let decoder = LineDecoder {
        bytes,
        buffer: Vec::new(),
        scanned: 0,
        ready: VecDeque::new(),
        line: 0,
        finished: false,
    };

    stream::unfold(decoder, |mut decoder| async move {
        loop {
            if let Some(record) = decoder.ready.pop_front() {
                return Some((record, decoder));
            }

            if decoder.finished {
                return None;
            }

            match decoder.bytes.next().await {
                Some(Ok(chunk)) => {
                    decoder.buffer.extend_from_slice(&chunk);
                    decoder.drain_lines(false);
                }
                Some(Err(err)) => {
                    decoder.finished = true;
                    return Some((Err(err), decoder));
                }
                None => {
                    decoder.finished = true;
                    decoder.drain_lines(true);
                }
            }
        }
    })
    .boxed()
}
