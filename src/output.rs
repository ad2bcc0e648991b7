//! Structured output of a solve.
//!
//! The solver reports named data values grouped by concern (`solver`,
//! `decomposition`, `search`) and free-form messages. An
//! [`InstrumentationSink`] decides where they go.

use std::borrow::Cow;
use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Value of a data record.
#[derive(Debug, Clone, PartialEq)]
pub enum DataValue {
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl fmt::Display for DataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataValue::Int(v) => write!(f, "{v}"),
            DataValue::UInt(v) => write!(f, "{v}"),
            DataValue::Float(v) => write!(f, "{v}"),
            DataValue::Bool(v) => write!(f, "{v}"),
            DataValue::Text(v) => f.write_str(v),
        }
    }
}

impl From<i64> for DataValue {
    fn from(v: i64) -> Self {
        DataValue::Int(v)
    }
}

impl From<u64> for DataValue {
    fn from(v: u64) -> Self {
        DataValue::UInt(v)
    }
}

impl From<usize> for DataValue {
    fn from(v: usize) -> Self {
        DataValue::UInt(v as u64)
    }
}

impl From<f64> for DataValue {
    fn from(v: f64) -> Self {
        DataValue::Float(v)
    }
}

impl From<bool> for DataValue {
    fn from(v: bool) -> Self {
        DataValue::Bool(v)
    }
}

impl From<&str> for DataValue {
    fn from(v: &str) -> Self {
        DataValue::Text(v.to_string())
    }
}

impl From<String> for DataValue {
    fn from(v: String) -> Self {
        DataValue::Text(v)
    }
}

/// Receiver of solver output.
pub trait InstrumentationSink: Send + Sync {
    /// Record `value` under `group`/`key`. Keys may repeat.
    fn data(&self, group: &str, key: &str, value: DataValue);

    fn info(&self, message: &str);

    fn debug(&self, message: &str);

    fn warning(&self, message: &str);

    fn error(&self, message: &str);

    /// Write and forget every buffered data record.
    fn flush(&self, out: &mut dyn Write) -> io::Result<()>;
}

/// Shared sinks let the caller keep a handle while a session owns a clone.
impl<S: InstrumentationSink + ?Sized> InstrumentationSink for Arc<S> {
    fn data(&self, group: &str, key: &str, value: DataValue) {
        (**self).data(group, key, value)
    }

    fn info(&self, message: &str) {
        (**self).info(message)
    }

    fn debug(&self, message: &str) {
        (**self).debug(message)
    }

    fn warning(&self, message: &str) {
        (**self).warning(message)
    }

    fn error(&self, message: &str) {
        (**self).error(message)
    }

    fn flush(&self, out: &mut dyn Write) -> io::Result<()> {
        (**self).flush(out)
    }
}

/// Data records grouped by name, in first-seen group order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputMultiMap {
    groups: Vec<(String, Vec<(String, DataValue)>)>,
}

impl OutputMultiMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, group: &str, key: &str, value: DataValue) {
        let record = (key.to_string(), value);
        match self.groups.iter_mut().find(|(name, _)| name == group) {
            Some((_, records)) => records.push(record),
            None => self.groups.push((group.to_string(), vec![record])),
        }
    }

    /// Records of `group` in insertion order.
    pub fn group(&self, group: &str) -> &[(String, DataValue)] {
        self.groups
            .iter()
            .find(|(name, _)| name == group)
            .map(|(_, records)| records.as_slice())
            .unwrap_or(&[])
    }

    /// Last value recorded under `group`/`key`.
    pub fn last(&self, group: &str, key: &str) -> Option<&DataValue> {
        self.group(group)
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &DataValue)> + '_ {
        self.groups.iter().flat_map(|(group, records)| {
            records
                .iter()
                .map(move |(key, value)| (group.as_str(), key.as_str(), value))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn clear(&mut self) {
        self.groups.clear();
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Csv,
}

/// Sink forwarding messages to `tracing` and buffering data records.
#[derive(Debug, Default)]
pub struct TracingSink {
    format: OutputFormat,
    records: Mutex<OutputMultiMap>,
}

impl TracingSink {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            records: Mutex::new(OutputMultiMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, OutputMultiMap> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy of the buffered records.
    pub fn snapshot(&self) -> OutputMultiMap {
        self.lock().clone()
    }
}

impl InstrumentationSink for TracingSink {
    fn data(&self, group: &str, key: &str, value: DataValue) {
        tracing::trace!(group, key, %value, "data");
        self.lock().insert(group, key, value);
    }

    fn info(&self, message: &str) {
        tracing::info!("{message}");
    }

    fn debug(&self, message: &str) {
        tracing::debug!("{message}");
    }

    fn warning(&self, message: &str) {
        tracing::warn!("{message}");
    }

    fn error(&self, message: &str) {
        tracing::error!("{message}");
    }

    fn flush(&self, out: &mut dyn Write) -> io::Result<()> {
        let records = std::mem::take(&mut *self.lock());
        if self.format == OutputFormat::Csv {
            writeln!(out, "group,key,value")?;
        }
        for (group, key, value) in records.iter() {
            match self.format {
                OutputFormat::Text => writeln!(out, "{group} {key} : {value}")?,
                OutputFormat::Csv => writeln!(
                    out,
                    "{},{},{}",
                    csv_field(group),
                    csv_field(key),
                    csv_field(&value.to_string())
                )?,
            }
        }
        Ok(())
    }
}

/// Quote `field` if it contains a separator, a quote or a line break.
fn csv_field(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}
