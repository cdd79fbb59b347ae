//! Capture of clearing events into column tables.
//!
//! The engine emits structured `tracing` events (one per trade, tariff,
//! market pass and notice). `TableSubscriber` turns each event target into a
//! table whose columns are the event's fields, so tests can inspect a whole
//! run after the fact.
//!
//! # Usage
//!
//! ```ignore
//! // In engine code:
//! tracing::info!(target: "trade", cycle, commodity, quantity, unit_price);
//!
//! // In test:
//! let (summary, tape) = instrument::record(|| world.clear_all_markets());
//! let trades = tape.table("trade").unwrap();
//! assert_eq!(trades.sum_i64("quantity"), 10);
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Record};
use tracing::{Event, Id, Metadata, Subscriber};

/// Values of one field across all rows of a table.
#[derive(Debug, Clone, PartialEq)]
pub enum Values {
    I64(Vec<i64>),
    U64(Vec<u64>),
    Bool(Vec<bool>),
    Text(Vec<String>),
}

impl Values {
    pub fn len(&self) -> usize {
        match self {
            Values::I64(v) => v.len(),
            Values::U64(v) => v.len(),
            Values::Bool(v) => v.len(),
            Values::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fill up to `rows` with the column's zero value.
    fn pad_to(&mut self, rows: usize) {
        let missing = rows.saturating_sub(self.len());
        match self {
            Values::I64(v) => v.extend(std::iter::repeat_n(0, missing)),
            Values::U64(v) => v.extend(std::iter::repeat_n(0, missing)),
            Values::Bool(v) => v.extend(std::iter::repeat_n(false, missing)),
            Values::Text(v) => v.extend(std::iter::repeat_n(String::new(), missing)),
        }
    }
}

/// All events recorded under one target.
#[derive(Debug, Clone, Default)]
pub struct EventTable {
    pub columns: HashMap<String, Values>,
    pub rows: usize,
}

impl EventTable {
    fn pad_all(&mut self) {
        let rows = self.rows;
        for col in self.columns.values_mut() {
            col.pad_to(rows);
        }
    }

    /// Signed column as i64. Unsigned columns are widened.
    pub fn i64s(&self, name: &str) -> Vec<i64> {
        match self.columns.get(name) {
            Some(Values::I64(v)) => v.clone(),
            Some(Values::U64(v)) => v.iter().map(|&x| x as i64).collect(),
            _ => Vec::new(),
        }
    }

    pub fn sum_i64(&self, name: &str) -> i64 {
        self.i64s(name).iter().sum()
    }

    pub fn texts(&self, name: &str) -> Vec<String> {
        match self.columns.get(name) {
            Some(Values::Text(v)) => v.clone(),
            _ => Vec::new(),
        }
    }
}

/// Tables keyed by tracing target.
#[derive(Debug, Clone, Default)]
pub struct Tape {
    pub tables: HashMap<String, EventTable>,
}

impl Tape {
    pub fn table(&self, target: &str) -> Option<&EventTable> {
        self.tables.get(target)
    }

    pub fn rows(&self, target: &str) -> usize {
        self.table(target).map_or(0, |t| t.rows)
    }
}

thread_local! {
    static TAPE: RefCell<Tape> = RefCell::default();
}

/// Writes one event's fields into the current row of a table.
struct RowWriter<'a> {
    table: &'a mut EventTable,
}

impl RowWriter<'_> {
    fn column(&mut self, field: &Field, empty: impl FnOnce(usize) -> Values) -> &mut Values {
        let rows = self.table.rows;
        self.table
            .columns
            .entry(field.name().to_string())
            .or_insert_with(|| empty(rows))
    }
}

impl Visit for RowWriter<'_> {
    fn record_i64(&mut self, field: &Field, value: i64) {
        if let Values::I64(v) = self.column(field, |rows| Values::I64(vec![0; rows])) {
            v.push(value);
        }
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        if let Values::U64(v) = self.column(field, |rows| Values::U64(vec![0; rows])) {
            v.push(value);
        }
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        if let Values::Bool(v) = self.column(field, |rows| Values::Bool(vec![false; rows])) {
            v.push(value);
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if let Values::Text(v) = self.column(field, |rows| Values::Text(vec![String::new(); rows])) {
            v.push(value.to_string());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.record_str(field, &format!("{:?}", value));
    }
}

/// Subscriber that appends every info-level event to the thread-local tape.
pub struct TableSubscriber;

impl Subscriber for TableSubscriber {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.is_event() && *metadata.level() <= tracing::Level::INFO
    }

    fn new_span(&self, _span: &Attributes<'_>) -> Id {
        Id::from_u64(1)
    }

    fn record(&self, _span: &Id, _values: &Record<'_>) {}

    fn record_follows_from(&self, _span: &Id, _follows: &Id) {}

    fn event(&self, event: &Event<'_>) {
        let target = event.metadata().target().to_string();

        TAPE.with(|t| {
            let mut tape = t.borrow_mut();
            let table = tape.tables.entry(target).or_default();

            table.pad_all();
            event.record(&mut RowWriter { table });
            table.rows += 1;
            // Fields this event did not carry
            table.pad_all();
        });
    }

    fn enter(&self, _span: &Id) {}

    fn exit(&self, _span: &Id) {}
}

/// Take everything recorded on this thread so far.
pub fn drain() -> Tape {
    TAPE.with(|t| std::mem::take(&mut *t.borrow_mut()))
}

pub fn clear() {
    TAPE.with(|t| *t.borrow_mut() = Tape::default());
}

/// Run `f` with `TableSubscriber` installed for this thread only and return what it recorded.
pub fn record<R>(f: impl FnOnce() -> R) -> (R, Tape) {
    clear();
    let out = tracing::subscriber::with_default(TableSubscriber, f);
    (out, drain())
}

// === Polars Integration ===

use polars::prelude::*;

impl EventTable {
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let mut names: Vec<&String> = self.columns.keys().collect();
        names.sort();

        let columns: Vec<Column> = names
            .into_iter()
            .map(|name| match &self.columns[name] {
                Values::I64(v) => Column::new(name.into(), v),
                Values::U64(v) => Column::new(name.into(), v),
                Values::Bool(v) => Column::new(name.into(), v),
                Values::Text(v) => Column::new(name.into(), v),
            })
            .collect();

        DataFrame::new(columns)
    }
}

impl Tape {
    pub fn to_dataframes(&self) -> HashMap<String, DataFrame> {
        self.tables
            .iter()
            .filter_map(|(name, table)| table.to_dataframe().ok().map(|df| (name.clone(), df)))
            .collect()
    }
}
