//! Fixed-size result grid, one cell per (ticker, interval).

use crate::core::error::{TableError, TaskError};
use crate::core::price::{Interval, TaskKey};
use crate::core::regime::{Classification, classify_result};
use serde::Serialize;
use std::collections::HashMap;

/// The exponent for one task, or why it could not be produced.
pub type HurstResult = Result<f64, TaskError>;

#[derive(Debug, Clone, PartialEq)]
pub struct TableCell {
    pub result: HurstResult,
    pub classification: Classification,
}

impl TableCell {
    pub fn new(result: HurstResult) -> Self {
        let classification = classify_result(&result);
        Self {
            result,
            classification,
        }
    }

    pub fn exponent(&self) -> Option<f64> {
        self.result.as_ref().ok().copied()
    }
}

/// Flattened, serializable view of a cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub ticker: String,
    pub interval: Interval,
    pub exponent: Option<f64>,
    pub regime: Option<String>,
    pub error: Option<String>,
}

/// Cells are laid out row-major by ticker index then interval index. The
/// grid is allocated up front and never grows.
#[derive(Debug, Clone)]
pub struct ResultTable {
    tickers: Vec<String>,
    intervals: Vec<Interval>,
    ticker_index: HashMap<String, usize>,
    cells: Vec<Option<TableCell>>,
}

impl ResultTable {
    /// Callers guarantee `tickers` and `intervals` hold no duplicates.
    pub fn new(tickers: Vec<String>, intervals: Vec<Interval>) -> Self {
        let ticker_index = tickers
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i))
            .collect();
        let cells = vec![None; tickers.len() * intervals.len()];
        Self {
            tickers,
            intervals,
            ticker_index,
            cells,
        }
    }

    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    fn slot(&self, key: &TaskKey) -> Option<usize> {
        let row = *self.ticker_index.get(&key.ticker)?;
        let col = self.intervals.iter().position(|i| *i == key.interval)?;
        Some(row * self.intervals.len() + col)
    }

    /// Writes the cell for `key`. Each cell accepts exactly one write.
    pub fn record(&mut self, key: &TaskKey, cell: TableCell) -> Result<(), TableError> {
        let slot = self.slot(key).ok_or_else(|| TableError::UnknownKey {
            ticker: key.ticker.clone(),
            interval: key.interval,
        })?;
        match &mut self.cells[slot] {
            Some(_) => Err(TableError::DuplicateKey {
                ticker: key.ticker.clone(),
                interval: key.interval,
            }),
            empty => {
                *empty = Some(cell);
                Ok(())
            }
        }
    }

    pub fn get(&self, key: &TaskKey) -> Option<&TableCell> {
        self.slot(key).and_then(|slot| self.cells[slot].as_ref())
    }

    pub fn len(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.cells.len()
    }

    pub fn is_complete(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    /// Keys of the cross product that have not been recorded yet.
    pub fn missing_keys(&self) -> Vec<TaskKey> {
        self.keys()
            .zip(&self.cells)
            .filter(|(_, cell)| cell.is_none())
            .map(|(key, _)| key)
            .collect()
    }

    /// Every key of the cross product in configured order.
    pub fn keys(&self) -> impl Iterator<Item = TaskKey> + '_ {
        self.tickers.iter().flat_map(move |ticker| {
            self.intervals.iter().map(move |interval| TaskKey {
                ticker: ticker.clone(),
                interval: *interval,
            })
        })
    }

    /// Recorded cells in configured order.
    pub fn iter(&self) -> impl Iterator<Item = (TaskKey, &TableCell)> + '_ {
        self.keys()
            .zip(&self.cells)
            .filter_map(|(key, cell)| cell.as_ref().map(|c| (key, c)))
    }

    pub fn rows(&self) -> Vec<TableRow> {
        self.iter()
            .map(|(key, cell)| TableRow {
                ticker: key.ticker,
                interval: key.interval,
                exponent: cell.exponent(),
                regime: cell.classification.regime().map(|r| r.to_string()),
                error: cell.result.as_ref().err().map(|e| e.to_string()),
            })
            .collect()
    }
}
