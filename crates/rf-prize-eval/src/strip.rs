//! Weighted reel strips

use serde::{Deserialize, Serialize};

use crate::error::{EvalError, EvalResult, checked_add};

/// One strip position: symbol plus its selection weight
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stop {
    pub symbol: String,
    #[serde(default = "default_weight")]
    pub weight: u64,
}

fn default_weight() -> u64 {
    1
}

impl Stop {
    pub fn new(symbol: impl Into<String>, weight: u64) -> Self {
        Self {
            symbol: symbol.into(),
            weight,
        }
    }
}

#[derive(Deserialize)]
struct RawStrip {
    name: String,
    stops: Vec<Stop>,
}

/// A weighted reel strip
///
/// Virtual stops index the cumulative weight range `[0, total_weight)`,
/// physical stops index `stops`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawStrip")]
pub struct Strip {
    pub name: String,
    stops: Vec<Stop>,
    /// Exclusive upper bound of each stop's cumulative weight range
    #[serde(skip)]
    cumulative: Vec<u64>,
}

impl TryFrom<RawStrip> for Strip {
    type Error = EvalError;

    fn try_from(raw: RawStrip) -> EvalResult<Self> {
        Self::new(raw.name, raw.stops)
    }
}

impl Strip {
    /// Build a strip, validating weights
    pub fn new(name: impl Into<String>, stops: Vec<Stop>) -> EvalResult<Self> {
        let name = name.into();
        if stops.is_empty() {
            return Err(EvalError::precondition(format!("strip {name} has no stops")));
        }

        let mut cumulative = Vec::with_capacity(stops.len());
        let mut total = 0u64;
        for (index, stop) in stops.iter().enumerate() {
            if stop.weight == 0 {
                return Err(EvalError::precondition(format!(
                    "strip {name} stop {index} has zero weight"
                )));
            }
            total = checked_add(total, stop.weight, "strip total weight")?;
            cumulative.push(total);
        }

        Ok(Self {
            name,
            stops,
            cumulative,
        })
    }

    /// Unweighted strip (every stop weight 1)
    pub fn uniform<S: Into<String>>(
        name: impl Into<String>,
        symbols: impl IntoIterator<Item = S>,
    ) -> EvalResult<Self> {
        Self::new(name, symbols.into_iter().map(|s| Stop::new(s, 1)).collect())
    }

    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    /// Number of physical stops
    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Sum of all stop weights
    pub fn total_weight(&self) -> u64 {
        self.cumulative.last().copied().unwrap_or(0)
    }

    /// Symbol at a physical stop (wraps around)
    pub fn symbol_at(&self, physical_stop: usize) -> &str {
        &self.stops[physical_stop % self.stops.len()].symbol
    }

    /// Resolve a virtual stop to the physical stop whose weight range contains it
    pub fn stop_index_for_weight(&self, virtual_stop: u64) -> EvalResult<usize> {
        if virtual_stop >= self.total_weight() {
            return Err(EvalError::precondition(format!(
                "virtual stop {} outside strip {} weight {}",
                virtual_stop,
                self.name,
                self.total_weight()
            )));
        }
        // First stop whose exclusive upper bound is above the virtual stop
        Ok(self.cumulative.partition_point(|&end| end <= virtual_stop))
    }

    /// Cumulative weight range `[start, end)` covered by a physical stop
    pub fn weight_range(&self, physical_stop: usize) -> Option<(u64, u64)> {
        let end = *self.cumulative.get(physical_stop)?;
        let start = if physical_stop == 0 {
            0
        } else {
            self.cumulative[physical_stop - 1]
        };
        Some((start, end))
    }

    /// Move a physical stop by a signed distance, wrapping at strip length
    pub fn shift_stop(&self, physical_stop: usize, distance: i64) -> usize {
        let len = self.stops.len() as i64;
        (physical_stop as i64 + distance).rem_euclid(len) as usize
    }
}

/// Named collection of strips
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StripList {
    pub strips: Vec<Strip>,
}

impl StripList {
    pub fn new(strips: Vec<Strip>) -> Self {
        Self { strips }
    }

    /// Get strip by name
    pub fn get(&self, name: &str) -> EvalResult<&Strip> {
        self.strips
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| EvalError::MissingStrip(name.to_string()))
    }
}
