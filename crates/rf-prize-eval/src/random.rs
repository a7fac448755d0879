//! Random number capability
//!
//! The engine never owns an RNG. Every stage that needs entropy takes a
//! `&mut dyn RandomSource`, so a round can be replayed from a recorded log.

use std::collections::{HashMap, VecDeque};

use rand::prelude::*;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::error::{EvalError, EvalResult};

/// Materialize the pool for picks without replacement below this size
const MAX_MATERIALIZED_POOL: u64 = 1 << 16;

/// A request for `count` integers in `[low, high]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RandomRequest {
    pub count: usize,
    pub low: u64,
    pub high: u64,
    /// `None` = independent draws; `Some(d)` = each value may appear at most `d + 1` times
    #[serde(default)]
    pub allowed_duplicates: Option<u32>,
}

impl RandomRequest {
    /// Single draw in `[low, high]`
    pub fn single(low: u64, high: u64) -> Self {
        Self {
            count: 1,
            low,
            high,
            allowed_duplicates: None,
        }
    }

    /// `count` independent draws
    pub fn many(count: usize, low: u64, high: u64) -> Self {
        Self {
            count,
            low,
            high,
            allowed_duplicates: None,
        }
    }

    /// `count` draws where each value appears at most `allowed_duplicates + 1` times
    pub fn pick(count: usize, low: u64, high: u64, allowed_duplicates: u32) -> Self {
        Self {
            count,
            low,
            high,
            allowed_duplicates: Some(allowed_duplicates),
        }
    }

    /// Number of distinct values in the range
    pub fn range_size(&self) -> u64 {
        // high >= low is validated first, so only the full u64 range can overflow
        (self.high - self.low).saturating_add(1)
    }

    /// Size of the pool for picks without replacement (`None` when unlimited)
    pub fn pool_size(&self) -> Option<u64> {
        self.allowed_duplicates
            .map(|d| self.range_size().saturating_mul(u64::from(d) + 1))
    }

    /// Reject malformed requests before drawing anything
    pub fn validate(&self) -> EvalResult<()> {
        if self.low > self.high {
            return Err(EvalError::precondition(format!(
                "random range low {} exceeds high {}",
                self.low, self.high
            )));
        }
        if let Some(available) = self.pool_size() {
            let requested = self.count as u64;
            if requested > available {
                return Err(EvalError::PickCount {
                    requested,
                    available,
                });
            }
        }
        Ok(())
    }

    fn contains(&self, value: u64) -> bool {
        (self.low..=self.high).contains(&value)
    }
}

/// Source of uniformly distributed integers
pub trait RandomSource {
    /// Draw the numbers for one request
    fn random_numbers(&mut self, request: &RandomRequest) -> EvalResult<Vec<u64>>;

    /// Draw several requests, results in request order
    fn random_numbers_batch(&mut self, requests: &[RandomRequest]) -> EvalResult<Vec<Vec<u64>>> {
        requests.iter().map(|r| self.random_numbers(r)).collect()
    }
}

/// `StdRng`-backed source
pub struct StdRandomSource {
    rng: StdRng,
}

impl StdRandomSource {
    /// Seed for reproducible results
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Seed from the operating system
    pub fn from_os() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    fn pick_materialized(&mut self, request: &RandomRequest, copies: u64) -> Vec<u64> {
        let mut pool: Vec<u64> = (request.low..=request.high)
            .flat_map(|v| std::iter::repeat_n(v, copies as usize))
            .collect();
        let (picked, _) = pool.partial_shuffle(&mut self.rng, request.count);
        picked.to_vec()
    }

    fn pick_rejecting(&mut self, request: &RandomRequest, copies: u64) -> Vec<u64> {
        let mut seen: HashMap<u64, u64> = HashMap::with_capacity(request.count);
        let mut values = Vec::with_capacity(request.count);
        while values.len() < request.count {
            let v = self.rng.random_range(request.low..=request.high);
            let n = seen.entry(v).or_insert(0);
            if *n < copies {
                *n += 1;
                values.push(v);
            }
        }
        values
    }
}

impl RandomSource for StdRandomSource {
    fn random_numbers(&mut self, request: &RandomRequest) -> EvalResult<Vec<u64>> {
        request.validate()?;

        match request.allowed_duplicates {
            None => Ok((0..request.count)
                .map(|_| self.rng.random_range(request.low..=request.high))
                .collect()),
            Some(d) => {
                let copies = u64::from(d) + 1;
                let pool = request.pool_size().unwrap_or(u64::MAX);
                // Rejection sampling degrades when the pick nearly exhausts the pool
                if pool <= MAX_MATERIALIZED_POOL {
                    Ok(self.pick_materialized(request, copies))
                } else {
                    Ok(self.pick_rejecting(request, copies))
                }
            }
        }
    }
}

/// Replays a recorded sequence of draws
///
/// Used for regulatory replay and for tests that need exact stops.
#[derive(Debug, Clone, Default)]
pub struct ReplayRandomSource {
    values: VecDeque<u64>,
    consumed: usize,
}

impl ReplayRandomSource {
    pub fn new(values: impl IntoIterator<Item = u64>) -> Self {
        Self {
            values: values.into_iter().collect(),
            consumed: 0,
        }
    }

    /// Values not yet replayed
    pub fn remaining(&self) -> usize {
        self.values.len()
    }

    /// Values replayed so far
    pub fn consumed(&self) -> usize {
        self.consumed
    }
}

impl RandomSource for ReplayRandomSource {
    fn random_numbers(&mut self, request: &RandomRequest) -> EvalResult<Vec<u64>> {
        request.validate()?;

        if self.values.len() < request.count {
            return Err(EvalError::evaluation(format!(
                "replay log exhausted after {} values",
                self.consumed + self.values.len()
            )));
        }
        // Check the whole draw before consuming any of it
        if let Some(v) = self.values.iter().take(request.count).find(|v| !request.contains(**v)) {
            return Err(EvalError::precondition(format!(
                "replayed value {} outside [{}, {}]",
                v, request.low, request.high
            )));
        }

        let values: Vec<u64> = self.values.drain(..request.count).collect();
        self.consumed += values.len();
        Ok(values)
    }
}
