//! Round-up playoff for a partial wager

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{EvalError, EvalResult};
use crate::random::{RandomRequest, RandomSource};

/// Plays a residual credit amount up to a full bet at proportional odds
///
/// The player keeps `residual_amount` of an `expected_bet_amount` wager and
/// wins the full bet with probability `residual / expected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundWagerUpPlayoffEvaluator {
    pub residual_amount: u64,
    pub expected_bet_amount: u64,
}

impl RoundWagerUpPlayoffEvaluator {
    pub fn new(residual_amount: u64, expected_bet_amount: u64) -> EvalResult<Self> {
        let evaluator = Self {
            residual_amount,
            expected_bet_amount,
        };
        evaluator.validate()?;
        Ok(evaluator)
    }

    pub fn validate(&self) -> EvalResult<()> {
        if self.expected_bet_amount == 0 {
            return Err(EvalError::precondition("expected bet amount must be positive"));
        }
        if self.residual_amount > self.expected_bet_amount {
            return Err(EvalError::precondition(format!(
                "residual {} exceeds expected bet {}",
                self.residual_amount, self.expected_bet_amount
            )));
        }
        Ok(())
    }

    /// Draw in `[1, expected]`; the playoff wins when the residual covers the draw
    pub fn evaluate(&self, rng: &mut dyn RandomSource) -> EvalResult<bool> {
        self.validate()?;
        let draw = rng
            .random_numbers(&RandomRequest::single(1, self.expected_bet_amount))?
            .first()
            .copied()
            .ok_or_else(|| EvalError::evaluation("random source returned no value"))?;
        let won = self.residual_amount >= draw;
        debug!(
            "Playoff {}/{} drew {}: {}",
            self.residual_amount,
            self.expected_bet_amount,
            draw,
            if won { "won" } else { "lost" }
        );
        Ok(won)
    }
}
