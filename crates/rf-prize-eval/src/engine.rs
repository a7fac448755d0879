//! Prize evaluation engine: one game cycle from stops to payable wins

use log::debug;
use serde::{Deserialize, Serialize};

use crate::anticipation::{AnticipationHit, SlotAnticipationCache, SlotAnticipationEvaluator};
use crate::bet::{BetDefinitions, process_bet_requirements};
use crate::cell::CellPopulationOutcome;
use crate::config::{EvaluationConfig, EvaluationMode};
use crate::denomination::apply_denomination;
use crate::error::{EvalError, EvalResult, checked_add};
use crate::evaluator::evaluate_patterns;
use crate::multiway::evaluate_multiway_patterns;
use crate::pattern::{PatternList, populate_multiway_patterns, populate_patterns};
use crate::population::{CellPopulation, populate, populate_from_stops};
use crate::prize::{PayStrategy, PrizeScale};
use crate::random::RandomSource;
use crate::strip::StripList;
use crate::win::WinOutcome;
use crate::win_cap::apply_win_cap;
use crate::win_processor::{
    execute_best_pay_per_way, execute_best_static_mode, execute_best_win_per_prize,
};

/// One paytable section: strips, window, patterns and prizes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paytable {
    pub name: String,
    pub strips: StripList,
    pub population: CellPopulation,
    pub patterns: PatternList,
    pub prizes: PrizeScale,
    #[serde(default)]
    pub config: EvaluationConfig,
}

impl Paytable {
    /// Check every cross reference before the first evaluation
    pub fn validate(&self) -> EvalResult<()> {
        self.config.validate()?;
        self.prizes.validate()?;
        for entry in &self.population.entries {
            self.strips.get(&entry.strip)?;
        }
        for name in &self.config.anticipation_prizes {
            self.prizes.get(name)?;
        }
        if self.config.mode.is_multiway() {
            if let Some(prize) = self
                .prizes
                .prizes
                .iter()
                .find(|p| p.pay == PayStrategy::PayAny)
            {
                return Err(EvalError::config(format!(
                    "{}: prize {} uses PayAny in a multiway paytable",
                    self.name, prize.name
                )));
            }
        }
        Ok(())
    }

    /// Parse and validate a JSON paytable
    pub fn from_json(json: &str) -> EvalResult<Self> {
        let paytable: Self = serde_json::from_str(json)
            .map_err(|e| EvalError::config(format!("invalid paytable: {e}")))?;
        paytable.validate()?;
        Ok(paytable)
    }
}

/// Result of one game cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOutcome {
    /// Populated symbol window
    pub window: CellPopulationOutcome,
    /// Payable wins in currency units
    pub wins: WinOutcome,
    /// Total win in credits, before denomination
    pub credits_won: u64,
    /// The win cap was reached this cycle
    pub cap_applied: bool,
    /// Near-wins of the configured anticipation prizes
    #[serde(default)]
    pub anticipation: Vec<AnticipationHit>,
}

/// Evaluate a populated window: match, apply bets, resolve, cap, denominate
///
/// `previously_paid` is what the round already paid in credits, counted
/// against the win cap.
pub fn evaluate_window(
    paytable: &Paytable,
    window: CellPopulationOutcome,
    bets: &BetDefinitions,
    previously_paid: u64,
) -> EvalResult<GameOutcome> {
    let config = &paytable.config;

    let candidates = if config.mode.is_multiway() {
        let populated = populate_multiway_patterns(&window, &paytable.patterns)?;
        evaluate_multiway_patterns(&paytable.prizes, &populated, &paytable.patterns.name)?
    } else {
        let populated = populate_patterns(&window, &paytable.patterns)?;
        evaluate_patterns(&paytable.prizes, &populated)?
    };
    let candidate_count = candidates.len();

    let betted = process_bet_requirements(candidates, &paytable.prizes, bets, &paytable.patterns)?;
    let resolved = match config.mode {
        EvaluationMode::Static => execute_best_static_mode(betted)?,
        EvaluationMode::Multiway => execute_best_win_per_prize(betted)?,
        EvaluationMode::PayPerWay => execute_best_pay_per_way(betted)?,
    };

    let (capped, cap_applied) = apply_win_cap(resolved, config.win_cap_limit, previously_paid)?;
    let credits_won = capped.total_win;
    let wins = apply_denomination(capped, config.denomination)?;

    debug!(
        "{}: {} candidates -> {} wins, {} credits{}",
        paytable.name,
        candidate_count,
        wins.len(),
        credits_won,
        if cap_applied { " (capped)" } else { "" }
    );

    Ok(GameOutcome {
        window,
        wins,
        credits_won,
        cap_applied,
        anticipation: Vec::new(),
    })
}

/// Populate a window from `rng` and evaluate it
pub fn evaluate_game(
    paytable: &Paytable,
    bets: &BetDefinitions,
    previously_paid: u64,
    rng: &mut dyn RandomSource,
) -> EvalResult<GameOutcome> {
    let window = populate(&paytable.strips, &paytable.population, rng)?;
    evaluate_window(paytable, window, bets, previously_paid)
}

/// Session statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub rounds: u64,
    pub total_bet: u64,
    /// Credits won
    pub total_win: u64,
    pub winning_rounds: u64,
    pub capped_rounds: u64,
}

impl SessionStats {
    /// Return to player in percent
    pub fn rtp(&self) -> f64 {
        if self.total_bet > 0 {
            (self.total_win as f64 / self.total_bet as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Share of winning rounds in percent
    pub fn hit_rate(&self) -> f64 {
        if self.rounds > 0 {
            (self.winning_rounds as f64 / self.rounds as f64) * 100.0
        } else {
            0.0
        }
    }

    fn record(&mut self, bet: u64, outcome: &GameOutcome) -> EvalResult<()> {
        self.rounds += 1;
        self.total_bet = checked_add(self.total_bet, bet, "session bet")?;
        self.total_win = checked_add(self.total_win, outcome.credits_won, "session win")?;
        if outcome.credits_won > 0 {
            self.winning_rounds += 1;
        }
        if outcome.cap_applied {
            self.capped_rounds += 1;
        }
        Ok(())
    }
}

/// Evaluation engine bound to one paytable section
///
/// Owns the anticipation cache of the section and keeps session totals.
#[derive(Debug)]
pub struct PrizeEvaluationEngine {
    paytable: Paytable,
    anticipation: SlotAnticipationCache,
    stats: SessionStats,
}

impl PrizeEvaluationEngine {
    pub fn new(paytable: Paytable) -> EvalResult<Self> {
        paytable.validate()?;
        Ok(Self {
            paytable,
            anticipation: SlotAnticipationCache::new(),
            stats: SessionStats::default(),
        })
    }

    pub fn from_json(json: &str) -> EvalResult<Self> {
        Self::new(Paytable::from_json(json)?)
    }

    pub fn paytable(&self) -> &Paytable {
        &self.paytable
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = SessionStats::default();
    }

    /// Play one cycle with stops drawn from `rng`
    pub fn play(
        &mut self,
        bets: &BetDefinitions,
        previously_paid: u64,
        rng: &mut dyn RandomSource,
    ) -> EvalResult<GameOutcome> {
        let window = populate(&self.paytable.strips, &self.paytable.population, rng)?;
        self.finish(window, bets, previously_paid)
    }

    /// Play one cycle from explicit virtual stops
    pub fn play_stops(
        &mut self,
        bets: &BetDefinitions,
        previously_paid: u64,
        virtual_stops: &[u64],
    ) -> EvalResult<GameOutcome> {
        let window =
            populate_from_stops(&self.paytable.strips, &self.paytable.population, virtual_stops)?;
        self.finish(window, bets, previously_paid)
    }

    fn finish(
        &mut self,
        window: CellPopulationOutcome,
        bets: &BetDefinitions,
        previously_paid: u64,
    ) -> EvalResult<GameOutcome> {
        let total_bet = bets.total_bet()?;
        let mut outcome = evaluate_window(&self.paytable, window, bets, previously_paid)?;
        outcome.anticipation = self.anticipate(&outcome.window)?;
        self.stats.record(total_bet, &outcome)?;
        Ok(outcome)
    }

    /// Near-wins of the configured anticipation prizes on line patterns
    fn anticipate(&self, window: &CellPopulationOutcome) -> EvalResult<Vec<AnticipationHit>> {
        let config = &self.paytable.config;
        if config.anticipation_prizes.is_empty() || config.mode.is_multiway() {
            return Ok(Vec::new());
        }
        let names: Vec<&str> = config.anticipation_prizes.iter().map(String::as_str).collect();
        let populated = populate_patterns(window, &self.paytable.patterns)?;
        SlotAnticipationEvaluator::new(&self.anticipation, self.paytable.name.as_str()).evaluate(
            &self.paytable.prizes,
            &names,
            &populated,
        )
    }
}
