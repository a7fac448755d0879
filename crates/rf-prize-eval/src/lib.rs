//! # rf-prize-eval: Prize Evaluation Engine for Reel-Strip Slots
//!
//! Turns a paytable section and a source of randomness into the payable wins
//! of one game cycle. Every stage is a pure function over owned values; the
//! only entropy comes from an injected [`RandomSource`], so any cycle can be
//! replayed from its recorded draws.
//!
//! ## Features
//!
//! - **Weighted strips**: virtual → physical stop lookup, offsets, shifts and partial respins
//! - **Line / scatter matching**: ordered and unordered prizes, five pay strategies, grouped symbols
//! - **Multiway matching**: cross-product way tracking, ways and jumbo pays
//! - **Conflict resolution**: best per pattern, best per prize, or each way paid once
//! - **Bet gating, win cap, denomination**: checked arithmetic throughout
//! - **Triggers, playoffs, anticipation**: free-game registry, round-up playoff, near-win cache
//!
//! ## Architecture
//!
//! ```text
//! StripList + CellPopulation ── RandomSource
//!     │
//!     v
//! CellPopulationOutcome (symbol window)
//!     │
//!     ├── PatternList ──> PrizeEvaluator ─────────┐
//!     └── PatternList ──> MultiwayPrizeEvaluator ─┤
//!                                                 v
//!                              WinOutcome (candidates)
//!                                                 │
//!     BetProcessor → WinProcessor (WayTree) → WinCap → Denomination
//!                                                 │
//!                                                 v
//!                                           GameOutcome
//! ```

pub mod anticipation;
pub mod bet;
pub mod cell;
pub mod config;
pub mod denomination;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod multiway;
pub mod pattern;
pub mod playoff;
pub mod population;
pub mod prize;
pub mod random;
pub mod strip;
pub mod trigger;
pub mod way_tree;
pub mod win;
pub mod win_cap;
pub mod win_processor;

pub use anticipation::*;
pub use bet::*;
pub use cell::*;
pub use config::*;
pub use denomination::*;
pub use engine::*;
pub use error::*;
pub use evaluator::*;
pub use multiway::*;
pub use pattern::*;
pub use playoff::*;
pub use population::*;
pub use prize::*;
pub use random::*;
pub use strip::*;
pub use trigger::*;
pub use way_tree::*;
pub use win::*;
pub use win_cap::*;
pub use win_processor::*;
