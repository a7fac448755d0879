//! Pipeline Test Suite
//!
//! End-to-end game cycles over JSON paytables:
//! - Line matching through bet gating and best-static resolution
//! - Multiway ways pays with per-way deduplication
//! - Win cap interaction with free-game triggers
//! - Replay determinism and paytable loading errors

use rf_prize_eval::{
    BetDefinitions, ErrorKind, EvaluationMode, Paytable, PatternBet, PrizeEvaluationEngine,
    ReplayRandomSource, RoundWagerUpPlayoffEvaluator, StdRandomSource, TriggerManager,
    evaluate_game,
};
use serde_json::{Value, json};

// ═══════════════════════════════════════════════════════════════════════════════
// TEST FIXTURES
// ═══════════════════════════════════════════════════════════════════════════════

/// 3×3 window with one middle payline
///
/// Physical stop 0 shows K Q J on the middle row, stops (2, 0, 2) show Q Q Q.
fn line_paytable_json() -> Value {
    json!({
        "name": "base",
        "strips": {
            "strips": [
                { "name": "S1", "stops": [{ "symbol": "A" }, { "symbol": "K" }, { "symbol": "B" }, { "symbol": "Q" }] },
                { "name": "S2", "stops": [{ "symbol": "A" }, { "symbol": "Q" }, { "symbol": "B" }, { "symbol": "Q" }] },
                { "name": "S3", "stops": [{ "symbol": "A" }, { "symbol": "J" }, { "symbol": "B" }, { "symbol": "Q" }] }
            ]
        },
        "population": {
            "name": "window",
            "entries": [
                { "name": "R1", "strip": "S1", "cells": [{ "row": 0, "column": 0 }, { "row": 1, "column": 0 }, { "row": 2, "column": 0 }] },
                { "name": "R2", "strip": "S2", "cells": [{ "row": 0, "column": 1 }, { "row": 1, "column": 1 }, { "row": 2, "column": 1 }] },
                { "name": "R3", "strip": "S3", "cells": [{ "row": 0, "column": 2 }, { "row": 1, "column": 2 }, { "row": 2, "column": 2 }] }
            ]
        },
        "patterns": {
            "name": "lines",
            "patterns": [
                { "name": "MID", "cells": [{ "row": 1, "column": 0 }, { "row": 1, "column": 1 }, { "row": 1, "column": 2 }] }
            ]
        },
        "prizes": {
            "name": "base",
            "prizes": [
                {
                    "name": "3Q",
                    "order": "Unordered",
                    "pay": "PayAny",
                    "symbols": [{ "id": "Q" }],
                    "pays": [{
                        "count": 3,
                        "amounts": [
                            { "amount": 500, "required_patterns": [{ "pattern": "ANY", "bet": "max" }] },
                            { "amount": 50, "triggers": [{ "name": "FS", "count": 10 }] }
                        ]
                    }]
                }
            ]
        },
        "config": { "name": "Line Test" }
    })
}

/// 4×2 ways window; reels 1-3 show A A at stop 0, reel 4 never shows A
fn ways_paytable_json() -> Value {
    let ways_strip = json!([{ "symbol": "A" }, { "symbol": "A" }, { "symbol": "K" }, { "symbol": "K" }]);
    let cells: Vec<Value> = (0..4)
        .flat_map(|column| (0..2).map(move |row| json!({ "row": row, "column": column })))
        .collect();
    let entries: Vec<Value> = (0..4)
        .map(|column| {
            json!({
                "name": format!("R{}", column + 1),
                "strip": if column < 3 { "W" } else { "X" },
                "cells": [{ "row": 0, "column": column }, { "row": 1, "column": column }]
            })
        })
        .collect();

    json!({
        "name": "ways",
        "strips": {
            "strips": [
                { "name": "W", "stops": ways_strip },
                { "name": "X", "stops": [{ "symbol": "K" }, { "symbol": "Q" }, { "symbol": "K" }, { "symbol": "Q" }] }
            ]
        },
        "population": { "name": "window", "entries": entries },
        "patterns": { "name": "ways", "patterns": [{ "name": "WAYS", "cells": cells }] },
        "prizes": {
            "name": "ways",
            "prizes": [{
                "name": "A-ways",
                "pattern": "ways",
                "order": "Unordered",
                "pay": "PayLeft",
                "symbols": [{ "id": "A" }],
                "pays": [
                    { "count": 2, "amounts": [{ "amount": 1, "modification": "TimesMultiplierTimesBetOnPattern" }] },
                    { "count": 3, "amounts": [{ "amount": 1, "modification": "TimesMultiplierTimesBetOnPattern" }] },
                    { "count": 4, "amounts": [{ "amount": 5, "modification": "TimesMultiplierTimesBetOnPattern" }] }
                ]
            }]
        },
        "config": { "name": "Ways Test", "mode": "PayPerWay" }
    })
}

fn paytable(value: Value) -> Paytable {
    let _ = env_logger::builder().is_test(true).try_init();
    Paytable::from_json(&value.to_string()).unwrap()
}

fn bet(pattern: &str, amount: u64) -> BetDefinitions {
    BetDefinitions::new(vec![PatternBet::new(pattern, amount)])
}

// ═══════════════════════════════════════════════════════════════════════════════
// LINE GAMES
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_three_q_needs_three_q() {
    let mut engine = PrizeEvaluationEngine::new(paytable(line_paytable_json())).unwrap();

    let miss = engine.play_stops(&bet("MID", 1), 0, &[0, 0, 0]).unwrap();
    let middle: Vec<String> = miss.window.symbol_grid().into_iter().map(|c| c[1].clone()).collect();
    assert_eq!(middle, vec!["K", "Q", "J"]);
    assert!(miss.wins.is_empty());

    let hit = engine.play_stops(&bet("MID", 1), 0, &[2, 0, 2]).unwrap();
    assert_eq!(hit.wins.len(), 1);
    let win = &hit.wins.items[0];
    assert_eq!(win.name, "3Q_MID");
    assert_eq!(win.pattern.count, 3);
    assert_eq!(win.pattern.cells.len(), 3);
    assert_eq!(win.win_amount, 50);

    assert_eq!(engine.stats().rounds, 2);
    assert_eq!(engine.stats().winning_rounds, 1);
}

#[test]
fn test_max_bet_award_requires_max_bet() {
    let table = paytable(line_paytable_json());

    let mut rng = ReplayRandomSource::new([2, 0, 2]);
    let regular = evaluate_game(&table, &bet("MID", 1), 0, &mut rng).unwrap();
    assert_eq!(regular.wins.total_win, 50);

    let mut rng = ReplayRandomSource::new([2, 0, 2]);
    let max = evaluate_game(&table, &bet("MID", 1).with_max(true), 0, &mut rng).unwrap();
    assert_eq!(max.wins.total_win, 500);
}

#[test]
fn test_max_only_prize_removed_without_max_bet() {
    let mut json = line_paytable_json();
    let amounts = &mut json["prizes"]["prizes"][0]["pays"][0]["amounts"];
    *amounts = json!([{ "amount": 500, "required_patterns": [{ "pattern": "ANY", "bet": "max" }] }]);
    let table = paytable(json);

    let mut rng = ReplayRandomSource::new([2, 0, 2]);
    let outcome = evaluate_game(&table, &bet("MID", 1), 0, &mut rng).unwrap();
    assert!(outcome.wins.is_empty());
    assert_eq!(outcome.credits_won, 0);
}

#[test]
fn test_cap_strips_triggers() {
    let table = paytable(line_paytable_json());

    let mut rng = ReplayRandomSource::new([2, 0, 2]);
    let uncapped = evaluate_game(&table, &bet("MID", 1), 0, &mut rng).unwrap();
    let mut manager = TriggerManager::new();
    assert_eq!(manager.trigger_from_outcome(&uncapped.wins).unwrap(), 1);
    assert_eq!(manager.get_priority_trigger().unwrap().total, 10);

    let mut json = line_paytable_json();
    json["config"]["win_cap_limit"] = json!(100);
    let capped_table = paytable(json);

    let mut rng = ReplayRandomSource::new([2, 0, 2]);
    let capped = evaluate_game(&capped_table, &bet("MID", 1), 70, &mut rng).unwrap();
    assert!(capped.cap_applied);
    assert_eq!(capped.credits_won, 30);
    assert!(!capped.wins.has_triggers());

    let mut manager = TriggerManager::new();
    assert_eq!(manager.trigger_from_outcome(&capped.wins).unwrap(), 0);
}

#[test]
fn test_denomination_scales_payout() {
    let mut json = line_paytable_json();
    json["config"]["denomination"] = json!(25);
    let table = paytable(json);

    let mut rng = ReplayRandomSource::new([2, 0, 2]);
    let outcome = evaluate_game(&table, &bet("MID", 1), 0, &mut rng).unwrap();
    assert_eq!(outcome.credits_won, 50);
    assert_eq!(outcome.wins.total_win, 1250);
}

// ═══════════════════════════════════════════════════════════════════════════════
// WAYS GAMES
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_ways_pay_each_way_once() {
    let table = paytable(ways_paytable_json());
    let mut rng = ReplayRandomSource::new([0, 0, 0, 0]);
    let outcome = evaluate_game(&table, &bet("WAYS", 2), 0, &mut rng).unwrap();

    // 3-reel ways claim every 2-reel way, reel 4 breaks the scan
    assert_eq!(outcome.wins.len(), 1);
    let win = &outcome.wins.items[0];
    assert_eq!(win.pattern.count, 3);
    assert_eq!(win.multiplier, 8);
    assert_eq!(win.ways.len(), 8);
    assert_eq!(win.win_amount, 16);
}

#[test]
fn test_ways_best_win_per_prize() {
    let mut json = ways_paytable_json();
    json["config"]["mode"] = json!("Multiway");
    let table = paytable(json);
    assert_eq!(table.config.mode, EvaluationMode::Multiway);

    let mut rng = ReplayRandomSource::new([0, 0, 0, 0]);
    let outcome = evaluate_game(&table, &bet("WAYS", 1), 0, &mut rng).unwrap();
    assert_eq!(outcome.wins.len(), 1);
    assert_eq!(outcome.wins.items[0].win_amount, 8);
}

#[test]
fn test_ways_reject_pay_any() {
    let mut json = ways_paytable_json();
    json["prizes"]["prizes"][0]["pay"] = json!("PayAny");
    let err = Paytable::from_json(&json.to_string()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

// ═══════════════════════════════════════════════════════════════════════════════
// DETERMINISM & LOADING
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_seeded_rounds_replay_identically() {
    let table = paytable(line_paytable_json());
    let bets = bet("MID", 1);

    let mut first = StdRandomSource::seeded(2024);
    let mut second = StdRandomSource::seeded(2024);
    for _ in 0..50 {
        let a = evaluate_game(&table, &bets, 0, &mut first).unwrap();
        let b = evaluate_game(&table, &bets, 0, &mut second).unwrap();
        assert_eq!(a, b);
    }
}

#[test]
fn test_paytable_roundtrip() {
    let table = paytable(line_paytable_json());
    let json = serde_json::to_string(&table).unwrap();
    assert_eq!(Paytable::from_json(&json).unwrap(), table);
}

#[test]
fn test_paytable_errors() {
    let mut json = line_paytable_json();
    json["population"]["entries"][2]["strip"] = json!("S9");
    let err = Paytable::from_json(&json.to_string()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);

    let mut json = line_paytable_json();
    json["strips"]["strips"][0]["stops"][1]["weight"] = json!(0);
    assert!(Paytable::from_json(&json.to_string()).is_err());

    let mut rng = ReplayRandomSource::new([0, 0]);
    let err = evaluate_game(&paytable(line_paytable_json()), &bet("MID", 1), 0, &mut rng).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Evaluation);
}

#[test]
fn test_round_up_playoff() {
    let playoff = RoundWagerUpPlayoffEvaluator::new(50, 100).unwrap();
    assert!(playoff.evaluate(&mut ReplayRandomSource::new([40])).unwrap());
    assert!(!playoff.evaluate(&mut ReplayRandomSource::new([60])).unwrap());
}
