//! Free-game trigger bookkeeping

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::{EvalError, EvalResult};
use crate::win::WinOutcome;

/// Trigger award attached to a win amount
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TriggerAward {
    pub name: String,
    /// Games awarded
    pub count: u32,
    /// Lower value plays first
    #[serde(default)]
    pub priority: u32,
    /// Cap on total games of one activation
    #[serde(default)]
    pub max_total: Option<u32>,
    /// Cap on retriggers of one activation
    #[serde(default)]
    pub max_retriggers: Option<u32>,
}

impl TriggerAward {
    pub fn new(name: impl Into<String>, count: u32) -> Self {
        Self {
            name: name.into(),
            count,
            priority: 0,
            max_total: None,
            max_retriggers: None,
        }
    }

    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_limits(mut self, max_total: Option<u32>, max_retriggers: Option<u32>) -> Self {
        self.max_total = max_total;
        self.max_retriggers = max_retriggers;
        self
    }
}

/// A running trigger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveTrigger {
    pub name: String,
    pub priority: u32,
    pub played: u32,
    pub total: u32,
    pub retriggers: u32,
    pub max_total: Option<u32>,
    pub max_retriggers: Option<u32>,
}

impl ActiveTrigger {
    pub fn new(award: &TriggerAward) -> Self {
        let total = award
            .max_total
            .map_or(award.count, |max| award.count.min(max));
        Self {
            name: award.name.clone(),
            priority: award.priority,
            played: 0,
            total,
            retriggers: 0,
            max_total: award.max_total,
            max_retriggers: award.max_retriggers,
        }
    }

    /// Games left to play
    pub fn remaining(&self) -> u32 {
        self.total.saturating_sub(self.played)
    }

    pub fn is_complete(&self) -> bool {
        self.remaining() == 0
    }

    /// Add games; returns false when the retrigger limit is already reached
    pub fn retrigger(&mut self, count: u32) -> bool {
        if self.max_retriggers.is_some_and(|max| self.retriggers >= max) {
            return false;
        }
        let total = self.total.saturating_add(count);
        self.total = self.max_total.map_or(total, |max| total.min(max));
        self.retriggers += 1;
        true
    }

    /// Consume one game; returns false when none remain
    pub fn play(&mut self) -> bool {
        if self.is_complete() {
            return false;
        }
        self.played += 1;
        true
    }

    /// End the trigger early, keeping its counters
    pub fn stop(&mut self) {
        self.total = self.played;
    }
}

/// Registry of active triggers, one per name
#[derive(Debug, Clone, Default)]
pub struct TriggerManager {
    /// Registration order breaks priority ties
    triggers: Vec<ActiveTrigger>,
}

impl TriggerManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an award, retriggering when the name is already active
    ///
    /// Returns whether games were added.
    pub fn trigger(&mut self, award: &TriggerAward) -> EvalResult<bool> {
        if award.count == 0 {
            return Err(EvalError::precondition(format!(
                "trigger {} awards no games",
                award.name
            )));
        }

        if let Some(active) = self.triggers.iter_mut().find(|t| t.name == award.name) {
            let added = active.retrigger(award.count);
            debug!(
                "Retrigger {} (+{}): {}/{}",
                award.name, award.count, active.played, active.total
            );
            return Ok(added);
        }

        debug!("Trigger {} with {} games", award.name, award.count);
        self.triggers.push(ActiveTrigger::new(award));
        Ok(true)
    }

    /// Register every trigger carried by the wins, in outcome order
    pub fn trigger_from_outcome(&mut self, outcome: &WinOutcome) -> EvalResult<usize> {
        let mut registered = 0;
        for award in outcome.items.iter().flat_map(|w| w.triggers.iter()) {
            if self.trigger(award)? {
                registered += 1;
            }
        }
        Ok(registered)
    }

    /// Consume one game of the named trigger
    pub fn play(&mut self, name: &str) -> bool {
        match self.triggers.iter_mut().find(|t| t.name == name) {
            Some(active) => active.play(),
            None => {
                warn!("Play requested for unknown trigger {}", name);
                false
            }
        }
    }

    /// Incomplete trigger with the lowest priority value
    pub fn get_priority_trigger(&self) -> Option<&ActiveTrigger> {
        self.triggers
            .iter()
            .filter(|t| !t.is_complete())
            .min_by_key(|t| t.priority)
    }

    /// Stop the named trigger; it stays registered until cleared
    pub fn stop_trigger(&mut self, name: &str) -> bool {
        match self.triggers.iter_mut().find(|t| t.name == name) {
            Some(active) => {
                active.stop();
                true
            }
            None => {
                warn!("Stop requested for unknown trigger {}", name);
                false
            }
        }
    }

    pub fn clear_triggers(&mut self) {
        self.triggers.clear();
    }

    pub fn get(&self, name: &str) -> Option<&ActiveTrigger> {
        self.triggers.iter().find(|t| t.name == name)
    }

    pub fn len(&self) -> usize {
        self.triggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_and_play() {
        let mut manager = TriggerManager::new();
        assert!(manager.trigger(&TriggerAward::new("FS", 2)).unwrap());

        assert!(manager.play("FS"));
        assert!(manager.play("FS"));
        assert!(!manager.play("FS"));
        assert!(manager.get("FS").unwrap().is_complete());
        assert!(!manager.play("missing"));
    }

    #[test]
    fn test_retrigger_limits() {
        let mut manager = TriggerManager::new();
        let award = TriggerAward::new("FS", 10).with_limits(Some(25), Some(1));

        manager.trigger(&award).unwrap();
        assert!(manager.trigger(&award).unwrap());
        assert_eq!(manager.get("FS").unwrap().total, 20);

        // Second retrigger exceeds max_retriggers
        assert!(!manager.trigger(&award).unwrap());
        assert_eq!(manager.get("FS").unwrap().total, 20);
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn test_max_total_caps_retrigger() {
        let mut active = ActiveTrigger::new(&TriggerAward::new("FS", 10).with_limits(Some(15), None));
        assert!(active.retrigger(10));
        assert_eq!(active.total, 15);
        assert_eq!(active.retriggers, 1);
    }

    #[test]
    fn test_zero_count_rejected() {
        let mut manager = TriggerManager::new();
        assert!(manager.trigger(&TriggerAward::new("FS", 0)).is_err());
        assert!(manager.is_empty());
    }

    #[test]
    fn test_priority_trigger() {
        let mut manager = TriggerManager::new();
        manager.trigger(&TriggerAward::new("Bonus", 1).with_priority(5)).unwrap();
        manager.trigger(&TriggerAward::new("FS", 3).with_priority(1)).unwrap();
        manager.trigger(&TriggerAward::new("Pick", 1).with_priority(1)).unwrap();

        assert_eq!(manager.get_priority_trigger().unwrap().name, "FS");

        assert!(manager.stop_trigger("FS"));
        assert_eq!(manager.get_priority_trigger().unwrap().name, "Pick");
        // Stopped triggers stay registered
        assert_eq!(manager.len(), 3);

        manager.clear_triggers();
        assert!(manager.get_priority_trigger().is_none());
    }
}
