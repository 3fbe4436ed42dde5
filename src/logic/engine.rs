use crate::db::KeyValueStore;
use crate::error::{Result, RunGearError};
use crate::models::{ClothingRule, RuleId, WeatherSnapshot};
use tracing::warn;

/// Key the serialized rule set lives under.
pub const RULES_KEY: &str = "rules";

/// A draft entry: the rule plus the handle edit operations refer to it by.
#[derive(Debug, Clone)]
pub struct DraftRule {
    pub id: RuleId,
    pub rule: ClothingRule,
}

/// Owns the rule set and its editing lifecycle.
///
/// Two collections live here: the committed set, which drives
/// recommendations and mirrors what storage holds, and the draft, which
/// edit operations mutate freely. Nothing touches storage until
/// [`RuleEngine::commit`] or [`RuleEngine::reset_to_defaults`]; a draft
/// abandoned mid-edit is simply lost.
pub struct RuleEngine<S: KeyValueStore> {
    store: S,
    committed: Vec<ClothingRule>,
    draft: Vec<DraftRule>,
    next_id: u64,
}

impl<S: KeyValueStore> RuleEngine<S> {
    /// Load the committed rule set from storage. An absent or unreadable
    /// value falls back to the defaults without surfacing an error.
    pub fn load(store: S) -> Self {
        let committed = match store.get(RULES_KEY) {
            Ok(Some(json)) => match serde_json::from_str::<Vec<ClothingRule>>(&json) {
                Ok(rules) => rules,
                Err(e) => {
                    warn!("Stored rules unreadable, using defaults: {}", e);
                    ClothingRule::defaults()
                }
            },
            Ok(None) => ClothingRule::defaults(),
            Err(e) => {
                warn!("Failed to read stored rules, using defaults: {}", e);
                ClothingRule::defaults()
            }
        };

        let mut engine = Self {
            store,
            committed,
            draft: Vec::new(),
            next_id: 0,
        };
        engine.rebuild_draft();
        engine
    }

    /// Names of every committed rule the snapshot satisfies, in rule-set
    /// order. All matching rules are returned; duplicates fire separately.
    pub fn evaluate(&self, weather: &WeatherSnapshot) -> Vec<String> {
        self.committed
            .iter()
            .filter(|rule| rule.matches(weather))
            .map(|rule| rule.name.clone())
            .collect()
    }

    pub fn committed_rules(&self) -> &[ClothingRule] {
        &self.committed
    }

    pub fn list_draft(&self) -> &[DraftRule] {
        &self.draft
    }

    /// Append a blank rule to the draft and hand back its id for editing.
    pub fn add_draft_rule(&mut self, name: impl Into<String>) -> RuleId {
        let id = self.fresh_id();
        self.draft.push(DraftRule {
            id,
            rule: ClothingRule::new(name),
        });
        id
    }

    pub fn update_draft_rule(&mut self, id: RuleId, rule: ClothingRule) -> Result<()> {
        let entry = self
            .draft
            .iter_mut()
            .find(|entry| entry.id == id)
            .ok_or(RunGearError::UnknownRuleId(id))?;
        entry.rule = rule;
        Ok(())
    }

    pub fn delete_draft_rule(&mut self, id: RuleId) -> Result<()> {
        let index = self
            .draft
            .iter()
            .position(|entry| entry.id == id)
            .ok_or(RunGearError::UnknownRuleId(id))?;
        self.draft.remove(index);
        Ok(())
    }

    /// Persist the draft and make it the committed set. Storage is written
    /// first; if the write fails the committed set is untouched.
    pub fn commit(&mut self) -> Result<()> {
        let rules: Vec<ClothingRule> = self.draft.iter().map(|entry| entry.rule.clone()).collect();
        let json = serde_json::to_string(&rules)?;
        self.store.set(RULES_KEY, &json)?;
        self.committed = rules;
        Ok(())
    }

    /// Throw away draft edits, restoring it to the committed set.
    pub fn discard_draft(&mut self) {
        self.rebuild_draft();
    }

    /// Replace draft and committed set with the defaults and persist
    /// immediately. No separate commit step, and no way back short of
    /// re-entering the old rules.
    pub fn reset_to_defaults(&mut self) -> Result<()> {
        let defaults = ClothingRule::defaults();
        let json = serde_json::to_string(&defaults)?;
        self.store.set(RULES_KEY, &json)?;
        self.committed = defaults;
        self.rebuild_draft();
        Ok(())
    }

    fn rebuild_draft(&mut self) {
        let rules = self.committed.clone();
        let mut draft = Vec::with_capacity(rules.len());
        for rule in rules {
            let id = self.fresh_id();
            draft.push(DraftRule { id, rule });
        }
        self.draft = draft;
    }

    fn fresh_id(&mut self) -> RuleId {
        let id = RuleId(self.next_id);
        self.next_id += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConditionCategory, FeelBound};
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Minimal stand-in for the SQLite settings table.
    #[derive(Default)]
    struct MemoryStore {
        values: RefCell<HashMap<String, String>>,
    }

    impl MemoryStore {
        fn with_rules(json: &str) -> Self {
            let store = Self::default();
            store
                .values
                .borrow_mut()
                .insert(RULES_KEY.to_string(), json.to_string());
            store
        }
    }

    impl KeyValueStore for MemoryStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            Ok(self.values.borrow().get(key).cloned())
        }

        fn set(&self, key: &str, value: &str) -> Result<()> {
            self.values
                .borrow_mut()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        fn remove(&self, key: &str) -> Result<()> {
            self.values.borrow_mut().remove(key);
            Ok(())
        }
    }

    fn snapshot(
        feels_like_f: f64,
        is_daytime: bool,
        condition: Option<ConditionCategory>,
    ) -> WeatherSnapshot {
        WeatherSnapshot {
            city: "Boston".to_string(),
            time: "now".to_string(),
            temp_f: feels_like_f,
            feels_like_f,
            condition,
            wind_mph: 5.0,
            is_daytime,
        }
    }

    #[test]
    fn empty_storage_loads_defaults() {
        let engine = RuleEngine::load(MemoryStore::default());
        assert_eq!(engine.committed_rules().len(), 10);
        assert_eq!(engine.list_draft().len(), 10);
    }

    #[test]
    fn unparsable_storage_loads_defaults() {
        let engine = RuleEngine::load(MemoryStore::with_rules("{not json"));
        assert_eq!(engine.committed_rules().len(), 10);
    }

    #[test]
    fn cold_snowy_day_recommendations() {
        let mut engine = RuleEngine::load(MemoryStore::default());
        engine.reset_to_defaults().unwrap();
        let names = engine.evaluate(&snapshot(10.0, true, Some(ConditionCategory::Snowing)));
        assert_eq!(
            names,
            [
                "winter hat",
                "gloves",
                "heavy jacket",
                "long-sleeve shirt",
                "tights",
            ]
        );
    }

    #[test]
    fn sunglasses_only_by_day_in_the_clear() {
        let engine = RuleEngine::load(MemoryStore::default());
        let day = engine.evaluate(&snapshot(70.0, true, Some(ConditionCategory::Clear)));
        assert!(day.contains(&"sunglasses".to_string()));
        let night = engine.evaluate(&snapshot(70.0, false, Some(ConditionCategory::Clear)));
        assert!(!night.contains(&"sunglasses".to_string()));
        let cloudy_day = engine.evaluate(&snapshot(70.0, true, Some(ConditionCategory::Cloudy)));
        assert!(!cloudy_day.contains(&"sunglasses".to_string()));
    }

    #[test]
    fn boundary_feel_is_inclusive_below_exclusive_above() {
        let engine = RuleEngine::load(MemoryStore::default());
        let at_35 = engine.evaluate(&snapshot(35.0, true, Some(ConditionCategory::Cloudy)));
        // 35 is the shorts lower bound (matches) and the tights upper bound
        // (does not match)
        assert!(at_35.contains(&"shorts".to_string()));
        assert!(!at_35.contains(&"tights".to_string()));
        assert!(!at_35.contains(&"winter hat".to_string()));
        assert!(!at_35.contains(&"light jacket".to_string()));
    }

    #[test]
    fn evaluate_is_pure() {
        let engine = RuleEngine::load(MemoryStore::default());
        let weather = snapshot(10.0, true, Some(ConditionCategory::Snowing));
        let first = engine.evaluate(&weather);
        let second = engine.evaluate(&weather);
        assert_eq!(first, second);
    }

    #[test]
    fn uncategorized_condition_matches_nothing() {
        let engine = RuleEngine::load(MemoryStore::default());
        assert!(engine.evaluate(&snapshot(50.0, true, None)).is_empty());
    }

    #[test]
    fn duplicate_names_both_fire() {
        let mut engine = RuleEngine::load(MemoryStore::default());
        for _ in 0..2 {
            let id = engine.add_draft_rule("buff");
            let mut rule = ClothingRule::new("buff");
            rule.min_feel = FeelBound::from_f64(-50.0);
            rule.max_feel = FeelBound::from_f64(150.0);
            rule.day = true;
            rule.night = true;
            rule.clear = true;
            engine.update_draft_rule(id, rule).unwrap();
        }
        engine.commit().unwrap();
        let names = engine.evaluate(&snapshot(50.0, true, Some(ConditionCategory::Clear)));
        assert_eq!(names.iter().filter(|n| n.as_str() == "buff").count(), 2);
    }

    #[test]
    fn draft_edits_do_not_affect_recommendations_until_commit() {
        let mut engine = RuleEngine::load(MemoryStore::default());
        let weather = snapshot(10.0, true, Some(ConditionCategory::Snowing));
        let before = engine.evaluate(&weather);

        let ids: Vec<RuleId> = engine.list_draft().iter().map(|e| e.id).collect();
        for id in ids {
            engine.delete_draft_rule(id).unwrap();
        }
        assert!(engine.list_draft().is_empty());
        assert_eq!(engine.evaluate(&weather), before);

        engine.commit().unwrap();
        assert!(engine.evaluate(&weather).is_empty());
    }

    #[test]
    fn update_unknown_id_fails_and_leaves_draft_unchanged() {
        let mut engine = RuleEngine::load(MemoryStore::default());
        let before: Vec<ClothingRule> =
            engine.list_draft().iter().map(|e| e.rule.clone()).collect();

        let result = engine.update_draft_rule(RuleId(9999), ClothingRule::new("ghost"));
        assert!(matches!(result, Err(RunGearError::UnknownRuleId(_))));

        let after: Vec<ClothingRule> = engine.list_draft().iter().map(|e| e.rule.clone()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn delete_unknown_id_fails() {
        let mut engine = RuleEngine::load(MemoryStore::default());
        let result = engine.delete_draft_rule(RuleId(9999));
        assert!(matches!(result, Err(RunGearError::UnknownRuleId(_))));
        assert_eq!(engine.list_draft().len(), 10);
    }

    #[test]
    fn discard_restores_draft_to_committed() {
        let mut engine = RuleEngine::load(MemoryStore::default());
        let committed: Vec<ClothingRule> = engine.committed_rules().to_vec();

        engine.add_draft_rule("arm warmers");
        let first_id = engine.list_draft()[0].id;
        engine.delete_draft_rule(first_id).unwrap();
        let next_id = engine.list_draft()[0].id;
        engine
            .update_draft_rule(next_id, ClothingRule::new("renamed"))
            .unwrap();

        engine.discard_draft();
        let draft: Vec<ClothingRule> = engine.list_draft().iter().map(|e| e.rule.clone()).collect();
        assert_eq!(draft, committed);
    }

    #[test]
    fn commit_round_trips_through_fresh_engine() {
        let store = MemoryStore::default();
        let mut engine = RuleEngine::load(store);
        let id = engine.add_draft_rule("rain shell");
        let mut rule = ClothingRule::new("rain shell");
        rule.min_feel = FeelBound::from_f64(30.0);
        rule.max_feel = FeelBound::from_f64(70.0);
        rule.day = true;
        rule.night = true;
        rule.raining = true;
        engine.update_draft_rule(id, rule).unwrap();
        engine.commit().unwrap();
        let committed: Vec<ClothingRule> = engine.committed_rules().to_vec();

        let reloaded = RuleEngine::load(engine.store);
        assert_eq!(reloaded.committed_rules(), committed.as_slice());
    }

    #[test]
    fn reset_overwrites_committed_and_draft() {
        let mut engine = RuleEngine::load(MemoryStore::default());
        let ids: Vec<RuleId> = engine.list_draft().iter().map(|e| e.id).collect();
        for id in ids {
            engine.delete_draft_rule(id).unwrap();
        }
        engine.commit().unwrap();
        assert!(engine.committed_rules().is_empty());

        engine.reset_to_defaults().unwrap();
        assert_eq!(engine.committed_rules().len(), 10);
        assert_eq!(engine.list_draft().len(), 10);

        // The reset persisted without a commit
        let reloaded = RuleEngine::load(engine.store);
        assert_eq!(reloaded.committed_rules().len(), 10);
    }

    #[test]
    fn rule_with_unparsable_bounds_is_kept_but_never_fires() {
        let json = r#"[
            {"name": "mystery", "minFeel": "cold", "maxFeel": "hot",
             "day": true, "night": true,
             "clear": true, "cloudy": true, "raining": true, "snowing": true},
            {"name": "shorts", "minFeel": "35", "maxFeel": "150",
             "day": true, "night": true,
             "clear": true, "cloudy": true, "raining": true, "snowing": true}
        ]"#;
        let engine = RuleEngine::load(MemoryStore::with_rules(json));
        assert_eq!(engine.committed_rules().len(), 2);
        let names = engine.evaluate(&snapshot(60.0, true, Some(ConditionCategory::Clear)));
        assert_eq!(names, ["shorts"]);
    }
}
