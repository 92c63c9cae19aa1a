use crate::checks::Check;
use crate::error::CheckError;
use repolint_config::RulesetConfig;
use repolint_github::Client;
use repolint_types::github::{BypassActor, RulesetConditions, RulesetRule, Ruleset};
use repolint_types::{CheckType, Issue, data_keys};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Compares one named repository ruleset with its reference JSON.
pub struct RulesetsCheck {
    config: RulesetConfig,
}

impl RulesetsCheck {
    pub fn new(config: RulesetConfig) -> Self {
        Self { config }
    }

    fn issue(&self, message: String) -> Issue {
        Issue::new(self.check_type(), self.name(), message)
            .fixable(true)
            .with_data(data_keys::RULESET_NAME, &self.config.name)
            .with_data(data_keys::REFERENCE, &self.config.reference)
    }
}

impl Check for RulesetsCheck {
    fn check_type(&self) -> CheckType {
        CheckType::Rulesets
    }

    fn name(&self) -> String {
        format!("rulesets({})", self.config.name)
    }

    fn run(&self, client: &Client) -> Result<Vec<Issue>, CheckError> {
        let RulesetConfig { name, reference } = &self.config;
        if reference.is_empty() {
            return Err(CheckError::MissingReference {
                kind: "ruleset",
                name: name.clone(),
            });
        }

        let expected = client
            .fetch_reference_ruleset(reference)
            .map_err(CheckError::reference("ruleset"))?;
        let summaries = client
            .get_rulesets()
            .map_err(CheckError::api("rulesets"))?;

        let Some(summary) = summaries.iter().find(|rs| rs.name == *name) else {
            return Ok(vec![self.issue(format!("Ruleset '{name}' does not exist"))]);
        };
        let actual = client
            .get_ruleset(summary.id)
            .map_err(CheckError::api("ruleset details"))?;

        if rulesets_match(&actual, &expected) {
            debug!(ruleset = %name, "ruleset matches reference");
            return Ok(vec![]);
        }
        Ok(vec![self.issue(format!(
            "Ruleset '{name}' does not match reference '{reference}'"
        ))])
    }
}

/// Configuration equivalence, ignoring ids and the name.
///
/// Enforcement and target must be equal. Ref-name patterns are compared in
/// order. Rules are matched by type, bypass actors as a set.
pub fn rulesets_match(actual: &Ruleset, expected: &Ruleset) -> bool {
    actual.enforcement == expected.enforcement
        && actual.target == expected.target
        && conditions_match(actual.conditions.as_ref(), expected.conditions.as_ref())
        && rules_match(&actual.rules, &expected.rules)
        && bypass_actors_match(
            actual.bypass_actors.as_deref().unwrap_or_default(),
            expected.bypass_actors.as_deref().unwrap_or_default(),
        )
}

fn conditions_match(actual: Option<&RulesetConditions>, expected: Option<&RulesetConditions>) -> bool {
    match (actual, expected) {
        (None, None) => true,
        (Some(a), Some(e)) => match (&a.ref_name, &e.ref_name) {
            (None, None) => true,
            (Some(a), Some(e)) => a.include == e.include && a.exclude == e.exclude,
            _ => false,
        },
        _ => false,
    }
}

fn rules_match(actual: &[RulesetRule], expected: &[RulesetRule]) -> bool {
    if actual.len() != expected.len() {
        return false;
    }
    let by_type = |rules: &[RulesetRule]| -> BTreeMap<String, Option<Map<String, Value>>> {
        rules
            .iter()
            .map(|r| (r.kind.clone(), r.parameters.clone()))
            .collect()
    };
    let actual = by_type(actual);
    let expected = by_type(expected);

    actual.len() == expected.len()
        && expected.iter().all(|(kind, params)| {
            actual
                .get(kind)
                .is_some_and(|a| parameters_match(a.as_ref(), params.as_ref()))
        })
}

/// Absent and empty parameter objects are equivalent.
fn parameters_match(actual: Option<&Map<String, Value>>, expected: Option<&Map<String, Value>>) -> bool {
    let empty = Map::new();
    let actual = actual.unwrap_or(&empty);
    let expected = expected.unwrap_or(&empty);
    actual.len() == expected.len()
        && expected
            .iter()
            .all(|(key, e)| actual.get(key).is_some_and(|a| values_match(a, e)))
}

/// JSON equality where numbers compare by value, so `1` equals `1.0`.
fn values_match(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(a, b)| values_match(a, b))
        }
        (Value::Object(a), Value::Object(b)) => parameters_match(Some(a), Some(b)),
        (a, b) => a == b,
    }
}

fn bypass_actors_match(actual: &[BypassActor], expected: &[BypassActor]) -> bool {
    if actual.len() != expected.len() {
        return false;
    }
    let expected: BTreeSet<String> = expected.iter().map(BypassActor::key).collect();
    actual.iter().all(|a| expected.contains(&a.key()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use repolint_types::github::RefNameCondition;
    use serde_json::json;

    fn ruleset() -> Ruleset {
        serde_json::from_value(json!({
            "id": 7,
            "name": "main",
            "target": "branch",
            "enforcement": "active",
            "conditions": {"ref_name": {"include": ["~DEFAULT_BRANCH"], "exclude": []}},
            "rules": [
                {"type": "deletion"},
                {"type": "pull_request", "parameters": {"required_approving_review_count": 1}}
            ],
            "bypass_actors": [
                {"actor_id": 5, "actor_type": "RepositoryRole", "bypass_mode": "always"},
                {"actor_type": "OrganizationAdmin", "bypass_mode": "pull_request"}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn ids_and_ordering_of_rules_and_actors_are_ignored() {
        let actual = ruleset();
        let mut expected = ruleset();
        expected.id = 0;
        expected.name = "reference".into();
        expected.rules.reverse();
        if let Some(actors) = expected.bypass_actors.as_mut() {
            actors.reverse();
        }
        assert!(rulesets_match(&actual, &expected));
    }

    #[test]
    fn enforcement_difference_is_a_mismatch() {
        let mut expected = ruleset();
        expected.enforcement = "evaluate".into();
        assert!(!rulesets_match(&ruleset(), &expected));
    }

    #[test]
    fn include_order_is_significant() {
        let mut actual = ruleset();
        let mut expected = ruleset();
        let patterns = |a: &str, b: &str| RulesetConditions {
            ref_name: Some(RefNameCondition {
                include: vec![a.into(), b.into()],
                exclude: vec![],
            }),
        };
        actual.conditions = Some(patterns("main", "release/*"));
        expected.conditions = Some(patterns("release/*", "main"));
        assert!(!rulesets_match(&actual, &expected));
    }

    #[test]
    fn one_sided_conditions_mismatch() {
        let mut expected = ruleset();
        expected.conditions = None;
        assert!(!rulesets_match(&ruleset(), &expected));

        let mut actual = ruleset();
        actual.conditions = Some(RulesetConditions { ref_name: None });
        assert!(!rulesets_match(&actual, &ruleset()));
    }

    #[test]
    fn absent_and_empty_parameters_are_equal() {
        let mut actual = ruleset();
        let expected = ruleset();
        actual.rules[0].parameters = Some(Map::new());
        assert!(rulesets_match(&actual, &expected));

        actual.rules[1].parameters = Some(
            json!({"required_approving_review_count": 2})
                .as_object()
                .cloned()
                .unwrap(),
        );
        assert!(!rulesets_match(&actual, &expected));
    }

    #[test]
    fn integer_and_float_parameters_are_equal() {
        let mut expected = ruleset();
        expected.rules[1].parameters = Some(
            json!({"required_approving_review_count": 1.0})
                .as_object()
                .cloned()
                .unwrap(),
        );
        assert!(rulesets_match(&ruleset(), &expected));

        expected.rules[1].parameters = Some(
            json!({"required_approving_review_count": 1.5})
                .as_object()
                .cloned()
                .unwrap(),
        );
        assert!(!rulesets_match(&ruleset(), &expected));
    }

    #[test]
    fn absent_and_empty_bypass_actors_are_equal() {
        let mut actual = ruleset();
        let mut expected = ruleset();
        actual.bypass_actors = None;
        expected.bypass_actors = Some(vec![]);
        assert!(rulesets_match(&actual, &expected));
    }

    #[test]
    fn extra_rule_is_a_mismatch() {
        let mut actual = ruleset();
        actual.rules.push(RulesetRule {
            kind: "non_fast_forward".into(),
            parameters: None,
        });
        assert!(!rulesets_match(&actual, &ruleset()));
    }
}
