use crate::error::FixError;
use crate::fixers::Fixer;
use repolint_config::RulesetConfig;
use repolint_github::Client;
use repolint_types::github::RulesetRequest;
use repolint_types::{Issue, data_keys};
use tracing::info;

/// Creates or replaces a ruleset from its reference JSON.
pub struct RulesetsFixer {
    configs: Vec<RulesetConfig>,
}

impl RulesetsFixer {
    pub fn new(configs: Vec<RulesetConfig>) -> Self {
        Self { configs }
    }
}

impl Fixer for RulesetsFixer {
    fn name(&self) -> &'static str {
        "rulesets"
    }

    fn fix(&self, client: &Client, issue: &Issue) -> Result<(), FixError> {
        let name = issue
            .data(data_keys::RULESET_NAME)
            .ok_or(FixError::MissingData(data_keys::RULESET_NAME))?;
        let cfg = self
            .configs
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| FixError::NoConfig {
                kind: "ruleset",
                name: name.to_string(),
            })?;
        if cfg.reference.is_empty() {
            return Err(FixError::NoReference {
                kind: "ruleset",
                name: name.to_string(),
            });
        }

        let reference = client
            .fetch_reference_ruleset(&cfg.reference)
            .map_err(FixError::reference("ruleset"))?;
        let request = RulesetRequest::from_reference(&cfg.name, &reference);

        let existing = client
            .get_rulesets()
            .map_err(FixError::api("fetch rulesets"))?
            .into_iter()
            .find(|rs| rs.name == cfg.name);

        match existing {
            Some(rs) => {
                client
                    .update_ruleset(rs.id, &request)
                    .map_err(FixError::api("update ruleset"))?;
                info!(ruleset = %cfg.name, id = rs.id, "updated ruleset");
            }
            None => {
                client
                    .create_ruleset(&request)
                    .map_err(FixError::api("create ruleset"))?;
                info!(ruleset = %cfg.name, "created ruleset");
            }
        }
        Ok(())
    }
}
