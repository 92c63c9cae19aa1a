use crate::error::CheckError;
use repolint_config::Config;
use repolint_github::Client;
use repolint_types::{CheckType, Issue};

mod actions;
mod files;
mod rulesets;
mod settings;

pub use actions::{ActionsCheck, WORKFLOWS_DIR, workflow_files};
pub use files::FilesCheck;
pub use rulesets::{RulesetsCheck, rulesets_match};
pub use settings::SettingsCheck;

/// One unit of compliance evaluation.
///
/// `name` identifies the instance (`settings`, `rulesets(main)`, ...) and is
/// what callers pass to skip it.
pub trait Check {
    fn check_type(&self) -> CheckType;
    fn name(&self) -> String;
    fn run(&self, client: &Client) -> Result<Vec<Issue>, CheckError>;
}

/// Settings and actions always; then one check per configured ruleset and file.
pub fn builtin_checks(config: &Config) -> Vec<Box<dyn Check>> {
    let checks = &config.checks;
    let mut out: Vec<Box<dyn Check>> = vec![
        Box::new(SettingsCheck::new(checks.settings.clone())),
        Box::new(ActionsCheck::new(checks.actions.clone())),
    ];
    out.extend(
        checks
            .rulesets()
            .iter()
            .map(|rs| Box::new(RulesetsCheck::new(rs.clone())) as Box<dyn Check>),
    );
    out.extend(
        checks
            .files()
            .iter()
            .map(|f| Box::new(FilesCheck::new(f.clone())) as Box<dyn Check>),
    );
    out
}
