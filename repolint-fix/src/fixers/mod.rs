use crate::error::FixError;
use repolint_config::Config;
use repolint_github::Client;
use repolint_types::{CheckType, Issue};

mod actions;
mod files;
mod rulesets;
mod settings;

pub use actions::ActionsFixer;
pub use files::FilesFixer;
pub use rulesets::RulesetsFixer;
pub use settings::SettingsFixer;

/// Reverses one category of deviation.
///
/// A fixer locates its configuration through the issue's `data`, never by
/// parsing the message.
pub trait Fixer {
    fn name(&self) -> &'static str;
    fn fix(&self, client: &Client, issue: &Issue) -> Result<(), FixError>;
}

/// One fixer per check type, built from the merged policy.
pub fn builtin_fixers(config: &Config) -> Vec<(CheckType, Box<dyn Fixer>)> {
    let checks = &config.checks;
    vec![
        (
            CheckType::Settings,
            Box::new(SettingsFixer::new(checks.settings.clone())),
        ),
        (
            CheckType::Actions,
            Box::new(ActionsFixer::new(checks.actions.clone())),
        ),
        (
            CheckType::Rulesets,
            Box::new(RulesetsFixer::new(checks.rulesets().to_vec())),
        ),
        (
            CheckType::Files,
            Box::new(FilesFixer::new(checks.files().to_vec())),
        ),
    ]
}
