use crate::checks::Check;
use crate::error::CheckError;
use repolint_config::FileConfig;
use repolint_github::Client;
use repolint_types::{CheckType, Issue, data_keys};
use std::io;

/// Compares one working-directory file with its hydrated reference.
pub struct FilesCheck {
    config: FileConfig,
}

impl FilesCheck {
    pub fn new(config: FileConfig) -> Self {
        Self { config }
    }

    fn issue(&self, message: String) -> Issue {
        Issue::new(self.check_type(), self.name(), message)
            .fixable(true)
            .with_data(data_keys::FILE_NAME, &self.config.name)
            .with_data(data_keys::REFERENCE, &self.config.reference)
    }
}

impl Check for FilesCheck {
    fn check_type(&self) -> CheckType {
        CheckType::Files
    }

    fn name(&self) -> String {
        format!("files({})", self.config.name)
    }

    fn run(&self, client: &Client) -> Result<Vec<Issue>, CheckError> {
        let FileConfig { name, reference } = &self.config;
        if reference.is_empty() {
            return Err(CheckError::MissingReference {
                kind: "file",
                name: name.clone(),
            });
        }

        let expected = client
            .resolve_reference(reference)
            .map_err(CheckError::reference("file"))?;
        let expected = client.hydrate_template(&expected);

        let actual = match client.read_local_file(name) {
            Ok(actual) => actual,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                return Ok(vec![self.issue(format!("File '{name}' does not exist"))]);
            }
            Err(error) => return Err(CheckError::io(name)(error)),
        };

        if actual.trim_ascii() == expected.trim_ascii() {
            return Ok(vec![]);
        }
        Ok(vec![self.issue(format!(
            "File '{name}' does not match reference '{reference}'"
        ))])
    }
}
