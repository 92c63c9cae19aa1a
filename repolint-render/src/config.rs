//! Merged configuration annotated with where each value came from.

use repolint_config::{
    ActionsConfig, Config, DependabotSettingsConfig, LoadedConfig, MergeConfig, SettingsConfig,
    Source, WorkflowConfig,
};

const RESET: &str = "\x1b[0m";
const CYAN: &str = "\x1b[36m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigDisplay {
    pub text: String,
    /// References the validator rejected, in display order.
    pub invalid_references: Vec<String>,
}

/// Renders the merged policy as YAML-like text.
///
/// Every leaf carries its origin: `[repo]`/`[owner]` suffixes, or cyan/yellow
/// when `use_color` is set. When `validate` is given, each ruleset and file
/// reference is checked and marked valid or invalid.
pub fn render_config(
    loaded: &LoadedConfig,
    use_color: bool,
    validate: Option<&dyn Fn(&str) -> bool>,
) -> ConfigDisplay {
    let mut w = Writer {
        loaded,
        use_color,
        validate,
        out: ConfigDisplay::default(),
    };

    w.line(0, "Configuration:");
    w.line(0, "");
    if use_color {
        w.line(
            0,
            &format!("Legend: {CYAN}repo-level{RESET} | {YELLOW}owner-level{RESET}"),
        );
    } else {
        w.line(0, "Legend: [repo] repo-level | [owner] owner-level");
    }
    w.line(0, "");
    w.checks();
    w.out
}

struct Writer<'a> {
    loaded: &'a LoadedConfig,
    use_color: bool,
    validate: Option<&'a dyn Fn(&str) -> bool>,
    out: ConfigDisplay,
}

impl Writer<'_> {
    fn line(&mut self, indent: usize, text: &str) {
        self.out.text.push_str(&" ".repeat(indent));
        self.out.text.push_str(text);
        self.out.text.push('\n');
    }

    /// Repo when the repo-scope document sets the value, owner otherwise.
    fn source(&self, is_set: impl Fn(&Config) -> bool) -> Source {
        match &self.loaded.repo_config {
            Some(repo) if is_set(repo) => Source::Repo,
            _ => Source::Owner,
        }
    }

    fn paint(&self, value: &str, source: Source) -> String {
        match (self.use_color, source) {
            (false, source) => format!("{value} [{source}]"),
            (true, Source::Repo) => format!("{CYAN}{value}{RESET}"),
            (true, Source::Owner) => format!("{YELLOW}{value}{RESET}"),
        }
    }

    fn field(&mut self, indent: usize, name: &str, value: &str, source: Source) {
        let painted = self.paint(value, source);
        self.line(indent, &format!("{name}: {painted}"));
    }

    fn flag<S>(
        &mut self,
        indent: usize,
        name: &str,
        value: Option<bool>,
        section: fn(&Config) -> Option<&S>,
        pick: fn(&S) -> Option<bool>,
    ) {
        let Some(value) = value else { return };
        let source = self.source(|c| section(c).and_then(pick).is_some());
        self.field(indent, name, &value.to_string(), source);
    }

    fn checks(&mut self) {
        let loaded = self.loaded;
        let checks = &loaded.config.checks;
        self.line(0, "checks:");
        if let Some(settings) = &checks.settings {
            self.settings(settings);
        }
        if let Some(actions) = &checks.actions {
            self.actions(actions);
        }
        if !checks.rulesets().is_empty() {
            self.line(2, "rulesets:");
            let source = self.source(|c| c.checks.rulesets.is_some());
            for rs in checks.rulesets() {
                self.named_reference(&rs.name, &rs.reference, source);
            }
        }
        if !checks.files().is_empty() {
            self.line(2, "files:");
            let source = self.source(|c| c.checks.files.is_some());
            for f in checks.files() {
                self.named_reference(&f.name, &f.reference, source);
            }
        }
    }

    fn settings(&mut self, cfg: &SettingsConfig) {
        fn section(c: &Config) -> Option<&SettingsConfig> {
            c.checks.settings.as_ref()
        }

        self.line(2, "settings:");
        self.flag(4, "issues", cfg.issues, section, |s| s.issues);
        self.flag(4, "wiki", cfg.wiki, section, |s| s.wiki);
        self.flag(4, "projects", cfg.projects, section, |s| s.projects);
        self.flag(4, "discussions", cfg.discussions, section, |s| s.discussions);
        self.flag(
            4,
            "allow_actions_to_approve_prs",
            cfg.allow_actions_to_approve_prs,
            section,
            |s| s.allow_actions_to_approve_prs,
        );

        let non_empty = |v: &Option<String>| v.clone().filter(|s| !s.is_empty());
        if let Some(policy) = non_empty(&cfg.pull_request_creation_policy) {
            let source = self.source(|c| {
                section(c).is_some_and(|s| non_empty(&s.pull_request_creation_policy).is_some())
            });
            self.field(4, "pull_request_creation_policy", &policy, source);
        }
        if let Some(branch) = non_empty(&cfg.default_branch) {
            let source =
                self.source(|c| section(c).is_some_and(|s| non_empty(&s.default_branch).is_some()));
            self.field(4, "default_branch", &branch, source);
        }
        if let Some(merge) = &cfg.merge {
            self.merge(merge);
        }
        if let Some(dependabot) = &cfg.dependabot {
            self.dependabot(dependabot);
        }
    }

    fn merge(&mut self, cfg: &MergeConfig) {
        fn section(c: &Config) -> Option<&MergeConfig> {
            c.checks.settings.as_ref()?.merge.as_ref()
        }

        self.line(4, "merge:");
        self.flag(6, "allow_merge_commit", cfg.allow_merge_commit, section, |m| {
            m.allow_merge_commit
        });
        self.flag(6, "allow_squash_merge", cfg.allow_squash_merge, section, |m| {
            m.allow_squash_merge
        });
        self.flag(6, "allow_rebase_merge", cfg.allow_rebase_merge, section, |m| {
            m.allow_rebase_merge
        });
        self.flag(6, "allow_auto_merge", cfg.allow_auto_merge, section, |m| {
            m.allow_auto_merge
        });
        self.flag(
            6,
            "delete_branch_on_merge",
            cfg.delete_branch_on_merge,
            section,
            |m| m.delete_branch_on_merge,
        );
        self.flag(
            6,
            "always_suggest_updating_pull_request_branches",
            cfg.always_suggest_updating_pull_request_branches,
            section,
            |m| m.always_suggest_updating_pull_request_branches,
        );
    }

    fn dependabot(&mut self, cfg: &DependabotSettingsConfig) {
        fn section(c: &Config) -> Option<&DependabotSettingsConfig> {
            c.checks.settings.as_ref()?.dependabot.as_ref()
        }

        self.line(4, "dependabot:");
        self.flag(6, "alerts", cfg.alerts, section, |d| d.alerts);
        self.flag(6, "security_updates", cfg.security_updates, section, |d| {
            d.security_updates
        });
    }

    fn actions(&mut self, cfg: &ActionsConfig) {
        fn section(c: &Config) -> Option<&ActionsConfig> {
            c.checks.actions.as_ref()
        }

        self.line(2, "actions:");
        self.flag(
            4,
            "require_pinned_versions",
            cfg.require_pinned_versions,
            section,
            |a| a.require_pinned_versions,
        );
        self.flag(4, "require_timeout", cfg.require_timeout, section, |a| {
            a.require_timeout
        });
        self.flag(
            4,
            "require_minimal_permissions",
            cfg.require_minimal_permissions,
            section,
            |a| a.require_minimal_permissions,
        );
        if let Some(max) = cfg.max_timeout_minutes {
            let source = self.source(|c| section(c).is_some_and(|a| a.max_timeout_minutes.is_some()));
            self.field(4, "max_timeout_minutes", &max.to_string(), source);
        }
        if !cfg.required_workflows().is_empty() {
            let source = self.source(|c| section(c).is_some_and(|a| a.required_workflows.is_some()));
            self.workflows(cfg.required_workflows(), source);
        }
    }

    fn workflows(&mut self, workflows: &[WorkflowConfig], source: Source) {
        self.line(4, "required_workflows:");
        for wf in workflows {
            let path = self.paint(&wf.path, source);
            self.line(6, &format!("- path: {path}"));
            if let Some(reference) = wf.reference() {
                let reference = self.paint(reference, source);
                self.line(8, &format!("reference: {reference}"));
            }
        }
    }

    fn named_reference(&mut self, name: &str, reference: &str, source: Source) {
        let name = self.paint(name, source);
        self.line(4, &format!("- name: {name}"));

        let valid = self.validate.map(|validate| validate(reference));
        let text = match valid {
            None => format!("reference: {}", self.paint(reference, source)),
            Some(true) => format!("reference: {} ✅", self.paint(reference, source)),
            Some(false) => {
                self.out.invalid_references.push(reference.to_string());
                if self.use_color {
                    format!("reference: {RED}{reference} ❌{RESET}")
                } else {
                    format!("reference: {reference} ❌ [INVALID]")
                }
            }
        };
        self.line(6, &text);
    }
}
