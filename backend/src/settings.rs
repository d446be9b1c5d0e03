//! Workspace limits loaded via OrthoConfig.
//!
//! Values come from `NOTEBOOKS_*` environment variables or a configuration
//! file; anything unset falls back to the built-in limits.

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::WorkspaceLimits;

/// Configuration values controlling validation limits.
#[derive(Debug, Clone, Default, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "NOTEBOOKS")]
pub struct WorkspaceSettings {
    /// Maximum notebook title length in characters.
    pub notebook_title_max: Option<usize>,
    /// Maximum notebook description length in characters.
    pub description_max: Option<usize>,
    /// Maximum page title length in characters.
    pub page_title_max: Option<usize>,
    /// Maximum page nesting depth.
    pub max_page_depth: Option<usize>,
}

impl WorkspaceSettings {
    /// Resolve the configured limits, falling back to defaults per field.
    pub fn limits(&self) -> WorkspaceLimits {
        let defaults = WorkspaceLimits::default();
        WorkspaceLimits {
            notebook_title_max: self
                .notebook_title_max
                .unwrap_or(defaults.notebook_title_max),
            description_max: self.description_max.unwrap_or(defaults.description_max),
            page_title_max: self.page_title_max.unwrap_or(defaults.page_title_max),
            max_page_depth: self
                .max_page_depth
                .filter(|depth| *depth > 0)
                .unwrap_or(defaults.max_page_depth),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for workspace configuration parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 4] = [
        "NOTEBOOKS_NOTEBOOK_TITLE_MAX",
        "NOTEBOOKS_DESCRIPTION_MAX",
        "NOTEBOOKS_PAGE_TITLE_MAX",
        "NOTEBOOKS_MAX_PAGE_DEPTH",
    ];

    fn load_from_empty_args() -> WorkspaceSettings {
        WorkspaceSettings::load_from_iter([OsString::from("notebooks")])
            .expect("config should load")
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert_eq!(settings.limits(), WorkspaceLimits::default());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("NOTEBOOKS_NOTEBOOK_TITLE_MAX", Some("40".to_owned())),
            ("NOTEBOOKS_DESCRIPTION_MAX", None),
            ("NOTEBOOKS_PAGE_TITLE_MAX", Some("60".to_owned())),
            ("NOTEBOOKS_MAX_PAGE_DEPTH", Some("4".to_owned())),
        ]);

        let limits = load_from_empty_args().limits();
        assert_eq!(limits.notebook_title_max, 40);
        assert_eq!(limits.description_max, 200);
        assert_eq!(limits.page_title_max, 60);
        assert_eq!(limits.max_page_depth, 4);
    }

    #[rstest]
    fn zero_depth_falls_back_to_default() {
        let settings = WorkspaceSettings {
            max_page_depth: Some(0),
            ..WorkspaceSettings::default()
        };
        assert_eq!(settings.limits().max_page_depth, 16);
    }
}
