use std::fs;
use std::path::Path;

use quote_core::{StepCatalog, StepDefinition};
use serde::Deserialize;
use tracing::debug;

use crate::error::ConfigError;

/// The on-disk shape of the step catalog.
///
/// `order` lists every step id in wizard order. Ids without a `[[steps]]`
/// entry must name a custom step.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct StepCatalogFile {
    pub order: Vec<String>,
    #[serde(default)]
    pub steps: Vec<StepDefinition>,
}

/// Loader for the step catalog.
pub struct StepCatalogLoader;

impl StepCatalogLoader {
    /// Parse the catalog file without resolving it.
    pub fn parse(
        text: &str,
        file: &str,
    ) -> Result<StepCatalogFile, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Toml {
            file: file.to_string(),
            source,
        })
    }

    /// Parse the catalog file and resolve every step id.
    pub fn build(
        text: &str,
        file: &str,
    ) -> Result<StepCatalog, ConfigError> {
        let parsed = Self::parse(text, file)?;
        let declared = parsed.steps.len();
        let catalog = StepCatalog::build(&parsed.order, parsed.steps)?;

        debug!(
            file,
            steps = catalog.step_count(),
            declarative = declared,
            "built step catalog"
        );
        Ok(catalog)
    }

    pub fn load_from_file(path: &Path) -> Result<StepCatalog, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::build(&text, &path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use quote_core::{CatalogError, CustomStep, FieldPath, StepHandle};

    use super::*;

    const STEPS: &str = r#"
        order = ["welcome", "move-type", "contact"]

        [[steps]]
        id = "welcome"
        title = "What kind of move?"

        [steps.validation]
        required = true
        field = "serviceType"

        [steps.buttons.primary]
        action = "auto"

        [[steps.options]]
        value = "full-service"
        label = "Full Service"

        [[steps.options]]
        value = "labor-only"
        label = "Labor Only"
    "#;

    #[test]
    fn test_parse_order_and_definitions() {
        let parsed = StepCatalogLoader::parse(STEPS, "steps.toml").expect("Failed to parse");

        assert_eq!(parsed.order, vec!["welcome", "move-type", "contact"]);
        assert_eq!(parsed.steps.len(), 1);
        assert_eq!(parsed.steps[0].validation.field, Some(FieldPath::ServiceType));
        assert_eq!(parsed.steps[0].options.len(), 2);
        assert!(parsed.steps[0].is_auto());
    }

    #[test]
    fn test_build_resolves_custom_steps() {
        let catalog = StepCatalogLoader::build(STEPS, "steps.toml").expect("Failed to build");

        assert_eq!(catalog.step_count(), 3);
        assert_eq!(
            catalog.resolve_step(1),
            Some(StepHandle::Custom(CustomStep::MoveType))
        );
    }

    #[test]
    fn test_build_rejects_unresolved_step() {
        let text = r#"order = ["welcome", "pickup-location"]"#;

        let err = StepCatalogLoader::build(text, "steps.toml").expect_err("Should fail");

        match err {
            ConfigError::Catalog(CatalogError::UnresolvedStep(id)) => assert_eq!(id, "welcome"),
            other => panic!("expected UnresolvedStep, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_field_path() {
        let text = r#"
            order = ["welcome"]

            [[steps]]
            id = "welcome"
            validation = { required = true, field = "favouriteColour" }
        "#;

        let err = StepCatalogLoader::parse(text, "steps.toml").expect_err("Should fail");

        let ConfigError::Toml { source, .. } = err else {
            panic!("Expected Toml error, got: {err:?}");
        };
        assert!(
            source.to_string().contains("favouriteColour"),
            "Expected the path in the error, got: {source}"
        );
    }

    #[test]
    fn test_parse_missing_order() {
        let err = StepCatalogLoader::parse("", "steps.toml").expect_err("Should fail");

        assert!(matches!(err, ConfigError::Toml { .. }));
    }
}
