use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// What to do when several registered values satisfy a requested interface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum InterfaceResolution {
    /// Exactly one implementor may match; more than one is an error
    #[default]
    Unique,
    /// The first implementor in registration order wins
    FirstMatch,
}

/// Options controlling how an [`Injector`](crate::Injector) resolves types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InjectorOptions {
    /// Policy for the interface-satisfaction scan (default: unique)
    #[serde(default)]
    pub interface_resolution: InterfaceResolution,

    /// Maximum number of nested factories in one resolution (default: 64)
    #[serde(default = "default_max_resolution_depth")]
    pub max_resolution_depth: usize,
}

fn default_max_resolution_depth() -> usize {
    64
}

impl Default for InjectorOptions {
    fn default() -> Self {
        Self {
            interface_resolution: InterfaceResolution::Unique,
            max_resolution_depth: default_max_resolution_depth(),
        }
    }
}

impl InjectorOptions {
    /// Load options from a YAML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn to_yaml_string(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Merge explicit overrides on top of these options
    /// Only `Some` values replace what is already set
    pub fn merge(&mut self, overrides: &OptionOverrides) {
        if let Some(interface_resolution) = overrides.interface_resolution {
            self.interface_resolution = interface_resolution;
        }
        if let Some(max_resolution_depth) = overrides.max_resolution_depth {
            self.max_resolution_depth = max_resolution_depth;
        }
    }
}

/// Partial options, typically coming from the embedding application
#[derive(Debug, Clone, Default)]
pub struct OptionOverrides {
    pub interface_resolution: Option<InterfaceResolution>,
    pub max_resolution_depth: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = InjectorOptions::default();
        assert_eq!(options.interface_resolution, InterfaceResolution::Unique);
        assert_eq!(options.max_resolution_depth, 64);
    }

    #[test]
    fn test_serialize_options() {
        let yaml = InjectorOptions::default().to_yaml_string().unwrap();
        assert!(yaml.contains("interfaceResolution: unique"));
        assert!(yaml.contains("maxResolutionDepth: 64"));
    }

    #[test]
    fn test_deserialize_options() {
        let yaml = r#"
interfaceResolution: firstMatch
maxResolutionDepth: 8
"#;
        let options = InjectorOptions::from_yaml_str(yaml).unwrap();
        assert_eq!(options.interface_resolution, InterfaceResolution::FirstMatch);
        assert_eq!(options.max_resolution_depth, 8);
    }

    #[test]
    fn test_deserialize_partial_options_uses_defaults() {
        let options = InjectorOptions::from_yaml_str("maxResolutionDepth: 3\n").unwrap();
        assert_eq!(options.interface_resolution, InterfaceResolution::Unique);
        assert_eq!(options.max_resolution_depth, 3);
    }

    #[test]
    fn test_deserialize_invalid_options() {
        let err = InjectorOptions::from_yaml_str("interfaceResolution: whatever\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_from_missing_file() {
        let err = InjectorOptions::from_file(Path::new("/nonexistent/depinject.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_merge_overrides() {
        let mut options = InjectorOptions::default();
        options.merge(&OptionOverrides {
            interface_resolution: Some(InterfaceResolution::FirstMatch),
            ..Default::default()
        });
        assert_eq!(options.interface_resolution, InterfaceResolution::FirstMatch);
        assert_eq!(options.max_resolution_depth, 64);

        options.merge(&OptionOverrides::default());
        assert_eq!(options.interface_resolution, InterfaceResolution::FirstMatch);
    }
}
