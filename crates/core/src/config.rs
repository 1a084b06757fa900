//! Generator configuration record.

use serde::Deserialize;

/// Options recognized by the generator.
///
/// Keys are camelCase in configuration files; snake_case aliases are
/// accepted as well.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Strip the tag text from exposed callable names in tag groupings.
    #[serde(alias = "remove_tag_from_operation_id")]
    pub remove_tag_from_operation_id: bool,
    /// Split types into input and output views and emit the projection utilities.
    #[serde(alias = "add_readonly_writeonly_modifiers")]
    pub add_readonly_writeonly_modifiers: bool,
    /// Module specifier the client imports the type library from.
    #[serde(alias = "types_module")]
    pub types_module: String,
    /// Import the type library as a namespace and qualify every named type.
    #[serde(alias = "types_namespace")]
    pub types_namespace: Option<String>,
    /// Module specifier providing `request` and `TransportOptions`.
    #[serde(alias = "transport_module")]
    pub transport_module: String,
    /// Pass path parameter values through `encodeURIComponent` after coercing them to text.
    #[serde(alias = "encode_path_params")]
    pub encode_path_params: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            remove_tag_from_operation_id: false,
            add_readonly_writeonly_modifiers: false,
            types_module: "./types".to_string(),
            types_namespace: None,
            transport_module: "./transport".to_string(),
            encode_path_params: true,
        }
    }
}

impl GeneratorConfig {
    /// Name prefix applied to type references in the client artifact.
    pub fn type_prefix(&self) -> Option<String> {
        self.types_namespace.as_ref().map(|ns| format!("{ns}."))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_keys() {
        let config: GeneratorConfig =
            serde_json::from_str(r#"{ "removeTagFromOperationId": true }"#).unwrap();
        assert!(config.remove_tag_from_operation_id);
        assert!(!config.add_readonly_writeonly_modifiers);
        assert_eq!(config.types_module, "./types");
        assert_eq!(config.transport_module, "./transport");
        assert!(config.encode_path_params);
    }

    #[test]
    fn test_path_encoding_can_be_disabled() {
        let config: GeneratorConfig =
            serde_json::from_str(r#"{ "encodePathParams": false }"#).unwrap();
        assert!(!config.encode_path_params);
        let config: GeneratorConfig =
            serde_json::from_str(r#"{ "encode_path_params": false }"#).unwrap();
        assert!(!config.encode_path_params);
    }

    #[test]
    fn test_snake_case_alias() {
        let config: GeneratorConfig =
            serde_json::from_str(r#"{ "add_readonly_writeonly_modifiers": true }"#).unwrap();
        assert!(config.add_readonly_writeonly_modifiers);
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(serde_json::from_str::<GeneratorConfig>(r#"{ "bogus": 1 }"#).is_err());
    }

    #[test]
    fn test_type_prefix() {
        let config = GeneratorConfig {
            types_namespace: Some("Types".into()),
            ..GeneratorConfig::default()
        };
        assert_eq!(config.type_prefix().as_deref(), Some("Types."));
    }
}
