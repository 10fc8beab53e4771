//! Configuration schema for the host tool.
//!
//! The host renders a connection form from this JSON schema and hands the
//! entered values back as a key/value mapping.

use indexmap::IndexMap;
use serde::Serialize;

use crate::config::{ConfigKey, GrantType, DEFAULT_CLIENT_ID};

/// JSON schema of the data source configuration object.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ConfigurationSchema {
    #[serde(rename = "type")]
    pub schema_type: &'static str,
    pub properties: IndexMap<&'static str, PropertySchema>,
    pub required: Vec<&'static str>,
    pub secret: Vec<&'static str>,
}

/// Schema of a single configuration property.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PropertySchema {
    #[serde(rename = "type")]
    pub property_type: &'static str,
    pub title: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<&'static str>,
}

impl PropertySchema {
    fn string(title: &'static str) -> Self {
        Self {
            property_type: "string",
            title,
            default: None,
        }
    }

    fn with_default(mut self, default: &'static str) -> Self {
        self.default = Some(default);
        self
    }
}

/// Returns the configuration schema of the Corporate Memory runner.
pub fn configuration_schema() -> ConfigurationSchema {
    let mut properties = IndexMap::new();
    properties.insert(
        ConfigKey::CmemBaseUri.as_str(),
        PropertySchema::string("CMEM_BASE_URL"),
    );
    properties.insert(
        ConfigKey::OauthGrantType.as_str(),
        PropertySchema::string("OAUTH_GRANT_TYPE (can be: password or client_credentials)")
            .with_default(GrantType::ClientCredentials.as_str()),
    );
    properties.insert(
        ConfigKey::OauthClientId.as_str(),
        PropertySchema::string("OAUTH_CLIENT_ID (e.g. cmem-service-account)")
            .with_default(DEFAULT_CLIENT_ID),
    );
    properties.insert(
        ConfigKey::OauthClientSecret.as_str(),
        PropertySchema::string(
            "OAUTH_CLIENT_SECRET - only needed for grant type 'client_credentials'",
        ),
    );
    properties.insert(
        ConfigKey::OauthUser.as_str(),
        PropertySchema::string("OAUTH_USER (e.g. admin) - only needed for grant type 'password'"),
    );
    properties.insert(
        ConfigKey::OauthPassword.as_str(),
        PropertySchema::string("OAUTH_PASSWORD - only needed for grant type 'password'"),
    );

    ConfigurationSchema {
        schema_type: "object",
        properties,
        required: vec![
            ConfigKey::CmemBaseUri.as_str(),
            ConfigKey::OauthGrantType.as_str(),
            ConfigKey::OauthClientId.as_str(),
        ],
        secret: vec![ConfigKey::OauthClientSecret.as_str()],
    }
}

impl ConfigurationSchema {
    /// Returns the schema as a JSON value.
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
