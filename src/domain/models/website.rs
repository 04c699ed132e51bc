use serde::{Deserialize, Serialize};

/// Static website hosting configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WebsiteConfig {
    pub index: String,
    pub error_document: String,
    /// `http` or `https`
    pub protocol: String,
    pub rules: Vec<WebsiteRoutingRule>,
    /// Website endpoint URL, filled on read
    pub url: String,
}

impl WebsiteConfig {
    pub fn is_empty(&self) -> bool {
        self.index.is_empty() && self.error_document.is_empty() && self.rules.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WebsiteRoutingRule {
    pub condition_error_code: String,
    pub condition_prefix: String,
    pub redirect_protocol: String,
    pub redirect_replace_key: String,
    pub redirect_replace_key_prefix: String,
}

/// A single CORS rule; `id` is the rule's position when read back
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CorsRule {
    pub id: String,
    pub allowed_origins: Vec<String>,
    pub allowed_methods: Vec<String>,
    pub allowed_headers: Vec<String>,
    pub expose_headers: Vec<String>,
    pub max_age_seconds: i64,
}

/// Referer (hotlink protection) configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RefererConfig {
    pub enabled: bool,
    pub allow_empty_refer: bool,
    /// `White-List` or `Black-List`
    pub referer_type: String,
    pub domain_list: Vec<String>,
}
