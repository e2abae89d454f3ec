use std::env;

/// Table name used when `DYNAMODB_TABLE` is unset.
pub const DEFAULT_TABLE_NAME: &str = "planzoco";

/// Region used when `AWS_REGION` is unset.
pub const DEFAULT_REGION: &str = "eu-west-2";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// DynamoDB table holding events, questions and options (default: "planzoco")
    pub table_name: String,
    /// AWS region (default: "eu-west-2")
    pub region: String,
    /// Custom endpoint URL, for a local DynamoDB
    pub endpoint_url: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `DYNAMODB_TABLE` - Table name (default: "planzoco")
    /// - `AWS_REGION` - AWS region (default: "eu-west-2")
    /// - `DYNAMODB_ENDPOINT_URL` - Endpoint override (default: unset)
    pub fn from_env() -> Self {
        Self {
            table_name: env::var("DYNAMODB_TABLE")
                .unwrap_or_else(|_| DEFAULT_TABLE_NAME.to_string()),
            region: env::var("AWS_REGION").unwrap_or_else(|_| DEFAULT_REGION.to_string()),
            endpoint_url: env::var("DYNAMODB_ENDPOINT_URL")
                .ok()
                .filter(|url| !url.is_empty()),
        }
    }

    /// Returns a display string for the target environment.
    pub fn target_display(&self) -> String {
        match &self.endpoint_url {
            Some(url) => format!("Local DynamoDB ({}), table {}", url, self.table_name),
            None => format!(
                "AWS DynamoDB (region: {}), table {}",
                self.region, self.table_name
            ),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
