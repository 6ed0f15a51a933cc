use std::env;

use gymdb_core::plan::RenameMode;
use gymdb_core::storage::Consistency;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// DynamoDB table holding every entity (default: "gym")
    pub table_name: String,
    /// AWS region (default: "us-east-1")
    pub region: String,
    /// Custom endpoint URL, e.g. a local DynamoDB (default: unset)
    pub endpoint_url: Option<String>,
    /// Read metadata and workouts with strong consistency (default: false)
    pub consistent_reads: bool,
    /// Rename workouts in a transaction instead of a batch (default: false)
    pub strict_rename: bool,
    /// Resubmissions of unprocessed batch writes (default: 3)
    pub batch_max_retries: u32,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `GYM_TABLE_NAME` - Table name (default: "gym")
    /// - `AWS_REGION` - AWS region (default: "us-east-1")
    /// - `AWS_ENDPOINT_URL` - Custom endpoint (default: unset)
    /// - `GYM_CONSISTENT_READS` - Strongly consistent reads (default: false)
    /// - `GYM_STRICT_RENAME` - Transactional renames (default: false)
    /// - `GYM_BATCH_MAX_RETRIES` - Batch resubmissions (default: 3)
    pub fn from_env() -> Self {
        Self {
            table_name: env::var("GYM_TABLE_NAME").unwrap_or_else(|_| "gym".to_string()),
            region: env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            endpoint_url: env::var("AWS_ENDPOINT_URL").ok().filter(|v| !v.is_empty()),
            consistent_reads: env_flag("GYM_CONSISTENT_READS"),
            strict_rename: env_flag("GYM_STRICT_RENAME"),
            batch_max_retries: env::var("GYM_BATCH_MAX_RETRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3),
        }
    }

    /// Consistency used by read paths.
    pub fn read_consistency(&self) -> Consistency {
        if self.consistent_reads {
            Consistency::Strong
        } else {
            Consistency::Eventual
        }
    }

    /// Strategy used by workout renames.
    pub fn rename_mode(&self) -> RenameMode {
        if self.strict_rename {
            RenameMode::Transactional
        } else {
            RenameMode::Batched
        }
    }

    /// Returns a display string for the target environment.
    pub fn target_display(&self) -> String {
        match &self.endpoint_url {
            Some(url) => format!("Local DynamoDB ({}) table {}", url, self.table_name),
            None => format!(
                "AWS DynamoDB (region: {}) table {}",
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

fn env_flag(name: &str) -> bool {
    env::var(name)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}
