//! Constants and runtime settings.
//!
//! Settings are read from the environment (after `dotenv` has loaded `.env`),
//! with the first positional argument overriding the resource group.

use crate::error::InventoryError;
use std::path::PathBuf;
use std::str::FromStr;

/// Back-end port identifying WinRM over HTTPS traffic.
pub const WINRM_HTTPS_PORT: u16 = 5986;

/// Azure Resource Manager endpoint.
pub const ARM_ENDPOINT: &str = "https://management.azure.com";

/// API version used for Microsoft.Network list calls.
pub const NETWORK_API_VERSION: &str = "2023-09-01";

/// API version used for Microsoft.Compute list calls.
pub const COMPUTE_API_VERSION: &str = "2023-09-01";

/// Largest CLI response accepted, in bytes.
pub const MAX_RESPONSE_BYTES: usize = 20_000_000;

/// Upper bound on `nextLink` pages followed for one collection.
pub const MAX_PAGES: usize = 200;

/// Placeholder `az rest` replaces with the logged-in subscription.
pub const SUBSCRIPTION_PLACEHOLDER: &str = "{subscriptionId}";

pub const ENV_RESOURCE_GROUP: &str = "AZURE_RESOURCE_GROUP";
pub const ENV_SUBSCRIPTION_ID: &str = "AZURE_SUBSCRIPTION_ID";
pub const ENV_SNAPSHOT_FILE: &str = "INVENTORY_SNAPSHOT_FILE";
pub const ENV_OUTPUT: &str = "INVENTORY_OUTPUT";

/// How the binary presents the resolved inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Table,
}

impl FromStr for OutputFormat {
    type Err = InventoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "table" | "csv" => Ok(OutputFormat::Table),
            other => Err(InventoryError::Config(format!(
                "unknown output format '{other}', expected json or table"
            ))),
        }
    }
}

/// Runtime settings for one invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub resource_group: String,
    pub subscription_id: Option<String>,
    pub snapshot_file: Option<PathBuf>,
    pub output: OutputFormat,
}

impl Settings {
    /// Build settings from the process environment and arguments.
    pub fn from_env() -> Result<Settings, InventoryError> {
        let arg = std::env::args().nth(1);
        Settings::from_lookup(arg, |key| std::env::var(key).ok())
    }

    /// Build settings from an explicit argument and a variable lookup.
    pub fn from_lookup<F>(arg: Option<String>, lookup: F) -> Result<Settings, InventoryError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |v: String| {
            let v = v.trim().to_string();
            (!v.is_empty()).then_some(v)
        };

        let resource_group = arg
            .and_then(non_blank)
            .or_else(|| lookup(ENV_RESOURCE_GROUP).and_then(non_blank))
            .ok_or_else(|| {
                InventoryError::Config(format!(
                    "no resource group given, pass it as first argument or set {ENV_RESOURCE_GROUP}"
                ))
            })?;

        let output = match lookup(ENV_OUTPUT).and_then(non_blank) {
            Some(v) => v.parse()?,
            None => OutputFormat::default(),
        };

        Ok(Settings {
            resource_group,
            subscription_id: lookup(ENV_SUBSCRIPTION_ID).and_then(non_blank),
            snapshot_file: lookup(ENV_SNAPSHOT_FILE)
                .and_then(non_blank)
                .map(PathBuf::from),
            output,
        })
    }
}
