//! DynamoDB client module.
//!
//! Provides a blocking DynamoDB client that supports multiple credential sources:
//! - Environment variables
//! - Hardcoded credentials
//! - AWS profiles
//!
//! The main struct is [`DynamoClient`], which wraps the AWS SDK client and
//! the tokio runtime its calls block on.

use std::sync::Arc;

use aws_config::meta::region::RegionProviderChain;
use aws_config::profile::ProfileFileCredentialsProvider;
use aws_config::BehaviorVersion;
use aws_sdk_dynamodb::config::{Credentials, Region};
use aws_sdk_dynamodb::Client;
use once_cell::sync::OnceCell;
use tokio::runtime::Runtime;
use tracing::debug;

use crate::basic_operations::{self, StatementOutcome};
use crate::config::{ClientConfig, DEFAULT_REGION};
use crate::errors::{map_sdk_error, Error, Result};
use crate::item::Item;
use crate::statement::Statement;
use crate::table::DynamoTable;

/// Process-wide tokio runtime shared by clients built with [`DynamoClient::connect`].
static RUNTIME: OnceCell<Arc<Runtime>> = OnceCell::new();

/// The shared runtime, created on first use.
pub fn shared_runtime() -> Result<Arc<Runtime>> {
    RUNTIME
        .get_or_try_init(|| {
            Runtime::new()
                .map(Arc::new)
                .map_err(|e| Error::Runtime(format!("Failed to create tokio runtime: {}", e)))
        })
        .cloned()
}

/// Blocking DynamoDB client.
///
/// Build it once at startup and hand out [`DynamoTable`] handles or pass
/// [`DynamoClient::sdk_client`] to the free functions. Methods block the
/// calling thread and must not be called from inside an async runtime.
///
/// ```no_run
/// use dynohelp::{ClientConfig, DynamoClient, Item, Key};
///
/// # fn main() -> dynohelp::Result<()> {
/// let client = DynamoClient::connect(ClientConfig::new().region("eu-west-1"))?;
/// let users = client.table("users");
/// users.insert_item(&Item::new().with("pk", "USER#1").with("name", "Ada"))?;
/// let found = users.get_item(&Key::new("pk", "USER#1"), None)?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct DynamoClient {
    client: Client,
    runtime: Arc<Runtime>,
    region: String,
}

impl DynamoClient {
    /// Build a client on the shared runtime.
    pub fn connect(config: ClientConfig) -> Result<Self> {
        Self::connect_with_runtime(config, shared_runtime()?)
    }

    /// Build a client whose calls block on `runtime`.
    pub fn connect_with_runtime(config: ClientConfig, runtime: Arc<Runtime>) -> Result<Self> {
        let (client, region) = runtime.block_on(build_client(config));
        debug!(region = %region, "DynamoDB client ready");
        Ok(DynamoClient {
            client,
            runtime,
            region,
        })
    }

    /// Wrap an SDK client built elsewhere.
    pub fn from_sdk_client(client: Client, runtime: Arc<Runtime>) -> Self {
        let region = client
            .config()
            .region()
            .map(|r| r.as_ref().to_string())
            .unwrap_or_else(|| DEFAULT_REGION.to_string());
        DynamoClient {
            client,
            runtime,
            region,
        }
    }

    /// Get the configured AWS region.
    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn sdk_client(&self) -> &Client {
        &self.client
    }

    pub fn runtime(&self) -> &Arc<Runtime> {
        &self.runtime
    }

    /// Check connectivity with a ListTables call limited to one table.
    pub fn ping(&self) -> Result<()> {
        self.runtime
            .block_on(self.client.list_tables().limit(1).send())
            .map_err(|e| map_sdk_error(e, None))?;
        Ok(())
    }

    /// Handle bound to `table_name`, sharing this client and runtime.
    pub fn table(&self, table_name: impl Into<String>) -> DynamoTable<Client> {
        DynamoTable::new(table_name, self.client.clone(), self.runtime.clone())
    }

    pub fn execute_statement(&self, statement: &Statement) -> Result<Vec<Item>> {
        basic_operations::execute_statement(&self.client, &self.runtime, statement)
    }

    pub fn batch_execute_statements(
        &self,
        statements: &[Statement],
    ) -> Result<Vec<StatementOutcome>> {
        basic_operations::batch_execute_statements(&self.client, &self.runtime, statements)
    }
}

impl std::fmt::Debug for DynamoClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamoClient")
            .field("region", &self.region)
            .finish_non_exhaustive()
    }
}

/// Build the AWS SDK DynamoDB client with the given configuration.
async fn build_client(config: ClientConfig) -> (Client, String) {
    let region_provider = RegionProviderChain::first_try(config.region.clone().map(Region::new))
        .or_default_provider()
        .or_else(DEFAULT_REGION);

    let mut config_loader = aws_config::defaults(BehaviorVersion::latest()).region(region_provider);

    // Credentials priority: hardcoded > profile > env/default chain
    if let (Some(ak), Some(sk)) = (config.access_key, config.secret_key) {
        let creds = Credentials::new(ak, sk, config.session_token, None, "dynohelp-static");
        config_loader = config_loader.credentials_provider(creds);
    } else if let Some(profile_name) = config.profile {
        let profile_provider = ProfileFileCredentialsProvider::builder()
            .profile_name(&profile_name)
            .build();
        config_loader = config_loader.credentials_provider(profile_provider);
    }

    let sdk_config = config_loader.load().await;
    let region = sdk_config
        .region()
        .map(|r| r.as_ref().to_string())
        .unwrap_or_else(|| DEFAULT_REGION.to_string());

    let mut dynamo_config = aws_sdk_dynamodb::config::Builder::from(&sdk_config);
    if let Some(url) = config.endpoint_url {
        dynamo_config = dynamo_config.endpoint_url(url);
    }

    (Client::from_conf(dynamo_config.build()), region)
}
