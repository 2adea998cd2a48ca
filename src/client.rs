//! DynamoDB client construction.
//!
//! Inside Lambda the execution role supplies credentials through the default
//! chain. An explicit profile and endpoint are supported for running the
//! handlers against local DynamoDB.

use aws_config::meta::region::RegionProviderChain;
use aws_config::profile::ProfileFileCredentialsProvider;
use aws_config::BehaviorVersion;
use aws_sdk_dynamodb::Client;
use tracing::debug;

/// Where and how to reach DynamoDB.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientConfig {
    /// AWS region (default chain, then us-east-1).
    pub region: Option<String>,
    /// AWS profile name from ~/.aws/credentials.
    pub profile: Option<String>,
    /// Custom endpoint URL for local testing.
    pub endpoint_url: Option<String>,
}

/// Build the AWS SDK DynamoDB client with the given configuration.
pub async fn build_client(config: &ClientConfig) -> Client {
    // Region priority: explicit > env var/profile > default
    let region_provider = RegionProviderChain::first_try(
        config
            .region
            .clone()
            .map(aws_sdk_dynamodb::config::Region::new),
    )
    .or_default_provider()
    .or_else("us-east-1");

    let mut config_loader = aws_config::defaults(BehaviorVersion::latest()).region(region_provider);

    if let Some(profile_name) = &config.profile {
        let profile_provider = ProfileFileCredentialsProvider::builder()
            .profile_name(profile_name)
            .build();
        config_loader = config_loader.credentials_provider(profile_provider);
    }

    let sdk_config = config_loader.load().await;

    let mut dynamo_config = aws_sdk_dynamodb::config::Builder::from(&sdk_config);
    if let Some(url) = &config.endpoint_url {
        debug!(endpoint = %url, "using custom DynamoDB endpoint");
        dynamo_config = dynamo_config.endpoint_url(url);
    }

    Client::from_conf(dynamo_config.build())
}
