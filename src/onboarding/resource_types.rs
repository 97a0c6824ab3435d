use crate::api::FugueClient;
use crate::error::Result;
use crate::onboarding::provider::Provider;

/// Sentinel asking for every resource type the provider supports.
pub const ALL_RESOURCE_TYPES: &str = "All";

pub fn wants_full_catalog(configured: &[String]) -> bool {
    matches!(configured, [only] if only == ALL_RESOURCE_TYPES)
}

/// Resolve the survey list for one region: the provider's full catalog when
/// configured as `["All"]`, otherwise the configured list unchanged.
pub async fn resolve_resource_types(
    client: &FugueClient,
    provider: Provider,
    region: &str,
    configured: &[String],
) -> Result<Vec<String>> {
    if wants_full_catalog(configured) {
        log::debug!("Fetching {} resource types for {}", provider, region);
        client.resource_types(provider, region).await
    } else {
        Ok(configured.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_sentinel_detection() {
        assert!(wants_full_catalog(&strings(&["All"])));
        assert!(!wants_full_catalog(&strings(&["all"])));
        assert!(!wants_full_catalog(&strings(&["All", "AWS.EC2.Vpc"])));
        assert!(!wants_full_catalog(&[]));
    }

    #[tokio::test]
    async fn test_explicit_list_is_returned_unchanged() {
        // Unroutable base URL: the explicit list must not trigger a request
        let config = crate::config::ApiConfig::new("id", "secret").with_base_url("http://127.0.0.1:9");
        let client = FugueClient::new(config).unwrap();
        let configured = strings(&["AWS.ACM.Certificate", "AWS.ACMPCA.CertificateAuthority"]);

        let resolved = resolve_resource_types(&client, Provider::Aws, "us-east-1", &configured)
            .await
            .unwrap();

        assert_eq!(resolved, configured);
    }
}
