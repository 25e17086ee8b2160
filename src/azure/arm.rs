//! Azure Resource Manager list calls.
//!
//! Lists go through `az rest`, which reuses the credentials of `az login`.
//! The `{ value, nextLink }` envelope is followed until the collection is complete.

use super::cli;
use crate::config::{
    ARM_ENDPOINT, COMPUTE_API_VERSION, MAX_PAGES, NETWORK_API_VERSION, SUBSCRIPTION_PLACEHOLDER,
};
use crate::error::{FetchError, ResourceType};
use crate::models::ArmPage;
use serde::de::DeserializeOwned;
use std::future::Future;

/// URL listing one collection of a resource group.
///
/// Without a subscription id the `az rest` placeholder is used, so the
/// logged-in account's subscription applies.
pub fn list_url(
    subscription_id: Option<&str>,
    resource_group: &str,
    resource_type: ResourceType,
) -> String {
    let api_version = match resource_type {
        ResourceType::VirtualMachines => COMPUTE_API_VERSION,
        _ => NETWORK_API_VERSION,
    };
    format!(
        "{ARM_ENDPOINT}/subscriptions/{subscription}/resourceGroups/{resource_group}/providers/{provider}/{collection}?api-version={api_version}",
        subscription = subscription_id.unwrap_or(SUBSCRIPTION_PLACEHOLDER),
        provider = resource_type.provider(),
        collection = resource_type.collection(),
    )
}

/// Parse one page of a list response, reporting the JSON path on failure.
pub fn parse_page<T: DeserializeOwned>(output: &str, page: usize) -> Result<ArmPage<T>, FetchError> {
    let mut json_block_deserializer = serde_json::Deserializer::from_str(output);
    serde_path_to_error::deserialize(&mut json_block_deserializer).map_err(|e| {
        log::debug!("OUTPUT START:\n\n{}\n\nOUTPUT END\n", output);
        format!(
            "Error parsing JSON page {}: path={} error={}",
            page,
            e.path(),
            e
        )
        .into()
    })
}

/// Fetch every page starting at `url` using `get` for each request.
pub async fn list_all_with<T, F, Fut>(url: String, mut get: F) -> Result<Vec<T>, FetchError>
where
    T: DeserializeOwned,
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<String, FetchError>>,
{
    let mut records = Vec::new();
    let mut next = Some(url);
    let mut seen_links: Vec<String> = Vec::new();
    let mut page = 0;

    while let Some(url) = next.take() {
        if page >= MAX_PAGES {
            return Err(format!("Gave up after {MAX_PAGES} pages at {url}").into());
        }
        if seen_links.contains(&url) {
            return Err("nextLink not unique - possible infinite loop".into());
        }

        let output = get(url.clone()).await?;
        let parsed: ArmPage<T> = parse_page(&output, page)?;
        let count = parsed.value.len();
        records.extend(parsed.value);

        log::debug!(
            "got page#{page:2} record_count=+{count:3} => {total:3} next={more}",
            total = records.len(),
            more = parsed.next_link.is_some(),
        );

        seen_links.push(url);
        next = parsed.next_link.filter(|link| !link.is_empty());
        page += 1;
    }

    Ok(records)
}

/// List one collection through `az rest`.
pub async fn list_all<T: DeserializeOwned>(url: String) -> Result<Vec<T>, FetchError> {
    list_all_with(url, |url| async move {
        cli::run(&format!(
            "az rest --method get --url \"{url}\" --output json"
        ))
        .await
    })
    .await
}
