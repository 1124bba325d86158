// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP client for the three third-party endpoints pulse talks to.

use std::sync::OnceLock;

use regex::Regex;
use reqwest::header::COOKIE;
use reqwest::Client;

use crate::config::PulseConfig;

/// HTTP client wrapper over the configured upstream endpoints.
pub struct UpstreamClient {
    client: Client,
    resolver_url: String,
    session_page_url: String,
    write_url: String,
    link_base_url: String,
}

impl UpstreamClient {
    pub fn new(config: &PulseConfig) -> Self {
        let client =
            Client::builder().timeout(config.request_timeout()).build().unwrap_or_default();
        Self {
            client,
            resolver_url: config.resolver_url.clone(),
            session_page_url: config.session_page_url.clone(),
            write_url: config.write_url.clone(),
            link_base_url: config.link_base_url.clone(),
        }
    }

    /// Resolve a resource reference to its internal numeric id.
    ///
    /// Any transport or parse failure comes back as `None`; the caller must
    /// treat that as "unable to resolve" and abort before creating state.
    pub async fn resolve_id(&self, url: &str) -> Option<u64> {
        match self.try_resolve(url).await {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!(url = %url, err = %e, "resource resolution failed");
                None
            }
        }
    }

    async fn try_resolve(&self, url: &str) -> anyhow::Result<Option<u64>> {
        let resp = self
            .client
            .post(&self.resolver_url)
            .form(&[("link", url)])
            .send()
            .await?
            .error_for_status()?;
        let value: serde_json::Value = resp.json().await?;
        Ok(parse_id(&value))
    }

    /// Exchange the normalized credential for a short-lived access token.
    ///
    /// `None` on any failure, including a page with no embedded token.
    pub async fn fetch_access_token(&self, cookie_header: &str) -> Option<String> {
        match self.try_fetch_token(cookie_header).await {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(err = %e, "token exchange failed");
                None
            }
        }
    }

    async fn try_fetch_token(&self, cookie_header: &str) -> anyhow::Result<Option<String>> {
        let resp = self
            .client
            .get(&self.session_page_url)
            .header(COOKIE, cookie_header)
            .send()
            .await?
            .error_for_status()?;
        let body = resp.text().await?;
        Ok(extract_access_token(&body))
    }

    /// Perform one write action for a resolved resource.
    ///
    /// Success is a 2xx status; anything else is an error and terminates the
    /// job on the caller's side.
    pub async fn perform_write(
        &self,
        id: u64,
        access_token: &str,
        cookie_header: &str,
    ) -> anyhow::Result<()> {
        let link = format!("{}/{}", self.link_base_url.trim_end_matches('/'), id);
        self.client
            .post(&self.write_url)
            .query(&[
                ("link", link.as_str()),
                ("published", "0"),
                ("access_token", access_token),
            ])
            .header(COOKIE, cookie_header)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

/// Pull the numeric id out of a resolver response body.
///
/// The endpoint is loose about types: the id arrives as a JSON number or a
/// numeric string depending on the resource.
pub fn parse_id(value: &serde_json::Value) -> Option<u64> {
    match value.get("id") {
        Some(v) if v.is_u64() => v.as_u64(),
        Some(v) => v.as_str().and_then(|s| s.parse().ok()),
        None => None,
    }
}

/// Scrape the embedded access-token literal out of a session page body.
pub fn extract_access_token(body: &str) -> Option<String> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    let re = RE
        .get_or_init(|| Regex::new(r#""accessToken"\s*:\s*"([^"]+)""#).ok())
        .as_ref()?;
    re.captures(body).and_then(|c| c.get(1)).map(|m| m.as_str().to_owned())
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
