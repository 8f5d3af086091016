//! Managed account creation
//!
//! New LNDHub-style accounts are created by posting to the server's
//! `/create` endpoint. Custodial servers need an explicit acknowledgement
//! before an account is created on them.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Login returned by account creation
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AccountLogin {
    pub login: String,
    pub password: String,
}

/// Creates accounts on a managed-account server
#[async_trait]
pub trait AccountProvisioner: Send + Sync {
    async fn create_account(
        &self,
        server_url: &str,
        verify_cert: bool,
        use_tor: bool,
    ) -> Result<AccountLogin>;
}

/// Check whether a server is on the custodial list
pub fn is_custodial(server_url: &str, custodial_hosts: &[String]) -> bool {
    let normalized = server_url.trim().trim_end_matches('/');
    custodial_hosts
        .iter()
        .any(|h| h.trim_end_matches('/').eq_ignore_ascii_case(normalized))
}

#[derive(Serialize)]
struct CreateAccountBody<'a> {
    partnerid: &'a str,
    accounttype: &'a str,
}

/// HTTP provisioner talking to an LNDHub-compatible server
pub struct HttpAccountProvisioner {
    timeout: Duration,

    /// SOCKS proxy for Tor requests, e.g. `socks5h://127.0.0.1:9050`
    tor_proxy: Option<String>,
}

impl HttpAccountProvisioner {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            tor_proxy: None,
        }
    }

    pub fn with_tor_proxy(mut self, proxy_url: impl Into<String>) -> Self {
        self.tor_proxy = Some(proxy_url.into());
        self
    }

    fn client(&self, verify_cert: bool, use_tor: bool) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .danger_accept_invalid_certs(!verify_cert);

        if use_tor {
            let proxy_url = self.tor_proxy.as_deref().ok_or_else(|| {
                Error::AccountCreation("tor proxy not configured".to_string())
            })?;
            debug!("Routing account creation through {}", proxy_url);
            builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
        }

        Ok(builder.build()?)
    }

    fn endpoint(server_url: &str) -> String {
        let base = server_url.trim().trim_end_matches('/');
        if base.starts_with("http://") || base.starts_with("https://") {
            format!("{}/create", base)
        } else {
            format!("https://{}/create", base)
        }
    }
}

#[async_trait]
impl AccountProvisioner for HttpAccountProvisioner {
    async fn create_account(
        &self,
        server_url: &str,
        verify_cert: bool,
        use_tor: bool,
    ) -> Result<AccountLogin> {
        let client = self.client(verify_cert, use_tor)?;

        let response = client
            .post(Self::endpoint(server_url))
            .json(&CreateAccountBody {
                partnerid: "bluewallet",
                accounttype: "common",
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::AccountCreation(format!(
                "server returned {}",
                response.status()
            )));
        }

        let login: AccountLogin = response
            .json()
            .await
            .map_err(|e| Error::Deserialization(e.to_string()))?;

        if login.login.is_empty() || login.password.is_empty() {
            return Err(Error::AccountCreation(
                "server returned empty credentials".to_string(),
            ));
        }

        info!("Created managed account on {}", server_url);
        Ok(login)
    }
}
