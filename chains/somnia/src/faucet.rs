use crate::config::Settings;
use anyhow::{Context, Result};
use async_trait::async_trait;
use core_logic::{NetworkError, ProxyConfig};
use ethers::types::Address;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, ORIGIN, REFERER, USER_AGENT};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use url::Url;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const BROWSER_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64)";

/// HTTP status and raw body returned by the faucet endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaucetReply {
    pub status: u16,
    pub body: String,
}

/// Native-currency faucet endpoint.
///
/// Any HTTP status is a reply; only transport failures are errors.
#[async_trait]
pub trait FaucetApi: Send + Sync {
    async fn request(&self, address: Address) -> Result<FaucetReply>;

    /// Proxy the requests go through, if any.
    fn proxy(&self) -> Option<&ProxyConfig> {
        None
    }
}

#[derive(Serialize)]
struct FaucetPayload {
    address: String,
}

pub struct HttpFaucet {
    client: Client,
    url: Url,
    proxy: Option<ProxyConfig>,
}

impl HttpFaucet {
    pub fn new(settings: &Settings) -> Result<Self> {
        let mut client_builder = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .default_headers(browser_headers(&settings.faucet_url)?);

        if let Some(proxy_conf) = &settings.proxy {
            // socks proxies take credentials from the URL itself
            let proxy = reqwest::Proxy::all(proxy_conf.connection_url())?;
            client_builder = client_builder.proxy(proxy);
        }

        Ok(Self {
            client: client_builder.build()?,
            url: settings.faucet_url.clone(),
            proxy: settings.proxy.clone(),
        })
    }
}

fn browser_headers(faucet_url: &Url) -> Result<HeaderMap> {
    let origin = faucet_url.origin().ascii_serialization();

    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_UA));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(ORIGIN, HeaderValue::from_str(&origin)?);
    headers.insert(REFERER, HeaderValue::from_str(&origin)?);
    Ok(headers)
}

#[async_trait]
impl FaucetApi for HttpFaucet {
    async fn request(&self, address: Address) -> Result<FaucetReply> {
        let payload = FaucetPayload {
            address: format!("{:?}", address),
        };

        let response = self
            .client
            .post(self.url.clone())
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    anyhow::Error::new(NetworkError::Timeout {
                        timeout_ms: REQUEST_TIMEOUT.as_millis() as u64,
                        endpoint: self.url.to_string(),
                    })
                } else {
                    anyhow::Error::new(e).context("Faucet request failed")
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .with_context(|| format!("Failed to read faucet response ({})", status))?;

        Ok(FaucetReply {
            status: status.as_u16(),
            body,
        })
    }

    fn proxy(&self) -> Option<&ProxyConfig> {
        self.proxy.as_ref()
    }
}

/// How the faucet answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FaucetStatus {
    Granted,
    RateLimited,
    Rejected(NetworkError),
}

impl FaucetStatus {
    pub fn classify(reply: &FaucetReply, endpoint: &str) -> Self {
        match reply.status {
            200 => FaucetStatus::Granted,
            429 => FaucetStatus::RateLimited,
            _ => FaucetStatus::Rejected(NetworkError::HttpError {
                status_code: reply.status,
                endpoint: endpoint.to_string(),
                body: reply.body.clone(),
            }),
        }
    }
}
