use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProxyConfig {
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl ProxyConfig {
    /// Proxy URL with credentials inlined, as accepted by HTTP clients.
    pub fn connection_url(&self) -> String {
        match (&self.username, &self.password) {
            (Some(u), Some(p)) => match self.url.split_once("://") {
                Some((scheme, rest)) => format!("{}://{}:{}@{}", scheme, u, p, rest),
                None => self.url.clone(),
            },
            _ => self.url.clone(),
        }
    }
}

/// Network the batch talks to; `name` is the human-readable label used in logs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChainConfig {
    pub name: String,
    pub rpc_endpoint: String,
    pub chain_id: Option<u64>,
}
