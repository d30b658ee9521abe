use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::error::Aria2Error;
use crate::progress::snapshot::ProgressSnapshot;

use super::types::{AddUriOptions, Gid, TellStatus, VersionInfo};

/// Keys requested from `aria2.tellStatus`; keeps replies small.
const STATUS_KEYS: [&str; 8] = [
    "gid",
    "status",
    "totalLength",
    "completedLength",
    "downloadSpeed",
    "errorCode",
    "errorMessage",
    "dir",
];

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: String,
    method: &'a str,
    params: Vec<Value>,
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

#[derive(Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

/// JSON-RPC client for a running aria2 instance.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct Aria2Client {
    http: reqwest::Client,
    endpoint: String,
    secret: Option<String>,
}

impl Aria2Client {
    pub fn new(config: &ClientConfig) -> Result<Self, Aria2Error> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.request_timeout)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            secret: config.secret.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Queue `uris` (mirrors of the same file) and return the new GID
    /// without waiting for the transfer.
    pub async fn add_uri(&self, uris: &[String], options: &AddUriOptions) -> Result<Gid, Aria2Error> {
        self.call("aria2.addUri", vec![json!(uris), serde_json::to_value(options)?])
            .await
    }

    pub async fn tell_status(&self, gid: &Gid) -> Result<TellStatus, Aria2Error> {
        self.call("aria2.tellStatus", vec![json!(gid), json!(STATUS_KEYS)])
            .await
    }

    /// Current progress of `gid` as a snapshot.
    pub async fn progress(&self, gid: &Gid) -> Result<ProgressSnapshot, Aria2Error> {
        Ok(self.tell_status(gid).await?.to_snapshot())
    }

    pub async fn pause(&self, gid: &Gid) -> Result<(), Aria2Error> {
        self.call::<Gid>("aria2.pause", vec![json!(gid)]).await?;
        Ok(())
    }

    pub async fn unpause(&self, gid: &Gid) -> Result<(), Aria2Error> {
        self.call::<Gid>("aria2.unpause", vec![json!(gid)]).await?;
        Ok(())
    }

    /// Stop the download and drop it from aria2's queue.
    pub async fn remove(&self, gid: &Gid) -> Result<(), Aria2Error> {
        self.call::<Gid>("aria2.remove", vec![json!(gid)]).await?;
        Ok(())
    }

    pub async fn get_version(&self) -> Result<VersionInfo, Aria2Error> {
        self.call("aria2.getVersion", Vec::new()).await
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, mut params: Vec<Value>) -> Result<T, Aria2Error> {
        if let Some(secret) = &self.secret {
            params.insert(0, Value::String(format!("token:{}", secret)));
        }
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: Uuid::new_v4().to_string(),
            method,
            params,
        };

        log::debug!("aria2 rpc {} -> {}", method, self.endpoint);

        // aria2 answers RPC errors with a 4xx status and an error body, so the
        // body is decoded whatever the status code.
        let body = self
            .http
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await?
            .text()
            .await?;

        let response: RpcResponse = serde_json::from_str(&body)?;
        if let Some(error) = response.error {
            log::debug!("aria2 rpc {} failed: [{}] {}", method, error.code, error.message);
            return Err(Aria2Error::Rpc {
                code: error.code,
                message: error.message,
            });
        }
        let result = response.result.ok_or(Aria2Error::EmptyResponse)?;
        Ok(serde_json::from_value(result)?)
    }
}
