use std::path::PathBuf;
use std::time::Duration;

/// Where aria2 listens when nothing else is configured.
pub const DEFAULT_RPC_ENDPOINT: &str = "http://localhost:6800/jsonrpc";

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub const ENV_RPC_URL: &str = "ORION_RPC_URL";
pub const ENV_RPC_SECRET: &str = "ORION_RPC_SECRET";
pub const ENV_DOWNLOAD_DIR: &str = "ORION_DOWNLOAD_DIR";
pub const ENV_ARIA2C: &str = "ORION_ARIA2C";

const DEFAULT_ARIA2C: &str = "aria2c";

/// Connection and placement settings shared by the RPC client and the daemon.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// JSON-RPC endpoint, e.g. `http://localhost:6800/jsonrpc`.
    pub endpoint: String,
    /// Value of aria2's `--rpc-secret`, if one is set.
    pub secret: Option<String>,
    /// Directory new downloads are saved into.
    pub download_dir: PathBuf,
    pub request_timeout: Duration,
    /// Program started by `Aria2Daemon`; looked up on `PATH` when relative.
    pub aria2c_program: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_RPC_ENDPOINT.to_string(),
            secret: None,
            download_dir: default_download_dir(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            aria2c_program: PathBuf::from(DEFAULT_ARIA2C),
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by `ORION_RPC_URL`, `ORION_RPC_SECRET`,
    /// `ORION_DOWNLOAD_DIR` and `ORION_ARIA2C`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] but reads variables through
    /// `lookup`. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(endpoint) = get(ENV_RPC_URL) {
            config.endpoint = endpoint;
        }
        config.secret = get(ENV_RPC_SECRET);
        if let Some(dir) = get(ENV_DOWNLOAD_DIR) {
            config.download_dir = PathBuf::from(dir);
        }
        if let Some(program) = get(ENV_ARIA2C) {
            config.aria2c_program = PathBuf::from(program);
        }
        config
    }
}

/// The user's Downloads folder when it exists, otherwise the home directory,
/// otherwise the current working directory.
pub fn default_download_dir() -> PathBuf {
    dirs::download_dir()
        .filter(|dir| dir.is_dir())
        .or_else(dirs::home_dir)
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_overrides() {
        let config = ClientConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config.endpoint, DEFAULT_RPC_ENDPOINT);
        assert!(config.secret.is_none());
        assert_eq!(config.request_timeout, DEFAULT_REQUEST_TIMEOUT);
        assert_eq!(config.download_dir, default_download_dir());
        assert_eq!(config.aria2c_program, PathBuf::from("aria2c"));
    }

    #[test]
    fn test_env_overrides() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            (ENV_RPC_URL, "http://10.0.0.2:6801/jsonrpc"),
            (ENV_RPC_SECRET, "hunter2"),
            (ENV_DOWNLOAD_DIR, "/srv/downloads"),
            (ENV_ARIA2C, "/opt/aria2/bin/aria2c"),
        ]));
        assert_eq!(config.endpoint, "http://10.0.0.2:6801/jsonrpc");
        assert_eq!(config.secret.as_deref(), Some("hunter2"));
        assert_eq!(config.download_dir, PathBuf::from("/srv/downloads"));
        assert_eq!(config.aria2c_program, PathBuf::from("/opt/aria2/bin/aria2c"));
    }

    #[test]
    fn test_download_dir_override_is_taken_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("not-created-yet");
        let config = ClientConfig::from_lookup(lookup_from(&[(
            ENV_DOWNLOAD_DIR,
            path.to_str().unwrap(),
        )]));
        assert_eq!(config.download_dir, path);
        assert!(!config.download_dir.exists());
    }

    #[test]
    fn test_blank_values_are_ignored() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            (ENV_RPC_URL, "   "),
            (ENV_RPC_SECRET, ""),
        ]));
        assert_eq!(config.endpoint, DEFAULT_RPC_ENDPOINT);
        assert!(config.secret.is_none());
    }
}
