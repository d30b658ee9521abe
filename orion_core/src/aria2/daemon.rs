use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::{Child, Command};

use crate::config::ClientConfig;
use crate::error::Aria2Error;

use super::client::Aria2Client;

/// An `aria2c` process started and owned by this program.
///
/// The program comes from `ClientConfig::aria2c_program`.
///
/// The child is killed when the daemon is dropped.
pub struct Aria2Daemon {
    child: Child,
    config: ClientConfig,
}

impl Aria2Daemon {
    /// Start `aria2c` with RPC enabled, saving into `config.download_dir`.
    ///
    /// Fails with [`Aria2Error::AlreadyRunning`] when something already
    /// answers RPC calls on the configured endpoint.
    pub async fn start(config: &ClientConfig) -> Result<Self, Aria2Error> {
        let client = Aria2Client::new(config)?;
        if let Ok(version) = client.get_version().await {
            log::info!("aria2 {} already listening on {}", version.version, client.endpoint());
            return Err(Aria2Error::AlreadyRunning);
        }

        let child = spawn(config, &config.download_dir)?;
        log::info!("aria2c started, saving to {}", config.download_dir.display());
        Ok(Self {
            child,
            config: config.clone(),
        })
    }

    pub fn download_dir(&self) -> &Path {
        &self.config.download_dir
    }

    /// Kill the running process and start a new one that saves into `dir`.
    ///
    /// Downloads already queued in the old process are lost, as aria2 keeps
    /// no session file here.
    pub async fn restart_in(&mut self, dir: PathBuf) -> Result<(), Aria2Error> {
        log::info!("restarting aria2c with download directory {}", dir.display());
        self.kill().await?;
        self.child = spawn(&self.config, &dir)?;
        self.config.download_dir = dir;
        Ok(())
    }

    pub async fn stop(mut self) -> Result<(), Aria2Error> {
        log::info!("stopping aria2c");
        self.kill().await
    }

    async fn kill(&mut self) -> Result<(), Aria2Error> {
        // An already-exited child is fine; anything else is reported.
        match self.child.try_wait() {
            Ok(Some(status)) => {
                log::warn!("aria2c had already exited: {}", status);
                Ok(())
            }
            _ => self.child.kill().await.map_err(Aria2Error::Stop),
        }
    }
}

/// Arguments `aria2c` is launched with.
pub fn command_args(config: &ClientConfig, dir: &Path) -> Vec<String> {
    let mut args = vec!["--enable-rpc".to_string(), "--rpc-listen-all".to_string()];

    if let Some(port) = reqwest::Url::parse(&config.endpoint)
        .ok()
        .and_then(|url| url.port_or_known_default())
    {
        args.push(format!("--rpc-listen-port={}", port));
    }
    if !dir.as_os_str().is_empty() {
        args.push(format!("--dir={}", dir.display()));
    }
    if let Some(secret) = &config.secret {
        args.push(format!("--rpc-secret={}", secret));
    }
    args
}

fn spawn(config: &ClientConfig, dir: &Path) -> Result<Child, Aria2Error> {
    Command::new(&config.aria2c_program)
        .args(command_args(config, dir))
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| {
            log::error!("could not run {}: {}", config.aria2c_program.display(), e);
            Aria2Error::Spawn(e)
        })
}
