use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};

use orion_core::aria2::{AddUriOptions, Aria2Client, Aria2Daemon, Gid};
use orion_core::progress::{format_bytes, ProgressPoller, ProgressSnapshot};
use orion_core::{Aria2Error, ClientConfig};

mod terminal_observer;
use terminal_observer::TerminalProgressObserver;

#[derive(Parser)]
#[command(name = "orion", about = "Download manager driving an aria2 backend")]
struct Args {
    /// aria2 JSON-RPC endpoint (default: $ORION_RPC_URL or http://localhost:6800/jsonrpc)
    #[arg(long, global = true)]
    rpc_url: Option<String>,

    /// aria2 RPC secret (default: $ORION_RPC_SECRET)
    #[arg(long, global = true)]
    secret: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Queue a URL and print its GID
    Add {
        url: String,
        /// Directory to save into (default: $ORION_DOWNLOAD_DIR or ~/Downloads)
        #[arg(short, long)]
        dir: Option<PathBuf>,
        /// File name to save as
        #[arg(short, long)]
        out: Option<String>,
        /// Follow progress until the download finishes
        #[arg(short, long)]
        watch: bool,
    },
    /// Print the current progress of a download
    Status {
        gid: String,
        /// Print the snapshot as JSON
        #[arg(long)]
        json: bool,
    },
    /// Follow a download with a progress bar until it finishes
    Watch {
        gid: String,
        #[arg(long, default_value = "500")]
        interval_ms: u64,
    },
    /// Pause a download
    Pause { gid: String },
    /// Resume a paused download
    Resume { gid: String },
    /// Cancel and remove a download
    Cancel { gid: String },
    /// Run aria2c with RPC enabled until Ctrl-C; `dir <path>` on stdin
    /// restarts it saving into another directory
    Daemon {
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },
    /// Print the download directory new downloads are saved into
    Dir,
    /// Parse a progress snapshot from JSON text and print it
    Inspect { json: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let mut config = ClientConfig::from_env();
    if let Some(url) = args.rpc_url {
        config.endpoint = url;
    }
    if args.secret.is_some() {
        config.secret = args.secret;
    }

    match args.command {
        Command::Add { url, dir, out, watch } => {
            let client = Aria2Client::new(&config)?;
            let dir = dir.unwrap_or_else(|| config.download_dir.clone());
            let options = AddUriOptions {
                dir: Some(dir.display().to_string()),
                out,
            };
            println!("Starting download for: {}", url);
            let gid = client.add_uri(&[url], &options).await?;
            println!("{}", gid);
            if watch {
                follow(client, gid, Duration::from_millis(500)).await?;
            }
        }
        Command::Status { gid, json } => {
            let client = Aria2Client::new(&config)?;
            let snapshot = client.progress(&Gid::new(gid)?).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else {
                print_snapshot(&snapshot);
            }
        }
        Command::Watch { gid, interval_ms } => {
            let client = Aria2Client::new(&config)?;
            follow(client, Gid::new(gid)?, Duration::from_millis(interval_ms)).await?;
        }
        Command::Pause { gid } => {
            Aria2Client::new(&config)?.pause(&Gid::new(gid)?).await?;
        }
        Command::Resume { gid } => {
            Aria2Client::new(&config)?.unpause(&Gid::new(gid)?).await?;
        }
        Command::Cancel { gid } => {
            Aria2Client::new(&config)?.remove(&Gid::new(gid)?).await?;
        }
        Command::Daemon { dir } => {
            if let Some(dir) = dir {
                config.download_dir = dir;
            }
            run_daemon(&config).await?;
        }
        Command::Dir => {
            println!("{}", download_dir_line(&config));
        }
        Command::Inspect { json } => {
            let snapshot: ProgressSnapshot = json.parse()?;
            print_snapshot(&snapshot);
        }
    }
    Ok(())
}

/// Lines understood on stdin while `orion daemon` runs.
#[derive(Debug, PartialEq)]
enum DaemonInput {
    ShowDir,
    SetDir(PathBuf),
    Quit,
    Unknown(String),
}

fn parse_daemon_input(line: &str) -> Option<DaemonInput> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let (cmd, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(cmd, rest)| (cmd, rest.trim()));

    Some(match cmd {
        "dir" if rest.is_empty() => DaemonInput::ShowDir,
        "dir" => DaemonInput::SetDir(PathBuf::from(rest)),
        "quit" | "exit" => DaemonInput::Quit,
        _ => DaemonInput::Unknown(line.to_string()),
    })
}

/// Run aria2c until Ctrl-C or `quit`, restarting it when a new download
/// directory is entered. An aria2 that is already listening is left alone.
async fn run_daemon(config: &ClientConfig) -> Result<(), Box<dyn Error>> {
    let mut daemon = match Aria2Daemon::start(config).await {
        Ok(daemon) => daemon,
        Err(Aria2Error::AlreadyRunning) => {
            println!("aria2 is already running on {}", config.endpoint);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    println!(
        "aria2c listening on {}, saving to {}",
        config.endpoint,
        daemon.download_dir().display()
    );
    println!("Enter `dir <path>` to change the download directory, `quit` or Ctrl-C to stop.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                signal?;
                break;
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    // stdin closed; keep serving until interrupted.
                    tokio::signal::ctrl_c().await?;
                    break;
                };
                match parse_daemon_input(&line) {
                    None => {}
                    Some(DaemonInput::ShowDir) => println!("{}", daemon.download_dir().display()),
                    Some(DaemonInput::SetDir(dir)) => {
                        daemon.restart_in(dir).await?;
                        println!("aria2c restarted, saving to {}", daemon.download_dir().display());
                    }
                    Some(DaemonInput::Quit) => break,
                    Some(DaemonInput::Unknown(input)) => {
                        eprintln!("unknown command `{}`; try `dir <path>` or `quit`", input)
                    }
                }
            }
        }
    }

    daemon.stop().await?;
    Ok(())
}

fn download_dir_line(config: &ClientConfig) -> String {
    config.download_dir.display().to_string()
}

/// Poll `gid` with a terminal bar until it completes, fails, or Ctrl-C.
async fn follow(client: Aria2Client, gid: Gid, interval: Duration) -> Result<(), Box<dyn Error>> {
    let mut poller = ProgressPoller::new(client, gid.clone()).with_interval(interval);
    poller.add_observer(Box::new(TerminalProgressObserver::new(gid.to_string())));

    let cancel = poller.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    let last = poller.run().await?;
    log::info!("stopped following {} at {:?}", gid, last.status);
    Ok(())
}

fn print_snapshot(snapshot: &ProgressSnapshot) {
    fn show<T: std::fmt::Display>(value: Option<T>) -> String {
        value.map_or_else(|| "-".to_string(), |v| v.to_string())
    }

    println!("status:    {}", show(snapshot.status.as_deref()));
    println!(
        "progress:  {}",
        show(snapshot.progress.map(|p| format!("{:.1}%", p * 100.0)))
    );
    println!(
        "speed:     {}",
        show(snapshot.download_speed.map(|s| format!("{}/s", format_bytes(s as u64))))
    );
    println!("completed: {}", show(snapshot.completed_size.map(format_size)));
    println!("total:     {}", show(snapshot.total_size.map(format_size)));
}

/// Whole, non-negative sizes get units; anything else is shown as given.
fn format_size(size: f64) -> String {
    if size >= 0.0 && size.fract() == 0.0 && size <= u64::MAX as f64 {
        format_bytes(size as u64)
    } else {
        format!("{} B", size)
    }
}
