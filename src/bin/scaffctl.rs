//! scaffctl: command-line client for a running scaffold server.
//!
//! ```bash
//! # Generate the module for a config without deploying it
//! scaffctl generate 6f1c...
//!
//! # Generate and deploy, waiting for a terminal status
//! scaffctl deploy 6f1c... --env staging
//!
//! # Inspect or follow a deployment job
//! scaffctl status 9ab2... --watch
//!
//! # Request cancellation / roll back to an earlier version
//! scaffctl cancel 9ab2...
//! scaffctl rollback 3c77...
//! ```

use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use std::process::ExitCode;
use std::time::Duration;
use tokio::time::sleep;

/// Exit codes: 0 terminal success, 2 validation failure, 3 executor failure,
/// 4 not found, 1 anything else.
const EXIT_VALIDATION: u8 = 2;
const EXIT_EXECUTOR: u8 = 3;
const EXIT_NOT_FOUND: u8 = 4;

const WATCH_INTERVAL: Duration = Duration::from_secs(2);

#[derive(Parser)]
#[command(name = "scaffctl", about = "Scaffold server CLI", long_about = None)]
struct Cli {
    /// Base URL of a running scaffold server
    #[arg(long, global = true, default_value = "http://localhost:3000")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the module for a config without deploying it
    Generate {
        /// Config id (uuid)
        config_id: String,
    },
    /// Generate and deploy a config, waiting for a terminal status
    Deploy {
        /// Config id (uuid)
        config_id: String,
        /// Target environment name
        #[arg(long)]
        env: Option<String>,
    },
    /// Show a deployment job
    Status {
        /// Job id (uuid)
        job_id: String,
        /// Poll until the job reaches a terminal status
        #[arg(long)]
        watch: bool,
    },
    /// Request cancellation of a deployment job
    Cancel {
        /// Job id (uuid)
        job_id: String,
    },
    /// Roll a config back to an earlier version
    Rollback {
        /// Version id (uuid)
        version_id: String,
    },
}

enum CliError {
    Http { status: u16, body: String },
    Transport(String),
}

impl CliError {
    fn report(&self) -> ExitCode {
        match self {
            CliError::Http { status, body } => {
                eprintln!("server returned {}: {}", status, body);
                match *status {
                    422 => ExitCode::from(EXIT_VALIDATION),
                    404 => ExitCode::from(EXIT_NOT_FOUND),
                    502 => ExitCode::from(EXIT_EXECUTOR),
                    _ => ExitCode::FAILURE,
                }
            }
            CliError::Transport(message) => {
                eprintln!("request failed: {}", message);
                ExitCode::FAILURE
            }
        }
    }
}

struct ApiClient {
    base: String,
    client: reqwest::Client,
}

impl ApiClient {
    fn new(base: &str) -> Self {
        ApiClient {
            base: base.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    async fn get(&self, path: &str) -> Result<Value, CliError> {
        let resp = self
            .client
            .get(format!("{}{}", self.base, path))
            .send()
            .await
            .map_err(|e| CliError::Transport(e.to_string()))?;
        read_body(resp).await
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value, CliError> {
        let resp = self
            .client
            .post(format!("{}{}", self.base, path))
            .json(&body)
            .send()
            .await
            .map_err(|e| CliError::Transport(e.to_string()))?;
        read_body(resp).await
    }
}

async fn read_body(resp: reqwest::Response) -> Result<Value, CliError> {
    let status = resp.status();
    let text = resp
        .text()
        .await
        .map_err(|e| CliError::Transport(e.to_string()))?;
    if !status.is_success() {
        return Err(CliError::Http {
            status: status.as_u16(),
            body: text,
        });
    }
    serde_json::from_str(&text).map_err(|e| CliError::Transport(format!("malformed response: {}", e)))
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let api = ApiClient::new(&cli.server);

    let result = match cli.command {
        Commands::Generate { config_id } => {
            submit_and_wait(&api, &config_id, json!({ "generateOnly": true })).await
        }
        Commands::Deploy { config_id, env } => {
            submit_and_wait(&api, &config_id, json!({ "targetEnv": env })).await
        }
        Commands::Status { job_id, watch } => status(&api, &job_id, watch).await,
        Commands::Cancel { job_id } => {
            api.post(&format!("/api/v1/deployments/{}/cancel", job_id), json!({}))
                .await
                .map(|v| {
                    print_pretty(&v);
                    ExitCode::SUCCESS
                })
        }
        Commands::Rollback { version_id } => {
            api.post(&format!("/api/v1/versions/{}/rollback", version_id), json!({}))
                .await
                .map(|v| {
                    print_pretty(&v);
                    ExitCode::SUCCESS
                })
        }
    };

    match result {
        Ok(code) => code,
        Err(e) => e.report(),
    }
}

async fn submit_and_wait(api: &ApiClient, config_id: &str, options: Value) -> Result<ExitCode, CliError> {
    let resp = api
        .post(
            "/api/v1/deployments",
            json!({ "configId": config_id, "options": options }),
        )
        .await?;
    let job_id = resp["data"]["id"].as_str().unwrap_or_default().to_string();
    println!("job {}", job_id);
    watch_until_terminal(api, &job_id).await
}

async fn status(api: &ApiClient, job_id: &str, watch: bool) -> Result<ExitCode, CliError> {
    if watch {
        return watch_until_terminal(api, job_id).await;
    }
    let resp = api.get(&format!("/api/v1/deployments/{}", job_id)).await?;
    print_pretty(&resp);
    Ok(exit_for_status(resp["data"]["status"].as_str().unwrap_or_default()))
}

async fn watch_until_terminal(api: &ApiClient, job_id: &str) -> Result<ExitCode, CliError> {
    let mut printed_logs = 0usize;
    loop {
        let resp = api.get(&format!("/api/v1/deployments/{}", job_id)).await?;
        let job = &resp["data"];
        let status = job["status"].as_str().unwrap_or_default().to_string();
        let progress = job["progress"].as_u64().unwrap_or(0);
        if let Some(logs) = job["logs"].as_array() {
            for line in &logs[printed_logs.min(logs.len())..] {
                println!(
                    "  [{}] {}",
                    line["level"].as_str().unwrap_or("info"),
                    line["message"].as_str().unwrap_or_default()
                );
            }
            printed_logs = logs.len();
        }
        println!("{} {}%", status, progress);
        if matches!(status.as_str(), "success" | "failed" | "canceled") {
            if status == "failed" {
                if let Some(error) = job.get("error").filter(|e| !e.is_null()) {
                    eprintln!("error: {}", error);
                }
            }
            return Ok(exit_for_status(&status));
        }
        sleep(WATCH_INTERVAL).await;
    }
}

fn exit_for_status(status: &str) -> ExitCode {
    match status {
        "failed" => ExitCode::from(EXIT_EXECUTOR),
        "canceled" => ExitCode::FAILURE,
        _ => ExitCode::SUCCESS,
    }
}

fn print_pretty(value: &Value) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
    );
}
