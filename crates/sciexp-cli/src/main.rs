use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use sciexp_client::{
    ClientConfig, GatewayClient, GatewayError, HttpChannel, LaunchOutcome, LaunchRequest,
    ReconciledStatus, RpcChannel, TerminationOutcome,
};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sciexp", version, about = "Experiment service client")]
struct Cli {
    #[arg(long, global = true, default_value = "sciexp.yaml")]
    config: PathBuf,
    #[arg(long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Launch {
        #[arg(long)]
        user: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        resource: String,
        #[arg(long)]
        queue: String,
        #[arg(long)]
        cores: u32,
        #[arg(long)]
        nodes: u32,
        #[arg(long, default_value_t = 1)]
        groups: u32,
        /// Minutes.
        #[arg(long)]
        wall_time: u32,
        #[arg(long)]
        input: String,
        #[arg(long)]
        output: String,
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        request_id: Option<String>,
        #[arg(long)]
        cluster_user: Option<String>,
        #[arg(long)]
        json: bool,
    },
    Status {
        experiment_id: String,
        #[arg(long)]
        json: bool,
    },
    Errors {
        experiment_id: String,
        #[arg(long)]
        json: bool,
    },
    Terminate {
        experiment_id: String,
        #[arg(long)]
        json: bool,
    },
    Watch {
        experiment_id: String,
        #[arg(long, default_value_t = 30)]
        interval_secs: u64,
        #[arg(long)]
        max_polls: Option<u64>,
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let json_mode = command_json_mode(&cli.command);
    let result = run_command(&cli.config, cli.command);
    match result {
        Ok(Some(payload)) => {
            emit_json(&payload);
            if payload["ok"] == Value::Bool(false) {
                std::process::exit(1);
            }
            Ok(())
        }
        Ok(None) => Ok(()),
        Err(err) => {
            if json_mode {
                emit_json(&json_error(error_code(&err), err.to_string(), json!({})));
                std::process::exit(1);
            }
            Err(err)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "debug" } else { "warn" };
    let filter = std::env::var("SCIEXP_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .ok()
        .and_then(|directive| EnvFilter::try_new(directive).ok())
        .unwrap_or_else(|| EnvFilter::new(default_directive));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn connect(config_path: &Path) -> Result<GatewayClient<HttpChannel>> {
    let config = ClientConfig::load(config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    Ok(GatewayClient::<HttpChannel>::connect(&config)?)
}

fn run_command(config_path: &Path, command: Commands) -> Result<Option<Value>> {
    let client = connect(config_path)?;
    let payload = match command {
        Commands::Launch {
            user,
            name,
            resource,
            queue,
            cores,
            nodes,
            groups,
            wall_time,
            input,
            output,
            host,
            request_id,
            cluster_user,
            json,
        } => {
            let request = LaunchRequest {
                source_host: host.unwrap_or_else(default_source_host),
                user_id: user,
                experiment_name: name,
                request_id: request_id.unwrap_or_else(generated_request_id),
                resource,
                queue,
                cores,
                nodes,
                groups,
                wall_time_minutes: wall_time,
                cluster_user,
                input_path: input,
                output_dir: output,
            };
            let outcome = client.launch(&request);
            if json {
                Some(launch_outcome_to_json(&outcome, &request.request_id))
            } else {
                print_launch_outcome(&outcome, &request.request_id)?;
                None
            }
        }
        Commands::Status {
            experiment_id,
            json,
        } => {
            let status = client.get_status(&experiment_id)?;
            if json {
                Some(json!({
                    "ok": true,
                    "command": "status",
                    "experiment_id": experiment_id,
                    "status": status.as_str()
                }))
            } else {
                println!("{}", status);
                None
            }
        }
        Commands::Errors {
            experiment_id,
            json,
        } => {
            let error = client.get_errors(&experiment_id)?;
            if json {
                Some(json!({
                    "ok": true,
                    "command": "errors",
                    "experiment_id": experiment_id,
                    "error": error
                }))
            } else {
                println!("{}", error.as_deref().unwrap_or("none"));
                None
            }
        }
        Commands::Terminate {
            experiment_id,
            json,
        } => {
            let outcome = client.terminate(&experiment_id);
            if json {
                Some(termination_outcome_to_json(&outcome, &experiment_id))
            } else {
                print_termination_outcome(&outcome, &experiment_id)?;
                None
            }
        }
        Commands::Watch {
            experiment_id,
            interval_secs,
            max_polls,
            json,
        } => {
            let summary = watch(
                &client,
                &experiment_id,
                Duration::from_secs(interval_secs),
                max_polls,
                json,
            )?;
            if json {
                Some(summary)
            } else {
                print_watch_summary(&summary);
                None
            }
        }
    };
    client.shutdown();
    Ok(payload)
}

/// Polls until the reconciled status is terminal or `max_polls` is reached.
/// Returns the summary payload; the first recorded error is looked up only
/// when the final status is `FAILED`.
fn watch<C: RpcChannel>(
    client: &GatewayClient<C>,
    experiment_id: &str,
    interval: Duration,
    max_polls: Option<u64>,
    json: bool,
) -> Result<Value> {
    if max_polls == Some(0) {
        return Err(anyhow!("--max-polls must be positive"));
    }
    let mut polls: u64 = 0;
    let status = loop {
        polls += 1;
        let status = client.get_status(experiment_id)?;
        if json {
            emit_json(&json!({
                "ok": true,
                "command": "watch",
                "experiment_id": experiment_id,
                "poll": polls,
                "status": status.as_str()
            }));
        } else {
            println!("[{}] {}: {}", Utc::now().format("%H:%M:%S"), experiment_id, status);
        }
        if status.is_terminal() || max_polls.is_some_and(|max| polls >= max) {
            break status;
        }
        thread::sleep(interval);
    };

    let error = if status == ReconciledStatus::Failed {
        client.get_errors(experiment_id)?
    } else {
        None
    };
    Ok(json!({
        "ok": true,
        "command": "watch",
        "experiment_id": experiment_id,
        "polls": polls,
        "final_status": status.as_str(),
        "terminal": status.is_terminal(),
        "error": error
    }))
}

fn print_watch_summary(summary: &Value) {
    if let Some(message) = summary["error"].as_str() {
        println!("error: {}", message);
    }
    if summary["terminal"] != Value::Bool(true) {
        println!(
            "stopped after {} polls without a terminal state",
            summary["polls"]
        );
    }
}

fn default_source_host() -> String {
    std::env::var("HOSTNAME").unwrap_or_else(|_| "localhost".to_string())
}

fn generated_request_id() -> String {
    format!("req_{}", Utc::now().format("%Y%m%d_%H%M%S"))
}

fn launch_outcome_to_json(outcome: &LaunchOutcome, request_id: &str) -> Value {
    json!({
        "ok": outcome.launched,
        "command": "launch",
        "launched": outcome.launched,
        "experiment_id": outcome.experiment_id,
        "request_id": request_id,
        "message": outcome.message,
        "error_code": outcome.error_code
    })
}

fn print_launch_outcome(outcome: &LaunchOutcome, request_id: &str) -> Result<()> {
    if !outcome.launched {
        return Err(anyhow!(outcome.message.clone()));
    }
    println!("request_id: {}", request_id);
    println!(
        "experiment_id: {}",
        outcome.experiment_id.as_deref().unwrap_or("none")
    );
    println!("message: {}", outcome.message);
    Ok(())
}

fn termination_outcome_to_json(outcome: &TerminationOutcome, experiment_id: &str) -> Value {
    json!({
        "ok": outcome.terminated,
        "command": "terminate",
        "terminated": outcome.terminated,
        "experiment_id": experiment_id,
        "message": outcome.message,
        "error_code": outcome.error_code
    })
}

fn print_termination_outcome(outcome: &TerminationOutcome, experiment_id: &str) -> Result<()> {
    if !outcome.terminated {
        return Err(anyhow!(outcome.message.clone()));
    }
    println!("experiment_id: {}", experiment_id);
    println!("message: {}", outcome.message);
    Ok(())
}

fn emit_json(value: &Value) {
    match serde_json::to_string(value) {
        Ok(s) => println!("{}", s),
        Err(_) => println!(
            "{{\"ok\":false,\"error\":{{\"code\":\"serialization_error\",\"message\":\"failed to serialize JSON payload\",\"details\":{{}}}}}}"
        ),
    }
}

fn json_error(code: &str, message: String, details: Value) -> Value {
    json!({
        "ok": false,
        "error": {
            "code": code,
            "message": message,
            "details": details
        }
    })
}

fn error_code(err: &anyhow::Error) -> &'static str {
    err.downcast_ref::<GatewayError>()
        .map(GatewayError::code)
        .unwrap_or("command_failed")
}

fn command_json_mode(command: &Commands) -> bool {
    match command {
        Commands::Launch { json, .. }
        | Commands::Status { json, .. }
        | Commands::Errors { json, .. }
        | Commands::Terminate { json, .. }
        | Commands::Watch { json, .. } => *json,
    }
}
