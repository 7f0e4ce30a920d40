use std::sync::Arc;
use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use sym_app::{
    ChatClient, ClientConfig, EventSink, Gateway, HealthProbe, HealthStatus, HttpGateway, JobEvent,
    JobLifecycleClient, PollOptions,
};
use sym_core::{JobOutcome, JobRequest};

/// The chat UI only ever offered this many suggestions.
const MAX_SUGGESTIONS: usize = 8;

#[derive(Parser)]
#[command(name = "symon")]
#[command(author, version, about = "Image generation and chat client", long_about = None)]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Overrides SYM_API_BASE
    #[arg(long, global = true)]
    api_base: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Health,

    Generate {
        prompt: String,

        #[arg(long, default_value = "28")]
        steps: u32,

        #[arg(long, default_value = "7.5")]
        guidance: f32,

        #[arg(long, default_value = "512")]
        width: u32,

        #[arg(long, default_value = "512")]
        height: u32,

        #[arg(long)]
        seed: Option<i64>,

        #[arg(short, long)]
        model: Option<String>,

        #[arg(long)]
        interval_ms: Option<u64>,

        #[arg(long)]
        timeout_ms: Option<u64>,
    },

    Jobs {
        #[arg(short, long, default_value = "25")]
        limit: u32,
    },

    Chat {
        message: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    let mut conf = ClientConfig::load()?;
    if let Some(api_base) = cli.api_base {
        conf.api_base = api_base;
    }

    let gateway: Arc<dyn Gateway> = Arc::new(HttpGateway::new(conf.api_base.clone(), conf.request_timeout)?);
    info!("Using API at {}", conf.api_base);

    match cli.command {
        Commands::Health => {
            let status = HealthStatus::from_result(HealthProbe::new(gateway).check().await);
            println!("API {}", status.label);
            if !status.ok {
                anyhow::bail!("API is down");
            }
        }

        Commands::Generate { prompt, steps, guidance, width, height, seed, model, interval_ms, timeout_ms } => {
            let req = JobRequest::new(prompt)
                .with_steps(steps)
                .with_guidance(guidance)
                .with_size(width, height)
                .with_seed(seed)
                .with_model_id(model);

            let defaults = conf.poll_options();
            let options = PollOptions::from_millis(
                interval_ms.unwrap_or(defaults.interval.as_millis() as u64),
                timeout_ms.unwrap_or(defaults.timeout.as_millis() as u64),
            );

            let (sink, rx) = EventSink::channel();
            let printer = tokio::spawn(print_events(rx));

            open_session(&gateway).await;
            let client = JobLifecycleClient::new(gateway, sink);
            let handle = client.submit(&req).await?;
            println!("Job: {} queued", handle);

            let outcome = client.poll(&handle, &options).await;
            drop(client);
            printer.await?;

            match outcome {
                Some(JobOutcome::Success { artifact_url }) => println!("{}", artifact_url),
                Some(other) => anyhow::bail!("Job {} failed: {}", handle, other.message()),
                None => println!("Another poll is already running"),
            }
        }

        Commands::Jobs { limit } => {
            open_session(&gateway).await;
            let client = JobLifecycleClient::new(gateway, EventSink::disconnected());
            for job in client.list_jobs(limit).await? {
                println!(
                    "{}  {:<8} {}  {}",
                    job.id,
                    job.status(),
                    job.created_at.as_deref().unwrap_or("-"),
                    job.prompt.as_deref().unwrap_or("")
                );
                if let Some(url) = &job.output_url {
                    println!("    {}", url);
                }
                if let Some(error) = &job.error {
                    println!("    error: {}", error);
                }
            }
        }

        Commands::Chat { message } => {
            let reply = ChatClient::new(gateway).send(&message).await?;
            println!("{}", reply.text);

            if !reply.suggestions.is_empty() {
                println!();
                println!("Suggestions:");
                for (i, suggestion) in reply.suggestions.iter().take(MAX_SUGGESTIONS).enumerate() {
                    println!("  {}. {}", i + 1, suggestion);
                }
            }
        }
    }

    Ok(())
}

/// The job routes need the session cookie `/health` hands out.
async fn open_session(gateway: &Arc<dyn Gateway>) {
    let status = HealthStatus::from_result(HealthProbe::new(gateway.clone()).check().await);
    if !status.ok {
        warn!("Health check failed, job requests may be rejected");
    }
}

async fn print_events(mut rx: UnboundedReceiver<JobEvent>) {
    while let Some(event) = rx.recv().await {
        match event {
            JobEvent::JobProgress(p) => {
                println!(
                    "Working… ({}) • {}s • poll {} • {}",
                    p.status,
                    p.elapsed_ms / 1000,
                    p.attempt,
                    p.observed_at.with_timezone(&chrono::Local).format("%H:%M:%S")
                );
            }
            JobEvent::JobComplete { job_id, .. } => println!("Done • {}", job_id),
            JobEvent::JobFailed { job_id, message } => println!("Job failed • {}: {}", job_id, message),
        }
    }
}
