mod render;

use clap::{Parser, Subcommand};
use fl_client::HttpClient;
use fl_core::chat::CustomerChat;
use fl_core::desk::SupervisorDesk;
use fl_core::followup::{UNAVAILABLE_REPLY, await_answer};
use fl_core::list_view::FilterMode;
use fl_core::types::HelpRequestId;
use fl_core::{NotificationCenter, Observer, PollingSynchronizer, Settings};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;

const FIRST_SYNC_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Parser)]
#[command(name = "fl", about = "Help-request desk for a front-desk agent")]
struct Cli {
    /// Path to a TOML config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, global = true)]
    debug: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the backend.
    Serve,
    /// Print the OpenAPI document.
    Openapi,
    /// Follow the request set as a customer badge and a supervisor list.
    Watch {
        #[arg(long, value_enum, default_value = "pending")]
        filter: FilterArg,
    },
    /// Answer a pending help request.
    Resolve { id: String, answer: String },
    /// Send a message to the agent.
    Chat {
        message: String,
        #[arg(long, default_value = "Customer")]
        customer: String,
        /// Wait for a supervisor answer if the message is escalated.
        #[arg(long)]
        wait: bool,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum FilterArg {
    Pending,
    Resolved,
}

impl From<FilterArg> for FilterMode {
    fn from(value: FilterArg) -> Self {
        match value {
            FilterArg::Pending => FilterMode::Pending,
            FilterArg::Resolved => FilterMode::Resolved,
        }
    }
}

fn build_env_filter(debug: bool) -> tracing_subscriber::EnvFilter {
    if debug {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(build_env_filter(cli.debug))
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let settings = match Settings::load(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("config error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Command::Serve => serve(&settings).await,
        Command::Openapi => {
            println!("{}", fl_serve::openapi::generate_spec());
            Ok(())
        }
        Command::Watch { filter } => watch(&settings, filter.into()).await,
        Command::Resolve { id, answer } => resolve(&settings, &id, answer).await,
        Command::Chat {
            message,
            customer,
            wait,
        } => chat(&settings, &message, &customer, wait).await,
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

async fn serve(settings: &Settings) -> Result<(), String> {
    if let Some(parent) = settings.db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|err| format!("cannot create {}: {err}", parent.display()))?;
        }
    }
    let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), settings.port);
    let state = fl_serve::AppState {
        db_path: settings.db_path.display().to_string(),
    };
    fl_serve::serve(state, addr)
        .await
        .map_err(|err| format!("serve error: {err}"))
}

fn connect(settings: &Settings) -> Result<Arc<HttpClient>, String> {
    HttpClient::new(&settings.api_url)
        .map(Arc::new)
        .map_err(|err| format!("client error: {err}"))
}

fn notification_center(settings: &Settings) -> NotificationCenter {
    NotificationCenter::new(settings.notification_ttl, settings.notification_capacity)
}

fn observer(name: &str, client: &Arc<HttpClient>, center: &NotificationCenter, settings: &Settings) -> Observer {
    PollingSynchronizer::new(name, client.clone(), center.clone())
        .with_interval(settings.poll_interval)
        .start()
}

async fn watch(settings: &Settings, filter: FilterMode) -> Result<(), String> {
    let client = connect(settings)?;
    let center = notification_center(settings);
    let mut events = center.subscribe();
    let mut customer = observer("customer", &client, &center, settings);
    let mut supervisor = observer("supervisor", &client, &center, settings);
    let mut badge = customer.subscribe_badge();
    let mut snapshots = supervisor.subscribe_snapshot();
    tracing::info!(api_url = %settings.api_url, "watching help requests");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = badge.changed() => {
                if changed.is_err() {
                    break;
                }
                let pending = *badge.borrow_and_update();
                println!("{}", render::badge_line(customer.name(), pending));
            }
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                println!("[{}] {} requests ({:?})", supervisor.name(), snapshot.requests.len(), filter);
                for request in snapshot.view(filter) {
                    println!("  {}", render::request_line(&request));
                }
            }
            event = events.recv() => match event {
                Ok(event) => {
                    if let Some(line) = render::notification_line(&event) {
                        println!("{line}");
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "notification events dropped");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    customer.stop().await;
    supervisor.stop().await;
    center.shutdown();
    Ok(())
}

async fn resolve(settings: &Settings, id: &str, answer: String) -> Result<(), String> {
    let id = HelpRequestId::new(id.to_string()).map_err(|err| err.to_string())?;
    let client = connect(settings)?;
    let center = notification_center(settings);
    let mut events = center.subscribe();
    let mut supervisor = observer("supervisor", &client, &center, settings);

    let synced = tokio::time::timeout(FIRST_SYNC_TIMEOUT, supervisor.wait_for_cycle(1)).await;
    let Ok(Some(snapshot)) = synced else {
        supervisor.stop().await;
        drain(&mut events);
        return Err("could not synchronize with the backend".to_string());
    };
    let Some(request) = snapshot.get(&id).cloned() else {
        supervisor.stop().await;
        return Err(format!("help request {id} not found"));
    };

    let desk = SupervisorDesk::new(client, center.clone()).with_refresh(supervisor.refresh_trigger());
    desk.select(request);
    desk.set_draft(answer);
    let outcome = desk.submit().await;
    drain(&mut events);
    supervisor.stop().await;
    center.shutdown();
    outcome.map(|_| ()).map_err(|err| err.to_string())
}

async fn chat(settings: &Settings, message: &str, customer: &str, wait: bool) -> Result<(), String> {
    let client = connect(settings)?;
    let center = notification_center(settings);
    let mut events = center.subscribe();
    let session = CustomerChat::new(client.clone(), customer, center.clone());

    let reply = session.send(message).await;
    drain(&mut events);
    let reply = reply.map_err(|err| err.to_string())?;
    println!("{}", reply.response);

    if let (true, Some(request_id)) = (wait, reply.request_id) {
        let answer = await_answer(
            client.as_ref(),
            &request_id,
            settings.followup_poll,
            settings.followup_timeout,
        )
        .await;
        let text = answer.unwrap_or_else(|| UNAVAILABLE_REPLY.to_string());
        session.record_agent(&text);
        println!("{text}");
    }
    center.shutdown();
    Ok(())
}

fn drain(events: &mut tokio::sync::broadcast::Receiver<fl_core::notifications::NotificationEvent>) {
    while let Ok(event) = events.try_recv() {
        if let Some(line) = render::notification_line(&event) {
            println!("{line}");
        }
    }
}
