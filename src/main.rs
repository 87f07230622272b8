//! Демонстрационный процесс topicbus.
//!
//! Подписывает по одному обработчику на каждый путь из `--subscribe`, затем
//! читает со stdin строки вида `<path> <payload>` и публикует их. Каждая
//! доставка печатается в stdout. Остановка по EOF или Ctrl-C.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::{
    io::{self, AsyncBufReadExt, BufReader},
    sync::oneshot,
    task::JoinHandle,
};
use tracing::{debug, error, info, trace, warn};
use topicbus::{
    init_logging, Broker, BrokerClient, BrokerError, ErrorExt, LogLevel, Settings, Subscription,
    TopicPath,
};

#[derive(Parser)]
#[command(name = "topicbus")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "In-process topic broker demo: publish lines from stdin", long_about = None)]
struct Cli {
    /// Путь подписки; можно указать несколько раз. Пустая строка означает корень.
    #[arg(short, long = "subscribe", value_name = "PATH")]
    subscribe: Vec<String>,
    /// Ёмкость буфера каждой подписки
    #[arg(short, long)]
    capacity: Option<usize>,
    /// Файл настроек (TOML, YAML или JSON)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = match &cli.config {
        Some(path) => Settings::load_from_file(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => Settings::load().context("failed to load settings")?,
    };
    if let Some(capacity) = cli.capacity {
        settings.broker.subscriber_capacity = capacity;
    }
    settings.validate()?;
    init_logging(&settings.logging)?;

    let broker = Broker::<String>::with_settings(&settings.broker);
    let client = broker.client();
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let actor = tokio::spawn(broker.run(stop_rx));

    let mut printers = Vec::with_capacity(cli.subscribe.len());
    for raw in &cli.subscribe {
        let path = TopicPath::from(raw.as_str());
        let (handle, subscription) = client.channel();
        if let Err(err) = client.subscribe(&handle, &path).await {
            report_error("subscribe", &err);
            if err.status_code().is_terminal() {
                anyhow::bail!("broker stopped before subscribing to {path:?}");
            }
            continue;
        }
        printers.push(spawn_printer(path, subscription));
    }

    tokio::select! {
        result = publish_lines(&client) => result?,
        _ = tokio::signal::ctrl_c() => info!("Ctrl-C received"),
    }

    // Цикл брокера мог завершиться раньше только из-за паники.
    let _ = stop_tx.send(());
    let report = actor.await.context("broker task failed")?;
    for printer in printers {
        printer.await.context("printer task failed")?;
    }
    info!(
        handles_closed = report.handles_closed,
        rejected_commands = report.rejected_commands,
        "Shutdown complete"
    );
    Ok(())
}

async fn publish_lines(client: &BrokerClient<String>) -> Result<()> {
    let mut lines = BufReader::new(io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (path, payload) = line.split_once(' ').unwrap_or((line, ""));
        if let Err(err) = client.publish(payload.to_string(), path).await {
            report_error("publish", &err);
            if err.status_code().is_terminal() {
                break;
            }
        }
    }
    Ok(())
}

/// Логирует ошибку брокера на уровне, который задаёт её статус-код.
fn report_error(
    action: &str,
    err: &BrokerError,
) {
    let status = err.status_code();
    let message = err.client_message();
    match status.log_level() {
        LogLevel::Trace => trace!(action, %status, "{message}"),
        LogLevel::Debug => debug!(action, %status, "{message}"),
        LogLevel::Info => info!(action, %status, "{message}"),
        LogLevel::Warn => warn!(action, %status, "{message}"),
        LogLevel::Error => error!(action, %status, "{message}"),
    }
}

fn spawn_printer(
    path: TopicPath,
    mut subscription: Subscription<String>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(payload) = subscription.recv().await {
            println!("[{path}] {payload}");
        }
        println!("[{path}] closed");
    })
}
