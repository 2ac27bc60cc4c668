mod cli;
mod ctrl_client;

use std::net::SocketAddr;
use std::path::Path;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use anyhow::Context;
use chunkwire::{ChunkTransfer, FileStore, FrameIdAllocator, TransferConfig};
use clap::Parser;
use log::info;
use tokio::net::UdpSocket;

use crate::cli::{Action, Cli};
use crate::ctrl_client::{ClientError, CtrlClient};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&cli.log_level))
        .init();

    if let Action::Push {
        dest,
        file,
        chunk_size,
        chunk_delay_ms,
    } = &cli.action
    {
        let config = TransferConfig::new()
            .with_chunk_capacity(*chunk_size)
            .with_chunk_delay(Duration::from_millis(*chunk_delay_ms));
        config.validate().context("Invalid transfer settings")?;
        push(*dest, file, config).await?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(text) = cli.action.control_text() else {
        return Ok(ExitCode::SUCCESS);
    };
    let client = CtrlClient::connect(cli.server, cli.timeout())
        .await
        .context("Failed to open client socket")?;

    match client.send_command(&text).await {
        Ok(reply) => {
            println!("{}", reply);
            Ok(if reply.is_ok() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Err(ClientError::NoReply(timeout)) => {
            eprintln!("no reply from {} within {:?}", cli.server, timeout);
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e).with_context(|| format!("Command {:?} to {} failed", text, cli.server)),
    }
}

/// Streams `file` to `dest` with the same framing the server uses.
async fn push(dest: SocketAddr, file: &Path, config: TransferConfig) -> anyhow::Result<()> {
    let local = if dest.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
    let socket = UdpSocket::bind(local)
        .await
        .context("Failed to open push socket")?;

    let frame_id = FrameIdAllocator::new()
        .allocate()
        .context("No frame id available")?;
    let start = Instant::now();
    let summary = ChunkTransfer::new(&socket, config)
        .send_file(&FileStore, file, dest, frame_id)
        .await
        .with_context(|| format!("Failed to push '{}' to {}", file.display(), dest))?;

    let elapsed = start.elapsed();
    info!(
        "Push complete in {:.2} seconds ({:.2} KB/s)",
        elapsed.as_secs_f64(),
        (summary.bytes_sent as f64 / 1024.0) / elapsed.as_secs_f64().max(f64::EPSILON)
    );
    println!("{}", summary);
    Ok(())
}
