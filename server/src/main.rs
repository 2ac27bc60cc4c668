mod config;
mod ctrl_server;
mod gpio;

use anyhow::Context;
use chunkwire::FileStore;
use clap::Parser;
use log::info;
use tokio::net::UdpSocket;

use crate::config::{Args, ServerConfig};
use crate::ctrl_server::CtrlServer;
use crate::gpio::{OutputPin, SimulatedPin, SysfsPin};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&args.log_level))
        .init();

    let config = args
        .server_config()
        .context("Invalid transfer settings")?;

    let socket = UdpSocket::bind(config.listen)
        .await
        .with_context(|| format!("Failed to bind control socket {}", config.listen))?;
    info!("Control server listening on {}", socket.local_addr()?);
    info!(
        "Transfer source '{}', default transfer port {}, chunk {} bytes, delay {:?}",
        config.image_path.display(),
        config.default_transfer_port,
        config.transfer.chunk_capacity,
        config.transfer.chunk_delay
    );

    if args.simulate_gpio {
        info!("GPIO simulation enabled");
        serve(socket, SimulatedPin::new(), config).await
    } else {
        let pin = SysfsPin::open(&args.gpio_root, args.gpio_line).with_context(|| {
            format!(
                "Failed to configure GPIO {} under {}",
                args.gpio_line,
                args.gpio_root.display()
            )
        })?;
        serve(socket, pin, config).await
    }
}

async fn serve<P: OutputPin>(
    socket: UdpSocket,
    pin: P,
    config: ServerConfig,
) -> anyhow::Result<()> {
    CtrlServer::new(socket, pin, FileStore, config).run().await;
    Ok(())
}
