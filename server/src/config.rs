use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use chunkwire::{
    CONTROL_PORT, DEFAULT_CHUNK_CAPACITY, DEFAULT_CHUNK_DELAY_MS, DEFAULT_TRANSFER_PORT,
    TransferConfig,
};
use clap::Parser;

use crate::gpio::{DEFAULT_GPIO_LINE, SYSFS_GPIO_ROOT};

/// File streamed by `Transfer` when none is configured.
pub const DEFAULT_IMAGE_PATH: &str = "/usr/bin/image.jpg";

#[derive(Debug, Parser)]
#[command(
    name = "ctrl-server",
    version,
    about = "UDP control server: LedOn | LedOff | Transfer [<port>]"
)]
pub struct Args {
    /// Address the control socket binds to
    #[arg(long, default_value = "0.0.0.0")]
    pub bind: IpAddr,

    /// Control channel port
    #[arg(long, default_value_t = CONTROL_PORT)]
    pub port: u16,

    /// File streamed by the `Transfer` command
    #[arg(long, default_value = DEFAULT_IMAGE_PATH)]
    pub image: PathBuf,

    /// Transfer port used when `Transfer` carries no port
    #[arg(long, default_value_t = DEFAULT_TRANSFER_PORT, value_parser = clap::value_parser!(u16).range(1..))]
    pub default_transfer_port: u16,

    /// GPIO line driven by LedOn / LedOff
    #[arg(long, default_value_t = DEFAULT_GPIO_LINE)]
    pub gpio_line: u32,

    /// Sysfs GPIO root directory
    #[arg(long, default_value = SYSFS_GPIO_ROOT)]
    pub gpio_root: PathBuf,

    /// Log pin changes instead of touching GPIO
    #[arg(long)]
    pub simulate_gpio: bool,

    /// Payload bytes per chunk datagram
    #[arg(long, default_value_t = DEFAULT_CHUNK_CAPACITY)]
    pub chunk_size: usize,

    /// Pause after every chunk, in milliseconds
    #[arg(long, default_value_t = DEFAULT_CHUNK_DELAY_MS)]
    pub chunk_delay_ms: u64,

    /// Default log filter (RUST_LOG takes precedence)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

/// Runtime settings of the control server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen: SocketAddr,
    pub image_path: PathBuf,
    pub default_transfer_port: u16,
    pub transfer: TransferConfig,
}

impl Args {
    pub fn server_config(&self) -> chunkwire::Result<ServerConfig> {
        let transfer = TransferConfig::new()
            .with_chunk_capacity(self.chunk_size)
            .with_chunk_delay(Duration::from_millis(self.chunk_delay_ms));
        transfer.validate()?;

        Ok(ServerConfig {
            listen: SocketAddr::new(self.bind, self.port),
            image_path: self.image.clone(),
            default_transfer_port: self.default_transfer_port,
            transfer,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["ctrl-server"]).unwrap();
        assert!(!args.simulate_gpio);
        assert_eq!(args.gpio_line, 185);

        let config = args.server_config().unwrap();
        assert_eq!(config.listen, "0.0.0.0:50000".parse().unwrap());
        assert_eq!(config.image_path, PathBuf::from("/usr/bin/image.jpg"));
        assert_eq!(config.default_transfer_port, 50001);
        assert_eq!(config.transfer, TransferConfig::default());
    }

    #[test]
    fn test_overrides() {
        let args = Args::try_parse_from([
            "ctrl-server",
            "--bind",
            "127.0.0.1",
            "--port",
            "6000",
            "--image",
            "/tmp/frame.bin",
            "--default-transfer-port",
            "6001",
            "--chunk-size",
            "512",
            "--chunk-delay-ms",
            "0",
            "--simulate-gpio",
        ])
        .unwrap();
        assert!(args.simulate_gpio);

        let config = args.server_config().unwrap();
        assert_eq!(config.listen, "127.0.0.1:6000".parse().unwrap());
        assert_eq!(config.default_transfer_port, 6001);
        assert_eq!(config.transfer.chunk_capacity, 512);
        assert!(config.transfer.chunk_delay.is_zero());
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(Args::try_parse_from(["ctrl-server", "--default-transfer-port", "0"]).is_err());

        let args = Args::try_parse_from(["ctrl-server", "--chunk-size", "9000"]).unwrap();
        assert_eq!(
            args.server_config().unwrap_err(),
            chunkwire::Error::InvalidCapacity
        );
    }
}
