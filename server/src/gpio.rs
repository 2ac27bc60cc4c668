//! Output pin driven by the `LedOn` / `LedOff` commands.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info};

/// Default sysfs GPIO root.
pub const SYSFS_GPIO_ROOT: &str = "/sys/class/gpio";

/// GPIO line of the board LED (MIO 47).
pub const DEFAULT_GPIO_LINE: u32 = 185;

/// A single digital output.
pub trait OutputPin {
    /// Drives the pin high (`true`) or low (`false`).
    fn set(&mut self, on: bool) -> io::Result<()>;
}

/// GPIO line exposed through the legacy sysfs interface.
#[derive(Debug)]
pub struct SysfsPin {
    value_path: PathBuf,
}

impl SysfsPin {
    /// Exports `line` if needed, configures it as an output and drives it low.
    pub fn open(root: &Path, line: u32) -> io::Result<Self> {
        let dir = root.join(format!("gpio{}", line));
        if !dir.exists() {
            debug!("Exporting GPIO {}", line);
            fs::write(root.join("export"), line.to_string())?;
        }
        fs::write(dir.join("direction"), "out")?;

        let mut pin = Self {
            value_path: dir.join("value"),
        };
        pin.set(false)?;
        info!("GPIO {} configured as output", line);
        Ok(pin)
    }
}

impl OutputPin for SysfsPin {
    fn set(&mut self, on: bool) -> io::Result<()> {
        fs::write(&self.value_path, if on { "1" } else { "0" })
    }
}

/// Stand-in pin for hosts without GPIO; only logs and remembers the level.
#[derive(Debug, Default)]
pub struct SimulatedPin {
    level: bool,
}

impl SimulatedPin {
    /// Creates a pin that starts low.
    pub fn new() -> Self {
        Self::default()
    }
}

impl OutputPin for SimulatedPin {
    fn set(&mut self, on: bool) -> io::Result<()> {
        let label = |level: bool| if level { "on" } else { "off" };
        info!("[simulated] LED {} (was {})", label(on), label(self.level));
        self.level = on;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sysfs_pin_configures_output() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir(root.path().join("gpio185")).unwrap();

        let mut pin = SysfsPin::open(root.path(), 185).unwrap();
        assert!(!root.path().join("export").exists());

        let read = |name: &str| fs::read_to_string(root.path().join("gpio185").join(name)).unwrap();
        assert_eq!(read("direction"), "out");
        assert_eq!(read("value"), "0");

        pin.set(true).unwrap();
        assert_eq!(read("value"), "1");
        pin.set(false).unwrap();
        assert_eq!(read("value"), "0");
    }

    #[test]
    fn test_sysfs_pin_exports_missing_line() {
        let root = tempfile::tempdir().unwrap();

        // A plain directory never materializes gpio7/, so configuring fails
        // right after the export request.
        let err = SysfsPin::open(root.path(), 7).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert_eq!(fs::read_to_string(root.path().join("export")).unwrap(), "7");
    }

    #[test]
    fn test_simulated_pin() {
        let mut pin = SimulatedPin::new();
        assert!(!pin.level);
        pin.set(true).unwrap();
        assert!(pin.level);
    }
}
