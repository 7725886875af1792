//! Configuration persistence
//!
//! Loads the controller configuration from flash storage.
//! Falls back to the embedded `brewer.toml`, then to built-in defaults.

use defmt::*;

use mosto_core::config::{parse_config, ControllerConfig, ValidationError, CONFIG_VERSION};
use mosto_hal_rp2040::flash::{FlashError, Rp2040FlashStorage, StorageKey};
// Import the FlashStorage trait to bring methods into scope
use mosto_hal_rp2040::FlashStorageTrait;

/// Embedded default configuration (compiled into firmware)
/// Edit brewer.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../../brewer.toml");

/// Maximum serialized config size (binary)
const MAX_CONFIG_SIZE: usize = 128;

/// Configuration persistence errors
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Flash operation failed
    Flash(FlashError),
    /// Deserialization failed
    Deserialize,
    /// Config version mismatch
    VersionMismatch(u8),
    /// Values out of range
    Invalid(ValidationError),
}

impl From<FlashError> for ConfigError {
    fn from(e: FlashError) -> Self {
        ConfigError::Flash(e)
    }
}

impl From<ValidationError> for ConfigError {
    fn from(e: ValidationError) -> Self {
        ConfigError::Invalid(e)
    }
}

/// Where the running configuration came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigSource {
    Flash,
    Embedded,
    Defaults,
}

/// Configuration persistence manager
pub struct ConfigPersistence<'d> {
    storage: Rp2040FlashStorage<'d>,
}

impl<'d> ConfigPersistence<'d> {
    /// Create a new config persistence manager
    pub fn new(storage: Rp2040FlashStorage<'d>) -> Self {
        Self { storage }
    }

    /// Consume this persistence manager and return the underlying storage
    ///
    /// The logger task takes over the flash once the configuration is loaded.
    pub fn into_storage(self) -> Rp2040FlashStorage<'d> {
        self.storage
    }

    /// Load the postcard configuration from flash
    pub async fn load(&mut self) -> Result<ControllerConfig, ConfigError> {
        let mut buffer = [0u8; MAX_CONFIG_SIZE];
        let len = self
            .storage
            .read(StorageKey::ControllerConfig, &mut buffer)
            .await?;

        debug!("Read {} bytes of config from flash", len);

        let config =
            ControllerConfig::from_bytes(&buffer[..len]).map_err(|_| ConfigError::Deserialize)?;
        if config.version != CONFIG_VERSION {
            return Err(ConfigError::VersionMismatch(config.version));
        }
        config.validate()?;
        Ok(config)
    }
}

/// Load the configuration from the first source that yields a valid one
pub async fn load_config(persistence: &mut ConfigPersistence<'_>) -> (ControllerConfig, ConfigSource) {
    match persistence.load().await {
        Ok(config) => return (config, ConfigSource::Flash),
        Err(ConfigError::Flash(FlashError::NotFound)) => {
            info!("No configuration in flash");
        }
        Err(e) => {
            warn!("Ignoring stored configuration: {:?}", e);
        }
    }

    match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => match config.validate() {
            Ok(()) => return (config, ConfigSource::Embedded),
            Err(e) => error!("Embedded config rejected: {:?}", e),
        },
        // build.rs validates brewer.toml, so this only trips on reader gaps
        Err(e) => error!("Failed to parse embedded config: {:?}", e),
    }

    (ControllerConfig::default(), ConfigSource::Defaults)
}

/// Log the values the tasks will run with
pub fn log_config_summary(config: &ControllerConfig) {
    info!(
        "PID kp={} ki={} kd={}",
        config.pid.kp, config.pid.ki, config.pid.kd
    );
    info!(
        "Heater: {} bits (max {}), band +/-{} C",
        config.heater.pwm_resolution_bits,
        config.heater.max_duty(),
        config.heater.tolerance_band_c
    );
    info!(
        "Periods: control {} ms, telemetry {} ms, keypad {} ms, sensor {} ms",
        config.timing.control_tick_ms,
        config.timing.telemetry_ms,
        config.timing.keypad_poll_ms,
        config.timing.sensor_poll_ms
    );
    debug!("Probe at {=u8:#x}", config.sensor.i2c_address);
}
