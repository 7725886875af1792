//! Build script for mosto-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates brewer.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());

    // cortex-m-rt, embassy-rp boot2 and defmt linker scripts
    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Known keys per section, with the accepted numeric range
const SCHEMA: &[(&str, &[(&str, f64, f64)])] = &[
    ("pid", &[("kp", 0.0, 1e6), ("ki", 0.0, 1e6), ("kd", 0.0, 1e6)]),
    (
        "heater",
        &[("pwm_resolution_bits", 1.0, 16.0), ("tolerance_band_c", 0.01, 20.0)],
    ),
    (
        "timing",
        &[
            ("control_tick_ms", 1.0, 60_000.0),
            ("telemetry_ms", 1.0, 600_000.0),
            ("keypad_poll_ms", 1.0, 10_000.0),
            ("sensor_poll_ms", 1.0, 600_000.0),
            ("input_timeout_ms", 1.0, 600_000.0),
            ("finished_message_ms", 1.0, 600_000.0),
        ],
    ),
    ("sensor", &[("i2c_address", 0.0, 127.0)]),
];

/// Validate brewer.toml configuration at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=brewer.toml");

    let config_path = Path::new("brewer.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: brewer.toml not found!                                   ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds brewer.toml as its fallback configuration.  ║\n\
            ║  Please create one in the mosto-firmware directory.              ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read brewer.toml                               ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in brewer.toml                       ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                {}\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let errors = validate_sections(&config);
    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid configuration in brewer.toml                     ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=brewer.toml validated successfully");
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Check every section and key against the schema
///
/// The on-device reader only understands `[section]` tables with numeric
/// values, so anything else is rejected here rather than at boot.
fn validate_sections(config: &toml::Value) -> Vec<String> {
    let mut errors = Vec::new();

    let root = match config.as_table() {
        Some(t) => t,
        None => return vec!["top level must be a table".to_string()],
    };

    for (section, body) in root {
        let Some((_, keys)) = SCHEMA.iter().find(|(name, _)| *name == section.as_str()) else {
            errors.push(format!("unknown section [{}]", section));
            continue;
        };
        let Some(body) = body.as_table() else {
            errors.push(format!("[{}] must be a table", section));
            continue;
        };

        for (key, value) in body {
            let Some((_, min, max)) = keys.iter().find(|(name, _, _)| *name == key.as_str()) else {
                errors.push(format!("[{}] unknown key '{}'", section, key));
                continue;
            };
            let number = match value {
                toml::Value::Integer(i) => *i as f64,
                toml::Value::Float(f) => *f,
                _ => {
                    errors.push(format!("[{}] {} must be a number", section, key));
                    continue;
                }
            };
            if number < *min || number > *max {
                errors.push(format!("[{}] {} must be {}-{}", section, key, min, max));
            }
        }
    }

    errors
}
