//! Build script for ld2410s-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates radar.toml at compile time
//! - Generates the configuration constants included by `src/config.rs`

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Baud rates the LD2410S can be switched to
const SUPPORTED_BAUDRATES: [i64; 8] = [9600, 19200, 38400, 57600, 115200, 230400, 256000, 460800];

/// Resolved radar settings
struct RadarSettings {
    baudrate: i64,
    throttle_ms: i64,
    settle_ms: i64,
    ack_timeout_ms: i64,
    poll_interval_ms: i64,
    query_on_boot: bool,
}

impl Default for RadarSettings {
    fn default() -> Self {
        Self {
            baudrate: 115200,
            throttle_ms: 1000,
            settle_ms: 50,
            ack_timeout_ms: 1000,
            poll_interval_ms: 20,
            query_on_boot: true,
        }
    }
}

fn main() {
    setup_linker();
    let settings = validate_config();
    generate_constants(&settings);
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate radar.toml and resolve it against the defaults
fn validate_config() -> RadarSettings {
    println!("cargo:rerun-if-changed=radar.toml");

    let config_path = Path::new("radar.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: radar.toml not found!                                    ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a radar.toml configuration file.          ║\n\
            ║  Please create one in the ld2410s-firmware directory.            ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read radar.toml                                ║\n\
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
                ║  ERROR: Invalid TOML syntax in radar.toml                        ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    validate_required_sections(&config);

    let mut settings = RadarSettings::default();
    let mut errors = Vec::new();
    validate_uart(&config, &mut settings, &mut errors);
    validate_driver(&config, &mut settings, &mut errors);
    validate_startup(&config, &mut settings, &mut errors);
    report_errors("Invalid radar configuration", &errors);

    println!("cargo:warning=radar.toml validated successfully");
    settings
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

/// Panic with a boxed list of errors, if there are any
fn report_errors(title: &str, errors: &[String]) {
    if errors.is_empty() {
        return;
    }
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        errors
            .iter()
            .map(|e| format!("║  • {:<62} ║", e))
            .collect::<Vec<_>>()
            .join("\n")
    );
}

/// Validate that required sections exist
fn validate_required_sections(config: &toml::Value) {
    let mut errors = Vec::new();

    if config.get("uart").is_none() {
        errors.push("Missing [uart] section".to_string());
    }
    if config.get("driver").is_none() {
        errors.push("Missing [driver] section".to_string());
    }

    report_errors("Missing required sections in radar.toml", &errors);
}

/// Read an optional integer key, checking its range
fn read_integer(
    section: &toml::value::Table,
    section_name: &str,
    key: &str,
    range: std::ops::RangeInclusive<i64>,
    errors: &mut Vec<String>,
) -> Option<i64> {
    match section.get(key) {
        None => None,
        Some(toml::Value::Integer(value)) if range.contains(value) => Some(*value),
        Some(toml::Value::Integer(_)) => {
            errors.push(format!(
                "[{}] {} must be {}-{}",
                section_name,
                key,
                range.start(),
                range.end()
            ));
            None
        }
        Some(_) => {
            errors.push(format!("[{}] {} must be an integer", section_name, key));
            None
        }
    }
}

fn section<'a>(
    config: &'a toml::Value,
    name: &str,
    errors: &mut Vec<String>,
) -> Option<&'a toml::value::Table> {
    match config.get(name) {
        Some(toml::Value::Table(t)) => Some(t),
        Some(_) => {
            errors.push(format!("[{}] must be a table", name));
            None
        }
        None => None,
    }
}

fn validate_uart(config: &toml::Value, settings: &mut RadarSettings, errors: &mut Vec<String>) {
    let Some(uart) = section(config, "uart", errors) else {
        return;
    };

    if let Some(baudrate) = read_integer(uart, "uart", "baudrate", 1200..=921600, errors) {
        if SUPPORTED_BAUDRATES.contains(&baudrate) {
            settings.baudrate = baudrate;
        } else {
            errors.push(format!("[uart] baudrate {} not supported by the radar", baudrate));
        }
    }
}

fn validate_driver(config: &toml::Value, settings: &mut RadarSettings, errors: &mut Vec<String>) {
    let Some(driver) = section(config, "driver", errors) else {
        return;
    };

    if let Some(value) = read_integer(driver, "driver", "throttle_ms", 0..=60_000, errors) {
        settings.throttle_ms = value;
    }
    if let Some(value) = read_integer(driver, "driver", "settle_ms", 0..=1000, errors) {
        settings.settle_ms = value;
    }
    if let Some(value) = read_integer(driver, "driver", "ack_timeout_ms", 0..=60_000, errors) {
        settings.ack_timeout_ms = value;
    }
    if let Some(value) = read_integer(driver, "driver", "poll_interval_ms", 1..=1000, errors) {
        settings.poll_interval_ms = value;
    }

    // Must outlast the settling delay
    if settings.ack_timeout_ms != 0 && settings.ack_timeout_ms <= settings.settle_ms {
        errors.push("[driver] ack_timeout_ms must exceed settle_ms (or be 0)".to_string());
    }
}

fn validate_startup(config: &toml::Value, settings: &mut RadarSettings, errors: &mut Vec<String>) {
    let Some(startup) = section(config, "startup", errors) else {
        return;
    };

    match startup.get("query_on_boot") {
        None => {}
        Some(toml::Value::Boolean(value)) => settings.query_on_boot = *value,
        Some(_) => errors.push("[startup] query_on_boot must be true or false".to_string()),
    }
}

/// Write the resolved settings as Rust constants
fn generate_constants(settings: &RadarSettings) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let ack_timeout = if settings.ack_timeout_ms == 0 {
        "None".to_string()
    } else {
        format!("Some({})", settings.ack_timeout_ms)
    };

    let generated = format!(
        "// Generated from radar.toml by build.rs\n\
        pub const BAUDRATE: u32 = {};\n\
        pub const THROTTLE_MS: u32 = {};\n\
        pub const SETTLE_MS: u32 = {};\n\
        pub const ACK_TIMEOUT_MS: Option<u32> = {};\n\
        pub const POLL_INTERVAL_MS: u32 = {};\n\
        pub const QUERY_ON_BOOT: bool = {};\n",
        settings.baudrate,
        settings.throttle_ms,
        settings.settle_ms,
        ack_timeout,
        settings.poll_interval_ms,
        settings.query_on_boot,
    );

    fs::write(out_dir.join("radar_config.rs"), generated).unwrap();
}
