use crate::config::GenerationConfig;
use chrono::{DateTime, Utc};
use colored::*;
use log::{Level, LevelFilter, Metadata, Record};
use once_cell::sync::Lazy;
use serde::Serialize;
use std::io::{self, Write};
use std::sync::RwLock;
use std::time::{Duration, Instant};

static GATEWAY_LOGGER: Lazy<GatewayLogger> = Lazy::new(GatewayLogger::default);

/// Installs the gateway logger configured from `LOG_FORMAT` / `LOG_LEVEL`.
pub fn init() -> Result<(), String> {
    init_with_config(LoggerConfig::from_env())
}

/// Installs the logger once; a repeated call fails and leaves the installed
/// configuration untouched.
pub fn init_with_config(config: LoggerConfig) -> Result<(), String> {
    log::set_logger(&*GATEWAY_LOGGER).map_err(|e| format!("Failed to set logger: {:?}", e))?;

    log::set_max_level(config.level);
    GATEWAY_LOGGER.reconfigure(config);
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Console,
    /// One JSON object per line, for CloudWatch and similar collectors.
    Json,
}

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub level: LevelFilter,
    pub format: LogFormat,
    pub colors: bool,
    pub emojis: bool,
    pub show_location: bool,
    pub prefix: Option<String>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: LevelFilter::Info,
            format: LogFormat::Console,
            colors: true,
            emojis: true,
            show_location: false,
            prefix: None,
        }
    }
}

impl LoggerConfig {
    pub fn production() -> Self {
        Self {
            format: LogFormat::Json,
            colors: false,
            emojis: false,
            ..Default::default()
        }
    }

    pub fn development() -> Self {
        Self {
            level: LevelFilter::Debug,
            show_location: true,
            ..Default::default()
        }
    }

    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let config = match var("LOG_FORMAT").as_deref().map(str::trim) {
            Some(format) if format.eq_ignore_ascii_case("json") => Self::production(),
            _ => Self::default(),
        };

        match var("LOG_LEVEL").and_then(|level| level.trim().parse().ok()) {
            Some(level) => config.with_level(level),
            None => config,
        }
    }

    pub fn with_level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_colors(mut self, enabled: bool) -> Self {
        self.colors = enabled;
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }
}

/// A single JSON log line.
#[derive(Debug, Serialize)]
struct JsonLine<'a> {
    ts: DateTime<Utc>,
    level: &'a str,
    target: &'a str,
    msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<String>,
}

fn level_emoji(level: Level) -> &'static str {
    match level {
        Level::Error => "❌",
        Level::Warn => "⚠️",
        Level::Info => "💡",
        Level::Debug => "🐛",
        Level::Trace => "🔍",
    }
}

fn level_color(level: Level) -> Color {
    match level {
        Level::Error => Color::Red,
        Level::Warn => Color::Yellow,
        Level::Info => Color::Green,
        Level::Debug => Color::Blue,
        Level::Trace => Color::Cyan,
    }
}

fn location(record: &Record) -> Option<String> {
    Some(format!("{}:{}", record.file()?, record.line()?))
}

#[derive(Default)]
pub struct GatewayLogger {
    config: RwLock<LoggerConfig>,
}

impl GatewayLogger {
    pub fn reconfigure(&self, config: LoggerConfig) {
        if let Ok(mut current) = self.config.write() {
            *current = config;
        }
    }

    fn render(record: &Record, config: &LoggerConfig, now: DateTime<Utc>) -> String {
        match config.format {
            LogFormat::Json => Self::render_json(record, config, now),
            LogFormat::Console => Self::render_console(record, config, now),
        }
    }

    fn render_json(record: &Record, config: &LoggerConfig, now: DateTime<Utc>) -> String {
        let line = JsonLine {
            ts: now,
            level: record.level().as_str(),
            target: record.target(),
            msg: record.args().to_string(),
            location: if config.show_location {
                location(record)
            } else {
                None
            },
        };
        serde_json::to_string(&line).unwrap_or_else(|_| line.msg.clone())
    }

    fn render_console(record: &Record, config: &LoggerConfig, now: DateTime<Utc>) -> String {
        let level = record.level();
        let mut label = level.as_str().to_string();
        if config.emojis {
            label = format!("{} {}", level_emoji(level), label);
        }

        let timestamp = now.format("%Y-%m-%d %H:%M:%S%.3f").to_string();
        let target = record.target();
        let location = if config.show_location {
            location(record).map(|loc| format!(" ({})", loc))
        } else {
            None
        };

        let mut line = String::new();
        if let Some(prefix) = &config.prefix {
            line.push_str(&format!("[{}] ", prefix));
        }

        if config.colors {
            line.push_str(&format!(
                "{} [{}] {} {}{}",
                timestamp.bright_black(),
                label.color(level_color(level)).bold(),
                target.bright_blue(),
                record.args(),
                location.unwrap_or_default().bright_black()
            ));
        } else {
            line.push_str(&format!(
                "{} [{}] {} {}{}",
                timestamp,
                label,
                target,
                record.args(),
                location.unwrap_or_default()
            ));
        }
        line
    }
}

impl log::Log for GatewayLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.config
            .read()
            .map(|config| metadata.level() <= config.level)
            .unwrap_or(true)
    }

    fn log(&self, record: &Record) {
        let Ok(config) = self.config.read() else {
            return;
        };
        if record.level() > config.level {
            return;
        }

        // stdout carries the handler's response.
        eprintln!("{}", Self::render(record, &config, Utc::now()));
    }

    fn flush(&self) {
        let _ = io::stderr().flush();
    }
}

/// Logs the elapsed time of a scope when dropped.
pub struct Timer {
    label: String,
    started: Instant,
}

impl Timer {
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        log::info!("⏱️  {} took {}ms", self.label, self.elapsed().as_millis());
    }
}

pub fn timer(label: &str) -> Timer {
    log::debug!("⏱️  {} started", label);
    Timer {
        label: label.to_string(),
        started: Instant::now(),
    }
}

pub fn log_startup_info(app_name: &str, version: &str) {
    log::info!("🚀 Starting {} v{}", app_name, version);
}

pub fn log_config_info(config: &GenerationConfig) {
    log::info!("⚙️  Generation configuration:");
    log::info!("   Prompt enhancer: {}", config.prompt_enhancer_model);
    log::info!("   Text-to-image model: {}", config.image_model);
    log::info!("   Titan model: {}", config.titan_model);
    log::info!("   img2img variant: {}", config.img2img_variant.as_str());
    log::info!("   Rewrite budget: {} chars", config.rewrite_char_budget);
}
