use serde::{Deserialize, Serialize};

/// Application configuration from helmad.yaml
///
/// Every section falls back to its defaults, so an empty or partial file is valid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub bridge: BridgeSettings,

    #[serde(default)]
    pub startup: StartupSettings,

    #[serde(default)]
    pub local_chart: LocalChartSettings,

    #[serde(default)]
    pub watch: WatchSettings,

    #[serde(default)]
    pub events: EventSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeSettings {
    /// Paths starting with this literal are routed to the command invoker
    #[serde(default = "default_command_prefix")]
    pub command_prefix: String,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            command_prefix: default_command_prefix(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartupSettings {
    #[serde(default = "default_splash_command")]
    pub splash_command: String,

    #[serde(default = "default_splash_delay_ms")]
    pub splash_delay_ms: u64,
}

impl Default for StartupSettings {
    fn default() -> Self {
        Self {
            splash_command: default_splash_command(),
            splash_delay_ms: default_splash_delay_ms(),
        }
    }
}

/// Settings for the "pick a local chart directory" flow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalChartSettings {
    /// Element id whose confirm event starts the flow
    #[serde(default = "default_trigger_element")]
    pub trigger_element: String,

    /// Release name passed to the pre-render command
    #[serde(default = "default_chart_name")]
    pub chart_name: String,

    #[serde(default = "default_render_command")]
    pub render_command: String,

    #[serde(default = "default_pre_render_command")]
    pub pre_render_command: String,
}

impl Default for LocalChartSettings {
    fn default() -> Self {
        Self {
            trigger_element: default_trigger_element(),
            chart_name: default_chart_name(),
            render_command: default_render_command(),
            pre_render_command: default_pre_render_command(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchSettings {
    #[serde(default = "default_true")]
    pub recursive: bool,
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self { recursive: true }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSettings {
    /// Broadcast buffer size; slow subscribers lag past this many events
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl Default for EventSettings {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_dir")]
    pub dir: String,

    #[serde(default = "default_log_prefix")]
    pub prefix: String,

    #[serde(default)]
    pub debug: bool,

    #[serde(default = "default_true")]
    pub console: bool,

    /// Write the log file as JSON lines instead of plain text
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            dir: default_log_dir(),
            prefix: default_log_prefix(),
            debug: false,
            console: true,
            json: false,
        }
    }
}

fn default_command_prefix() -> String {
    "command:".to_string()
}

fn default_splash_command() -> String {
    "close_splashscreen".to_string()
}

fn default_splash_delay_ms() -> u64 {
    1000
}

fn default_trigger_element() -> String {
    "localChart".to_string()
}

fn default_chart_name() -> String {
    "helmad".to_string()
}

fn default_render_command() -> String {
    "local_chart".to_string()
}

fn default_pre_render_command() -> String {
    "template".to_string()
}

fn default_channel_capacity() -> usize {
    256
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_log_prefix() -> String {
    "helmad".to_string()
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.bridge.command_prefix, "command:");
        assert_eq!(config.startup.splash_command, "close_splashscreen");
        assert_eq!(config.startup.splash_delay_ms, 1000);
        assert_eq!(config.local_chart.trigger_element, "localChart");
        assert_eq!(config.local_chart.chart_name, "helmad");
        assert!(config.watch.recursive);
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let yaml = "local_chart:\n  chart_name: preview\n";
        let config: AppConfig = serde_yaml_ng::from_str(yaml).unwrap();

        assert_eq!(config.local_chart.chart_name, "preview");
        assert_eq!(config.local_chart.pre_render_command, "template");
        assert_eq!(config.bridge.command_prefix, "command:");
    }
}
