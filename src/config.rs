use log::warn;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_MAX_UPLOAD_MB: usize = 25;

pub const HOST_VAR: &str = "CSV_INSIGHT_HOST";
pub const PORT_VAR: &str = "CSV_INSIGHT_PORT";
pub const MAX_UPLOAD_VAR: &str = "CSV_INSIGHT_MAX_UPLOAD_MB";

/// Settings for the web server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_MB * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    /// Resolve settings from the process arguments and environment.
    pub fn from_env() -> Self {
        let args: Vec<String> = std::env::args().skip(1).collect();
        Self::resolve(&args, |key| std::env::var(key).ok())
    }

    /// Positional `[host] [port]` arguments win over environment variables,
    /// which win over defaults. Unparsable values are ignored with a warning.
    pub fn resolve(args: &[String], env: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(host) = args.first().cloned().or_else(|| env(HOST_VAR)) {
            if !host.trim().is_empty() {
                config.host = host.trim().to_string();
            }
        }

        if let Some(port) = args.get(1).cloned().or_else(|| env(PORT_VAR)) {
            match port.trim().parse::<u16>() {
                Ok(p) if p > 0 => config.port = p,
                _ => warn!("ignoring invalid port '{port}', using {}", config.port),
            }
        }

        if let Some(limit) = env(MAX_UPLOAD_VAR) {
            match limit.trim().parse::<usize>() {
                Ok(mb) if mb > 0 => config.max_upload_bytes = mb * 1024 * 1024,
                _ => warn!("ignoring invalid {MAX_UPLOAD_VAR} '{limit}'"),
            }
        }

        config
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
