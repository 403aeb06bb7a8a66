use crate::utils::error::ClassifierError;
use crate::Result;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address
    pub bind_addr: String,

    /// Directory holding the page illustrations
    pub assets_dir: PathBuf,

    pub model_config: ModelConfig,

    pub fetch_config: FetchConfig,

    pub server_config: ServerConfig,
}

#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// ONNX export of the full network (frozen backbone + trained head)
    pub model_path: PathBuf,

    /// CPU threads used by a single inference
    pub intra_threads: usize,

    /// Graph optimization level (0-3)
    pub optimization_level: i32,
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Total time allowed for one image download
    pub timeout: Duration,

    pub connect_timeout: Duration,

    /// Largest image body accepted, in bytes
    pub max_image_bytes: usize,

    pub user_agent: String,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Request timeout in seconds
    pub request_timeout: u64,

    /// Maximum request body size in bytes
    pub max_request_size: usize,
}

impl Config {
    pub fn new(
        bind_addr: String,
        model_path: String,
        assets_dir: String,
        fetch_timeout_secs: u64,
        dev_mode: bool,
    ) -> Result<Self> {
        if fetch_timeout_secs == 0 {
            return Err(ClassifierError::Config(
                "fetch timeout must be at least one second".to_string(),
            ));
        }

        let cpu_cores = num_cpus::get();

        let model_config = ModelConfig {
            model_path: PathBuf::from(model_path),
            intra_threads: (cpu_cores * 3 / 4).max(1),
            optimization_level: 3,
        };

        let fetch_config = FetchConfig {
            timeout: Duration::from_secs(fetch_timeout_secs),
            connect_timeout: Duration::from_secs(fetch_timeout_secs.min(5)),
            max_image_bytes: 20 * 1024 * 1024,
            user_agent: format!("rps-classifier/{}", env!("CARGO_PKG_VERSION")),
        };

        // The page request has to outlive the fetch plus one forward pass
        let server_config = ServerConfig {
            request_timeout: if dev_mode { 300 } else { fetch_timeout_secs.saturating_add(30) },
            max_request_size: 64 * 1024,
        };

        Ok(Self {
            bind_addr,
            assets_dir: PathBuf::from(assets_dir),
            model_config,
            fetch_config,
            server_config,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8501".to_string(),
            assets_dir: PathBuf::from("assets"),
            model_config: ModelConfig {
                model_path: PathBuf::from("models/rps_inception.onnx"),
                intra_threads: 1,
                optimization_level: 3,
            },
            fetch_config: FetchConfig {
                timeout: Duration::from_secs(10),
                connect_timeout: Duration::from_secs(5),
                max_image_bytes: 20 * 1024 * 1024,
                user_agent: format!("rps-classifier/{}", env!("CARGO_PKG_VERSION")),
            },
            server_config: ServerConfig {
                request_timeout: 40,
                max_request_size: 64 * 1024,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_derives_sub_configs() {
        let config = Config::new(
            "127.0.0.1:9000".into(),
            "weights/model.onnx".into(),
            "static".into(),
            8,
            false,
        )
        .unwrap();

        assert_eq!(config.model_config.model_path, PathBuf::from("weights/model.onnx"));
        assert_eq!(config.fetch_config.timeout, Duration::from_secs(8));
        assert_eq!(config.fetch_config.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.server_config.request_timeout, 38);
        assert!(config.model_config.intra_threads >= 1);
    }

    #[test]
    fn zero_fetch_timeout_is_rejected() {
        let err = Config::new("a".into(), "b".into(), "c".into(), 0, false).unwrap_err();
        assert!(matches!(err, ClassifierError::Config(_)));
    }

    #[test]
    fn dev_mode_extends_request_timeout() {
        let config = Config::new("a".into(), "b".into(), "c".into(), 10, true).unwrap();
        assert_eq!(config.server_config.request_timeout, 300);
    }

    #[test]
    fn huge_fetch_timeout_does_not_overflow() {
        let config = Config::new("a".into(), "b".into(), "c".into(), u64::MAX, false).unwrap();
        assert_eq!(config.server_config.request_timeout, u64::MAX);
        assert_eq!(config.fetch_config.connect_timeout, Duration::from_secs(5));
    }
}
