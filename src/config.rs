use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub scheduler: SchedulerConfig,
    pub worker: WorkerConfig,
    pub work_package: WorkPackageConfig,
    pub job: JobConfig,
    pub upload: UploadConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Which work-package assignment strategy the master runs with.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SchedulerKind {
    #[default]
    Primitive,
    Proportional,
    Time,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SchedulerConfig {
    pub kind: SchedulerKind,
    /// Target duration of one package for the time-budget scheduler
    pub time_split_seconds: u64,
    /// Smallest batch the proportional scheduler hands out
    pub min_batch_size: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct WorkerConfig {
    pub timeout_seconds: u64,
    pub cleaning_interval_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct WorkPackageConfig {
    pub cleaning_interval_seconds: u64,
    pub verify_results: bool,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct JobConfig {
    pub enable_deletion: bool,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct UploadConfig {
    pub max_body_size: usize, // 64MB in bytes
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            kind: SchedulerKind::Primitive,
            time_split_seconds: 3 * 60,
            min_batch_size: 20,
        }
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 10,
            cleaning_interval_seconds: 5,
        }
    }
}

impl Default for WorkPackageConfig {
    fn default() -> Self {
        Self {
            cleaning_interval_seconds: 5,
            verify_results: true,
        }
    }
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            enable_deletion: true,
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_body_size: 64 * 1024 * 1024,
        }
    }
}

impl WorkerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn cleaning_interval(&self) -> Duration {
        Duration::from_secs(self.cleaning_interval_seconds)
    }
}

impl WorkPackageConfig {
    pub fn cleaning_interval(&self) -> Duration {
        Duration::from_secs(self.cleaning_interval_seconds)
    }
}

/// Largest time budget per package; the packing table grows with it.
pub const MAX_TIME_SPLIT_SECONDS: u64 = 24 * 60 * 60;

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        config.try_deserialize::<Self>()?.validated()
    }

    pub fn load_from(path: &Path) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        config.try_deserialize::<Self>()?.validated()
    }

    /// Rejects values the background loops and the schedulers cannot run with.
    pub fn validated(self) -> Result<Self, config::ConfigError> {
        let invalid = |msg: &str| Err(config::ConfigError::Message(msg.to_string()));

        if self.worker.timeout_seconds == 0 {
            return invalid("worker.timeout_seconds must be at least 1");
        }
        if self.worker.cleaning_interval_seconds == 0 {
            return invalid("worker.cleaning_interval_seconds must be at least 1");
        }
        if self.work_package.cleaning_interval_seconds == 0 {
            return invalid("work_package.cleaning_interval_seconds must be at least 1");
        }
        if self.scheduler.time_split_seconds == 0
            || self.scheduler.time_split_seconds > MAX_TIME_SPLIT_SECONDS
        {
            return Err(config::ConfigError::Message(format!(
                "scheduler.time_split_seconds must be between 1 and {}",
                MAX_TIME_SPLIT_SECONDS
            )));
        }
        Ok(self)
    }
}
