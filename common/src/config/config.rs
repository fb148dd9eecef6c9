use anyhow::{Context, Result};
use ::config::{Config, Environment, File};
use serde::Deserialize;
use std::sync::Arc;

/// 默认配置文件（可选，不存在时仅使用默认值与环境变量）
pub const DEFAULT_CONFIG_FILE: &str = "api-config.toml";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    pub database: Option<DatabaseConfig>,
    pub server: Option<ServerConfig>,
    pub sys: Option<SysConfig>,
}

/// 启动时读取的两个历史环境变量
#[derive(Debug, Clone, Default)]
pub struct LegacyEnv {
    /// `MONGO_URI`
    pub mongo_uri: Option<String>,
    /// `PORT`
    pub port: Option<String>,
}

impl LegacyEnv {
    pub fn from_process() -> Self {
        Self {
            mongo_uri: std::env::var("MONGO_URI").ok().filter(|v| !v.is_empty()),
            port: std::env::var("PORT").ok().filter(|v| !v.is_empty()),
        }
    }
}

impl AppConfig {
    /// 按 默认值 → 配置文件 → `APP__*` 环境变量 → `MONGO_URI`/`PORT` 的顺序合并配置
    pub fn load(file: &str, legacy: LegacyEnv) -> Result<Self> {
        let config = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 4000)?
            .set_default("database.url", "mongodb://localhost:27017")?
            .set_default("database.db_name", "test")?
            .set_default("database.storage", "mongo")?
            .set_default("sys.log_level", "info")?
            .add_source(File::with_name(file).required(false))
            .add_source(Environment::with_prefix("APP").prefix_separator("__").separator("__"))
            .set_override_option("database.url", legacy.mongo_uri)?
            .set_override_option("server.port", legacy.port)?
            .build()
            .context("Failed to build configuration")?;
        config.try_deserialize::<AppConfig>().context("Failed to deserialize configuration")
    }

    /// 从进程环境加载
    pub fn init(file: &str) -> Result<Arc<Self>> {
        Ok(Arc::new(Self::load(file, LegacyEnv::from_process())?))
    }

    pub fn get_database(&self) -> DatabaseConfig {
        self.database.clone().unwrap_or_default()
    }
    pub fn get_server(&self) -> ServerConfig {
        self.server.clone().unwrap_or_default()
    }
    pub fn get_sys(&self) -> SysConfig {
        self.sys.clone().unwrap_or_default()
    }
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    #[default]
    Mongo,
    Memory,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DatabaseConfig {
    pub url: String,
    /// URI 中未指定默认库时使用
    pub db_name: String,
    #[serde(default)]
    pub storage: StorageKind,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SysConfig {
    //全局日志级别
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
