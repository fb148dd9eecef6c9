use crate::config::DatabaseConfig;
use anyhow::{Result, anyhow};
use log::info;
use mongodb::bson::doc;
use mongodb::options::ClientOptions;
use mongodb::{Client, Database};
use once_cell::sync::OnceCell;

#[derive(Clone)]
pub struct Db {
    pub client: Client,
    pub db: Database,
}

impl Db {
    /// 连接串中带有默认库时优先使用，否则使用 `db_name`
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let client_options = ClientOptions::parse(&config.url)
            .await
            .map_err(|e| anyhow!("MongoDB URI parse error: {}", e))?;

        let client = Client::with_options(client_options)
            .map_err(|e| anyhow!("MongoDB client init error: {}", e))?;

        let db = client.default_database().unwrap_or_else(|| client.database(&config.db_name));
        Ok(Self { client, db })
    }

    /// 初始化 MongoDB 数据库连接（全局只允许初始化一次）
    ///
    /// 驱动按需建立连接，这里额外 ping 一次以便启动时就能看到连接结果；
    /// ping 失败时全局句柄仍然保留，错误交给调用方记录，不做重试。
    pub async fn init(config: &DatabaseConfig) -> Result<&'static Database> {
        let instance = Self::connect(config).await?;
        INSTANCE.set(instance).map_err(|_| anyhow!("MongoDB already initialized"))?;
        let db = Self::get().ok_or_else(|| anyhow!("MongoDB is not initialized"))?;

        db.run_command(doc! { "ping": 1 }).await?;
        info!("Connected to MongoDB database '{}'", db.name());
        Ok(db)
    }

    /// 获取全局数据库实例引用
    pub fn get() -> Option<&'static Database> {
        INSTANCE.get().map(|instance| &instance.db)
    }

    /// 关闭全局连接；未初始化时什么也不做
    pub async fn shutdown() {
        if let Some(instance) = INSTANCE.get() {
            instance.client.clone().shutdown().await;
            info!("MongoDB client shut down");
        }
    }
}

// 全局单例容器（私有）
static INSTANCE: OnceCell<Db> = OnceCell::new();
