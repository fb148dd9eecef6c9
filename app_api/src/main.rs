use actix_web::middleware::{from_fn, Logger};
use actix_web::{web, App, HttpServer};
use anyhow::{anyhow, Result};
use app_api::handlers;
use app_api::middleware::mongo_sanitize;
use biz_service::biz_service::country_service::CountryService;
use biz_service::entitys::country_entity::CountryEntity;
use biz_service::util::db_index_util::ensure_indexes;
use biz_service::COUNTRY_COLLECTION;
use common::config::{AppConfig, DatabaseConfig, StorageKind, SysConfig, DEFAULT_CONFIG_FILE};
use common::repository::db::Db;
use log::{error, warn, LevelFilter};
use std::str::FromStr;

#[actix_web::main]
async fn main() -> Result<()> {
    // .env 需在读取任何环境变量之前加载
    dotenvy::dotenv().ok();
    // 读取配置文件
    let app_cfg = AppConfig::init(DEFAULT_CONFIG_FILE)?;
    //初始化日志
    init_log(&app_cfg.get_sys())?;

    let country_service = web::Data::new(build_country_service(&app_cfg.get_database()).await?);
    let address_and_port = app_cfg.get_server().address();
    warn!("Starting server on {}", address_and_port);
    HttpServer::new(move || {
        App::new()
            .wrap(from_fn(mongo_sanitize))
            .wrap(Logger::default())
            .app_data(country_service.clone())
            // 配置 控制器
            .configure(handlers::configure)
    })
    .bind(address_and_port)?
    .run()
    .await?;

    Db::shutdown().await;
    Ok(())
}

/// `RUST_LOG` 存在时覆盖配置中的日志级别
pub fn init_log(sys: &SysConfig) -> Result<()> {
    let mut builder = env_logger::Builder::new();
    builder.filter(None, LevelFilter::from_str(&sys.log_level).unwrap_or(LevelFilter::Info));
    if let Ok(spec) = std::env::var("RUST_LOG") {
        builder.parse_filters(&spec);
    }
    builder.try_init()?;
    Ok(())
}

/// 连接失败只记录日志，服务照常启动，请求会在访问数据库时返回 500
async fn build_country_service(config: &DatabaseConfig) -> Result<CountryService> {
    if config.storage == StorageKind::Memory {
        warn!("Using in-memory storage, data is lost on exit");
        return Ok(CountryService::with_memory());
    }

    match Db::init(config).await {
        Ok(db) => {
            if let Err(e) = ensure_indexes::<CountryEntity>(db, COUNTRY_COLLECTION).await {
                error!("Failed to ensure country indexes: {}", e);
            }
        }
        Err(e) => error!("MongoDB connection failed: {}", e),
    }
    let db = Db::get().ok_or_else(|| anyhow!("MongoDB is not initialized"))?;
    Ok(CountryService::with_mongo(db))
}
