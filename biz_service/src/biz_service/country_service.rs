use crate::COUNTRY_COLLECTION;
use crate::entitys::country_code::CodeField;
use crate::entitys::country_entity::{CountryEntity, CountryPatch, FIELD_NAME};
use common::errors::{AppError, AppResult};
use common::memory_repository::MemoryRepository;
use common::repository_util::{BaseRepository, Repository};
use log::debug;
use mongodb::Database;
use mongodb::bson::doc;
use std::sync::Arc;

pub const MSG_NOT_FOUND: &str = "Country not found";
pub const MSG_DOES_NOT_EXIST: &str = "Country does not exist";
pub const MSG_ALREADY_EXISTS: &str = "Country already exists";

/// 国家资源的业务规则：存在性检查、名称查重、按代码字段分派
#[derive(Clone)]
pub struct CountryService {
    pub dao: Arc<dyn Repository<CountryEntity>>,
}

impl CountryService {
    pub fn new(dao: Arc<dyn Repository<CountryEntity>>) -> Self {
        Self { dao }
    }

    pub fn with_mongo(db: &Database) -> Self {
        Self::new(Arc::new(BaseRepository::<CountryEntity>::new(db, COUNTRY_COLLECTION)))
    }

    pub fn with_memory() -> Self {
        Self::new(Arc::new(MemoryRepository::<CountryEntity>::new(COUNTRY_COLLECTION)))
    }

    pub async fn list(&self) -> AppResult<Vec<CountryEntity>> {
        self.dao.query_all().await
    }

    pub async fn get_by_id(&self, id: &str) -> AppResult<CountryEntity> {
        self.dao.find_by_id(id).await?.ok_or_else(|| AppError::NotFound(MSG_NOT_FOUND.to_string()))
    }

    /// 没有匹配时返回空列表
    pub async fn find_by_code(&self, field: CodeField, code: &str) -> AppResult<Vec<CountryEntity>> {
        debug!("find country by {}: {}", field.field_name(), code);
        self.dao.find(field.filter(code)).await
    }

    /// 只预先检查名称是否重复，两个代码字段的唯一性交给存储层索引
    pub async fn create(&self, name: &str, alpha2_code: &str, alpha3_code: &str) -> AppResult<CountryEntity> {
        if self.dao.find_one(doc! { FIELD_NAME: name }).await?.is_some() {
            return Err(AppError::Validation(MSG_ALREADY_EXISTS.to_string()));
        }
        let entity = CountryEntity::new(name, alpha2_code, alpha3_code);
        self.dao.insert(&entity).await?;
        Ok(entity)
    }

    pub async fn update_by_id(&self, id: &str, patch: &CountryPatch) -> AppResult<CountryEntity> {
        let existing = self.dao.find_by_id(id).await?.ok_or_else(|| AppError::NotFound(MSG_DOES_NOT_EXIST.to_string()))?;
        let Some(update) = patch.to_update() else {
            return Ok(existing);
        };
        // 检查与更新之间记录可能已被删除
        self.dao
            .find_by_id_and_update(id, update)
            .await?
            .ok_or_else(|| AppError::NotFound(MSG_DOES_NOT_EXIST.to_string()))
    }

    pub async fn update_by_code(&self, field: CodeField, code: &str, patch: &CountryPatch) -> AppResult<CountryEntity> {
        debug!("update country by {}: {}", field.field_name(), code);
        let updated = match patch.to_update() {
            Some(update) => self.dao.find_one_and_update(field.filter(code), update).await?,
            None => self.dao.find_one(field.filter(code)).await?,
        };
        updated.ok_or_else(|| AppError::NotFound(MSG_DOES_NOT_EXIST.to_string()))
    }

    /// id 不存在时返回 400
    pub async fn delete_by_id(&self, id: &str) -> AppResult<CountryEntity> {
        if self.dao.find_by_id(id).await?.is_none() {
            return Err(AppError::Validation(MSG_DOES_NOT_EXIST.to_string()));
        }
        self.dao
            .find_by_id_and_delete(id)
            .await?
            .ok_or_else(|| AppError::Validation(MSG_DOES_NOT_EXIST.to_string()))
    }

    pub async fn delete_by_code(&self, field: CodeField, code: &str) -> AppResult<CountryEntity> {
        debug!("delete country by {}: {}", field.field_name(), code);
        self.dao
            .find_one_and_delete(field.filter(code))
            .await?
            .ok_or_else(|| AppError::NotFound(MSG_DOES_NOT_EXIST.to_string()))
    }
}
