use crate::errors::{AppError, AppResult};
use crate::has_mongo_indexes::{HasMongoIndexes, UniqueKey};
use crate::repository_util::{id_filter, Repository};
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{self, Bson, Document};
use serde::{de::DeserializeOwned, Serialize};
use std::marker::PhantomData;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// 进程内的文档集合，行为与 MongoDB 集合保持一致的子集：
/// 顶层字段等值过滤、`$set`/`$unset` 更新、`_id` 及声明的唯一索引约束。
///
/// 用于测试以及 `storage = "memory"` 模式。
pub struct MemoryRepository<T> {
    name: String,
    unique_keys: Vec<UniqueKey>,
    docs: RwLock<Vec<Document>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: HasMongoIndexes> MemoryRepository<T> {
    pub fn new(collection_name: &str) -> Self {
        let mut unique_keys = vec![UniqueKey { name: "_id_".to_string(), fields: vec!["_id".to_string()] }];
        unique_keys.extend(T::unique_keys());
        Self {
            name: collection_name.to_string(),
            unique_keys,
            docs: RwLock::new(Vec::new()),
            _marker: PhantomData,
        }
    }
}

impl<T> MemoryRepository<T> {
    pub fn len(&self) -> usize {
        self.read().map(|docs| docs.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> AppResult<RwLockReadGuard<'_, Vec<Document>>> {
        self.docs.read().map_err(|_| AppError::Internal(format!("collection '{}' lock poisoned", self.name)))
    }

    fn write(&self) -> AppResult<RwLockWriteGuard<'_, Vec<Document>>> {
        self.docs.write().map_err(|_| AppError::Internal(format!("collection '{}' lock poisoned", self.name)))
    }

    /// 检查 `candidate` 与除 `skip` 以外的文档是否违反唯一索引
    fn check_unique(&self, docs: &[Document], candidate: &Document, skip: Option<usize>) -> AppResult<()> {
        for key in &self.unique_keys {
            let values: Vec<&Bson> = key.fields.iter().map(|f| candidate.get(f).unwrap_or(&Bson::Null)).collect();
            let clash = docs.iter().enumerate().filter(|(i, _)| Some(*i) != skip).any(|(_, existing)| {
                key.fields
                    .iter()
                    .zip(&values)
                    .all(|(f, v)| existing.get(f).unwrap_or(&Bson::Null) == *v)
            });
            if clash {
                let dup = key
                    .fields
                    .iter()
                    .zip(&values)
                    .map(|(f, v)| format!("{}: {}", f, v))
                    .collect::<Vec<_>>()
                    .join(", ");
                return Err(AppError::DuplicateKey(format!(
                    "E11000 duplicate key error collection: {} index: {} dup key: {{ {} }}",
                    self.name, key.name, dup
                )));
            }
        }
        Ok(())
    }
}

fn matches(doc: &Document, filter: &Document) -> bool {
    filter.iter().all(|(k, v)| doc.get(k).unwrap_or(&Bson::Null) == v)
}

/// 仅支持 `$set` 与 `$unset`，`_id` 不可修改
fn apply_update(doc: &Document, update: &Document) -> AppResult<Document> {
    let mut next = doc.clone();
    for (op, arg) in update {
        let fields = match arg {
            Bson::Document(fields) => fields,
            _ => return Err(AppError::Internal(format!("Modifiers operate on fields but we found {} instead", arg))),
        };
        match op.as_str() {
            "$set" => {
                for (k, v) in fields {
                    if k == "_id" && doc.get("_id") != Some(v) {
                        return Err(AppError::Internal(
                            "Performing an update on the path '_id' would modify the immutable field '_id'".to_string(),
                        ));
                    }
                    next.insert(k.clone(), v.clone());
                }
            }
            "$unset" => {
                for (k, _) in fields {
                    if k == "_id" {
                        return Err(AppError::Internal(
                            "Performing an update on the path '_id' would modify the immutable field '_id'".to_string(),
                        ));
                    }
                    next.remove(k);
                }
            }
            other if other.starts_with('$') => {
                return Err(AppError::Internal(format!("Unknown modifier: {}", other)));
            }
            _ => return Err(AppError::Internal("update document requires atomic operators".to_string())),
        }
    }
    Ok(next)
}

#[async_trait]
impl<T> Repository<T> for MemoryRepository<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    async fn query_all(&self) -> AppResult<Vec<T>> {
        self.find(Document::new()).await
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<T>> {
        match id_filter(id) {
            Some(filter) => self.find_one(filter).await,
            None => Ok(None),
        }
    }

    async fn find_one(&self, filter: Document) -> AppResult<Option<T>> {
        let docs = self.read()?;
        match docs.iter().find(|d| matches(d, &filter)) {
            Some(found) => Ok(Some(bson::from_document(found.clone())?)),
            None => Ok(None),
        }
    }

    async fn find(&self, filter: Document) -> AppResult<Vec<T>> {
        let docs = self.read()?;
        docs.iter()
            .filter(|d| matches(d, &filter))
            .map(|d| bson::from_document(d.clone()).map_err(AppError::from))
            .collect()
    }

    async fn insert(&self, entity: &T) -> AppResult<()> {
        let mut doc = bson::to_document(entity)?;
        if !doc.contains_key("_id") {
            doc.insert("_id", ObjectId::new());
        }
        let mut docs = self.write()?;
        self.check_unique(&docs, &doc, None)?;
        docs.push(doc);
        Ok(())
    }

    async fn find_by_id_and_update(&self, id: &str, update: Document) -> AppResult<Option<T>> {
        match id_filter(id) {
            Some(filter) => self.find_one_and_update(filter, update).await,
            None => Ok(None),
        }
    }

    async fn find_by_id_and_delete(&self, id: &str) -> AppResult<Option<T>> {
        match id_filter(id) {
            Some(filter) => self.find_one_and_delete(filter).await,
            None => Ok(None),
        }
    }

    async fn find_one_and_update(&self, filter: Document, update: Document) -> AppResult<Option<T>> {
        let mut docs = self.write()?;
        let Some(pos) = docs.iter().position(|d| matches(d, &filter)) else {
            return Ok(None);
        };
        let next = apply_update(&docs[pos], &update)?;
        self.check_unique(&docs, &next, Some(pos))?;
        docs[pos] = next.clone();
        Ok(Some(bson::from_document(next)?))
    }

    async fn find_one_and_delete(&self, filter: Document) -> AppResult<Option<T>> {
        let mut docs = self.write()?;
        match docs.iter().position(|d| matches(d, &filter)) {
            Some(pos) => Ok(Some(bson::from_document(docs.remove(pos))?)),
            None => Ok(None),
        }
    }
}
