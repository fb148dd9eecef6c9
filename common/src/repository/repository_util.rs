use crate::errors::AppResult;
use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{doc, Document};
use mongodb::options::ReturnDocument;
use mongodb::{Collection, Database};
use serde::{de::DeserializeOwned, Serialize};

/// 单集合的查询/修改操作，不包含任何业务规则
///
/// 以字符串形式传入的 id 若不是合法的 ObjectId，视为不存在。
#[async_trait]
pub trait Repository<T>: Send + Sync {
    async fn query_all(&self) -> AppResult<Vec<T>>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<T>>;
    async fn find_one(&self, filter: Document) -> AppResult<Option<T>>;
    async fn find(&self, filter: Document) -> AppResult<Vec<T>>;
    async fn insert(&self, entity: &T) -> AppResult<()>;
    /// 返回修改后的文档
    async fn find_by_id_and_update(&self, id: &str, update: Document) -> AppResult<Option<T>>;
    /// 返回被删除的文档
    async fn find_by_id_and_delete(&self, id: &str) -> AppResult<Option<T>>;
    /// 返回修改后的文档
    async fn find_one_and_update(&self, filter: Document, update: Document) -> AppResult<Option<T>>;
    /// 返回被删除的文档
    async fn find_one_and_delete(&self, filter: Document) -> AppResult<Option<T>>;
}

/// 把字符串 id 转为 `_id` 过滤条件
pub fn id_filter(id: &str) -> Option<Document> {
    ObjectId::parse_str(id).ok().map(|oid| doc! { "_id": oid })
}

#[derive(Debug)]
pub struct BaseRepository<T: Send + Sync> {
    pub collection: Collection<T>, // 线程安全的数据库连接池
}

impl<T: Send + Sync> BaseRepository<T> {
    pub fn new(db: &Database, collection_name: &str) -> Self {
        Self { collection: db.collection(collection_name) }
    }
}

#[async_trait]
impl<T> Repository<T> for BaseRepository<T>
where
    T: Serialize + DeserializeOwned + Unpin + Send + Sync,
{
    async fn query_all(&self) -> AppResult<Vec<T>> {
        self.find(doc! {}).await
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<T>> {
        match id_filter(id) {
            Some(filter) => self.find_one(filter).await,
            None => Ok(None),
        }
    }

    async fn find_one(&self, filter: Document) -> AppResult<Option<T>> {
        Ok(self.collection.find_one(filter).await?)
    }

    async fn find(&self, filter: Document) -> AppResult<Vec<T>> {
        let cursor = self.collection.find(filter).await?;
        let items: Vec<T> = cursor.try_collect().await?;
        Ok(items)
    }

    async fn insert(&self, entity: &T) -> AppResult<()> {
        self.collection.insert_one(entity).await?;
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
        let updated = self
            .collection
            .find_one_and_update(filter, update)
            .return_document(ReturnDocument::After)
            .await?;
        Ok(updated)
    }

    async fn find_one_and_delete(&self, filter: Document) -> AppResult<Option<T>> {
        Ok(self.collection.find_one_and_delete(filter).await?)
    }
}
