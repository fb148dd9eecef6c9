use crate::index_trait::MongoIndexModelProvider;
use mongodb::bson::Document;
use mongodb::IndexModel;

/// 唯一索引的简化描述：索引名 + 字段列表
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueKey {
    pub name: String,
    pub fields: Vec<String>,
}

pub trait HasMongoIndexes {
    fn maybe_index_models() -> Option<Vec<IndexModel>> {
        None
    }

    /// 从索引声明中挑出唯一索引，供不依赖 MongoDB 的存储实现校验
    fn unique_keys() -> Vec<UniqueKey> {
        Self::maybe_index_models()
            .unwrap_or_default()
            .into_iter()
            .filter(|model| model.options.as_ref().and_then(|o| o.unique).unwrap_or(false))
            .map(|model| UniqueKey {
                name: model
                    .options
                    .as_ref()
                    .and_then(|o| o.name.clone())
                    .unwrap_or_else(|| default_index_name(&model.keys)),
                fields: model.keys.keys().cloned().collect(),
            })
            .collect()
    }
}

impl<T> HasMongoIndexes for T
where
    T: MongoIndexModelProvider,
{
    fn maybe_index_models() -> Option<Vec<IndexModel>> {
        Some(T::index_models())
    }
}

fn default_index_name(keys: &Document) -> String {
    keys.iter().map(|(k, v)| format!("{}_{}", k, v)).collect::<Vec<_>>().join("_")
}
