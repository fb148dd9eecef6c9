use common::errors::AppResult;
use common::has_mongo_indexes::HasMongoIndexes;
use mongodb::bson::Document;
use mongodb::{Collection, Database, IndexModel};
use std::collections::HashSet;

/// 按名称比对，只创建集合上尚不存在的索引。失败只记录日志，不重试。
pub async fn index_create(coll: Collection<Document>, target_list: Vec<IndexModel>) -> AppResult<usize> {
    // 集合尚未创建时列索引会报错，视为没有任何索引
    let existing: HashSet<String> = match coll.list_index_names().await {
        Ok(names) => names.into_iter().collect(),
        Err(e) => {
            log::warn!("⚠️ 列出索引失败 {}: {}", coll.name(), e);
            HashSet::new()
        }
    };

    let mut created = 0;
    for target in target_list {
        let name = target.options.as_ref().and_then(|o| o.name.clone()).unwrap_or_default();
        if existing.contains(&name) {
            continue;
        }
        match coll.create_index(target.clone()).await {
            Ok(_) => {
                created += 1;
                log::info!("✅ 创建索引成功: {} {}", coll.name(), target.keys);
            }
            Err(e) => log::error!("❌ 创建索引失败: {} {:?}", coll.name(), e),
        }
    }
    Ok(created)
}

/// 为实体声明的索引建索引
pub async fn ensure_indexes<T: HasMongoIndexes>(db: &Database, collection: &str) -> AppResult<usize> {
    let Some(models) = T::maybe_index_models() else {
        return Ok(0);
    };
    index_create(db.collection::<Document>(collection), models).await
}

