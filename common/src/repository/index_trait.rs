use mongodb::IndexModel;

/// 由 `#[derive(MongoIndexModelProvider)]` 实现，声明集合上的索引
pub trait MongoIndexModelProvider {
    fn index_models() -> Vec<IndexModel>;
}
