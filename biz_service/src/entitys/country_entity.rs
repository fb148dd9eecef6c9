use common::index_trait::MongoIndexModelProvider;
use mongo_macro::MongoIndexModelProvider as MongoDeriveMongoIndex;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{doc, Document};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const FIELD_NAME: &str = "name";
pub const FIELD_ALPHA2_CODE: &str = "alpha2Code";
pub const FIELD_ALPHA3_CODE: &str = "alpha3Code";

/// 国家文档，三个业务字段各自唯一
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, MongoDeriveMongoIndex)]
#[mongo_index(fields["name"], unique)]
#[mongo_index(fields["alpha2Code"], unique)]
#[mongo_index(fields["alpha3Code"], unique)]
#[serde(rename_all = "camelCase")]
pub struct CountryEntity {
    /// 主键，插入前生成，之后不可修改
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// 国家名称，如 "Wakanda"
    #[serde(default)]
    pub name: String,
    /// ISO 3166-1 alpha-2 两位代码，如 "WK"
    #[serde(default)]
    pub alpha2_code: String,
    /// ISO 3166-1 alpha-3 三位代码，如 "WKD"
    #[serde(default)]
    pub alpha3_code: String,
    /// 文档版本号
    #[serde(rename = "__v", default)]
    pub version: i32,
}

impl CountryEntity {
    pub fn new(name: impl Into<String>, alpha2_code: impl Into<String>, alpha3_code: impl Into<String>) -> Self {
        Self {
            id: Some(ObjectId::new()),
            name: name.into(),
            alpha2_code: alpha2_code.into(),
            alpha3_code: alpha3_code.into(),
            version: 0,
        }
    }
}

/// 部分更新，仅包含需要修改的字段
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CountryPatch {
    pub name: Option<String>,
    pub alpha2_code: Option<String>,
    pub alpha3_code: Option<String>,
}

impl CountryPatch {
    /// 生成 `$set` 更新文档；没有字段时返回 `None`
    pub fn to_update(&self) -> Option<Document> {
        let mut set = Document::new();
        let fields = [
            (FIELD_NAME, &self.name),
            (FIELD_ALPHA2_CODE, &self.alpha2_code),
            (FIELD_ALPHA3_CODE, &self.alpha3_code),
        ];
        for (field, value) in fields {
            if let Some(value) = value {
                set.insert(field, value.clone());
            }
        }
        if set.is_empty() { None } else { Some(doc! { "$set": set }) }
    }
}

/// 对外返回的 JSON 结构，`_id` 以十六进制字符串输出
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct CountryView {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(rename = "alpha2Code")]
    pub alpha2_code: String,
    #[serde(rename = "alpha3Code")]
    pub alpha3_code: String,
    #[serde(rename = "__v")]
    pub version: i32,
}

impl From<CountryEntity> for CountryView {
    fn from(entity: CountryEntity) -> Self {
        Self {
            id: entity.id.map(|oid| oid.to_hex()).unwrap_or_default(),
            name: entity.name,
            alpha2_code: entity.alpha2_code,
            alpha3_code: entity.alpha3_code,
            version: entity.version,
        }
    }
}
