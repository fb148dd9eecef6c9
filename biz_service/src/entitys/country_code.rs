use crate::entitys::country_entity::{FIELD_ALPHA2_CODE, FIELD_ALPHA3_CODE};
use mongodb::bson::{doc, Document};

/// 按代码长度选择查询字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeField {
    Alpha2,
    Alpha3,
}

/// 长度 → 字段；未列出的长度不是国家代码
const CODE_POLICY: [(usize, CodeField); 2] = [(2, CodeField::Alpha2), (3, CodeField::Alpha3)];

impl CodeField {
    pub fn for_code(code: &str) -> Option<Self> {
        let len = code.chars().count();
        CODE_POLICY.iter().find(|(l, _)| *l == len).map(|(_, field)| *field)
    }

    pub fn field_name(self) -> &'static str {
        match self {
            CodeField::Alpha2 => FIELD_ALPHA2_CODE,
            CodeField::Alpha3 => FIELD_ALPHA3_CODE,
        }
    }

    pub fn filter(self, code: &str) -> Document {
        let field = self.field_name();
        doc! { field: code }
    }
}

/// `/countries/{key}` 路径段的解析结果。
///
/// 代码与 id 共用同一个路径位置：能被代码长度表识别的视为代码，其余一律视为 id。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountryKey {
    Code(CodeField, String),
    Id(String),
}

impl CountryKey {
    pub fn parse(segment: &str) -> Self {
        match CodeField::for_code(segment) {
            Some(field) => CountryKey::Code(field, segment.to_string()),
            None => CountryKey::Id(segment.to_string()),
        }
    }
}
