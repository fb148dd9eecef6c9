use serde_json::{Map, Value};

/// 替换键名开头 `$` 的字符
pub const REPLACE_WITH: &str = "_";

/// 递归清洗 JSON 中以 `$` 开头的键名，防止请求体被当作查询操作符使用。
/// 键名中的 `.` 保持原样。返回是否发生了替换。
pub fn sanitize_value(value: &mut Value) -> bool {
    match value {
        Value::Object(map) => sanitize_map(map),
        Value::Array(items) => items.iter_mut().fold(false, |changed, item| sanitize_value(item) || changed),
        _ => false,
    }
}

fn sanitize_map(map: &mut Map<String, Value>) -> bool {
    let mut changed = false;
    let entries = std::mem::take(map);
    for (key, mut value) in entries {
        changed |= sanitize_value(&mut value);
        match key.strip_prefix('$') {
            Some(rest) => {
                changed = true;
                map.insert(format!("{}{}", REPLACE_WITH, rest), value);
            }
            None => {
                map.insert(key, value);
            }
        }
    }
    changed
}
