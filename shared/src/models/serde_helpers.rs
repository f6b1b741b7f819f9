//! Serde helpers for update payloads

use serde::{Deserialize, Deserializer};

/// 区分 "字段缺失" 与 "显式 null"
///
/// 配合 `#[serde(default)]` 使用：缺失 → `None` (保持不变)，
/// `null` → `Some(None)` (清空)，值 → `Some(Some(v))`。
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
