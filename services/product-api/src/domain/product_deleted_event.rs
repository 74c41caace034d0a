/// 商品削除イベント
///
/// 商品が削除されたときにProduct APIが発行し、ProductDeletedトピック経由で
/// 購読側サービスが受け取るメッセージペイロード。
///
/// ワイヤー形式は `{"productId": "..."}` のみ。購読側は未知のフィールドを無視し、
/// `productId` が欠落している場合は空文字列として扱う。
use serde::{Deserialize, Deserializer, Serialize};

/// 商品削除イベント
///
/// 構築後は不変。識別子の検証は行わない（空文字列も受け入れる）。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDeletedEvent {
    /// 削除された商品のID
    #[serde(default, deserialize_with = "lenient_product_id")]
    product_id: String,
}

impl ProductDeletedEvent {
    /// 商品IDから新しいイベントを作成
    pub fn new(product_id: impl Into<String>) -> Self {
        Self {
            product_id: product_id.into(),
        }
    }

    /// 商品IDを取得
    pub fn product_id(&self) -> &str {
        &self.product_id
    }

    /// JSON文字列にシリアライズ
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// JSON文字列からデシリアライズ
    ///
    /// 数値・真偽値の `productId` は文字列化し、nullは空文字列として扱う。
    /// 構文的に不正なJSON、または `productId` がオブジェクト・配列の場合のみエラーになる。
    pub fn from_json(payload: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(payload)
    }
}

/// `productId` として受け入れるスカラー値
#[derive(Deserialize)]
#[serde(untagged)]
enum ScalarId {
    Text(String),
    Number(serde_json::Number),
    Flag(bool),
}

// 文字列以外のスカラーは文字列化し、nullは欠落と同じ扱いにする
fn lenient_product_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<ScalarId>::deserialize(deserializer)? {
        Some(ScalarId::Text(value)) => value,
        Some(ScalarId::Number(value)) => value.to_string(),
        Some(ScalarId::Flag(value)) => value.to_string(),
        None => String::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== 構築テスト ====================

    #[test]
    fn test_new_exposes_product_id() {
        let event = ProductDeletedEvent::new("abc123");
        assert_eq!(event.product_id(), "abc123");
    }

    #[test]
    fn test_default_is_empty_product_id() {
        let event = ProductDeletedEvent::default();
        assert_eq!(event.product_id(), "");
    }

    #[test]
    fn test_empty_product_id_is_accepted() {
        let event = ProductDeletedEvent::new("");
        assert_eq!(event.product_id(), "");
    }

    // ==================== シリアライズテスト ====================

    #[test]
    fn test_serialize_uses_camel_case_field() {
        let json = ProductDeletedEvent::new("abc123").to_json().unwrap();
        assert_eq!(json, r#"{"productId":"abc123"}"#);
    }

    #[test]
    fn test_roundtrip_preserves_product_id() {
        let json = ProductDeletedEvent::new("abc123").to_json().unwrap();
        let decoded = ProductDeletedEvent::from_json(&json).unwrap();
        assert_eq!(decoded.product_id(), "abc123");
    }

    // ==================== デシリアライズ（寛容な解析）テスト ====================

    #[test]
    fn test_unknown_fields_are_ignored() {
        let payload = r#"{"productId":"abc123","deletedBy":"admin","version":3}"#;
        let event = ProductDeletedEvent::from_json(payload).unwrap();
        assert_eq!(event.product_id(), "abc123");
    }

    #[test]
    fn test_missing_product_id_defaults_to_empty() {
        let event = ProductDeletedEvent::from_json(r#"{"somethingElse":true}"#).unwrap();
        assert_eq!(event, ProductDeletedEvent::default());
    }

    #[test]
    fn test_null_product_id_defaults_to_empty() {
        let event = ProductDeletedEvent::from_json(r#"{"productId":null}"#).unwrap();
        assert_eq!(event.product_id(), "");
    }

    #[test]
    fn test_numeric_product_id_is_stringified() {
        let event = ProductDeletedEvent::from_json(r#"{"productId":42,"extra":1}"#).unwrap();
        assert_eq!(event.product_id(), "42");

        let event = ProductDeletedEvent::from_json(r#"{"productId":12.5}"#).unwrap();
        assert_eq!(event.product_id(), "12.5");
    }

    #[test]
    fn test_boolean_product_id_is_stringified() {
        let event = ProductDeletedEvent::from_json(r#"{"productId":true}"#).unwrap();
        assert_eq!(event.product_id(), "true");
    }

    #[test]
    fn test_structured_product_id_is_rejected() {
        assert!(ProductDeletedEvent::from_json(r#"{"productId":{"id":"abc"}}"#).is_err());
        assert!(ProductDeletedEvent::from_json(r#"{"productId":["abc"]}"#).is_err());
    }

    #[test]
    fn test_malformed_json_is_rejected() {
        assert!(ProductDeletedEvent::from_json("{not json").is_err());
    }
}
