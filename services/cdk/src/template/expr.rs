//! デプロイ時に解決される値
//!
//! テンプレート合成時には実際のARNや名前は確定していないため、
//! CloudFormationの組み込み関数（Ref / Fn::GetAtt / Fn::Join）として表現する。

use serde::ser::{Serialize, SerializeMap, Serializer};

use super::logical_id::LogicalId;

/// CloudFormation擬似パラメータ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pseudo {
    Partition,
    Region,
    AccountId,
}

impl Pseudo {
    pub fn as_str(&self) -> &'static str {
        match self {
            Pseudo::Partition => "AWS::Partition",
            Pseudo::Region => "AWS::Region",
            Pseudo::AccountId => "AWS::AccountId",
        }
    }
}

/// デプロイ時に解決される値
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// 固定文字列
    Literal(String),
    /// リソースまたはテンプレートパラメータへの参照
    Ref(LogicalId),
    /// リソース属性の参照
    GetAtt(LogicalId, String),
    /// 擬似パラメータの参照
    Pseudo(Pseudo),
    /// 区切り文字なしの連結
    Join(Vec<Expr>),
}

impl Expr {
    pub fn literal(value: impl Into<String>) -> Self {
        Expr::Literal(value.into())
    }

    pub fn get_att(id: &LogicalId, attribute: impl Into<String>) -> Self {
        Expr::GetAtt(id.clone(), attribute.into())
    }

    pub fn join(parts: impl IntoIterator<Item = Expr>) -> Self {
        Expr::Join(parts.into_iter().collect())
    }

    /// この値が参照している論理IDを列挙する（擬似パラメータは含まない）
    pub fn references(&self) -> Vec<&LogicalId> {
        match self {
            Expr::Literal(_) | Expr::Pseudo(_) => Vec::new(),
            Expr::Ref(id) | Expr::GetAtt(id, _) => vec![id],
            Expr::Join(parts) => parts.iter().flat_map(Expr::references).collect(),
        }
    }
}

impl From<&str> for Expr {
    fn from(value: &str) -> Self {
        Expr::Literal(value.to_string())
    }
}

impl From<String> for Expr {
    fn from(value: String) -> Self {
        Expr::Literal(value)
    }
}

impl Serialize for Expr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Expr::Literal(value) => serializer.serialize_str(value),
            Expr::Ref(id) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("Ref", id.as_str())?;
                map.end()
            }
            Expr::Pseudo(pseudo) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("Ref", pseudo.as_str())?;
                map.end()
            }
            Expr::GetAtt(id, attribute) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("Fn::GetAtt", &[id.as_str(), attribute.as_str()])?;
                map.end()
            }
            Expr::Join(parts) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("Fn::Join", &("", parts))?;
                map.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn id(value: &str) -> LogicalId {
        LogicalId::new(value).unwrap()
    }

    #[test]
    fn test_literal_serializes_as_string() {
        assert_eq!(serde_json::to_value(Expr::from("abc")).unwrap(), json!("abc"));
    }

    #[test]
    fn test_ref_and_get_att_shapes() {
        assert_eq!(
            serde_json::to_value(Expr::Ref(id("Table"))).unwrap(),
            json!({"Ref": "Table"})
        );
        assert_eq!(
            serde_json::to_value(Expr::get_att(&id("Table"), "Arn")).unwrap(),
            json!({"Fn::GetAtt": ["Table", "Arn"]})
        );
        assert_eq!(
            serde_json::to_value(Expr::Pseudo(Pseudo::Region)).unwrap(),
            json!({"Ref": "AWS::Region"})
        );
    }

    #[test]
    fn test_join_nests_parts() {
        let expr = Expr::join([
            Expr::from("lambda_sns:"),
            Expr::get_att(&id("Topic"), "TopicName"),
        ]);
        assert_eq!(
            serde_json::to_value(expr).unwrap(),
            json!({"Fn::Join": ["", ["lambda_sns:", {"Fn::GetAtt": ["Topic", "TopicName"]}]]})
        );
    }

    #[test]
    fn test_references_walks_joins_and_skips_pseudo() {
        let expr = Expr::join([
            Expr::Pseudo(Pseudo::Partition),
            Expr::Ref(id("Api")),
            Expr::from("/*"),
            Expr::get_att(&id("Fn"), "Arn"),
        ]);
        let refs: Vec<&str> = expr.references().iter().map(|i| i.as_str()).collect();
        assert_eq!(refs, vec!["Api", "Fn"]);
    }
}
