//! リソースハンドル
//!
//! スタックに追加したリソースを型付きで参照するためのハンドル。
//! 属性（ARN、名前、エンドポイント）はデプロイ時に解決される `Expr` として得られる。

use super::TemplateError;
use super::expr::Expr;
use super::logical_id::LogicalId;

/// SNSトピックとして発行先になれるもの
pub trait Topic {
    fn topic_arn(&self) -> Expr;
}

/// スタック内で定義したDynamoDBテーブル
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    id: LogicalId,
}

impl TableRef {
    pub(crate) fn new(id: LogicalId) -> Self {
        Self { id }
    }

    pub fn logical_id(&self) -> &LogicalId {
        &self.id
    }

    pub fn table_name(&self) -> Expr {
        Expr::Ref(self.id.clone())
    }

    pub fn table_arn(&self) -> Expr {
        Expr::get_att(&self.id, "Arn")
    }
}

/// スタック内で定義したSNSトピック
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicRef {
    id: LogicalId,
}

impl TopicRef {
    pub(crate) fn new(id: LogicalId) -> Self {
        Self { id }
    }

    pub fn logical_id(&self) -> &LogicalId {
        &self.id
    }

    pub fn topic_name(&self) -> Expr {
        Expr::get_att(&self.id, "TopicName")
    }
}

impl Topic for TopicRef {
    // AWS::SNS::Topic の Ref はトピックARN
    fn topic_arn(&self) -> Expr {
        Expr::Ref(self.id.clone())
    }
}

/// 他スタックで定義されたトピック（ARNのみ既知）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedTopic {
    arn: Expr,
}

impl ImportedTopic {
    pub fn from_arn(arn: impl Into<Expr>) -> Self {
        Self { arn: arn.into() }
    }
}

impl Topic for ImportedTopic {
    fn topic_arn(&self) -> Expr {
        self.arn.clone()
    }
}

/// Lambda関数とその実行ロール
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionRef {
    id: LogicalId,
    role: LogicalId,
}

impl FunctionRef {
    pub(crate) fn new(id: LogicalId, role: LogicalId) -> Self {
        Self { id, role }
    }

    pub fn logical_id(&self) -> &LogicalId {
        &self.id
    }

    pub fn role_id(&self) -> &LogicalId {
        &self.role
    }

    pub fn function_name(&self) -> Expr {
        Expr::Ref(self.id.clone())
    }

    pub fn function_arn(&self) -> Expr {
        Expr::get_att(&self.id, "Arn")
    }
}

/// HTTP API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpApiRef {
    id: LogicalId,
}

impl HttpApiRef {
    pub(crate) fn new(id: LogicalId) -> Self {
        Self { id }
    }

    pub fn logical_id(&self) -> &LogicalId {
        &self.id
    }

    pub fn api_id(&self) -> Expr {
        Expr::Ref(self.id.clone())
    }

    pub fn api_endpoint(&self) -> Expr {
        Expr::get_att(&self.id, "ApiEndpoint")
    }
}

/// Secrets Managerのシークレット（完全なARNで参照する既存リソース）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretRef {
    arn: String,
}

impl SecretRef {
    /// 完全なシークレットARNから参照を作る
    ///
    /// 形式: `arn:<partition>:secretsmanager:<region>:<account>:secret:<name>`
    pub fn from_complete_arn(arn: impl Into<String>) -> Result<Self, TemplateError> {
        let arn = arn.into();
        let parts: Vec<&str> = arn.splitn(7, ':').collect();
        let valid = parts.len() == 7
            && parts[0] == "arn"
            && parts[2] == "secretsmanager"
            && parts[5] == "secret"
            && !parts[6].is_empty();
        if !valid {
            return Err(TemplateError::InvalidArn(arn));
        }
        Ok(Self { arn })
    }

    pub fn arn(&self) -> &str {
        &self.arn
    }

    pub fn secret_arn(&self) -> Expr {
        Expr::literal(&self.arn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET_ARN: &str =
        "arn:aws:secretsmanager:us-east-1:123456789012:secret:dd-api-key-AbCdEf";

    #[test]
    fn test_secret_from_complete_arn() {
        let secret = SecretRef::from_complete_arn(SECRET_ARN).unwrap();
        assert_eq!(secret.arn(), SECRET_ARN);
        assert_eq!(secret.secret_arn(), Expr::literal(SECRET_ARN));
    }

    #[test]
    fn test_secret_rejects_malformed_arns() {
        for arn in [
            "",
            "dd-api-key",
            "arn:aws:ssm:us-east-1:123456789012:parameter/x",
            "arn:aws:secretsmanager:us-east-1:123456789012:secret:",
        ] {
            assert_eq!(
                SecretRef::from_complete_arn(arn),
                Err(TemplateError::InvalidArn(arn.to_string()))
            );
        }
    }

    #[test]
    fn test_topic_arn_sources() {
        let owned = TopicRef::new(LogicalId::new("Topic").unwrap());
        assert_eq!(owned.topic_arn(), Expr::Ref(LogicalId::new("Topic").unwrap()));

        let imported = ImportedTopic::from_arn("arn:aws:sns:us-east-1:123456789012:ProductAdded");
        assert_eq!(
            imported.topic_arn(),
            Expr::literal("arn:aws:sns:us-east-1:123456789012:ProductAdded")
        );
    }
}
