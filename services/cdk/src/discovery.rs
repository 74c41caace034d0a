//! リソース発見用パラメータ名前空間
//!
//! 独立してデプロイされるスタック同士は、SSM Parameter Storeの階層パス
//! （例: `/java/product-api/table-name`）を介してARNや名前を受け渡す。
//! パスと値の種類を `ParameterKey<K>` で型付けし、公開側と参照側の食い違いを
//! コンパイル時に検出できるようにする。

pub mod keys;
pub mod registry;
pub mod store;

use std::fmt;
use std::marker::PhantomData;

use thiserror::Error;

use crate::template::{Expr, HttpApiRef, ImportedTopic, TableRef, TemplateError, TopicRef};

// 再エクスポート
pub use registry::ParameterRegistry;
pub use store::{AwsSsmParameterStore, ParameterStore, resolve};

/// パラメータ操作のエラー型
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DiscoveryError {
    /// 同じパスが既に公開されている
    #[error("パラメータは既に公開されています: {0}")]
    AlreadyPublished(String),

    /// パスが `/` で始まらない、または空のセグメントを含む
    #[error("不正なパラメータパス: {0:?}")]
    InvalidPath(String),

    /// パラメータが存在しない
    #[error("パラメータが見つかりません: {0}")]
    NotFound(String),

    /// Parameter Store APIエラー
    #[error("AWS SSM APIエラー: {0}")]
    AwsSdkError(String),

    #[error(transparent)]
    Template(#[from] TemplateError),
}

/// パラメータ値の種類
pub trait ParameterKind {
    /// ログや表示用の種類名
    const NAME: &'static str;
}

/// SNSトピックARN
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopicArn;

/// SNSトピック名
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopicName;

/// DynamoDBテーブル名
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableName;

/// HTTP APIエンドポイントURL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiEndpoint;

impl ParameterKind for TopicArn {
    const NAME: &'static str = "topic-arn";
}

impl ParameterKind for TopicName {
    const NAME: &'static str = "topic-name";
}

impl ParameterKind for TableName {
    const NAME: &'static str = "table-name";
}

impl ParameterKind for ApiEndpoint {
    const NAME: &'static str = "api-endpoint";
}

/// 型付きのパラメータキー
///
/// `id` は公開側スタックでのSSMパラメータリソースの論理ID。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterKey<K> {
    id: &'static str,
    path: &'static str,
    kind: PhantomData<K>,
}

impl<K: ParameterKind> ParameterKey<K> {
    pub const fn new(id: &'static str, path: &'static str) -> Self {
        Self {
            id,
            path,
            kind: PhantomData,
        }
    }

    pub const fn id(&self) -> &'static str {
        self.id
    }

    pub const fn path(&self) -> &'static str {
        self.path
    }

    /// パスの形式を検証する
    pub fn validate(&self) -> Result<(), DiscoveryError> {
        let valid = self.path.len() > 1
            && self.path.starts_with('/')
            && self.path[1..].split('/').all(|segment| !segment.is_empty());
        if !valid {
            return Err(DiscoveryError::InvalidPath(self.path.to_string()));
        }
        Ok(())
    }
}

impl<K: ParameterKind> fmt::Display for ParameterKey<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.path, K::NAME)
    }
}

/// 種類付きのデプロイ時の値
///
/// 対応するハンドルからのみ作れるため、テーブル名をトピックARNのキーで公開するような
/// 取り違えはコンパイルエラーになる。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discoverable<K> {
    expr: Expr,
    kind: PhantomData<K>,
}

impl<K: ParameterKind> Discoverable<K> {
    pub(crate) fn new(expr: Expr) -> Self {
        Self {
            expr,
            kind: PhantomData,
        }
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    pub fn into_expr(self) -> Expr {
        self.expr
    }
}

impl From<&TopicRef> for Discoverable<TopicArn> {
    fn from(topic: &TopicRef) -> Self {
        use crate::template::Topic;
        Self::new(topic.topic_arn())
    }
}

impl From<&TopicRef> for Discoverable<TopicName> {
    fn from(topic: &TopicRef) -> Self {
        Self::new(topic.topic_name())
    }
}

impl From<&TableRef> for Discoverable<TableName> {
    fn from(table: &TableRef) -> Self {
        Self::new(table.table_name())
    }
}

impl From<&HttpApiRef> for Discoverable<ApiEndpoint> {
    fn from(api: &HttpApiRef) -> Self {
        Self::new(api.api_endpoint())
    }
}

impl From<Discoverable<TopicArn>> for ImportedTopic {
    fn from(arn: Discoverable<TopicArn>) -> Self {
        ImportedTopic::from_arn(arn.into_expr())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::{LogicalId, Topic};

    #[test]
    fn test_key_accessors_and_display() {
        let key: ParameterKey<TableName> =
            ParameterKey::new("TableNameParameter", "/java/product-api/table-name");

        assert_eq!(key.id(), "TableNameParameter");
        assert_eq!(key.path(), "/java/product-api/table-name");
        assert_eq!(key.to_string(), "/java/product-api/table-name (table-name)");
        assert!(key.validate().is_ok());
    }

    #[test]
    fn test_invalid_paths_are_rejected() {
        for path in ["", "/", "java/product-api", "/java//table-name", "/java/"] {
            let key: ParameterKey<TableName> = ParameterKey::new("Id", path);
            assert_eq!(
                key.validate(),
                Err(DiscoveryError::InvalidPath(path.to_string())),
                "{:?} should be rejected",
                path
            );
        }
    }

    #[test]
    fn test_topic_converts_to_arn_and_name() {
        let topic = TopicRef::new(LogicalId::new("Topic").unwrap());

        let arn: Discoverable<TopicArn> = (&topic).into();
        let name: Discoverable<TopicName> = (&topic).into();

        assert_eq!(arn.expr(), &topic.topic_arn());
        assert_eq!(name.expr(), &topic.topic_name());
    }

    #[test]
    fn test_discovered_arn_imports_topic() {
        let arn = Discoverable::<TopicArn>::new(Expr::literal("arn:aws:sns:us-east-1:1:T"));
        let topic = ImportedTopic::from(arn);
        assert_eq!(topic.topic_arn(), Expr::literal("arn:aws:sns:us-east-1:1:T"));
    }

    #[test]
    fn test_discovery_error_display() {
        assert_eq!(
            DiscoveryError::NotFound("/java/x".to_string()).to_string(),
            "パラメータが見つかりません: /java/x"
        );
        assert_eq!(
            DiscoveryError::from(TemplateError::InvalidLogicalId("a-b".to_string())).to_string(),
            "不正な論理ID: \"a-b\""
        );
    }
}
