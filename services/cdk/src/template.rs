//! CloudFormationテンプレートモデル
//!
//! リソース定義を型付きで組み立て、デプロイ時の望ましい状態（テンプレートJSON）へ合成する。

pub mod access;
pub mod expr;
pub mod handles;
pub mod logical_id;
pub mod resource;
pub mod stack;

use thiserror::Error;

// 再エクスポート
pub use access::Access;
pub use expr::{Expr, Pseudo};
pub use handles::{FunctionRef, HttpApiRef, ImportedTopic, SecretRef, TableRef, Topic, TopicRef};
pub use logical_id::{LogicalId, Scope};
pub use resource::{
    AttributeType, BillingMode, FunctionProps, HttpApiProps, HttpIntegrationProps, HttpMethod,
    HttpRouteProps, HttpStageProps, PermissionProps, PolicyProps, PolicyStatement, RemovalPolicy,
    Resource, ResourceKind, RoleProps, StringParameterProps, SubscriptionProps, TableClass,
    TableProps, TopicProps,
};
pub use stack::{Stack, TemplateParameter};

/// テンプレート構築・合成のエラー型
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TemplateError {
    #[error("不正な論理ID: {0:?}")]
    InvalidLogicalId(String),

    #[error("不正なスタック名: {0:?}")]
    InvalidStackName(String),

    #[error("論理IDが重複しています: {0}")]
    DuplicateLogicalId(String),

    #[error("存在しない論理IDへの参照: {from} -> {to}")]
    DanglingReference { from: String, to: String },

    #[error("不正なARN: {0:?}")]
    InvalidArn(String),

    #[error("関数が見つかりません: {0}")]
    UnknownFunction(String),
}
