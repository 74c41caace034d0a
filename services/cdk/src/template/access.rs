// アクセス権限の付与
//
// 関数に与える権限を用途単位で表す。合成時に関数ロールごとのIAMポリシーへ畳み込まれる。

use super::expr::Expr;
use super::handles::{SecretRef, TableRef, Topic};
use super::resource::PolicyStatement;

const TABLE_READ_ACTIONS: &[&str] = &[
    "dynamodb:BatchGetItem",
    "dynamodb:GetRecords",
    "dynamodb:GetShardIterator",
    "dynamodb:Query",
    "dynamodb:GetItem",
    "dynamodb:Scan",
    "dynamodb:ConditionCheckItem",
    "dynamodb:DescribeTable",
];

const TABLE_WRITE_ACTIONS: &[&str] = &[
    "dynamodb:BatchWriteItem",
    "dynamodb:PutItem",
    "dynamodb:UpdateItem",
    "dynamodb:DeleteItem",
];

const TOPIC_PUBLISH_ACTIONS: &[&str] = &["sns:Publish"];

const SECRET_READ_ACTIONS: &[&str] = &[
    "secretsmanager:GetSecretValue",
    "secretsmanager:DescribeSecret",
];

/// 関数に付与する権限
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    /// テーブルの読み取り
    TableRead { table_arn: Expr },
    /// テーブルの読み書き
    TableReadWrite { table_arn: Expr },
    /// トピックへの発行
    TopicPublish { topic_arn: Expr },
    /// シークレット値の読み取り
    SecretRead { secret_arn: Expr },
}

impl Access {
    pub fn table_read(table: &TableRef) -> Self {
        Access::TableRead {
            table_arn: table.table_arn(),
        }
    }

    pub fn table_read_write(table: &TableRef) -> Self {
        Access::TableReadWrite {
            table_arn: table.table_arn(),
        }
    }

    pub fn topic_publish(topic: &impl Topic) -> Self {
        Access::TopicPublish {
            topic_arn: topic.topic_arn(),
        }
    }

    pub fn secret_read(secret: &SecretRef) -> Self {
        Access::SecretRead {
            secret_arn: secret.secret_arn(),
        }
    }

    /// IAMアクション
    pub fn actions(&self) -> Vec<&'static str> {
        match self {
            Access::TableRead { .. } => TABLE_READ_ACTIONS.to_vec(),
            Access::TableReadWrite { .. } => TABLE_READ_ACTIONS
                .iter()
                .chain(TABLE_WRITE_ACTIONS)
                .copied()
                .collect(),
            Access::TopicPublish { .. } => TOPIC_PUBLISH_ACTIONS.to_vec(),
            Access::SecretRead { .. } => SECRET_READ_ACTIONS.to_vec(),
        }
    }

    /// 対象リソースのARN
    pub fn resource(&self) -> &Expr {
        match self {
            Access::TableRead { table_arn } | Access::TableReadWrite { table_arn } => table_arn,
            Access::TopicPublish { topic_arn } => topic_arn,
            Access::SecretRead { secret_arn } => secret_arn,
        }
    }

    /// テーブルへの書き込みを含むか
    pub fn allows_table_write(&self) -> bool {
        matches!(self, Access::TableReadWrite { .. })
    }

    pub fn statement(&self) -> PolicyStatement {
        PolicyStatement {
            actions: self.actions(),
            resources: vec![self.resource().clone()],
        }
    }
}
