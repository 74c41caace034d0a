//! リソース定義
//!
//! このリポジトリで使うCloudFormationリソース種別だけを型付きで表現する。

use std::collections::BTreeMap;

use serde_json::{Value, json};

use super::expr::Expr;
use super::logical_id::LogicalId;

/// リソース種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Table,
    Topic,
    Subscription,
    Role,
    Policy,
    Function,
    Permission,
    HttpApi,
    HttpStage,
    HttpIntegration,
    HttpRoute,
    StringParameter,
}

impl ResourceKind {
    /// CloudFormationのリソースタイプ名
    pub fn cfn_type(&self) -> &'static str {
        match self {
            ResourceKind::Table => "AWS::DynamoDB::Table",
            ResourceKind::Topic => "AWS::SNS::Topic",
            ResourceKind::Subscription => "AWS::SNS::Subscription",
            ResourceKind::Role => "AWS::IAM::Role",
            ResourceKind::Policy => "AWS::IAM::Policy",
            ResourceKind::Function => "AWS::Lambda::Function",
            ResourceKind::Permission => "AWS::Lambda::Permission",
            ResourceKind::HttpApi => "AWS::ApiGatewayV2::Api",
            ResourceKind::HttpStage => "AWS::ApiGatewayV2::Stage",
            ResourceKind::HttpIntegration => "AWS::ApiGatewayV2::Integration",
            ResourceKind::HttpRoute => "AWS::ApiGatewayV2::Route",
            ResourceKind::StringParameter => "AWS::SSM::Parameter",
        }
    }
}

/// スタック削除時のリソースの扱い
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalPolicy {
    Destroy,
    Retain,
}

impl RemovalPolicy {
    fn as_str(&self) -> &'static str {
        match self {
            RemovalPolicy::Destroy => "Delete",
            RemovalPolicy::Retain => "Retain",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeType {
    String,
    Number,
    Binary,
}

impl AttributeType {
    fn as_str(&self) -> &'static str {
        match self {
            AttributeType::String => "S",
            AttributeType::Number => "N",
            AttributeType::Binary => "B",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BillingMode {
    PayPerRequest,
    Provisioned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableClass {
    Standard,
    StandardInfrequentAccess,
}

/// DynamoDBテーブル（パーティションキーのみ）
#[derive(Debug, Clone, PartialEq)]
pub struct TableProps {
    pub partition_key: String,
    pub partition_key_type: AttributeType,
    pub billing_mode: BillingMode,
    pub table_class: TableClass,
    pub removal_policy: RemovalPolicy,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TopicProps {
    pub topic_name: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionProps {
    pub topic_arn: Expr,
    pub endpoint: Expr,
}

/// Lambda実行ロール
#[derive(Debug, Clone, PartialEq)]
pub struct RoleProps {
    pub service_principal: String,
    pub managed_policy_arns: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PolicyStatement {
    pub actions: Vec<&'static str>,
    pub resources: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PolicyProps {
    pub policy_name: String,
    pub role: Expr,
    pub statements: Vec<PolicyStatement>,
}

/// Lambda関数
///
/// コードはアセットバケット上のアーティファクト。`code_path` はローカルのビルド成果物パスで、
/// メタデータとしてテンプレートに残る。
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionProps {
    pub code_bucket: Expr,
    pub code_path: String,
    pub handler: String,
    pub runtime: String,
    pub memory_size: u32,
    pub timeout_seconds: u32,
    pub role_arn: Expr,
    pub environment: BTreeMap<String, Expr>,
    pub tags: BTreeMap<String, String>,
}

impl FunctionProps {
    /// アセットバケット内のオブジェクトキー（アーティファクトのファイル名）
    pub fn code_key(&self) -> &str {
        self.code_path.rsplit('/').next().unwrap_or(self.code_path.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PermissionProps {
    pub function_name: Expr,
    pub principal: String,
    pub source_arn: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpApiProps {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpStageProps {
    pub api_id: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpIntegrationProps {
    pub api_id: Expr,
    pub function_arn: Expr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpRouteProps {
    pub api_id: Expr,
    pub method: HttpMethod,
    pub path: String,
    pub integration: LogicalId,
}

impl HttpRouteProps {
    /// `GET /product/{productId}` 形式のルートキー
    pub fn route_key(&self) -> String {
        format!("{} {}", self.method.as_str(), self.path)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StringParameterProps {
    pub name: String,
    pub value: Expr,
}

/// テンプレートに含まれるリソース
#[derive(Debug, Clone, PartialEq)]
pub enum Resource {
    Table(TableProps),
    Topic(TopicProps),
    Subscription(SubscriptionProps),
    Role(RoleProps),
    Policy(PolicyProps),
    Function(FunctionProps),
    Permission(PermissionProps),
    HttpApi(HttpApiProps),
    HttpStage(HttpStageProps),
    HttpIntegration(HttpIntegrationProps),
    HttpRoute(HttpRouteProps),
    StringParameter(StringParameterProps),
}

impl Resource {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Resource::Table(_) => ResourceKind::Table,
            Resource::Topic(_) => ResourceKind::Topic,
            Resource::Subscription(_) => ResourceKind::Subscription,
            Resource::Role(_) => ResourceKind::Role,
            Resource::Policy(_) => ResourceKind::Policy,
            Resource::Function(_) => ResourceKind::Function,
            Resource::Permission(_) => ResourceKind::Permission,
            Resource::HttpApi(_) => ResourceKind::HttpApi,
            Resource::HttpStage(_) => ResourceKind::HttpStage,
            Resource::HttpIntegration(_) => ResourceKind::HttpIntegration,
            Resource::HttpRoute(_) => ResourceKind::HttpRoute,
            Resource::StringParameter(_) => ResourceKind::StringParameter,
        }
    }

    /// プロパティ内で参照している論理ID
    pub fn references(&self) -> Vec<&LogicalId> {
        match self {
            Resource::Table(_) | Resource::HttpApi(_) => Vec::new(),
            Resource::Topic(p) => p.topic_name.iter().flat_map(Expr::references).collect(),
            Resource::Subscription(p) => {
                let mut refs = p.topic_arn.references();
                refs.extend(p.endpoint.references());
                refs
            }
            Resource::Role(p) => p.managed_policy_arns.iter().flat_map(Expr::references).collect(),
            Resource::Policy(p) => {
                let mut refs = p.role.references();
                refs.extend(
                    p.statements
                        .iter()
                        .flat_map(|s| s.resources.iter().flat_map(Expr::references)),
                );
                refs
            }
            Resource::Function(p) => {
                let mut refs = p.code_bucket.references();
                refs.extend(p.role_arn.references());
                refs.extend(p.environment.values().flat_map(Expr::references));
                refs
            }
            Resource::Permission(p) => {
                let mut refs = p.function_name.references();
                refs.extend(p.source_arn.iter().flat_map(Expr::references));
                refs
            }
            Resource::HttpStage(p) => p.api_id.references(),
            Resource::HttpIntegration(p) => {
                let mut refs = p.api_id.references();
                refs.extend(p.function_arn.references());
                refs
            }
            Resource::HttpRoute(p) => {
                let mut refs = p.api_id.references();
                refs.push(&p.integration);
                refs
            }
            Resource::StringParameter(p) => p.value.references(),
        }
    }

    fn properties(&self) -> Value {
        match self {
            Resource::Table(p) => json!({
                "KeySchema": [{"AttributeName": p.partition_key, "KeyType": "HASH"}],
                "AttributeDefinitions": [{
                    "AttributeName": p.partition_key,
                    "AttributeType": p.partition_key_type.as_str(),
                }],
                "BillingMode": match p.billing_mode {
                    BillingMode::PayPerRequest => "PAY_PER_REQUEST",
                    BillingMode::Provisioned => "PROVISIONED",
                },
                "TableClass": match p.table_class {
                    TableClass::Standard => "STANDARD",
                    TableClass::StandardInfrequentAccess => "STANDARD_INFREQUENT_ACCESS",
                },
            }),
            Resource::Topic(p) => match &p.topic_name {
                Some(name) => json!({"TopicName": name}),
                None => json!({}),
            },
            Resource::Subscription(p) => json!({
                "Protocol": "lambda",
                "TopicArn": p.topic_arn,
                "Endpoint": p.endpoint,
            }),
            Resource::Role(p) => json!({
                "AssumeRolePolicyDocument": {
                    "Version": "2012-10-17",
                    "Statement": [{
                        "Action": "sts:AssumeRole",
                        "Effect": "Allow",
                        "Principal": {"Service": p.service_principal},
                    }],
                },
                "ManagedPolicyArns": p.managed_policy_arns,
            }),
            Resource::Policy(p) => json!({
                "PolicyName": p.policy_name,
                "Roles": [p.role],
                "PolicyDocument": {
                    "Version": "2012-10-17",
                    "Statement": p.statements.iter().map(|s| json!({
                        "Action": s.actions,
                        "Effect": "Allow",
                        "Resource": s.resources,
                    })).collect::<Vec<_>>(),
                },
            }),
            Resource::Function(p) => json!({
                "Code": {"S3Bucket": p.code_bucket, "S3Key": p.code_key()},
                "Handler": p.handler,
                "Runtime": p.runtime,
                "MemorySize": p.memory_size,
                "Timeout": p.timeout_seconds,
                "Role": p.role_arn,
                "Environment": {"Variables": p.environment},
                "Tags": p
                    .tags
                    .iter()
                    .map(|(k, v)| json!({"Key": k, "Value": v}))
                    .collect::<Vec<_>>(),
            }),
            Resource::Permission(p) => {
                let mut props = json!({
                    "Action": "lambda:InvokeFunction",
                    "FunctionName": p.function_name,
                    "Principal": p.principal,
                });
                if let Some(source_arn) = &p.source_arn {
                    props["SourceArn"] = json!(source_arn);
                }
                props
            }
            Resource::HttpApi(p) => json!({"Name": p.name, "ProtocolType": "HTTP"}),
            Resource::HttpStage(p) => json!({
                "ApiId": p.api_id,
                "StageName": "$default",
                "AutoDeploy": true,
            }),
            Resource::HttpIntegration(p) => json!({
                "ApiId": p.api_id,
                "IntegrationType": "AWS_PROXY",
                "IntegrationUri": p.function_arn,
                "PayloadFormatVersion": "2.0",
            }),
            Resource::HttpRoute(p) => json!({
                "ApiId": p.api_id,
                "RouteKey": p.route_key(),
                "AuthorizationType": "NONE",
                "Target": Expr::join([
                    Expr::from("integrations/"),
                    Expr::Ref(p.integration.clone()),
                ]),
            }),
            Resource::StringParameter(p) => json!({
                "Name": p.name,
                "Type": "String",
                "Value": p.value,
            }),
        }
    }

    /// テンプレートの `Resources` に入る1エントリ
    pub fn to_template(&self) -> Value {
        let mut entry = json!({
            "Type": self.kind().cfn_type(),
            "Properties": self.properties(),
        });
        match self {
            Resource::Table(p) => {
                entry["DeletionPolicy"] = json!(p.removal_policy.as_str());
                entry["UpdateReplacePolicy"] = json!(p.removal_policy.as_str());
            }
            Resource::Function(p) => {
                entry["Metadata"] = json!({"aws:asset:path": p.code_path});
            }
            _ => {}
        }
        entry
    }
}
