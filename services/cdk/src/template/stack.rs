//! スタック
//!
//! リソース・テンプレートパラメータ・権限付与を集め、CloudFormationテンプレートへ合成する。
//! 合成は一度きりの同期処理で、参照先の存在チェックもここで行う。

use std::collections::{BTreeMap, HashSet};

use serde_json::{Map, Value, json};
use tracing::debug;

use super::TemplateError;
use super::access::Access;
use super::expr::Expr;
use super::handles::FunctionRef;
use super::logical_id::LogicalId;
use super::resource::{PolicyProps, Resource, ResourceKind};

/// スタック名の最大長
const MAX_STACK_NAME_LENGTH: usize = 128;

/// テンプレートパラメータ（デプロイ時に値が決まる入力）
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateParameter {
    pub parameter_type: String,
    pub default: Option<String>,
    pub description: Option<String>,
}

impl TemplateParameter {
    fn to_template(&self) -> Value {
        let mut entry = json!({"Type": self.parameter_type});
        if let Some(default) = &self.default {
            entry["Default"] = json!(default);
        }
        if let Some(description) = &self.description {
            entry["Description"] = json!(description);
        }
        entry
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Grant {
    function: LogicalId,
    role: LogicalId,
    access: Access,
}

/// デプロイ単位となるスタック
#[derive(Debug, Clone)]
pub struct Stack {
    name: String,
    description: Option<String>,
    resources: Vec<(LogicalId, Resource)>,
    parameters: BTreeMap<LogicalId, TemplateParameter>,
    grants: Vec<Grant>,
}

impl Stack {
    /// スタック名は英字で始まり、英数字とハイフンのみ
    pub fn new(name: impl Into<String>) -> Result<Self, TemplateError> {
        let name = name.into();
        let valid = name.len() <= MAX_STACK_NAME_LENGTH
            && name.starts_with(|c: char| c.is_ascii_alphabetic())
            && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
        if !valid {
            return Err(TemplateError::InvalidStackName(name));
        }

        Ok(Self {
            name,
            description: None,
            resources: Vec::new(),
            parameters: BTreeMap::new(),
            grants: Vec::new(),
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 論理IDがリソースまたはパラメータとして使われているか
    pub fn contains(&self, id: &LogicalId) -> bool {
        self.parameters.contains_key(id) || self.resources.iter().any(|(rid, _)| rid == id)
    }

    /// リソースを追加する
    pub fn add(&mut self, id: LogicalId, resource: Resource) -> Result<(), TemplateError> {
        if self.contains(&id) {
            return Err(TemplateError::DuplicateLogicalId(id.to_string()));
        }
        debug!(
            stack = %self.name,
            logical_id = %id,
            kind = resource.kind().cfn_type(),
            "リソース追加"
        );
        self.resources.push((id, resource));
        Ok(())
    }

    /// テンプレートパラメータを追加する
    pub fn add_parameter(
        &mut self,
        id: LogicalId,
        parameter: TemplateParameter,
    ) -> Result<(), TemplateError> {
        if self.contains(&id) {
            return Err(TemplateError::DuplicateLogicalId(id.to_string()));
        }
        self.parameters.insert(id, parameter);
        Ok(())
    }

    pub fn parameter(&self, id: &LogicalId) -> Option<&TemplateParameter> {
        self.parameters.get(id)
    }

    pub fn resource(&self, id: &LogicalId) -> Option<&Resource> {
        self.resources
            .iter()
            .find(|(rid, _)| rid == id)
            .map(|(_, resource)| resource)
    }

    pub fn resources(&self) -> impl Iterator<Item = (&LogicalId, &Resource)> {
        self.resources.iter().map(|(id, resource)| (id, resource))
    }

    /// 指定種別のリソース数
    pub fn count(&self, kind: ResourceKind) -> usize {
        self.resources
            .iter()
            .filter(|(_, resource)| resource.kind() == kind)
            .count()
    }

    /// 関数に権限を付与する
    pub fn grant(&mut self, function: &FunctionRef, access: Access) -> Result<(), TemplateError> {
        if !matches!(self.resource(function.logical_id()), Some(Resource::Function(_))) {
            return Err(TemplateError::UnknownFunction(function.logical_id().to_string()));
        }
        self.grants.push(Grant {
            function: function.logical_id().clone(),
            role: function.role_id().clone(),
            access,
        });
        Ok(())
    }

    /// 関数に付与された権限（付与順）
    pub fn grants_for(&self, function: &FunctionRef) -> Vec<&Access> {
        self.grants
            .iter()
            .filter(|grant| &grant.function == function.logical_id())
            .map(|grant| &grant.access)
            .collect()
    }

    /// 権限付与をロールごとのIAMポリシーに畳み込む
    fn policies(&self) -> Result<Vec<(LogicalId, Resource)>, TemplateError> {
        let mut by_role: Vec<(&LogicalId, Vec<&Access>)> = Vec::new();
        for grant in &self.grants {
            match by_role.iter_mut().find(|(role, _)| *role == &grant.role) {
                Some((_, accesses)) => accesses.push(&grant.access),
                None => by_role.push((&grant.role, vec![&grant.access])),
            }
        }

        by_role
            .into_iter()
            .map(|(role, accesses)| {
                let id = LogicalId::new(format!("{}DefaultPolicy", role))?;
                if self.contains(&id) {
                    return Err(TemplateError::DuplicateLogicalId(id.to_string()));
                }
                let policy = Resource::Policy(PolicyProps {
                    policy_name: id.to_string(),
                    role: Expr::Ref(role.clone()),
                    statements: accesses.iter().map(|access| access.statement()).collect(),
                });
                Ok((id, policy))
            })
            .collect()
    }

    /// CloudFormationテンプレートを合成する
    ///
    /// # エラー
    /// - 存在しない論理IDを参照している場合は `DanglingReference`
    /// - 生成するポリシーIDが既存IDと衝突した場合は `DuplicateLogicalId`
    pub fn synthesize(&self) -> Result<Value, TemplateError> {
        let policies = self.policies()?;
        let all: Vec<(&LogicalId, &Resource)> = self
            .resources()
            .chain(policies.iter().map(|(id, resource)| (id, resource)))
            .collect();

        let known: HashSet<&LogicalId> = all
            .iter()
            .map(|(id, _)| *id)
            .chain(self.parameters.keys())
            .collect();

        for (id, resource) in &all {
            let dangling = resource.references().into_iter().find(|r| !known.contains(r));
            if let Some(missing) = dangling {
                return Err(TemplateError::DanglingReference {
                    from: id.to_string(),
                    to: missing.to_string(),
                });
            }
        }

        let mut resources: Map<String, Value> = all
            .iter()
            .map(|(id, resource)| (id.to_string(), resource.to_template()))
            .collect();

        // 権限付与された関数はロールのポリシーが作られてから作成する
        for grant in &self.grants {
            if let Some(entry) = resources.get_mut(&grant.function.to_string()) {
                entry["DependsOn"] = json!([
                    format!("{}DefaultPolicy", grant.role),
                    grant.role.to_string(),
                ]);
            }
        }

        let mut template = json!({
            "AWSTemplateFormatVersion": "2010-09-09",
            "Resources": resources,
        });
        if let Some(description) = &self.description {
            template["Description"] = json!(description);
        }
        if !self.parameters.is_empty() {
            let parameters: Map<String, Value> = self
                .parameters
                .iter()
                .map(|(id, parameter)| (id.to_string(), parameter.to_template()))
                .collect();
            template["Parameters"] = Value::Object(parameters);
        }

        debug!(
            stack = %self.name,
            resource_count = all.len(),
            parameter_count = self.parameters.len(),
            "テンプレート合成完了"
        );

        Ok(template)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::{TopicProps, TopicRef};
    use crate::template::resource::{FunctionProps, RoleProps};

    fn id(value: &str) -> LogicalId {
        LogicalId::new(value).unwrap()
    }

    fn topic(name: &str) -> Resource {
        Resource::Topic(TopicProps {
            topic_name: Some(Expr::from(name)),
        })
    }

    fn add_function(stack: &mut Stack, name: &str) -> FunctionRef {
        let role = id(&format!("{}ServiceRole", name));
        stack
            .add(
                role.clone(),
                Resource::Role(RoleProps {
                    service_principal: "lambda.amazonaws.com".to_string(),
                    managed_policy_arns: vec![],
                }),
            )
            .unwrap();
        stack
            .add(
                id(name),
                Resource::Function(FunctionProps {
                    code_bucket: Expr::from("bucket"),
                    code_path: "app.jar".to_string(),
                    handler: "h".to_string(),
                    runtime: "java21".to_string(),
                    memory_size: 128,
                    timeout_seconds: 3,
                    role_arn: Expr::get_att(&role, "Arn"),
                    environment: BTreeMap::new(),
                    tags: BTreeMap::new(),
                }),
            )
            .unwrap();
        FunctionRef::new(id(name), role)
    }

    // ==================== Stack 構築テスト ====================

    #[test]
    fn test_invalid_stack_names_are_rejected() {
        for name in ["", "1Stack", "has_underscore", "has space"] {
            assert_eq!(
                Stack::new(name).unwrap_err(),
                TemplateError::InvalidStackName(name.to_string())
            );
        }
        assert!(Stack::new("JavaProductApiStack").is_ok());
    }

    #[test]
    fn test_duplicate_logical_id_is_rejected() {
        let mut stack = Stack::new("Test").unwrap();
        stack.add(id("Topic"), topic("a")).unwrap();

        assert_eq!(
            stack.add(id("Topic"), topic("b")),
            Err(TemplateError::DuplicateLogicalId("Topic".to_string()))
        );
    }

    #[test]
    fn test_parameters_share_namespace_with_resources() {
        let mut stack = Stack::new("Test").unwrap();
        stack.add(id("Thing"), topic("a")).unwrap();

        let result = stack.add_parameter(
            id("Thing"),
            TemplateParameter {
                parameter_type: "String".to_string(),
                default: None,
                description: None,
            },
        );
        assert!(matches!(result, Err(TemplateError::DuplicateLogicalId(_))));
    }

    #[test]
    fn test_count_by_kind() {
        let mut stack = Stack::new("Test").unwrap();
        stack.add(id("A"), topic("a")).unwrap();
        stack.add(id("B"), topic("b")).unwrap();
        add_function(&mut stack, "Fn");

        assert_eq!(stack.count(ResourceKind::Topic), 2);
        assert_eq!(stack.count(ResourceKind::Function), 1);
        assert_eq!(stack.count(ResourceKind::Table), 0);
    }

    // ==================== 権限付与テスト ====================

    #[test]
    fn test_grant_to_unknown_function_is_rejected() {
        let mut stack = Stack::new("Test").unwrap();
        let ghost = FunctionRef::new(id("Ghost"), id("GhostRole"));
        let topic_ref = TopicRef::new(id("Topic"));

        assert_eq!(
            stack.grant(&ghost, Access::topic_publish(&topic_ref)),
            Err(TemplateError::UnknownFunction("Ghost".to_string()))
        );
    }

    #[test]
    fn test_grants_fold_into_one_policy_per_role() {
        let mut stack = Stack::new("Test").unwrap();
        stack.add(id("Topic"), topic("a")).unwrap();
        let function = add_function(&mut stack, "Fn");
        let topic_ref = TopicRef::new(id("Topic"));

        stack.grant(&function, Access::topic_publish(&topic_ref)).unwrap();
        stack.grant(&function, Access::topic_publish(&topic_ref)).unwrap();
        assert_eq!(stack.grants_for(&function).len(), 2);

        let template = stack.synthesize().unwrap();
        let policy = &template["Resources"]["FnServiceRoleDefaultPolicy"];
        assert_eq!(policy["Type"], "AWS::IAM::Policy");
        assert_eq!(policy["Properties"]["Roles"], json!([{"Ref": "FnServiceRole"}]));
        assert_eq!(
            policy["Properties"]["PolicyDocument"]["Statement"]
                .as_array()
                .unwrap()
                .len(),
            2
        );
    }

    #[test]
    fn test_granted_function_depends_on_role_policy() {
        let mut stack = Stack::new("Test").unwrap();
        stack.add(id("Topic"), topic("a")).unwrap();
        let granted = add_function(&mut stack, "Fn");
        add_function(&mut stack, "Plain");
        stack
            .grant(&granted, Access::topic_publish(&TopicRef::new(id("Topic"))))
            .unwrap();

        let template = stack.synthesize().unwrap();

        assert_eq!(
            template["Resources"]["Fn"]["DependsOn"],
            json!(["FnServiceRoleDefaultPolicy", "FnServiceRole"])
        );
        assert!(template["Resources"]["Plain"].get("DependsOn").is_none());
        assert!(template["Resources"]["Topic"].get("DependsOn").is_none());
    }

    // ==================== 合成テスト ====================

    #[test]
    fn test_dangling_reference_fails_synthesis() {
        let mut stack = Stack::new("Test").unwrap();
        stack
            .add(
                id("Sub"),
                Resource::Subscription(crate::template::SubscriptionProps {
                    topic_arn: Expr::Ref(id("MissingTopic")),
                    endpoint: Expr::from("arn:aws:lambda:us-east-1:123456789012:function:x"),
                }),
            )
            .unwrap();

        assert_eq!(
            stack.synthesize(),
            Err(TemplateError::DanglingReference {
                from: "Sub".to_string(),
                to: "MissingTopic".to_string(),
            })
        );
    }

    #[test]
    fn test_reference_to_parameter_is_valid() {
        let mut stack = Stack::new("Test").unwrap();
        stack
            .add_parameter(
                id("TopicArnParam"),
                TemplateParameter {
                    parameter_type: "AWS::SSM::Parameter::Value<String>".to_string(),
                    default: Some("/java/inventory/product-added-topic".to_string()),
                    description: None,
                },
            )
            .unwrap();
        stack
            .add(
                id("Sub"),
                Resource::Subscription(crate::template::SubscriptionProps {
                    topic_arn: Expr::Ref(id("TopicArnParam")),
                    endpoint: Expr::from("arn"),
                }),
            )
            .unwrap();

        let template = stack.synthesize().unwrap();
        assert_eq!(
            template["Parameters"]["TopicArnParam"]["Default"],
            "/java/inventory/product-added-topic"
        );
    }

    #[test]
    fn test_template_header_and_description() {
        let stack = Stack::new("Empty").unwrap().with_description("empty stack");
        let template = stack.synthesize().unwrap();

        assert_eq!(template["AWSTemplateFormatVersion"], "2010-09-09");
        assert_eq!(template["Description"], "empty stack");
        assert!(template.get("Parameters").is_none());
        assert_eq!(template["Resources"], json!({}));
    }
}
