//! 在庫発注サービススタック
//!
//! 他スタックが公開した「商品追加」トピックをParameter Store経由で参照し、
//! 購読するLambda関数を定義する。

use std::collections::BTreeMap;

use tracing::info;

use super::TopologyError;
use crate::config::DeploymentConfig;
use crate::constructs::{InstrumentedFunction, InstrumentedFunctionProps, SharedProps};
use crate::discovery::{ParameterRegistry, keys};
use crate::template::{
    FunctionRef, ImportedTopic, PermissionProps, Resource, Scope, Stack, SubscriptionProps,
    TemplateError, Topic,
};

pub const SERVICE_NAME: &str = "JavaInventoryOrderingService";

pub const STACK_NAME: &str = "JavaInventoryOrderingServiceStack";

const CODE_PATH: &str =
    "../inventory-ordering/target/com.inventory.ordering-0.0.1-SNAPSHOT-aws.jar";

const PACKAGE_NAME: &str = "com.inventory.ordering";

/// 商品追加イベントの購読関数
#[derive(Debug, Clone)]
pub struct InventoryOrderingService {
    function: FunctionRef,
}

impl InventoryOrderingService {
    pub fn new(
        stack: &mut Stack,
        scope: &Scope,
        shared: &SharedProps,
        product_added_topic: &impl Topic,
    ) -> Result<Self, TemplateError> {
        let function = InstrumentedFunction::new(
            stack,
            scope,
            "ProductAddedJavaFunction",
            InstrumentedFunctionProps {
                shared,
                package_name: PACKAGE_NAME,
                code_path: CODE_PATH,
                entry_point: "handleProductAdded",
                environment: BTreeMap::new(),
            },
        )?
        .function()
        .clone();

        let topic_arn = product_added_topic.topic_arn();
        stack.add(
            scope.id("ProductAddedTopicSubscription")?,
            Resource::Subscription(SubscriptionProps {
                topic_arn: topic_arn.clone(),
                endpoint: function.function_arn(),
            }),
        )?;
        stack.add(
            scope.id("ProductAddedTopicPermission")?,
            Resource::Permission(PermissionProps {
                function_name: function.function_name(),
                principal: "sns.amazonaws.com".to_string(),
                source_arn: Some(topic_arn),
            }),
        )?;

        Ok(Self { function })
    }

    pub fn function(&self) -> &FunctionRef {
        &self.function
    }
}

/// 在庫発注サービススタックを構築する
pub fn inventory_ordering_stack(config: &DeploymentConfig) -> Result<Stack, TopologyError> {
    let shared = SharedProps::from_config(SERVICE_NAME, config)?;
    let mut stack = Stack::new(STACK_NAME)?.with_description("Java Inventory Ordering Service");

    let product_added_topic: ImportedTopic =
        stack.lookup(&keys::INVENTORY_PRODUCT_ADDED_TOPIC)?.into();
    InventoryOrderingService::new(
        &mut stack,
        &Scope::new(SERVICE_NAME),
        &shared,
        &product_added_topic,
    )?;

    info!(
        stack = %stack.name(),
        env = %shared.env,
        resource_count = stack.resources().count(),
        "スタック構築完了"
    );
    Ok(stack)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::{Access, Expr, LogicalId, ResourceKind};

    const SECRET_ARN: &str =
        "arn:aws:secretsmanager:us-east-1:123456789012:secret:dd-api-key-AbCdEf";

    fn config() -> DeploymentConfig {
        DeploymentConfig::new(SECRET_ARN, "dev", "latest").unwrap()
    }

    fn topic_parameter_ref() -> Expr {
        Expr::Ref(LogicalId::new("SsmParameterValuejavainventoryproductaddedtopic").unwrap())
    }

    #[test]
    fn test_resource_counts() {
        let stack = inventory_ordering_stack(&config()).unwrap();

        assert_eq!(stack.count(ResourceKind::Function), 1);
        assert_eq!(stack.count(ResourceKind::Subscription), 1);
        assert_eq!(stack.count(ResourceKind::Permission), 1);
        assert_eq!(stack.count(ResourceKind::Topic), 0);
    }

    #[test]
    fn test_subscription_targets_looked_up_topic() {
        let stack = inventory_ordering_stack(&config()).unwrap();

        let subscription = stack.resources().find_map(|(_, resource)| match resource {
            Resource::Subscription(p) => Some(p),
            _ => None,
        });
        let subscription = subscription.expect("購読がありません");
        assert_eq!(subscription.topic_arn, topic_parameter_ref());

        let permission = stack.resources().find_map(|(_, resource)| match resource {
            Resource::Permission(p) => Some(p),
            _ => None,
        });
        let permission = permission.expect("呼び出し許可がありません");
        assert_eq!(permission.principal, "sns.amazonaws.com");
        assert_eq!(permission.source_arn, Some(topic_parameter_ref()));
    }

    #[test]
    fn test_function_identity_and_grants() {
        let shared = SharedProps::from_config(SERVICE_NAME, &config()).unwrap();
        let mut stack = Stack::new(STACK_NAME).unwrap();
        let topic = ImportedTopic::from_arn("arn:aws:sns:us-east-1:123456789012:ProductAdded");

        let service =
            InventoryOrderingService::new(&mut stack, &Scope::new(SERVICE_NAME), &shared, &topic)
                .unwrap();

        match stack.resource(service.function().logical_id()) {
            Some(Resource::Function(p)) => {
                assert_eq!(
                    p.environment["spring_cloud_function_definition"],
                    Expr::literal("handleProductAdded")
                );
                assert_eq!(
                    p.environment["MAIN_CLASS"],
                    Expr::literal("com.inventory.ordering.FunctionConfiguration")
                );
                assert_eq!(p.environment["DD_SERVICE"], Expr::literal(SERVICE_NAME));
                assert_eq!(p.code_path, CODE_PATH);
            }
            other => panic!("Expected Function, got {:?}", other),
        }
        assert_eq!(
            stack.grants_for(service.function()),
            vec![&Access::secret_read(&shared.dd_api_key_secret)]
        );
    }

    #[test]
    fn test_synthesized_template_declares_ssm_parameter() {
        let stack = inventory_ordering_stack(&config()).unwrap();
        let template = stack.synthesize().unwrap();

        let parameter = &template["Parameters"]["SsmParameterValuejavainventoryproductaddedtopic"];
        assert_eq!(parameter["Type"], "AWS::SSM::Parameter::Value<String>");
        assert_eq!(parameter["Default"], "/java/inventory/product-added-topic");
        assert_eq!(
            template["Resources"]["JavaInventoryOrderingServiceProductAddedTopicSubscription"]
                ["Properties"]["Protocol"],
            "lambda"
        );
    }
}
