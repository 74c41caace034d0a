//! 商品APIスタック
//!
//! DynamoDBテーブル1つ、商品イベントのSNSトピック3つ、操作ごとのLambda関数4つと
//! それを公開するHTTP APIを定義する。識別子はParameter Storeへ公開し、
//! 他スタックはパスで参照する。

use std::collections::BTreeMap;

use tracing::info;

use super::TopologyError;
use crate::config::DeploymentConfig;
use crate::constructs::{InstrumentedFunction, InstrumentedFunctionProps, SharedProps};
use crate::discovery::{DiscoveryError, ParameterRegistry, keys};
use crate::template::{
    Access, AttributeType, BillingMode, Expr, FunctionRef, HttpApiProps, HttpApiRef,
    HttpIntegrationProps, HttpMethod, HttpRouteProps, HttpStageProps, PermissionProps, Pseudo,
    RemovalPolicy, Resource, Scope, Stack, TableClass, TableProps, TableRef, Topic, TopicProps,
    TopicRef,
};

pub const SERVICE_NAME: &str = "JavaProductApi";

pub const STACK_NAME: &str = "JavaProductApiStack";

const CODE_PATH: &str = "../product-api/target/com.product.api-0.0.1-SNAPSHOT-aws.jar";

const PACKAGE_NAME: &str = "com.product.api";

/// 商品のライフサイクルイベント（トピック単位）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductEvent {
    Created,
    Updated,
    Deleted,
}

impl ProductEvent {
    pub const ALL: [ProductEvent; 3] = [
        ProductEvent::Created,
        ProductEvent::Updated,
        ProductEvent::Deleted,
    ];

    fn label(&self) -> &'static str {
        match self {
            ProductEvent::Created => "Created",
            ProductEvent::Updated => "Updated",
            ProductEvent::Deleted => "Deleted",
        }
    }

    /// 環境名付きのトピック名
    pub fn topic_name(&self, env: &str) -> String {
        format!("Product{}-{}", self.label(), env)
    }

    /// 関数に渡すトピックARNの環境変数名
    pub fn env_var(&self) -> &'static str {
        match self {
            ProductEvent::Created => "PRODUCT_CREATED_TOPIC_ARN",
            ProductEvent::Updated => "PRODUCT_UPDATED_TOPIC_ARN",
            ProductEvent::Deleted => "PRODUCT_DELETED_TOPIC_ARN",
        }
    }

    fn construct_id(&self) -> String {
        format!("JavaProduct{}Topic", self.label())
    }
}

/// 商品APIの操作（関数・ルート単位）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductOperation {
    Get,
    Create,
    Update,
    Delete,
}

impl ProductOperation {
    pub const ALL: [ProductOperation; 4] = [
        ProductOperation::Get,
        ProductOperation::Create,
        ProductOperation::Update,
        ProductOperation::Delete,
    ];

    fn label(&self) -> &'static str {
        match self {
            ProductOperation::Get => "Get",
            ProductOperation::Create => "Create",
            ProductOperation::Update => "Update",
            ProductOperation::Delete => "Delete",
        }
    }

    pub fn function_id(&self) -> String {
        format!("{}ProductJavaFunction", self.label())
    }

    /// Spring Cloud Functionの関数Bean名
    pub fn entry_point(&self) -> String {
        format!("handle{}Product", self.label())
    }

    pub fn method(&self) -> HttpMethod {
        match self {
            ProductOperation::Get => HttpMethod::Get,
            ProductOperation::Create => HttpMethod::Post,
            ProductOperation::Update => HttpMethod::Put,
            ProductOperation::Delete => HttpMethod::Delete,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            ProductOperation::Get | ProductOperation::Delete => "/product/{productId}",
            ProductOperation::Create | ProductOperation::Update => "/product",
        }
    }

    /// 変更系の操作が発行するイベント（参照系はNone）
    pub fn event(&self) -> Option<ProductEvent> {
        match self {
            ProductOperation::Get => None,
            ProductOperation::Create => Some(ProductEvent::Created),
            ProductOperation::Update => Some(ProductEvent::Updated),
            ProductOperation::Delete => Some(ProductEvent::Deleted),
        }
    }
}

/// イベントごとのトピック
#[derive(Debug, Clone)]
struct ProductTopics {
    created: TopicRef,
    updated: TopicRef,
    deleted: TopicRef,
}

impl ProductTopics {
    fn new(stack: &mut Stack, scope: &Scope, env: &str) -> Result<Self, TopologyError> {
        let mut add = |event: ProductEvent| -> Result<TopicRef, TopologyError> {
            let id = scope.id(&event.construct_id())?;
            stack.add(
                id.clone(),
                Resource::Topic(TopicProps {
                    topic_name: Some(Expr::literal(event.topic_name(env))),
                }),
            )?;
            Ok(TopicRef::new(id))
        };

        Ok(Self {
            created: add(ProductEvent::Created)?,
            updated: add(ProductEvent::Updated)?,
            deleted: add(ProductEvent::Deleted)?,
        })
    }

    fn get(&self, event: ProductEvent) -> &TopicRef {
        match event {
            ProductEvent::Created => &self.created,
            ProductEvent::Updated => &self.updated,
            ProductEvent::Deleted => &self.deleted,
        }
    }
}

/// 商品APIのリソース一式
#[derive(Debug, Clone)]
pub struct ProductApi {
    table: TableRef,
    topics: ProductTopics,
    functions: Vec<(ProductOperation, FunctionRef)>,
    api: HttpApiRef,
}

impl ProductApi {
    pub fn new(
        stack: &mut Stack,
        scope: &Scope,
        shared: &SharedProps,
    ) -> Result<Self, TopologyError> {
        let table_id = scope.id("TracedJavaTable")?;
        stack.add(
            table_id.clone(),
            Resource::Table(TableProps {
                partition_key: "PK".to_string(),
                partition_key_type: AttributeType::String,
                billing_mode: BillingMode::PayPerRequest,
                table_class: TableClass::Standard,
                removal_policy: RemovalPolicy::Destroy,
            }),
        )?;
        let table = TableRef::new(table_id);

        let topics = ProductTopics::new(stack, scope, &shared.env)?;

        let mut api_environment = BTreeMap::from([("TABLE_NAME".to_string(), table.table_name())]);
        for event in ProductEvent::ALL {
            api_environment.insert(event.env_var().to_string(), topics.get(event).topic_arn());
        }

        let mut functions = Vec::with_capacity(ProductOperation::ALL.len());
        for operation in ProductOperation::ALL {
            let mut environment = api_environment.clone();
            let topic = operation.event().map(|event| topics.get(event));
            if let Some(topic) = topic {
                environment.insert(
                    "DD_SERVICE_MAPPING".to_string(),
                    Expr::join([Expr::literal("lambda_sns:"), topic.topic_name()]),
                );
            }

            let entry_point = operation.entry_point();
            let function = InstrumentedFunction::new(
                stack,
                scope,
                &operation.function_id(),
                InstrumentedFunctionProps {
                    shared,
                    package_name: PACKAGE_NAME,
                    code_path: CODE_PATH,
                    entry_point: &entry_point,
                    environment,
                },
            )?
            .function()
            .clone();

            match topic {
                Some(topic) => {
                    stack.grant(&function, Access::table_read_write(&table))?;
                    stack.grant(&function, Access::topic_publish(topic))?;
                }
                None => stack.grant(&function, Access::table_read(&table))?,
            }

            functions.push((operation, function));
        }

        let api_id = scope.id("TracedJavaApi")?;
        stack.add(
            api_id.clone(),
            Resource::HttpApi(HttpApiProps {
                name: "TracedJavaApi".to_string(),
            }),
        )?;
        let api = HttpApiRef::new(api_id);
        stack.add(
            scope.id("TracedJavaApiDefaultStage")?,
            Resource::HttpStage(HttpStageProps { api_id: api.api_id() }),
        )?;

        for (operation, function) in &functions {
            add_route(stack, scope, &api, *operation, function)?;
        }

        Ok(Self {
            table,
            topics,
            functions,
            api,
        })
    }

    pub fn table(&self) -> &TableRef {
        &self.table
    }

    pub fn api(&self) -> &HttpApiRef {
        &self.api
    }

    pub fn topic(&self, event: ProductEvent) -> &TopicRef {
        self.topics.get(event)
    }

    pub fn function(&self, operation: ProductOperation) -> Option<&FunctionRef> {
        self.functions
            .iter()
            .find(|(op, _)| *op == operation)
            .map(|(_, function)| function)
    }

    /// トピック・テーブル・APIの識別子を公開する
    pub fn publish_parameters(
        &self,
        registry: &mut impl ParameterRegistry,
    ) -> Result<(), DiscoveryError> {
        let created = self.topic(ProductEvent::Created);
        let updated = self.topic(ProductEvent::Updated);
        let deleted = self.topic(ProductEvent::Deleted);

        registry.publish(&keys::PRODUCT_CREATED_TOPIC, created.into())?;
        registry.publish(&keys::PRODUCT_CREATED_TOPIC_NAME, created.into())?;
        registry.publish(&keys::PRODUCT_UPDATED_TOPIC, updated.into())?;
        registry.publish(&keys::PRODUCT_UPDATED_TOPIC_NAME, updated.into())?;
        registry.publish(&keys::PRODUCT_DELETED_TOPIC, deleted.into())?;
        registry.publish(&keys::PRODUCT_DELETED_TOPIC_NAME, deleted.into())?;
        registry.publish(&keys::PRODUCT_API_TABLE_NAME, (&self.table).into())?;
        registry.publish(&keys::PRODUCT_API_ENDPOINT, (&self.api).into())?;
        Ok(())
    }
}

/// Lambda統合・ルート・API Gatewayからの呼び出し許可を追加する
fn add_route(
    stack: &mut Stack,
    scope: &Scope,
    api: &HttpApiRef,
    operation: ProductOperation,
    function: &FunctionRef,
) -> Result<(), TopologyError> {
    let integration_name = format!("{}ProductFunctionIntegration", operation.label());
    let integration_id = scope.id(&integration_name)?;
    stack.add(
        integration_id.clone(),
        Resource::HttpIntegration(HttpIntegrationProps {
            api_id: api.api_id(),
            function_arn: function.function_arn(),
        }),
    )?;

    stack.add(
        scope.id(&format!("{}ProductRoute", operation.label()))?,
        Resource::HttpRoute(HttpRouteProps {
            api_id: api.api_id(),
            method: operation.method(),
            path: operation.path().to_string(),
            integration: integration_id.clone(),
        }),
    )?;

    stack.add(
        scope.id(&format!("{}Permission", integration_name))?,
        Resource::Permission(PermissionProps {
            function_name: function.function_name(),
            principal: "apigateway.amazonaws.com".to_string(),
            source_arn: Some(Expr::join([
                Expr::literal("arn:"),
                Expr::Pseudo(Pseudo::Partition),
                Expr::literal(":execute-api:"),
                Expr::Pseudo(Pseudo::Region),
                Expr::literal(":"),
                Expr::Pseudo(Pseudo::AccountId),
                Expr::literal(":"),
                api.api_id(),
                Expr::literal(format!("/*/*{}", operation.path())),
            ])),
        }),
    )?;
    Ok(())
}

/// 商品APIスタックを構築する
pub fn product_api_stack(config: &DeploymentConfig) -> Result<Stack, TopologyError> {
    let shared = SharedProps::from_config(SERVICE_NAME, config)?;
    let mut stack = Stack::new(STACK_NAME)?.with_description("Java Product API");

    let product_api = ProductApi::new(&mut stack, &Scope::new(SERVICE_NAME), &shared)?;
    product_api.publish_parameters(&mut stack)?;

    info!(
        stack = %stack.name(),
        env = %shared.env,
        resource_count = stack.resources().count(),
        "スタック構築完了"
    );
    Ok(stack)
}
