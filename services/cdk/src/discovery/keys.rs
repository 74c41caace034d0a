//! 既知のパラメータキー
//!
//! Product APIが公開するキーと、Inventory Ordering Serviceが参照するキー。

use super::{ApiEndpoint, ParameterKey, TableName, TopicArn, TopicName};

pub const PRODUCT_CREATED_TOPIC: ParameterKey<TopicArn> =
    ParameterKey::new("ProductCreatedTopicArn", "/java/product-api/product-created-topic");

pub const PRODUCT_CREATED_TOPIC_NAME: ParameterKey<TopicName> = ParameterKey::new(
    "ProductCreatedTopicName",
    "/java/product-api/product-created-topic-name",
);

pub const PRODUCT_UPDATED_TOPIC: ParameterKey<TopicArn> =
    ParameterKey::new("ProductUpdatedTopicArn", "/java/product-api/product-updated-topic");

pub const PRODUCT_UPDATED_TOPIC_NAME: ParameterKey<TopicName> = ParameterKey::new(
    "ProductUpdatedTopicName",
    "/java/product-api/product-updated-topic-name",
);

pub const PRODUCT_DELETED_TOPIC: ParameterKey<TopicArn> =
    ParameterKey::new("ProductDeletedTopicArn", "/java/product-api/product-deleted-topic");

pub const PRODUCT_DELETED_TOPIC_NAME: ParameterKey<TopicName> = ParameterKey::new(
    "ProductDeletedTopicName",
    "/java/product-api/product-deleted-topic-name",
);

pub const PRODUCT_API_TABLE_NAME: ParameterKey<TableName> =
    ParameterKey::new("TableNameParameter", "/java/product-api/table-name");

pub const PRODUCT_API_ENDPOINT: ParameterKey<ApiEndpoint> =
    ParameterKey::new("ApiEndpoint", "/java/product-api/api-endpoint");

/// Inventory側が公開する「商品追加」トピック
pub const INVENTORY_PRODUCT_ADDED_TOPIC: ParameterKey<TopicArn> =
    ParameterKey::new("ProductAddedTopicArn", "/java/inventory/product-added-topic");

/// Product APIが公開する全パス（`synth discover` で表示する順）
pub const PRODUCT_API_PATHS: [&str; 8] = [
    PRODUCT_CREATED_TOPIC.path(),
    PRODUCT_CREATED_TOPIC_NAME.path(),
    PRODUCT_UPDATED_TOPIC.path(),
    PRODUCT_UPDATED_TOPIC_NAME.path(),
    PRODUCT_DELETED_TOPIC.path(),
    PRODUCT_DELETED_TOPIC_NAME.path(),
    PRODUCT_API_TABLE_NAME.path(),
    PRODUCT_API_ENDPOINT.path(),
];
