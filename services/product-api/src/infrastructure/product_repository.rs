/// DynamoDBで商品を管理するための商品リポジトリ
///
/// シングルテーブル設計。アイテムのレイアウト:
/// - PK (S): 商品ID
/// - Type (S): 固定値 "Product"
/// - Name (S): 商品名
/// - Price (N): 小数点以下2桁に整形した価格
/// - ProductId (S): 商品ID
/// - PriceBrackets (S): 価格帯のJSON配列
use async_trait::async_trait;
use aws_sdk_dynamodb::Client as DynamoDbClient;
use aws_sdk_dynamodb::types::AttributeValue;
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

use crate::domain::{Product, ProductPriceBracket};

/// アイテム種別の固定値
const ITEM_TYPE: &str = "Product";

/// リポジトリ操作のエラー型
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RepositoryError {
    /// DynamoDBへの書き込みに失敗
    #[error("Write error: {0}")]
    WriteError(String),

    /// DynamoDBからの読み取りに失敗
    #[error("Read error: {0}")]
    ReadError(String),

    /// データのシリアライズ/デシリアライズに失敗
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// 商品永続化用トレイト
///
/// 実際のDynamoDB実装とテスト用モックを差し替え可能にする。
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// 商品IDで取得。存在しない場合は `Ok(None)`
    async fn get_product(&self, product_id: &str) -> Result<Option<Product>, RepositoryError>;

    /// 商品を作成
    async fn create_product(&self, product: Product) -> Result<Product, RepositoryError>;

    /// 商品を更新（アイテム全体を置き換える）
    async fn update_product(&self, product: Product) -> Result<Product, RepositoryError>;

    /// 商品を削除。存在しなかった場合も `Ok(true)`
    async fn delete_product(&self, product_id: &str) -> Result<bool, RepositoryError>;
}

/// 商品をDynamoDBアイテムに変換
pub fn product_to_item(
    product: &Product,
) -> Result<HashMap<String, AttributeValue>, RepositoryError> {
    let price_brackets = serde_json::to_string(&product.price_brackets)
        .map_err(|e| RepositoryError::SerializationError(e.to_string()))?;

    Ok(HashMap::from([
        ("PK".to_string(), AttributeValue::S(product.product_id.clone())),
        ("Type".to_string(), AttributeValue::S(ITEM_TYPE.to_string())),
        ("Name".to_string(), AttributeValue::S(product.name.clone())),
        ("Price".to_string(), AttributeValue::N(format!("{:.2}", product.price))),
        ("ProductId".to_string(), AttributeValue::S(product.product_id.clone())),
        ("PriceBrackets".to_string(), AttributeValue::S(price_brackets)),
    ]))
}

fn string_attr<'a>(
    item: &'a HashMap<String, AttributeValue>,
    name: &str,
) -> Result<&'a String, RepositoryError> {
    item.get(name)
        .and_then(|v| v.as_s().ok())
        .ok_or_else(|| RepositoryError::SerializationError(format!("Missing {} field", name)))
}

/// DynamoDBアイテムを商品に変換
pub fn product_from_item(
    item: &HashMap<String, AttributeValue>,
) -> Result<Product, RepositoryError> {
    let product_id = string_attr(item, "ProductId")?.clone();
    let name = string_attr(item, "Name")?.clone();

    let price = item
        .get("Price")
        .and_then(|v| v.as_n().ok())
        .ok_or_else(|| RepositoryError::SerializationError("Missing Price field".to_string()))?
        .parse::<f64>()
        .map_err(|e| RepositoryError::SerializationError(format!("Invalid Price: {}", e)))?;

    let price_brackets: Vec<ProductPriceBracket> =
        serde_json::from_str(string_attr(item, "PriceBrackets")?).map_err(|e| {
            RepositoryError::SerializationError(format!("Invalid PriceBrackets: {}", e))
        })?;

    Ok(Product {
        product_id,
        name,
        price,
        price_brackets,
    })
}

/// ProductRepositoryのDynamoDB実装
#[derive(Debug, Clone)]
pub struct DynamoProductRepository {
    /// DynamoDBクライアント
    client: DynamoDbClient,
    /// 商品テーブル名
    table_name: String,
}

impl DynamoProductRepository {
    pub fn new(client: DynamoDbClient, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    async fn put_product(&self, product: Product) -> Result<Product, RepositoryError> {
        let item = product_to_item(&product)?;

        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .send()
            .await
            .map_err(|e| RepositoryError::WriteError(e.to_string()))?;

        debug!(product_id = %product.product_id, table = %self.table_name, "商品を保存");
        Ok(product)
    }
}

#[async_trait]
impl ProductRepository for DynamoProductRepository {
    async fn get_product(&self, product_id: &str) -> Result<Option<Product>, RepositoryError> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key("PK", AttributeValue::S(product_id.to_string()))
            .send()
            .await
            .map_err(|e| RepositoryError::ReadError(e.to_string()))?;

        result.item().map(product_from_item).transpose()
    }

    async fn create_product(&self, product: Product) -> Result<Product, RepositoryError> {
        self.put_product(product).await
    }

    async fn update_product(&self, product: Product) -> Result<Product, RepositoryError> {
        self.put_product(product).await
    }

    async fn delete_product(&self, product_id: &str) -> Result<bool, RepositoryError> {
        self.client
            .delete_item()
            .table_name(&self.table_name)
            .key("PK", AttributeValue::S(product_id.to_string()))
            .send()
            .await
            .map_err(|e| RepositoryError::WriteError(e.to_string()))?;

        debug!(product_id = %product_id, table = %self.table_name, "商品を削除");
        Ok(true)
    }
}
