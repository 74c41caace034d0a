//! 商品イベント発行モジュール
//!
//! 商品の作成・更新・削除をSNSトピックへ通知する。
//! トピックARNは各関数の環境変数（`ProductApiConfig`）から取得する。

use async_trait::async_trait;
use aws_sdk_sns::Client as SnsClient;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use super::config::ProductApiConfig;
use crate::domain::ProductDeletedEvent;

/// イベント発行のエラー型
#[derive(Debug, Error)]
pub enum PublishError {
    /// AWS SDK エラー
    #[error("AWS SNS APIエラー: {0}")]
    AwsSdkError(String),
    /// JSON シリアライズエラー
    #[error("JSONシリアライズエラー: {0}")]
    SerializeError(String),
}

/// 発行結果
#[derive(Debug, Clone, PartialEq)]
pub struct PublishResult {
    /// 発行先トピックARN
    pub topic_arn: String,
    /// SNSが採番したメッセージID
    pub message_id: String,
}

/// メッセージ発行トレイト（テスト用の抽象化）
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// 文字列メッセージをトピックに発行する
    async fn publish(&self, topic_arn: &str, message: &str) -> Result<PublishResult, PublishError>;

    /// 値をJSONにシリアライズしてトピックに発行する
    async fn publish_json<T: Serialize + Send + Sync>(
        &self,
        topic_arn: &str,
        value: &T,
    ) -> Result<PublishResult, PublishError> {
        let message =
            serde_json::to_string(value).map_err(|e| PublishError::SerializeError(e.to_string()))?;

        self.publish(topic_arn, &message).await
    }
}

/// AWS SNS SDKを使用した発行実装
pub struct AwsSnsEventPublisher {
    client: SnsClient,
}

impl AwsSnsEventPublisher {
    pub fn new(client: SnsClient) -> Self {
        Self { client }
    }

    /// AWS設定からデフォルトのクライアントを作成
    pub async fn from_config() -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(SnsClient::new(&config))
    }
}

#[async_trait]
impl EventPublisher for AwsSnsEventPublisher {
    async fn publish(&self, topic_arn: &str, message: &str) -> Result<PublishResult, PublishError> {
        let response = self
            .client
            .publish()
            .topic_arn(topic_arn)
            .message(message)
            .send()
            .await
            .map_err(|err| {
                warn!(topic_arn = %topic_arn, error = %err, "SNS Publishエラー");
                PublishError::AwsSdkError(err.to_string())
            })?;

        let message_id = response.message_id().unwrap_or("unknown").to_string();
        info!(topic_arn = %topic_arn, message_id = %message_id, "SNS Publish成功");

        Ok(PublishResult {
            topic_arn: topic_arn.to_string(),
            message_id,
        })
    }
}

/// 商品イベントを対応するトピックへ振り分けて発行する
pub struct ProductEventPublisher<P> {
    publisher: P,
    config: ProductApiConfig,
}

impl<P: EventPublisher> ProductEventPublisher<P> {
    pub fn new(publisher: P, config: ProductApiConfig) -> Self {
        Self { publisher, config }
    }

    /// 商品削除イベントをProductDeletedトピックへ発行
    pub async fn publish_product_deleted(
        &self,
        event: &ProductDeletedEvent,
    ) -> Result<PublishResult, PublishError> {
        info!(product_id = %event.product_id(), "商品削除イベント発行");

        self.publisher
            .publish_json(self.config.product_deleted_topic_arn(), event)
            .await
    }
}
