//! Parameter Storeからの値の解決
//!
//! デプロイ済みの環境で公開済みパラメータを確認するために使う。
//! スタック合成自体はParameter Storeにアクセスしない。

use async_trait::async_trait;
use aws_sdk_ssm::Client as SsmClient;
use tracing::{debug, warn};

use super::{DiscoveryError, ParameterKey, ParameterKind};

/// パラメータ取得トレイト（テスト用の抽象化）
#[async_trait]
pub trait ParameterStore: Send + Sync {
    /// パスの値を取得する
    ///
    /// # 戻り値
    /// * `Ok(Some(value))` - 値
    /// * `Ok(None)` - パラメータが存在しない
    /// * `Err(DiscoveryError)` - API呼び出しの失敗
    async fn get(&self, path: &str) -> Result<Option<String>, DiscoveryError>;
}

/// 実際のAWS SSM SDKを使用した実装
pub struct AwsSsmParameterStore {
    client: SsmClient,
}

impl AwsSsmParameterStore {
    pub fn new(client: SsmClient) -> Self {
        Self { client }
    }

    /// AWS設定からデフォルトのクライアントを作成
    pub async fn from_config() -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(SsmClient::new(&config))
    }
}

#[async_trait]
impl ParameterStore for AwsSsmParameterStore {
    async fn get(&self, path: &str) -> Result<Option<String>, DiscoveryError> {
        let result = self.client.get_parameter().name(path).send().await;

        match result {
            Ok(output) => Ok(output
                .parameter()
                .and_then(|parameter| parameter.value())
                .map(str::to_string)),
            Err(err) => {
                let not_found = err
                    .as_service_error()
                    .is_some_and(|e| e.is_parameter_not_found());
                if not_found {
                    debug!(path = %path, "パラメータが存在しません");
                    return Ok(None);
                }
                warn!(path = %path, error = %err, "GetParameterエラー");
                Err(DiscoveryError::AwsSdkError(err.to_string()))
            }
        }
    }
}

/// 型付きキーの値を解決する
///
/// # エラー
/// - パスの形式が不正な場合は `InvalidPath`
/// - パラメータが存在しない場合は `NotFound`
pub async fn resolve<K, S>(store: &S, key: &ParameterKey<K>) -> Result<String, DiscoveryError>
where
    K: ParameterKind,
    S: ParameterStore + ?Sized,
{
    key.validate()?;
    store
        .get(key.path())
        .await?
        .ok_or_else(|| DiscoveryError::NotFound(key.path().to_string()))
}
