//! サービス共通のプロパティ

use crate::config::DeploymentConfig;
use crate::template::{SecretRef, TemplateError};

/// サービス名・環境・バージョンとDatadog APIキーの参照
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedProps {
    pub service_name: String,
    pub env: String,
    pub version: String,
    pub dd_api_key_secret: SecretRef,
}

impl SharedProps {
    /// デプロイ設定から作成する
    ///
    /// # エラー
    /// シークレットARNが完全なSecrets Manager ARNでない場合は `TemplateError::InvalidArn`
    pub fn from_config(
        service_name: impl Into<String>,
        config: &DeploymentConfig,
    ) -> Result<Self, TemplateError> {
        Ok(Self {
            service_name: service_name.into(),
            env: config.env().to_string(),
            version: config.version().to_string(),
            dd_api_key_secret: SecretRef::from_complete_arn(config.dd_secret_arn())?,
        })
    }
}
