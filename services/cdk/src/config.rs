/// デプロイ設定
///
/// スタック構築に必要な値を明示的な設定として受け渡す。
/// スタック構築コードはプロセス環境を直接読まない。
///
/// 環境変数から読み込む場合:
/// - DD_SECRET_ARN: Datadog APIキーを保持するシークレットの完全なARN（必須）
/// - ENV: デプロイ環境名（デフォルト: dev）
/// - VERSION: サービスバージョン（デフォルト: latest）
use thiserror::Error;

/// デフォルトの環境名
pub const DEFAULT_ENV: &str = "dev";

/// デフォルトのバージョン
pub const DEFAULT_VERSION: &str = "latest";

/// 設定のエラー型
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("環境変数が設定されていません: {0}")]
    MissingEnvVar(String),

    #[error("設定値が空です: {0}")]
    EmptyValue(String),
}

/// デプロイ設定
#[derive(Debug, Clone, PartialEq)]
pub struct DeploymentConfig {
    /// Datadog APIキーのシークレットARN
    dd_secret_arn: String,
    /// 環境名（トピック名のサフィックスやタグに使う）
    env: String,
    /// サービスバージョン
    version: String,
}

fn non_empty(name: &str, value: String) -> Result<String, ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::EmptyValue(name.to_string()));
    }
    Ok(trimmed.to_string())
}

impl DeploymentConfig {
    /// 明示的な値で設定を作成
    ///
    /// # エラー
    /// いずれかの値が空（空白のみを含む）の場合は `ConfigError::EmptyValue`
    pub fn new(
        dd_secret_arn: impl Into<String>,
        env: impl Into<String>,
        version: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            dd_secret_arn: non_empty("DD_SECRET_ARN", dd_secret_arn.into())?,
            env: non_empty("ENV", env.into())?,
            version: non_empty("VERSION", version.into())?,
        })
    }

    /// 環境変数から設定を読み込む
    ///
    /// DD_SECRET_ARNが未設定の場合はデフォルト値で補わずにエラーを返す。
    pub fn from_env() -> Result<Self, ConfigError> {
        let dd_secret_arn = std::env::var("DD_SECRET_ARN")
            .map_err(|_| ConfigError::MissingEnvVar("DD_SECRET_ARN".to_string()))?;
        let env = std::env::var("ENV").unwrap_or_else(|_| DEFAULT_ENV.to_string());
        let version = std::env::var("VERSION").unwrap_or_else(|_| DEFAULT_VERSION.to_string());

        Self::new(dd_secret_arn, env, version)
    }

    pub fn dd_secret_arn(&self) -> &str {
        &self.dd_secret_arn
    }

    pub fn env(&self) -> &str {
        &self.env
    }

    pub fn version(&self) -> &str {
        &self.version
    }
}
