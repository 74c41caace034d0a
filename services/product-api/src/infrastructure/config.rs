/// Product API関数のランタイム設定
///
/// リソース定義側が各関数の環境変数に配線した値を読み込む。
/// - TABLE_NAME: 商品テーブル名
/// - PRODUCT_CREATED_TOPIC_ARN: 商品作成イベントのトピックARN
/// - PRODUCT_UPDATED_TOPIC_ARN: 商品更新イベントのトピックARN
/// - PRODUCT_DELETED_TOPIC_ARN: 商品削除イベントのトピックARN
/// - DD_SERVICE_MAPPING: 更新系関数のみ設定される（任意）
use thiserror::Error;

/// 設定読み込みのエラー型
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("環境変数が設定されていません: {0}")]
    MissingEnvVar(String),
}

/// Product API関数のランタイム設定
#[derive(Debug, Clone, PartialEq)]
pub struct ProductApiConfig {
    /// 商品テーブル名
    table_name: String,
    /// ProductCreatedトピックARN
    product_created_topic_arn: String,
    /// ProductUpdatedトピックARN
    product_updated_topic_arn: String,
    /// ProductDeletedトピックARN
    product_deleted_topic_arn: String,
    /// トレースのサービスマッピング（例: `lambda_sns:ProductCreated-dev`）
    service_mapping: Option<String>,
}

fn required_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

impl ProductApiConfig {
    /// 環境変数から設定を読み込む
    ///
    /// # エラー
    /// 必須の環境変数が設定されていない場合は `ConfigError::MissingEnvVar` を返す
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            table_name: required_env("TABLE_NAME")?,
            product_created_topic_arn: required_env("PRODUCT_CREATED_TOPIC_ARN")?,
            product_updated_topic_arn: required_env("PRODUCT_UPDATED_TOPIC_ARN")?,
            product_deleted_topic_arn: required_env("PRODUCT_DELETED_TOPIC_ARN")?,
            service_mapping: std::env::var("DD_SERVICE_MAPPING").ok(),
        })
    }

    /// 明示的な値で設定を作成（テスト用）
    pub fn new(
        table_name: impl Into<String>,
        product_created_topic_arn: impl Into<String>,
        product_updated_topic_arn: impl Into<String>,
        product_deleted_topic_arn: impl Into<String>,
    ) -> Self {
        Self {
            table_name: table_name.into(),
            product_created_topic_arn: product_created_topic_arn.into(),
            product_updated_topic_arn: product_updated_topic_arn.into(),
            product_deleted_topic_arn: product_deleted_topic_arn.into(),
            service_mapping: None,
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn product_created_topic_arn(&self) -> &str {
        &self.product_created_topic_arn
    }

    pub fn product_updated_topic_arn(&self) -> &str {
        &self.product_updated_topic_arn
    }

    pub fn product_deleted_topic_arn(&self) -> &str {
        &self.product_deleted_topic_arn
    }

    pub fn service_mapping(&self) -> Option<&str> {
        self.service_mapping.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const ALL_VARS: [&str; 5] = [
        "TABLE_NAME",
        "PRODUCT_CREATED_TOPIC_ARN",
        "PRODUCT_UPDATED_TOPIC_ARN",
        "PRODUCT_DELETED_TOPIC_ARN",
        "DD_SERVICE_MAPPING",
    ];

    // 安全性: #[serial]で実行されるテストからのみ呼び出す
    unsafe fn cleanup() {
        for var in ALL_VARS {
            unsafe { std::env::remove_var(var) };
        }
    }

    unsafe fn set_required() {
        unsafe {
            std::env::set_var("TABLE_NAME", "products-table");
            std::env::set_var(
                "PRODUCT_CREATED_TOPIC_ARN",
                "arn:aws:sns:us-east-1:123456789012:ProductCreated-dev",
            );
            std::env::set_var(
                "PRODUCT_UPDATED_TOPIC_ARN",
                "arn:aws:sns:us-east-1:123456789012:ProductUpdated-dev",
            );
            std::env::set_var(
                "PRODUCT_DELETED_TOPIC_ARN",
                "arn:aws:sns:us-east-1:123456789012:ProductDeleted-dev",
            );
        }
    }

    // ==================== ConfigError テスト ====================

    #[test]
    fn test_missing_env_var_error_display() {
        let error = ConfigError::MissingEnvVar("TABLE_NAME".to_string());
        assert_eq!(error.to_string(), "環境変数が設定されていません: TABLE_NAME");
    }

    // ==================== from_env テスト ====================

    #[test]
    #[serial]
    fn test_from_env_success() {
        unsafe {
            cleanup();
            set_required();
        }

        let config = ProductApiConfig::from_env().expect("設定読み込みに失敗");

        assert_eq!(config.table_name(), "products-table");
        assert!(config.product_created_topic_arn().ends_with("ProductCreated-dev"));
        assert!(config.product_updated_topic_arn().ends_with("ProductUpdated-dev"));
        assert!(config.product_deleted_topic_arn().ends_with("ProductDeleted-dev"));
        assert_eq!(config.service_mapping(), None);

        unsafe { cleanup() };
    }

    #[test]
    #[serial]
    fn test_from_env_reads_service_mapping() {
        unsafe {
            cleanup();
            set_required();
            std::env::set_var("DD_SERVICE_MAPPING", "lambda_sns:ProductDeleted-dev");
        }

        let config = ProductApiConfig::from_env().expect("設定読み込みに失敗");
        assert_eq!(config.service_mapping(), Some("lambda_sns:ProductDeleted-dev"));

        unsafe { cleanup() };
    }

    #[test]
    #[serial]
    fn test_from_env_missing_deleted_topic() {
        unsafe {
            cleanup();
            set_required();
            std::env::remove_var("PRODUCT_DELETED_TOPIC_ARN");
        }

        let result = ProductApiConfig::from_env();
        assert_eq!(
            result.unwrap_err(),
            ConfigError::MissingEnvVar("PRODUCT_DELETED_TOPIC_ARN".to_string())
        );

        unsafe { cleanup() };
    }

    #[test]
    #[serial]
    fn test_from_env_missing_table_name() {
        unsafe { cleanup() };

        let result = ProductApiConfig::from_env();
        assert_eq!(
            result.unwrap_err(),
            ConfigError::MissingEnvVar("TABLE_NAME".to_string())
        );
    }

    #[test]
    fn test_new_explicit_values() {
        let config = ProductApiConfig::new("t", "created", "updated", "deleted");

        assert_eq!(config.table_name(), "t");
        assert_eq!(config.product_created_topic_arn(), "created");
        assert_eq!(config.product_updated_topic_arn(), "updated");
        assert_eq!(config.product_deleted_topic_arn(), "deleted");
    }
}
