//! スタック定義
//!
//! - product_api: 商品API（テーブル・トピック・関数・HTTP API・公開パラメータ）
//! - inventory_ordering: 在庫発注サービス（商品追加トピックの購読）

pub mod inventory_ordering;
pub mod product_api;

use thiserror::Error;

use crate::config::DeploymentConfig;
use crate::discovery::DiscoveryError;
use crate::template::{Stack, TemplateError};

// 再エクスポート
pub use inventory_ordering::{InventoryOrderingService, inventory_ordering_stack};
pub use product_api::{ProductApi, ProductEvent, ProductOperation, product_api_stack};

/// スタック構築のエラー型
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TopologyError {
    #[error("テンプレートエラー: {0}")]
    Template(#[from] TemplateError),

    #[error("パラメータエラー: {0}")]
    Discovery(#[from] DiscoveryError),
}

/// デプロイ対象の全スタックを構築する
pub fn build_stacks(config: &DeploymentConfig) -> Result<Vec<Stack>, TopologyError> {
    Ok(vec![product_api_stack(config)?, inventory_ordering_stack(config)?])
}
