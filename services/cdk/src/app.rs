//! テンプレートの出力と公開済みパラメータの確認

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use crate::discovery::{DiscoveryError, ParameterStore, keys};
use crate::template::{Stack, TemplateError};

/// 出力ファイル名のサフィックス
pub const TEMPLATE_SUFFIX: &str = ".template.json";

/// テンプレート出力のエラー型
#[derive(Debug, Error)]
pub enum SynthError {
    #[error("ファイル書き込みエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSONシリアライズエラー: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("スタックが見つかりません: {0}")]
    UnknownStack(String),
}

/// スタックを合成して `{スタック名}.template.json` に書き出す
///
/// `only` を指定した場合はそのスタックだけを出力する。
///
/// # 戻り値
/// 書き出したファイルのパス（スタック順）
pub fn write_templates(
    stacks: &[Stack],
    out_dir: &Path,
    only: Option<&str>,
) -> Result<Vec<PathBuf>, SynthError> {
    let selected: Vec<&Stack> = match only {
        Some(name) => {
            let stack = stacks
                .iter()
                .find(|stack| stack.name() == name)
                .ok_or_else(|| SynthError::UnknownStack(name.to_string()))?;
            vec![stack]
        }
        None => stacks.iter().collect(),
    };

    std::fs::create_dir_all(out_dir)?;

    let mut written = Vec::with_capacity(selected.len());
    for stack in selected {
        let template = stack.synthesize()?;
        let path = out_dir.join(format!("{}{}", stack.name(), TEMPLATE_SUFFIX));
        std::fs::write(&path, serde_json::to_string_pretty(&template)?)?;

        info!(stack = %stack.name(), path = %path.display(), "テンプレート出力");
        written.push(path);
    }
    Ok(written)
}

/// Product APIが公開したパラメータを取得する
///
/// 未公開のパスは `None` として返す。API呼び出しの失敗はエラーで中断する。
pub async fn discover<S>(store: &S) -> Result<Vec<(&'static str, Option<String>)>, DiscoveryError>
where
    S: ParameterStore + ?Sized,
{
    let mut found = Vec::with_capacity(keys::PRODUCT_API_PATHS.len());
    for path in keys::PRODUCT_API_PATHS {
        let value = store.get(path).await?;
        if value.is_none() {
            warn!(path = %path, "パラメータが未公開です");
        }
        found.push((path, value));
    }
    Ok(found)
}
