/// CloudFormationテンプレート合成CLI
///
/// 商品APIスタックと在庫発注サービススタックを合成し、テンプレートJSONを書き出す。
///
/// # 環境変数
/// - DD_SECRET_ARN: Datadog APIキーのシークレットARN（必須）
/// - ENV: デプロイ環境名（デフォルト: dev）
/// - VERSION: サービスバージョン（デフォルト: latest）
/// - LOG_FORMAT: `json` でJSONログ（デフォルト: コンパクト）
///
/// # 実行例
/// ```bash
/// export DD_SECRET_ARN=arn:aws:secretsmanager:us-east-1:123456789012:secret:dd-api-key-AbCdEf
///
/// # 全スタックを cdk.out/ に出力
/// cargo run --bin synth -- synth
///
/// # 1スタックだけ出力
/// cargo run --bin synth -- synth --stack JavaProductApiStack --out build
///
/// # 公開済みパラメータの確認（AWS認証情報が必要）
/// cargo run --bin synth -- discover
/// ```
use std::path::PathBuf;

use cdk::app::{discover, write_templates};
use cdk::config::DeploymentConfig;
use cdk::discovery::AwsSsmParameterStore;
use cdk::logging::init_logging;
use cdk::stacks::build_stacks;
use clap::{Parser, Subcommand};
use tracing::{error, info};

type Error = Box<dyn std::error::Error + Send + Sync>;

#[derive(Parser, Debug)]
#[command(name = "synth")]
#[command(about = "AWSリソース定義からCloudFormationテンプレートを合成")]
struct CliArgs {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// テンプレートを書き出す
    Synth {
        /// 出力ディレクトリ
        #[arg(long, short = 'o', default_value = "cdk.out")]
        out: PathBuf,

        /// 出力するスタック名（省略時は全スタック）
        #[arg(long, short = 's')]
        stack: Option<String>,
    },
    /// Parameter Storeに公開済みのパラメータを表示する
    Discover,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_logging();

    let args = CliArgs::parse();
    match args.command {
        Command::Synth { out, stack } => run_synth(out, stack),
        Command::Discover => run_discover().await,
    }
}

fn run_synth(out: PathBuf, stack: Option<String>) -> Result<(), Error> {
    let config = DeploymentConfig::from_env().map_err(|e| {
        error!(error = %e, "デプロイ設定読み込み失敗");
        e
    })?;

    info!(env = %config.env(), version = %config.version(), "スタック構築開始");

    let stacks = build_stacks(&config).map_err(|e| {
        error!(error = %e, "スタック構築失敗");
        e
    })?;

    let written = write_templates(&stacks, &out, stack.as_deref()).map_err(|e| {
        error!(error = %e, "テンプレート出力失敗");
        e
    })?;

    info!(count = written.len(), out = %out.display(), "合成完了");
    Ok(())
}

async fn run_discover() -> Result<(), Error> {
    let store = AwsSsmParameterStore::from_config().await;

    let found = discover(&store).await.map_err(|e| {
        error!(error = %e, "パラメータ取得失敗");
        e
    })?;

    for (path, value) in found {
        match value {
            Some(value) => println!("{}\t{}", path, value),
            None => println!("{}\t(未公開)", path),
        }
    }
    Ok(())
}
