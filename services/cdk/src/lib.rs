// テンプレートモデル
pub mod template;

// 共通コンストラクトとスタック定義
pub mod constructs;
pub mod stacks;

// スタック間のパラメータ受け渡し
pub mod discovery;

// 設定・ログ・出力
pub mod app;
pub mod config;
pub mod logging;
