//! 共通コンストラクト
//!
//! サービスをまたいで共有するプロパティと、Datadog計装済みLambda関数。

pub mod instrumented_function;
pub mod shared_props;

// 再エクスポート
pub use instrumented_function::{InstrumentedFunction, InstrumentedFunctionProps};
pub use shared_props::SharedProps;
