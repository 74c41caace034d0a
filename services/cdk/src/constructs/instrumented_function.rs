//! Datadog計装済みのJava Lambda関数
//!
//! Spring Cloud Functionのアダプタ経由で関数を呼び出す。
//! 呼び出す関数は `spring_cloud_function_definition` で選ぶため、
//! 同じjarを複数の関数で共有できる。

use std::collections::BTreeMap;

use tracing::debug;

use super::SharedProps;
use crate::template::{
    Access, Expr, FunctionProps, FunctionRef, LogicalId, Pseudo, Resource, RoleProps, Scope,
    Stack, TemplateError, TemplateParameter,
};

/// Spring Cloud Function のLambdaハンドラ
pub const HANDLER: &str =
    "org.springframework.cloud.function.adapter.aws.FunctionInvoker::handleRequest";

pub const RUNTIME: &str = "java21";

pub const MEMORY_SIZE_MB: u32 = 2048;

/// API Gatewayの統合タイムアウトに合わせる
pub const TIMEOUT_SECONDS: u32 = 29;

pub const DD_SITE: &str = "datadoghq.com";

/// アーティファクトを置くバケットのテンプレートパラメータ
pub const ASSETS_BUCKET_PARAMETER: &str = "AssetsBucket";

const BASIC_EXECUTION_POLICY: &str = ":iam::aws:policy/service-role/AWSLambdaBasicExecutionRole";

/// 関数ごとのプロパティ
#[derive(Debug, Clone)]
pub struct InstrumentedFunctionProps<'a> {
    pub shared: &'a SharedProps,
    /// `FunctionConfiguration` を含むJavaパッケージ
    pub package_name: &'a str,
    /// ビルド済みjarのパス
    pub code_path: &'a str,
    /// 呼び出す関数Bean名
    pub entry_point: &'a str,
    pub environment: BTreeMap<String, Expr>,
}

/// 実行ロール付きのLambda関数
#[derive(Debug, Clone)]
pub struct InstrumentedFunction {
    function: FunctionRef,
}

impl InstrumentedFunction {
    /// ロールと関数をスタックに追加し、APIキーの読み取りを許可する
    pub fn new(
        stack: &mut Stack,
        scope: &Scope,
        id: &str,
        props: InstrumentedFunctionProps<'_>,
    ) -> Result<Self, TemplateError> {
        let shared = props.shared;
        let bucket = ensure_assets_bucket(stack)?;

        let role_id = scope.id(&format!("{}ServiceRole", id))?;
        stack.add(
            role_id.clone(),
            Resource::Role(RoleProps {
                service_principal: "lambda.amazonaws.com".to_string(),
                managed_policy_arns: vec![Expr::join([
                    Expr::literal("arn:"),
                    Expr::Pseudo(Pseudo::Partition),
                    Expr::literal(BASIC_EXECUTION_POLICY),
                ])],
            }),
        )?;

        let mut environment = BTreeMap::from([
            ("DD_SERVICE".to_string(), Expr::literal(&shared.service_name)),
            ("DD_ENV".to_string(), Expr::literal(&shared.env)),
            ("DD_VERSION".to_string(), Expr::literal(&shared.version)),
            (
                "DD_API_KEY_SECRET_ARN".to_string(),
                shared.dd_api_key_secret.secret_arn(),
            ),
            ("DD_SITE".to_string(), Expr::literal(DD_SITE)),
            (
                "MAIN_CLASS".to_string(),
                Expr::literal(format!("{}.FunctionConfiguration", props.package_name)),
            ),
            (
                "spring_cloud_function_definition".to_string(),
                Expr::literal(props.entry_point),
            ),
        ]);
        environment.extend(props.environment);

        let tags = BTreeMap::from([
            ("service".to_string(), shared.service_name.clone()),
            ("env".to_string(), shared.env.clone()),
            ("version".to_string(), shared.version.clone()),
        ]);

        let function_id = scope.id(id)?;
        stack.add(
            function_id.clone(),
            Resource::Function(FunctionProps {
                code_bucket: bucket,
                code_path: props.code_path.to_string(),
                handler: HANDLER.to_string(),
                runtime: RUNTIME.to_string(),
                memory_size: MEMORY_SIZE_MB,
                timeout_seconds: TIMEOUT_SECONDS,
                role_arn: Expr::get_att(&role_id, "Arn"),
                environment,
                tags,
            }),
        )?;

        let function = FunctionRef::new(function_id, role_id);
        stack.grant(&function, Access::secret_read(&shared.dd_api_key_secret))?;

        debug!(
            stack = %stack.name(),
            function = %function.logical_id(),
            entry_point = %props.entry_point,
            "計装済み関数追加"
        );

        Ok(Self { function })
    }

    pub fn function(&self) -> &FunctionRef {
        &self.function
    }
}

/// アセットバケットのパラメータを宣言する（スタック内で1つ）
fn ensure_assets_bucket(stack: &mut Stack) -> Result<Expr, TemplateError> {
    let id = LogicalId::new(ASSETS_BUCKET_PARAMETER)?;
    if stack.parameter(&id).is_none() {
        stack.add_parameter(
            id.clone(),
            TemplateParameter {
                parameter_type: "String".to_string(),
                default: None,
                description: Some("Lambdaアーティファクトを配置したS3バケット".to_string()),
            },
        )?;
    }
    Ok(Expr::Ref(id))
}
