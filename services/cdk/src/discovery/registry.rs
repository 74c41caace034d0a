//! デプロイ時のパラメータ登録
//!
//! 公開側はSSMパラメータリソースを追加し、参照側はSSMパラメータ型の
//! テンプレートパラメータを宣言する。値の解決はデプロイ時にCloudFormationが行う。

use tracing::debug;

use super::{Discoverable, DiscoveryError, ParameterKey, ParameterKind};
use crate::template::{
    Expr, LogicalId, Resource, Stack, StringParameterProps, TemplateParameter,
};

/// SSMパラメータ値を受け取るテンプレートパラメータの型
const SSM_PARAMETER_TYPE: &str = "AWS::SSM::Parameter::Value<String>";

/// 型付きのパラメータ登録インターフェース
pub trait ParameterRegistry {
    /// 値をパスで公開する
    fn publish<K: ParameterKind>(
        &mut self,
        key: &ParameterKey<K>,
        value: Discoverable<K>,
    ) -> Result<(), DiscoveryError>;

    /// パスで公開された値を参照する
    fn lookup<K: ParameterKind>(
        &mut self,
        key: &ParameterKey<K>,
    ) -> Result<Discoverable<K>, DiscoveryError>;
}

/// 参照用テンプレートパラメータの論理ID
fn lookup_parameter_id(path: &str) -> Result<LogicalId, DiscoveryError> {
    Ok(LogicalId::sanitized(&format!("SsmParameterValue{}", path))?)
}

impl ParameterRegistry for Stack {
    fn publish<K: ParameterKind>(
        &mut self,
        key: &ParameterKey<K>,
        value: Discoverable<K>,
    ) -> Result<(), DiscoveryError> {
        key.validate()?;

        let already_published = self.resources().any(|(_, resource)| {
            matches!(resource, Resource::StringParameter(p) if p.name == key.path())
        });
        if already_published {
            return Err(DiscoveryError::AlreadyPublished(key.path().to_string()));
        }

        self.add(
            LogicalId::new(key.id())?,
            Resource::StringParameter(StringParameterProps {
                name: key.path().to_string(),
                value: value.into_expr(),
            }),
        )?;

        debug!(stack = %self.name(), path = %key.path(), kind = K::NAME, "パラメータ公開");
        Ok(())
    }

    fn lookup<K: ParameterKind>(
        &mut self,
        key: &ParameterKey<K>,
    ) -> Result<Discoverable<K>, DiscoveryError> {
        key.validate()?;

        let id = lookup_parameter_id(key.path())?;
        // 同じパスの参照は1つのテンプレートパラメータを共有する
        if self.parameter(&id).is_none() {
            self.add_parameter(
                id.clone(),
                TemplateParameter {
                    parameter_type: SSM_PARAMETER_TYPE.to_string(),
                    default: Some(key.path().to_string()),
                    description: Some(format!("{} ({})", key.path(), K::NAME)),
                },
            )?;
            debug!(stack = %self.name(), path = %key.path(), kind = K::NAME, "パラメータ参照");
        }

        Ok(Discoverable::new(Expr::Ref(id)))
    }
}
