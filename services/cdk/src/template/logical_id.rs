// 論理IDとコンストラクトスコープ
//
// CloudFormationの論理IDは英数字のみ・255文字以下。
// コンストラクトはネストしたスコープのIDを連結して論理IDを作る。

use std::fmt;

use super::TemplateError;

/// 論理IDの最大長
const MAX_LOGICAL_ID_LENGTH: usize = 255;

/// テンプレート内で一意なリソース/パラメータの論理ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LogicalId(String);

impl LogicalId {
    pub fn new(value: impl Into<String>) -> Result<Self, TemplateError> {
        let value = value.into();
        let valid = !value.is_empty()
            && value.len() <= MAX_LOGICAL_ID_LENGTH
            && value.chars().all(|c| c.is_ascii_alphanumeric());
        if !valid {
            return Err(TemplateError::InvalidLogicalId(value));
        }
        Ok(Self(value))
    }

    /// 英数字以外を取り除いて論理IDを作る（パスやルートキーから生成する場合）
    pub fn sanitized(value: &str) -> Result<Self, TemplateError> {
        Self::new(value.chars().filter(char::is_ascii_alphanumeric).collect::<String>())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LogicalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// コンストラクトのスコープ
///
/// `Scope::new("ProductApi").id("TracedJavaTable")` は `ProductApiTracedJavaTable` になる。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Scope {
    path: Vec<String>,
}

impl Scope {
    /// スタック直下のスコープ
    pub fn root() -> Self {
        Self::default()
    }

    pub fn new(id: impl Into<String>) -> Self {
        Self::root().child(id)
    }

    pub fn child(&self, id: impl Into<String>) -> Self {
        let mut path = self.path.clone();
        path.push(id.into());
        Self { path }
    }

    /// スコープ内の名前から論理IDを作る
    pub fn id(&self, name: &str) -> Result<LogicalId, TemplateError> {
        LogicalId::new(format!("{}{}", self.path.concat(), name))
    }
}
