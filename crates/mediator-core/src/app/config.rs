//! MediatorConfig - dispatch エンジンの設定
//!
//! JSON から読み込めるよう serde に対応。未指定のフィールドはデフォルト値。

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediatorConfig {
    /// true のとき、lookup の前に `Command::validate()` を呼び、
    /// false なら `MediatorError::ValidationFailed` で失敗させる
    pub validate_commands: bool,
}

impl MediatorConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn with_command_validation(mut self, enabled: bool) -> Self {
        self.validate_commands = enabled;
        self
    }
}
