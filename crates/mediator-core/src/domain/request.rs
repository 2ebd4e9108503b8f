//! Request - Command / Query の capability マーカー
//!
//! # 学習ポイント
//! - Associated Types (`type Output`)
//! - 同じ型が Command と Query の両方を実装できる（dispatch key に kind が入る理由）

use std::fmt;

use serde::{Deserialize, Serialize};

/// Command は状態を変更する意図を表すリクエスト
///
/// # 使用例
/// ```ignore
/// struct CreateOrder {
///     sku: String,
///     quantity: u32,
/// }
///
/// impl Command for CreateOrder {
///     type Output = OrderId;
///
///     fn validate(&self) -> bool {
///         self.quantity > 0
///     }
/// }
/// ```
///
/// # Trait Bounds
/// - `Send`: handler の future に move されるため
/// - `'static`: `Box<dyn Any>` に型消去するため
pub trait Command: Send + 'static {
    /// handler が返す結果の型
    type Output: Send + 'static;

    /// リクエスト自身の妥当性チェック
    fn validate(&self) -> bool;
}

/// Query は状態を読み取る意図を表すリクエスト
///
/// 読み取りは構築時点で妥当とみなすため validation hook は持たない。
pub trait Query: Send + 'static {
    type Output: Send + 'static;
}

/// CapabilityKind はリクエストの種別（dispatch key の一部）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityKind {
    Command,
    Query,
}

impl CapabilityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CapabilityKind::Command => "command",
            CapabilityKind::Query => "query",
        }
    }
}

impl fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
