//! App - アプリケーション層
//!
//! # 主要コンポーネント
//! - **Mediator**: dispatch エンジン（resolve → validate → invoke）
//! - **Sender**: 呼び出し側が依存する送信 trait
//! - **MediatorBuilder**: 起動時のワイヤリングと fail-fast 検証
//! - **MediatorConfig**: エンジンの設定

pub mod builder;
pub mod config;
pub mod mediator;
pub mod sender;

// 主要な型を再エクスポート
pub use self::builder::{BuildError, MediatorBuilder};
pub use self::config::MediatorConfig;
pub use self::mediator::Mediator;
pub use self::sender::Sender;
