//! Typed - 型付き Handler API
//!
//! このモジュールはリクエスト型と Handler の対応付けを静的に保証します。
//!
//! # 二層構造
//! - **表層（Typed）**: `CommandHandler<C>`, `QueryHandler<Q>` - 型安全
//! - **内部（Dyn）**: `DynHandler` trait - object-safe, type erasure

pub mod envelope;
pub mod handler;
pub mod registry;
pub mod codec;

#[cfg(test)]
pub(crate) mod fixtures;

// 主要な trait/型 を再エクスポート
pub use self::envelope::RequestEnvelope;
pub use self::handler::{CommandHandler, DynHandler, InvokeError, QueryHandler};
pub use self::registry::{HandlerRegistry, RegistryError};
pub use self::codec::{CodecError, PayloadCodec};
