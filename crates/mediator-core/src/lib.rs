//! mediator-core
//!
//! In-process request mediator: a caller sends a typed command or query and
//! the mediator routes it to the single handler registered for that exact
//! request type.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（Command / Query, DispatchKey, naming, cancellation, errors）
//! - **ports**: 抽象化レイヤー（HandlerLookup）
//! - **typed**: 型付き Handler API（CommandHandler, QueryHandler, DynHandler, HandlerRegistry, PayloadCodec）
//! - **app**: dispatch エンジン（Mediator, Sender, MediatorBuilder, MediatorConfig）

pub mod domain;
pub mod ports;
pub mod typed;
pub mod app;

pub use app::{BuildError, Mediator, MediatorBuilder, MediatorConfig, Sender};
pub use domain::{
    CancellationSignal, CancellationSource, CapabilityKind, Command, DispatchKey, HandlerError,
    MediatorError, Query,
};
pub use ports::HandlerLookup;
pub use typed::{CommandHandler, HandlerRegistry, QueryHandler, RegistryError};
