//! Errors - dispatch エンジンのエラー分類
//!
//! # 分類
//! - **dispatch failure**: mediator 自身が検出するもの（引数欠落、型不一致、未登録、shape 不正、結果型不正）
//! - **handler failure**: handler 自身の失敗。そのまま素通しし、ラップし直さない
//!
//! どちらも `send` の致命的な失敗で、mediator はリトライも縮退もしない。

use std::error::Error;
use std::fmt;

use super::key::{DispatchKey, RequestType, ResultType};
use super::request::CapabilityKind;

/// handler が返す失敗
///
/// 呼び出し側は `MediatorError::downcast_handler_error` で元の型に戻せる。
pub type HandlerError = Box<dyn Error + Send + Sync + 'static>;

#[derive(Debug, thiserror::Error)]
pub enum MediatorError {
    #[error("request argument is absent")]
    InvalidArgument,

    #[error(
        "invalid request type {request}: expected a {expected_kind} returning {expected_result}, request declares {declared}"
    )]
    InvalidRequestType {
        request: RequestType,
        expected_kind: CapabilityKind,
        expected_result: ResultType,
        declared: DispatchKey,
    },

    #[error("handler not registered for request_type={0}")]
    HandlerNotRegistered(RequestType),

    #[error("handler for {request} has an invalid shape: {mismatch}")]
    InvalidHandlerShape {
        request: RequestType,
        mismatch: ShapeMismatch,
    },

    #[error("handler for {request} did not produce a result of type {expected}")]
    InvalidHandlerResult {
        request: RequestType,
        expected: ResultType,
    },

    #[error("command {0} failed validation")]
    ValidationFailed(RequestType),

    #[error("no request registered under name {0:?}")]
    UnknownRequestName(String),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Handler(HandlerError),
}

impl MediatorError {
    /// mediator 自身が検出した失敗なら true（handler の失敗なら false）
    pub fn is_dispatch_failure(&self) -> bool {
        !matches!(self, MediatorError::Handler(_))
    }

    /// 失敗の原因となったリクエスト型（分かる場合のみ）
    pub fn request_type(&self) -> Option<RequestType> {
        match self {
            MediatorError::InvalidRequestType { request, .. }
            | MediatorError::InvalidHandlerShape { request, .. }
            | MediatorError::InvalidHandlerResult { request, .. } => Some(*request),
            MediatorError::HandlerNotRegistered(request) | MediatorError::ValidationFailed(request) => {
                Some(*request)
            }
            _ => None,
        }
    }

    pub fn handler_error(&self) -> Option<&(dyn Error + Send + Sync + 'static)> {
        match self {
            MediatorError::Handler(err) => Some(&**err),
            _ => None,
        }
    }

    /// handler の失敗を元の型として参照
    pub fn downcast_handler_ref<E: Error + 'static>(&self) -> Option<&E> {
        self.handler_error().and_then(|err| err.downcast_ref::<E>())
    }

    /// handler の失敗を元の型に戻す。型が違う・dispatch failure の場合は自身を返す
    pub fn downcast_handler_error<E: Error + 'static>(self) -> Result<E, Self> {
        match self {
            MediatorError::Handler(err) => err
                .downcast::<E>()
                .map(|boxed| *boxed)
                .map_err(MediatorError::Handler),
            other => Err(other),
        }
    }
}

/// ShapeMismatch は解決された handler の signature が lookup key と食い違った箇所
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeMismatch {
    Kind {
        expected: CapabilityKind,
        found: CapabilityKind,
    },
    RequestType {
        expected: RequestType,
        found: RequestType,
    },
    ResultType {
        expected: ResultType,
        found: ResultType,
    },
    /// signature は一致したが、渡した payload を受け付けなかった
    RequestRejected { expected: RequestType },
}

impl ShapeMismatch {
    /// 最初に食い違った箇所を返す（kind → request → result の順）
    pub fn between(expected: &DispatchKey, found: &DispatchKey) -> Option<Self> {
        if expected.kind != found.kind {
            return Some(ShapeMismatch::Kind {
                expected: expected.kind,
                found: found.kind,
            });
        }
        if expected.request != found.request {
            return Some(ShapeMismatch::RequestType {
                expected: expected.request,
                found: found.request,
            });
        }
        if expected.result != found.result {
            return Some(ShapeMismatch::ResultType {
                expected: expected.result,
                found: found.result,
            });
        }
        None
    }
}

impl fmt::Display for ShapeMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeMismatch::Kind { expected, found } => {
                write!(f, "handles a {found}, expected a {expected}")
            }
            ShapeMismatch::RequestType { expected, found } => {
                write!(f, "accepts {found}, expected {expected}")
            }
            ShapeMismatch::ResultType { expected, found } => {
                write!(f, "returns {found}, expected {expected}")
            }
            ShapeMismatch::RequestRejected { expected } => {
                write!(f, "rejected a {expected} payload despite its signature")
            }
        }
    }
}

/// CodecError は JSON ルーティングの変換エラー
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("json decode {request}: {source}")]
    Decode {
        request: String,
        source: serde_json::Error,
    },

    #[error("json encode {request}: {source}")]
    Encode {
        request: String,
        source: serde_json::Error,
    },

    #[error("handler output for {0} has an unexpected type")]
    UnexpectedOutput(String),
}
