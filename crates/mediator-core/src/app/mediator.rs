//! Mediator - リクエストを唯一の handler に dispatch する
//!
//! # パイプライン（1 回の send ごとに線形、呼び出し間で状態を持たない）
//! 1. リクエストが無ければ `InvalidArgument`（lookup はしない）
//! 2. リクエストの宣言 (kind, result) と呼び出しの期待が一致するか → `InvalidRequestType`
//! 3. (kind, request, result) の key で registry に問い合わせ
//! 4. 見つからなければ `HandlerNotRegistered`
//! 5. handler の signature が key と一致するか → `InvalidHandlerShape`
//! 6. 呼び出し、結果型を検査 → `InvalidHandlerResult`
//! 7. handler 自身の失敗は `MediatorError::Handler` でそのまま返す
//!
//! 保持するのは registry への参照と設定だけなので、
//! 1 つの Mediator を複数タスクから同時に使ってもロックは要らない。

use std::any::Any;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use super::config::MediatorConfig;
use crate::domain::{
    CancellationSignal, CapabilityKind, Command, DispatchKey, MediatorError, Query, RequestType,
    ResultType, ShapeMismatch, TypeTag,
};
use crate::ports::HandlerLookup;
use crate::typed::envelope::RequestEnvelope;
use crate::typed::handler::InvokeError;

const DISPATCH_TARGET: &str = "mediator::dispatch";

#[derive(Clone)]
pub struct Mediator {
    lookup: Arc<dyn HandlerLookup>,
    config: MediatorConfig,
}

impl Mediator {
    pub fn new(lookup: Arc<dyn HandlerLookup>) -> Self {
        Self::with_config(lookup, MediatorConfig::default())
    }

    pub fn with_config(lookup: Arc<dyn HandlerLookup>, config: MediatorConfig) -> Self {
        Self { lookup, config }
    }

    pub fn config(&self) -> &MediatorConfig {
        &self.config
    }

    /// Command を送信し、handler の結果を返す
    pub async fn send_command<C: Command>(
        &self,
        command: C,
        cancel: CancellationSignal,
    ) -> Result<C::Output, MediatorError> {
        let output = self
            .dispatch(
                CapabilityKind::Command,
                Some(RequestEnvelope::command(command)),
                TypeTag::of::<C::Output>(),
                cancel,
            )
            .await?;
        downcast_output::<C::Output>(output, TypeTag::of::<C>())
    }

    /// Query を送信し、handler の結果を返す
    pub async fn send_query<Q: Query>(
        &self,
        query: Q,
        cancel: CancellationSignal,
    ) -> Result<Q::Output, MediatorError> {
        let output = self
            .dispatch(
                CapabilityKind::Query,
                Some(RequestEnvelope::query(query)),
                TypeTag::of::<Q::Output>(),
                cancel,
            )
            .await?;
        downcast_output::<Q::Output>(output, TypeTag::of::<Q>())
    }

    /// 正規名で JSON リクエストを送信する
    ///
    /// # Example
    /// ```ignore
    /// let id = mediator
    ///     .send_json("CREATE_ORDER", json!({ "sku": "A-1", "quantity": 2 }), CancellationSignal::none())
    ///     .await?;
    /// ```
    pub async fn send_json(
        &self,
        name: &str,
        payload: Value,
        cancel: CancellationSignal,
    ) -> Result<Value, MediatorError> {
        let codec = self.lookup.codec(name).ok_or_else(|| {
            debug!(target: DISPATCH_TARGET, request = name, "no json route for request name");
            MediatorError::UnknownRequestName(name.to_string())
        })?;
        let key = codec.key();
        let envelope = codec.decode(payload)?;
        let output = self
            .dispatch(key.kind, Some(envelope), key.result, cancel)
            .await?;
        Ok(codec.encode(output)?)
    }

    /// 型消去された dispatch。typed な send と `send_json` はすべてここを通る
    pub async fn dispatch(
        &self,
        kind: CapabilityKind,
        request: Option<RequestEnvelope>,
        expected_result: ResultType,
        cancel: CancellationSignal,
    ) -> Result<Box<dyn Any + Send>, MediatorError> {
        let Some(request) = request else {
            debug!(target: DISPATCH_TARGET, %kind, "rejecting absent request");
            return Err(MediatorError::InvalidArgument);
        };

        let declared = request.declared();
        let request_type = declared.request;
        let name = request_type.canonical_name();

        if declared.kind != kind || declared.result != expected_result || !request.payload_matches() {
            debug!(
                target: DISPATCH_TARGET,
                request = %name,
                %kind,
                type_name = request_type.name(),
                "invalid request type"
            );
            return Err(MediatorError::InvalidRequestType {
                request: request_type,
                expected_kind: kind,
                expected_result,
                declared,
            });
        }

        if self.config.validate_commands
            && kind == CapabilityKind::Command
            && request.validate() == Some(false)
        {
            debug!(
                target: DISPATCH_TARGET,
                request = %name,
                %kind,
                type_name = request_type.name(),
                "command failed validation"
            );
            return Err(MediatorError::ValidationFailed(request_type));
        }

        let key = DispatchKey::new(kind, request_type, expected_result);
        debug!(
            target: DISPATCH_TARGET,
            request = %name,
            %kind,
            type_name = request_type.name(),
            "resolving handler"
        );

        let Some(handler) = self.lookup.lookup(&key) else {
            debug!(
                target: DISPATCH_TARGET,
                request = %name,
                %kind,
                type_name = request_type.name(),
                "handler not registered"
            );
            return Err(MediatorError::HandlerNotRegistered(request_type));
        };

        if let Some(mismatch) = ShapeMismatch::between(&key, &handler.signature()) {
            debug!(
                target: DISPATCH_TARGET,
                request = %name,
                %kind,
                type_name = request_type.name(),
                %mismatch,
                "resolved handler has an invalid shape"
            );
            return Err(MediatorError::InvalidHandlerShape {
                request: request_type,
                mismatch,
            });
        }

        debug!(
            target: DISPATCH_TARGET,
            request = %name,
            %kind,
            type_name = request_type.name(),
            "invoking handler"
        );

        let output = match handler.handle_dyn(request.into_payload(), cancel).await {
            Ok(output) => output,
            Err(InvokeError::RequestRejected) => {
                debug!(
                    target: DISPATCH_TARGET,
                    request = %name,
                    %kind,
                    type_name = request_type.name(),
                    "handler rejected the request payload"
                );
                return Err(MediatorError::InvalidHandlerShape {
                    request: request_type,
                    mismatch: ShapeMismatch::RequestRejected {
                        expected: request_type,
                    },
                });
            }
            Err(InvokeError::Failed(err)) => return Err(MediatorError::Handler(err)),
        };

        if (*output).type_id() != expected_result.id() {
            debug!(
                target: DISPATCH_TARGET,
                request = %name,
                %kind,
                type_name = request_type.name(),
                expected = expected_result.name(),
                "handler returned an unexpected result type"
            );
            return Err(MediatorError::InvalidHandlerResult {
                request: request_type,
                expected: expected_result,
            });
        }

        Ok(output)
    }
}

fn downcast_output<T: 'static>(
    output: Box<dyn Any + Send>,
    request: RequestType,
) -> Result<T, MediatorError> {
    output
        .downcast::<T>()
        .map(|boxed| *boxed)
        .map_err(|_| MediatorError::InvalidHandlerResult {
            request,
            expected: TypeTag::of::<T>(),
        })
}
