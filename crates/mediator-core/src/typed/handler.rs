//! Handler trait - Command / Query を処理する Handler の定義
//!
//! # 学習ポイント
//! - ジェネリック trait (`CommandHandler<C>`, `QueryHandler<Q>`)
//! - Object-safe trait (`DynHandler`)
//! - Type erasure パターン (`TypedCommandHandler<C, H>` → `DynHandler`)

use std::any::Any;
use std::marker::PhantomData;

use async_trait::async_trait;

use crate::domain::naming;
use crate::domain::{CancellationSignal, Command, DispatchKey, HandlerError, Query};

/// CommandHandler は 1 つの Command 型を処理する
///
/// # 使用例
/// ```ignore
/// struct CreateOrderHandler;
///
/// #[async_trait]
/// impl CommandHandler<CreateOrder> for CreateOrderHandler {
///     async fn handle(
///         &self,
///         command: CreateOrder,
///         cancel: CancellationSignal,
///     ) -> Result<OrderId, HandlerError> {
///         Ok(OrderId::new())
///     }
/// }
/// ```
///
/// # ジェネリクスによる型安全性
/// - `CommandHandler<CreateOrder>` は `CreateOrder` しか受け取れない
/// - 結果型は `CreateOrder::Output` に固定される
#[async_trait]
pub trait CommandHandler<C: Command>: Send + Sync {
    async fn handle(&self, command: C, cancel: CancellationSignal) -> Result<C::Output, HandlerError>;

    /// ログ・テレメトリ用の正規名（`CreateOrder` → `CREATE_ORDER`）
    fn command_name() -> String
    where
        Self: Sized,
    {
        naming::request_name::<C>()
    }
}

/// QueryHandler は 1 つの Query 型を処理する
#[async_trait]
pub trait QueryHandler<Q: Query>: Send + Sync {
    async fn handle(&self, query: Q, cancel: CancellationSignal) -> Result<Q::Output, HandlerError>;

    fn query_name() -> String
    where
        Self: Sized,
    {
        naming::request_name::<Q>()
    }
}

/// DynHandler の呼び出し失敗
#[derive(Debug)]
pub enum InvokeError {
    /// payload が handler の受け付ける型ではなかった
    RequestRejected,
    /// handler 自身の失敗（そのまま呼び出し側へ）
    Failed(HandlerError),
}

/// DynHandler は object-safe な Handler の抽象化
///
/// `TypedCommandHandler` / `TypedQueryHandler` を DynHandler に変換することで、
/// `HashMap<DispatchKey, Arc<dyn DynHandler>>` に格納可能にします。
///
/// # Object Safety
/// - メソッドはジェネリックではない
/// - request / result は `Box<dyn Any + Send>` で受け渡す
#[async_trait]
pub trait DynHandler: Send + Sync {
    /// この handler が処理する (kind, request, result)
    fn signature(&self) -> DispatchKey;

    async fn handle_dyn(
        &self,
        payload: Box<dyn Any + Send>,
        cancel: CancellationSignal,
    ) -> Result<Box<dyn Any + Send>, InvokeError>;
}

pub struct TypedCommandHandler<C: Command, H: CommandHandler<C>> {
    handler: H,
    _marker: PhantomData<fn(C)>,
}

impl<C: Command, H: CommandHandler<C>> TypedCommandHandler<C, H> {
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<C: Command, H: CommandHandler<C>> DynHandler for TypedCommandHandler<C, H> {
    fn signature(&self) -> DispatchKey {
        DispatchKey::command::<C>()
    }

    async fn handle_dyn(
        &self,
        payload: Box<dyn Any + Send>,
        cancel: CancellationSignal,
    ) -> Result<Box<dyn Any + Send>, InvokeError> {
        let command = payload
            .downcast::<C>()
            .map_err(|_| InvokeError::RequestRejected)?;
        let output = self
            .handler
            .handle(*command, cancel)
            .await
            .map_err(InvokeError::Failed)?;
        Ok(Box::new(output))
    }
}

pub struct TypedQueryHandler<Q: Query, H: QueryHandler<Q>> {
    handler: H,
    _marker: PhantomData<fn(Q)>,
}

impl<Q: Query, H: QueryHandler<Q>> TypedQueryHandler<Q, H> {
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<Q: Query, H: QueryHandler<Q>> DynHandler for TypedQueryHandler<Q, H> {
    fn signature(&self) -> DispatchKey {
        DispatchKey::query::<Q>()
    }

    async fn handle_dyn(
        &self,
        payload: Box<dyn Any + Send>,
        cancel: CancellationSignal,
    ) -> Result<Box<dyn Any + Send>, InvokeError> {
        let query = payload
            .downcast::<Q>()
            .map_err(|_| InvokeError::RequestRejected)?;
        let output = self
            .handler
            .handle(*query, cancel)
            .await
            .map_err(InvokeError::Failed)?;
        Ok(Box::new(output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typed::fixtures::{
        CreateOrder, CreateOrderHandler, GetOrder, GetOrderHandler, OrderError, OrderId,
    };

    #[tokio::test]
    async fn typed_command_handler_roundtrips_through_any() {
        let handler = TypedCommandHandler::<CreateOrder, _>::new(CreateOrderHandler::default());

        let output = handler
            .handle_dyn(Box::new(CreateOrder::new("A-1", 3)), CancellationSignal::none())
            .await
            .unwrap();
        let id = output.downcast::<OrderId>().unwrap();
        assert_eq!(*id, OrderId(3));
    }

    #[tokio::test]
    async fn typed_handler_rejects_foreign_payload() {
        let handler = TypedQueryHandler::<GetOrder, _>::new(GetOrderHandler::default());

        let result = handler
            .handle_dyn(Box::new(CreateOrder::new("A-1", 3)), CancellationSignal::none())
            .await;
        assert!(matches!(result, Err(InvokeError::RequestRejected)));
    }

    #[tokio::test]
    async fn handler_failure_is_passed_through() {
        let handler = TypedQueryHandler::<GetOrder, _>::new(GetOrderHandler::default());

        let result = handler
            .handle_dyn(Box::new(GetOrder { id: 404 }), CancellationSignal::none())
            .await;
        let Err(InvokeError::Failed(err)) = result else {
            panic!("expected handler failure");
        };
        assert_eq!(
            *err.downcast::<OrderError>().unwrap(),
            OrderError::NotFound(404)
        );
    }

    #[test]
    fn signature_matches_request_key() {
        let handler = TypedCommandHandler::<CreateOrder, _>::new(CreateOrderHandler::default());
        assert_eq!(handler.signature(), DispatchKey::command::<CreateOrder>());
    }

    #[test]
    fn handler_names_follow_naming_convention() {
        assert_eq!(
            <CreateOrderHandler as CommandHandler<CreateOrder>>::command_name(),
            "CREATE_ORDER"
        );
        assert_eq!(
            <GetOrderHandler as QueryHandler<GetOrder>>::query_name(),
            "GET_ORDER"
        );
    }
}
