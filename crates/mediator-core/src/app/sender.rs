//! Sender - 呼び出し側が依存する送信 API
//!
//! アプリケーションコードは `Mediator` ではなく `Sender` に依存させることで、
//! テストでは差し替えられる。

use async_trait::async_trait;

use super::mediator::Mediator;
use crate::domain::{CancellationSignal, Command, MediatorError, Query};

#[async_trait]
pub trait Sender: Send + Sync {
    async fn send_command<C: Command>(
        &self,
        command: C,
        cancel: CancellationSignal,
    ) -> Result<C::Output, MediatorError>;

    async fn send_query<Q: Query>(
        &self,
        query: Q,
        cancel: CancellationSignal,
    ) -> Result<Q::Output, MediatorError>;
}

#[async_trait]
impl Sender for Mediator {
    async fn send_command<C: Command>(
        &self,
        command: C,
        cancel: CancellationSignal,
    ) -> Result<C::Output, MediatorError> {
        Mediator::send_command(self, command, cancel).await
    }

    async fn send_query<Q: Query>(
        &self,
        query: Q,
        cancel: CancellationSignal,
    ) -> Result<Q::Output, MediatorError> {
        Mediator::send_query(self, query, cancel).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typed::fixtures::{CreateOrder, CreateOrderHandler, GetOrder, GetOrderHandler, OrderId};
    use crate::typed::registry::HandlerRegistry;
    use std::sync::Arc;

    /// Sender にだけ依存するアプリケーションコードの例
    async fn place_and_describe<S: Sender>(sender: &S) -> Result<String, MediatorError> {
        let OrderId(id) = sender
            .send_command(CreateOrder::new("A-1", 7), CancellationSignal::none())
            .await?;
        sender
            .send_query(GetOrder { id }, CancellationSignal::none())
            .await
    }

    #[tokio::test]
    async fn mediator_serves_sender_callers() {
        let mut registry = HandlerRegistry::new();
        registry
            .register_command::<CreateOrder, _>(CreateOrderHandler::default())
            .unwrap();
        registry
            .register_query::<GetOrder, _>(GetOrderHandler::default())
            .unwrap();
        let mediator = Mediator::new(Arc::new(registry));

        assert_eq!(place_and_describe(&mediator).await.unwrap(), "order-7");
    }
}
