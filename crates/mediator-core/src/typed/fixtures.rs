//! テスト用の Command / Query / Handler / Lookup

use std::any::Any;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{CancellationSignal, Command, DispatchKey, HandlerError, Query};
use crate::ports::HandlerLookup;
use crate::typed::codec::PayloadCodec;
use crate::typed::handler::{CommandHandler, DynHandler, InvokeError, QueryHandler};
use crate::typed::registry::HandlerRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderId(pub u64);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrder {
    pub sku: String,
    pub quantity: u32,
}

impl CreateOrder {
    pub fn new(sku: &str, quantity: u32) -> Self {
        Self {
            sku: sku.to_string(),
            quantity,
        }
    }
}

impl Command for CreateOrder {
    type Output = OrderId;

    fn validate(&self) -> bool {
        self.quantity > 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetOrder {
    pub id: u64,
}

impl Query for GetOrder {
    type Output = String;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderError {
    #[error("order {0} not found")]
    NotFound(u64),
    #[error("sku must not be empty")]
    EmptySku,
}

/// 呼び出し回数を数える CreateOrder handler（数量をそのまま id にする）
#[derive(Default, Clone)]
pub struct CreateOrderHandler {
    pub calls: Arc<AtomicUsize>,
}

#[async_trait]
impl CommandHandler<CreateOrder> for CreateOrderHandler {
    async fn handle(
        &self,
        command: CreateOrder,
        _cancel: CancellationSignal,
    ) -> Result<OrderId, HandlerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if command.sku.is_empty() {
            return Err(Box::new(OrderError::EmptySku));
        }
        Ok(OrderId(u64::from(command.quantity)))
    }
}

/// id 404 で NotFound を返す GetOrder handler
#[derive(Default, Clone)]
pub struct GetOrderHandler {
    pub calls: Arc<AtomicUsize>,
}

#[async_trait]
impl QueryHandler<GetOrder> for GetOrderHandler {
    async fn handle(&self, query: GetOrder, _cancel: CancellationSignal) -> Result<String, HandlerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if query.id == 404 {
            return Err(Box::new(OrderError::NotFound(query.id)));
        }
        Ok(format!("order-{}", query.id))
    }
}

/// 互いに別の型になる Query（並行 dispatch の検証用）
#[derive(Debug)]
pub struct Echo<const N: usize> {
    pub value: u64,
}

impl<const N: usize> Query for Echo<N> {
    type Output = (usize, u64);
}

pub struct EchoHandler<const N: usize>;

#[async_trait]
impl<const N: usize> QueryHandler<Echo<N>> for EchoHandler<N> {
    async fn handle(&self, query: Echo<N>, _cancel: CancellationSignal) -> Result<(usize, u64), HandlerError> {
        // 完了順を入れ替えるため N ごとに待ち時間を変える
        tokio::time::sleep(Duration::from_millis(((7 - N % 8) * 3) as u64)).await;
        Ok((N, query.value))
    }
}

/// cancel されるまで待ち、観測した状態を返す
#[derive(Debug)]
pub struct WaitForCancel;

impl Query for WaitForCancel {
    type Output = bool;
}

pub struct WaitForCancelHandler;

#[async_trait]
impl QueryHandler<WaitForCancel> for WaitForCancelHandler {
    async fn handle(&self, _query: WaitForCancel, cancel: CancellationSignal) -> Result<bool, HandlerError> {
        let _ = tokio::time::timeout(Duration::from_secs(1), cancel.cancelled()).await;
        Ok(cancel.is_cancelled())
    }
}

/// lookup 呼び出し回数を数える HandlerLookup
pub struct CountingLookup {
    pub inner: HandlerRegistry,
    pub lookups: AtomicUsize,
}

impl CountingLookup {
    pub fn new(inner: HandlerRegistry) -> Self {
        Self {
            inner,
            lookups: AtomicUsize::new(0),
        }
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl HandlerLookup for CountingLookup {
    fn lookup(&self, key: &DispatchKey) -> Option<Arc<dyn DynHandler>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.lookup(key)
    }

    fn codec(&self, name: &str) -> Option<PayloadCodec> {
        self.inner.codec(name)
    }
}

/// どの key にも同じ entry を返す、誤設定された registry
pub struct MisconfiguredLookup {
    pub entry: Arc<dyn DynHandler>,
}

impl HandlerLookup for MisconfiguredLookup {
    fn lookup(&self, _key: &DispatchKey) -> Option<Arc<dyn DynHandler>> {
        Some(self.entry.clone())
    }
}

/// 任意の signature を名乗り、固定の出力を返す DynHandler
pub struct ImpostorHandler {
    pub signature: DispatchKey,
    pub output: fn() -> Box<dyn Any + Send>,
    pub reject: bool,
    pub calls: Arc<AtomicUsize>,
}

impl ImpostorHandler {
    /// `signature` を名乗り、呼ばれたら `output` を返す
    pub fn claiming(signature: DispatchKey, output: fn() -> Box<dyn Any + Send>) -> Self {
        Self {
            signature,
            output,
            reject: false,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn rejecting(signature: DispatchKey) -> Self {
        Self {
            reject: true,
            ..Self::claiming(signature, || -> Box<dyn Any + Send> { Box::new(()) })
        }
    }
}

#[async_trait]
impl DynHandler for ImpostorHandler {
    fn signature(&self) -> DispatchKey {
        self.signature
    }

    async fn handle_dyn(
        &self,
        _payload: Box<dyn Any + Send>,
        _cancel: CancellationSignal,
    ) -> Result<Box<dyn Any + Send>, InvokeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.reject {
            return Err(InvokeError::RequestRejected);
        }
        Ok((self.output)())
    }
}
