//! In-memory order domain wired through the mediator.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use ulid::Ulid;

use mediator_core::{
    CancellationSignal, Command, CommandHandler, HandlerError, MediatorBuilder, Query,
    QueryHandler, RegistryError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(Ulid);

impl OrderId {
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for OrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Open,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub sku: String,
    pub quantity: u32,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("order {0} not found")]
    NotFound(OrderId),
    #[error("order {0} is already cancelled")]
    AlreadyCancelled(OrderId),
    #[error("request cancelled before the order store was touched")]
    Cancelled,
    #[error("order store lock poisoned")]
    Poisoned,
}

#[derive(Debug, Default)]
pub struct OrderStore {
    orders: Mutex<HashMap<OrderId, Order>>,
}

impl OrderStore {
    fn with_orders<T>(
        &self,
        f: impl FnOnce(&mut HashMap<OrderId, Order>) -> Result<T, OrderError>,
    ) -> Result<T, OrderError> {
        let mut orders = self.orders.lock().map_err(|_| OrderError::Poisoned)?;
        f(&mut orders)
    }
}

fn ensure_live(cancel: &CancellationSignal) -> Result<(), HandlerError> {
    if cancel.is_cancelled() {
        return Err(Box::new(OrderError::Cancelled));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrder {
    pub sku: String,
    pub quantity: u32,
}

impl Command for CreateOrder {
    type Output = OrderId;

    fn validate(&self) -> bool {
        !self.sku.trim().is_empty() && self.quantity > 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelOrder {
    pub id: OrderId,
}

impl Command for CancelOrder {
    type Output = Order;

    fn validate(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetOrder {
    pub id: OrderId,
}

impl Query for GetOrder {
    type Output = Option<Order>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListOrders {}

impl Query for ListOrders {
    type Output = Vec<Order>;
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

pub struct CreateOrderHandler {
    store: Arc<OrderStore>,
}

#[async_trait]
impl CommandHandler<CreateOrder> for CreateOrderHandler {
    async fn handle(
        &self,
        command: CreateOrder,
        cancel: CancellationSignal,
    ) -> Result<OrderId, HandlerError> {
        ensure_live(&cancel)?;
        let order = Order {
            id: OrderId::new(),
            sku: command.sku,
            quantity: command.quantity,
            status: OrderStatus::Open,
            created_at: Utc::now(),
        };
        let id = order.id;
        self.store.with_orders(|orders| {
            orders.insert(id, order);
            Ok(())
        })?;
        info!(order_id = %id, "order created");
        Ok(id)
    }
}

pub struct CancelOrderHandler {
    store: Arc<OrderStore>,
}

#[async_trait]
impl CommandHandler<CancelOrder> for CancelOrderHandler {
    async fn handle(&self, command: CancelOrder, cancel: CancellationSignal) -> Result<Order, HandlerError> {
        ensure_live(&cancel)?;
        let order = self.store.with_orders(|orders| {
            let order = orders
                .get_mut(&command.id)
                .ok_or(OrderError::NotFound(command.id))?;
            if order.status == OrderStatus::Cancelled {
                return Err(OrderError::AlreadyCancelled(command.id));
            }
            order.status = OrderStatus::Cancelled;
            Ok(order.clone())
        })?;
        info!(order_id = %order.id, "order cancelled");
        Ok(order)
    }
}

pub struct GetOrderHandler {
    store: Arc<OrderStore>,
}

#[async_trait]
impl QueryHandler<GetOrder> for GetOrderHandler {
    async fn handle(&self, query: GetOrder, cancel: CancellationSignal) -> Result<Option<Order>, HandlerError> {
        ensure_live(&cancel)?;
        Ok(self
            .store
            .with_orders(|orders| Ok(orders.get(&query.id).cloned()))?)
    }
}

pub struct ListOrdersHandler {
    store: Arc<OrderStore>,
}

#[async_trait]
impl QueryHandler<ListOrders> for ListOrdersHandler {
    async fn handle(&self, _query: ListOrders, cancel: CancellationSignal) -> Result<Vec<Order>, HandlerError> {
        ensure_live(&cancel)?;
        let mut orders = self
            .store
            .with_orders(|orders| Ok(orders.values().cloned().collect::<Vec<_>>()))?;
        orders.sort_by_key(|order| order.created_at);
        Ok(orders)
    }
}

/// 全 order handler を JSON ルート付きで登録した builder
pub fn builder(store: Arc<OrderStore>) -> Result<MediatorBuilder, RegistryError> {
    Ok(MediatorBuilder::new()
        .command_json::<CreateOrder, _>(CreateOrderHandler {
            store: store.clone(),
        })?
        .command_json::<CancelOrder, _>(CancelOrderHandler {
            store: store.clone(),
        })?
        .query_json::<GetOrder, _>(GetOrderHandler {
            store: store.clone(),
        })?
        .query_json::<ListOrders, _>(ListOrdersHandler { store })?
        .expect_command::<CreateOrder>()
        .expect_command::<CancelOrder>()
        .expect_query::<GetOrder>()
        .expect_query::<ListOrders>())
}
