//! HandlerRegistry - Handler の登録と管理
//!
//! # 学習ポイント
//! - HashMap での型消去された trait object の管理
//! - Generic methods での登録と型安全性（key は型パラメータから導出）
//! - Arc による共有所有権

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::codec::PayloadCodec;
use super::handler::{CommandHandler, DynHandler, QueryHandler, TypedCommandHandler, TypedQueryHandler};
use crate::domain::{Command, DispatchKey, Query};
use crate::ports::HandlerLookup;

/// HandlerRegistry は型付き Handler を登録・管理
///
/// # 使用例
/// ```ignore
/// let mut registry = HandlerRegistry::new();
/// registry.register_command::<CreateOrder, _>(CreateOrderHandler::new(store))?;
///
/// let mediator = Mediator::new(Arc::new(registry));
/// ```
///
/// # 設計
/// - 起動時に構築（mutable）
/// - 実行時は不変（`&self` の lookup のみ）なのでロック不要
/// - 登録は型パラメータで検査されるため、key と handler の signature は必ず一致する
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<DispatchKey, Arc<dyn DynHandler>>,
    codecs: HashMap<String, PayloadCodec>,
}

/// RegistryError は HandlerRegistry の操作エラー
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Handler for {0} is already registered")]
    AlreadyRegistered(DispatchKey),

    #[error("Request name '{0}' is already routed to another request type")]
    DuplicateName(String),
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            codecs: HashMap::new(),
        }
    }

    pub fn register_command<C, H>(&mut self, handler: H) -> Result<(), RegistryError>
    where
        C: Command,
        H: CommandHandler<C> + 'static,
    {
        let key = DispatchKey::command::<C>();
        self.ensure_vacant(&key)?;
        self.handlers
            .insert(key, Arc::new(TypedCommandHandler::<C, H>::new(handler)));
        Ok(())
    }

    pub fn register_query<Q, H>(&mut self, handler: H) -> Result<(), RegistryError>
    where
        Q: Query,
        H: QueryHandler<Q> + 'static,
    {
        let key = DispatchKey::query::<Q>();
        self.ensure_vacant(&key)?;
        self.handlers
            .insert(key, Arc::new(TypedQueryHandler::<Q, H>::new(handler)));
        Ok(())
    }

    /// handler を登録し、正規名での JSON ルーティングも有効にする
    pub fn register_command_json<C, H>(&mut self, handler: H) -> Result<(), RegistryError>
    where
        C: Command + DeserializeOwned,
        C::Output: Serialize,
        H: CommandHandler<C> + 'static,
    {
        let codec = PayloadCodec::command::<C>();
        self.ensure_name_vacant(&codec)?;
        self.register_command::<C, H>(handler)?;
        self.codecs.insert(codec.name(), codec);
        Ok(())
    }

    pub fn register_query_json<Q, H>(&mut self, handler: H) -> Result<(), RegistryError>
    where
        Q: Query + DeserializeOwned,
        Q::Output: Serialize,
        H: QueryHandler<Q> + 'static,
    {
        let codec = PayloadCodec::query::<Q>();
        self.ensure_name_vacant(&codec)?;
        self.register_query::<Q, H>(handler)?;
        self.codecs.insert(codec.name(), codec);
        Ok(())
    }

    pub fn get(&self, key: &DispatchKey) -> Option<Arc<dyn DynHandler>> {
        self.handlers.get(key).cloned()
    }

    pub fn contains(&self, key: &DispatchKey) -> bool {
        self.handlers.contains_key(key)
    }

    pub fn registered_keys(&self) -> Vec<DispatchKey> {
        self.handlers.keys().copied().collect()
    }

    /// JSON ルーティング可能な正規名（ソート済み）
    pub fn route_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.codecs.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    fn ensure_vacant(&self, key: &DispatchKey) -> Result<(), RegistryError> {
        if self.handlers.contains_key(key) {
            return Err(RegistryError::AlreadyRegistered(*key));
        }
        Ok(())
    }

    fn ensure_name_vacant(&self, codec: &PayloadCodec) -> Result<(), RegistryError> {
        let name = codec.name();
        if self.codecs.contains_key(&name) {
            return Err(RegistryError::DuplicateName(name));
        }
        Ok(())
    }
}

impl HandlerLookup for HandlerRegistry {
    fn lookup(&self, key: &DispatchKey) -> Option<Arc<dyn DynHandler>> {
        self.get(key)
    }

    fn codec(&self, name: &str) -> Option<PayloadCodec> {
        self.codecs.get(name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typed::fixtures::{CreateOrder, CreateOrderHandler, GetOrder, GetOrderHandler};

    #[test]
    fn test_register_and_get() {
        let mut registry = HandlerRegistry::new();
        registry
            .register_command::<CreateOrder, _>(CreateOrderHandler::default())
            .unwrap();

        let key = DispatchKey::command::<CreateOrder>();
        let handler = registry.get(&key).unwrap();
        assert_eq!(handler.signature(), key);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_double_registration() {
        let mut registry = HandlerRegistry::new();
        registry
            .register_command::<CreateOrder, _>(CreateOrderHandler::default())
            .unwrap();
        let result = registry.register_command::<CreateOrder, _>(CreateOrderHandler::default());
        assert!(matches!(
            result,
            Err(RegistryError::AlreadyRegistered(key)) if key == DispatchKey::command::<CreateOrder>()
        ));
    }

    #[test]
    fn test_command_and_query_are_kept_apart() {
        let mut registry = HandlerRegistry::new();
        registry
            .register_command::<CreateOrder, _>(CreateOrderHandler::default())
            .unwrap();
        registry
            .register_query::<GetOrder, _>(GetOrderHandler::default())
            .unwrap();

        assert!(registry.contains(&DispatchKey::command::<CreateOrder>()));
        assert!(registry.contains(&DispatchKey::query::<GetOrder>()));
        assert_eq!(registry.registered_keys().len(), 2);
    }

    #[test]
    fn test_missing_key_returns_none() {
        let registry = HandlerRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.lookup(&DispatchKey::query::<GetOrder>()).is_none());
    }

    #[test]
    fn test_json_registration_exposes_route() {
        let mut registry = HandlerRegistry::new();
        registry
            .register_command_json::<CreateOrder, _>(CreateOrderHandler::default())
            .unwrap();
        registry
            .register_query_json::<GetOrder, _>(GetOrderHandler::default())
            .unwrap();

        assert_eq!(registry.route_names(), vec!["CREATE_ORDER", "GET_ORDER"]);
        let codec = registry.codec("GET_ORDER").unwrap();
        assert_eq!(codec.key(), DispatchKey::query::<GetOrder>());
        assert!(registry.codec("DELETE_ORDER").is_none());
    }

    #[test]
    fn test_json_duplicate_leaves_registry_unchanged() {
        let mut registry = HandlerRegistry::new();
        registry
            .register_query_json::<GetOrder, _>(GetOrderHandler::default())
            .unwrap();
        let result = registry.register_query_json::<GetOrder, _>(GetOrderHandler::default());
        assert!(matches!(result, Err(RegistryError::DuplicateName(name)) if name == "GET_ORDER"));
        assert_eq!(registry.len(), 1);
    }
}
