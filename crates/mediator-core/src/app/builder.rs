//! MediatorBuilder - 起動時のワイヤリング
//!
//! # 学習ポイント
//! - Builder パターンの実装
//! - 起動時検証（Fail-fast 設計）
//! - 開発体験の改善（明確なエラーメッセージ）

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::config::MediatorConfig;
use super::mediator::Mediator;
use crate::domain::{Command, DispatchKey, Query};
use crate::typed::{CommandHandler, HandlerRegistry, QueryHandler, RegistryError};

/// MediatorBuilder は registry を組み立てて Mediator を生成
///
/// # 使用例
/// ```ignore
/// let mediator = MediatorBuilder::new()
///     .command::<CreateOrder, _>(CreateOrderHandler::new(store.clone()))?
///     .query::<GetOrder, _>(GetOrderHandler::new(store))?
///     .expect_command::<CreateOrder>()
///     .expect_query::<GetOrder>()
///     .build()?;
/// ```
///
/// # Fail-fast 設計
/// - `expect_*()` で必須の handler を宣言
/// - `build()` 時に「期待集合 ⊆ 登録済み集合」をチェック
/// - 不足があれば最初の send を待たずに BuildError を返す
pub struct MediatorBuilder {
    registry: HandlerRegistry,
    expected: Vec<DispatchKey>,
    config: MediatorConfig,
}

/// BuildError は Mediator 構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Missing handlers: {0:?}. These requests were expected but not registered.")]
    MissingHandlers(Vec<String>),
}

impl MediatorBuilder {
    pub fn new() -> Self {
        Self {
            registry: HandlerRegistry::new(),
            expected: Vec::new(),
            config: MediatorConfig::default(),
        }
    }

    pub fn command<C, H>(mut self, handler: H) -> Result<Self, RegistryError>
    where
        C: Command,
        H: CommandHandler<C> + 'static,
    {
        self.registry.register_command::<C, H>(handler)?;
        Ok(self)
    }

    pub fn query<Q, H>(mut self, handler: H) -> Result<Self, RegistryError>
    where
        Q: Query,
        H: QueryHandler<Q> + 'static,
    {
        self.registry.register_query::<Q, H>(handler)?;
        Ok(self)
    }

    /// handler を登録し、正規名での JSON ルーティングも有効にする
    pub fn command_json<C, H>(mut self, handler: H) -> Result<Self, RegistryError>
    where
        C: Command + DeserializeOwned,
        C::Output: Serialize,
        H: CommandHandler<C> + 'static,
    {
        self.registry.register_command_json::<C, H>(handler)?;
        Ok(self)
    }

    pub fn query_json<Q, H>(mut self, handler: H) -> Result<Self, RegistryError>
    where
        Q: Query + DeserializeOwned,
        Q::Output: Serialize,
        H: QueryHandler<Q> + 'static,
    {
        self.registry.register_query_json::<Q, H>(handler)?;
        Ok(self)
    }

    pub fn expect_command<C: Command>(mut self) -> Self {
        self.expected.push(DispatchKey::command::<C>());
        self
    }

    pub fn expect_query<Q: Query>(mut self) -> Self {
        self.expected.push(DispatchKey::query::<Q>());
        self
    }

    pub fn config(mut self, config: MediatorConfig) -> Self {
        self.config = config;
        self
    }

    /// 構築前の registry（登録済みの名前を表示する場合など）
    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// # 検証
    /// - `expect_*()` で宣言された key が全て登録されているかチェック
    /// - 不足があれば BuildError::MissingHandlers を返す
    pub fn build(self) -> Result<Mediator, BuildError> {
        let missing: Vec<String> = self
            .expected
            .iter()
            .filter(|key| !self.registry.contains(key))
            .map(|key| key.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(BuildError::MissingHandlers(missing));
        }
        Ok(Mediator::with_config(Arc::new(self.registry), self.config))
    }
}

impl Default for MediatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
