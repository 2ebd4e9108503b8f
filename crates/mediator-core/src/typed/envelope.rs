//! RequestEnvelope - 型消去されたリクエストと、その宣言 key
//!
//! typed な `send_command` / `send_query` も、名前ベースの `send_json` も、
//! 最終的にはこの envelope を `Mediator::dispatch` に渡す。

use std::any::Any;
use std::fmt;

use crate::domain::{Command, DispatchKey, Query, RequestType};

type ValidateFn = fn(&(dyn Any + Send)) -> bool;

pub struct RequestEnvelope {
    /// リクエスト型自身が trait 実装で宣言した key
    declared: DispatchKey,
    payload: Box<dyn Any + Send>,
    validate: Option<ValidateFn>,
}

impl RequestEnvelope {
    pub fn command<C: Command>(command: C) -> Self {
        Self {
            declared: DispatchKey::command::<C>(),
            payload: Box::new(command),
            validate: Some(validate_command::<C>),
        }
    }

    pub fn query<Q: Query>(query: Q) -> Self {
        Self {
            declared: DispatchKey::query::<Q>(),
            payload: Box::new(query),
            validate: None,
        }
    }

    /// 宣言 key と payload を別々に受け取る（緩く型付けされた producer 用）
    ///
    /// payload の実際の型が `declared.request` と一致するかは dispatch 時に検査される。
    /// validation hook は持たない。
    pub fn from_raw(declared: DispatchKey, payload: Box<dyn Any + Send>) -> Self {
        Self {
            declared,
            payload,
            validate: None,
        }
    }

    pub fn declared(&self) -> DispatchKey {
        self.declared
    }

    pub fn request_type(&self) -> RequestType {
        self.declared.request
    }

    /// payload の実際の型が宣言どおりか
    pub fn payload_matches(&self) -> bool {
        (*self.payload).type_id() == self.declared.request.id()
    }

    /// `Command::validate()` の結果。hook が無ければ None
    pub fn validate(&self) -> Option<bool> {
        self.validate.map(|validate| validate(&*self.payload))
    }

    pub fn into_payload(self) -> Box<dyn Any + Send> {
        self.payload
    }
}

impl fmt::Debug for RequestEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestEnvelope")
            .field("declared", &self.declared)
            .field("validates", &self.validate.is_some())
            .finish_non_exhaustive()
    }
}

fn validate_command<C: Command>(payload: &(dyn Any + Send)) -> bool {
    payload.downcast_ref::<C>().is_some_and(C::validate)
}
