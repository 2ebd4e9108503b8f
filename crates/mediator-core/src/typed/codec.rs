//! PayloadCodec - JSON と RequestEnvelope / 結果の相互変換
//!
//! 名前ベースのルーティング（`Mediator::send_json`）用。
//! 型ごとの decode / encode を登録時に関数ポインタとして固定する。

use std::any::Any;
use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::envelope::RequestEnvelope;
use crate::domain::naming;
use crate::domain::{Command, DispatchKey, Query};

pub use crate::domain::CodecError;

type DecodeFn = fn(Value) -> Result<RequestEnvelope, CodecError>;
type EncodeFn = fn(Box<dyn Any + Send>) -> Result<Value, CodecError>;

/// PayloadCodec は 1 つのリクエスト型の JSON 変換
///
/// # 変換フロー
/// 1. `decode`: JSON → リクエスト型 → RequestEnvelope
/// 2. dispatch
/// 3. `encode`: 結果（`Box<dyn Any>`）→ 結果型 → JSON
#[derive(Clone, Copy)]
pub struct PayloadCodec {
    key: DispatchKey,
    decode: DecodeFn,
    encode: EncodeFn,
}

impl PayloadCodec {
    pub fn command<C>() -> Self
    where
        C: Command + DeserializeOwned,
        C::Output: Serialize,
    {
        Self {
            key: DispatchKey::command::<C>(),
            decode: decode_command::<C>,
            encode: encode_output::<C, C::Output>,
        }
    }

    pub fn query<Q>() -> Self
    where
        Q: Query + DeserializeOwned,
        Q::Output: Serialize,
    {
        Self {
            key: DispatchKey::query::<Q>(),
            decode: decode_query::<Q>,
            encode: encode_output::<Q, Q::Output>,
        }
    }

    pub fn key(&self) -> DispatchKey {
        self.key
    }

    /// ルーティングに使う正規名
    pub fn name(&self) -> String {
        self.key.request.canonical_name()
    }

    pub fn decode(&self, payload: Value) -> Result<RequestEnvelope, CodecError> {
        (self.decode)(payload)
    }

    pub fn encode(&self, output: Box<dyn Any + Send>) -> Result<Value, CodecError> {
        (self.encode)(output)
    }
}

impl fmt::Debug for PayloadCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PayloadCodec").field("key", &self.key).finish()
    }
}

fn decode_command<C: Command + DeserializeOwned>(payload: Value) -> Result<RequestEnvelope, CodecError> {
    serde_json::from_value::<C>(payload)
        .map(RequestEnvelope::command)
        .map_err(|source| CodecError::Decode {
            request: naming::request_name::<C>(),
            source,
        })
}

fn decode_query<Q: Query + DeserializeOwned>(payload: Value) -> Result<RequestEnvelope, CodecError> {
    serde_json::from_value::<Q>(payload)
        .map(RequestEnvelope::query)
        .map_err(|source| CodecError::Decode {
            request: naming::request_name::<Q>(),
            source,
        })
}

fn encode_output<R: 'static, T: Serialize + 'static>(output: Box<dyn Any + Send>) -> Result<Value, CodecError> {
    let output = output
        .downcast::<T>()
        .map_err(|_| CodecError::UnexpectedOutput(naming::request_name::<R>()))?;
    serde_json::to_value(&*output).map_err(|source| CodecError::Encode {
        request: naming::request_name::<R>(),
        source,
    })
}
