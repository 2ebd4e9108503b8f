//! DispatchKey - (capability kind, request type, result type) の組
//!
//! # 学習ポイント
//! - `TypeId` による安定した型識別子
//! - 比較・ハッシュは `TypeId` のみ、`type_name` は診断表示用

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

use super::naming;
use super::request::{CapabilityKind, Command, Query};

/// TypeTag は型識別子と診断用の型名の組
#[derive(Debug, Clone, Copy)]
pub struct TypeTag {
    id: TypeId,
    name: &'static str,
}

impl TypeTag {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    /// 完全修飾の型名（`std::any::type_name`）
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// パスを除いた短い型名
    pub fn short_name(&self) -> &'static str {
        naming::strip_path(self.name)
    }

    /// UPPER_SNAKE_CASE の正規名
    pub fn canonical_name(&self) -> String {
        naming::to_upper_snake_case(self.short_name())
    }
}

impl PartialEq for TypeTag {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeTag {}

impl Hash for TypeTag {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// リクエストの具象型
pub type RequestType = TypeTag;

/// リクエストが宣言する結果型
pub type ResultType = TypeTag;

/// DispatchKey は handler を引くための合成キー（lookup 専用、永続化しない）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DispatchKey {
    pub kind: CapabilityKind,
    pub request: RequestType,
    pub result: ResultType,
}

impl DispatchKey {
    pub fn new(kind: CapabilityKind, request: RequestType, result: ResultType) -> Self {
        Self {
            kind,
            request,
            result,
        }
    }

    pub fn command<C: Command>() -> Self {
        Self::new(
            CapabilityKind::Command,
            TypeTag::of::<C>(),
            TypeTag::of::<C::Output>(),
        )
    }

    pub fn query<Q: Query>() -> Self {
        Self::new(
            CapabilityKind::Query,
            TypeTag::of::<Q>(),
            TypeTag::of::<Q::Output>(),
        )
    }
}

impl fmt::Display for DispatchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} -> {}", self.kind, self.request, self.result)
    }
}
