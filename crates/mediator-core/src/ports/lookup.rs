//! HandlerLookup port - dispatch key から handler を引く

use std::sync::Arc;

use crate::domain::DispatchKey;
use crate::typed::codec::PayloadCodec;
use crate::typed::handler::DynHandler;

/// HandlerLookup は registry に対する問い合わせ契約
///
/// # 契約
/// - 1 つの key に対して返す handler は高々 1 つ（一意性は registry 側の責務）
/// - 並行な読み取りに対して安全であること（`Send + Sync`）
/// - 返す handler が key どおりの shape かは保証しなくてよい。dispatch 時に検査される
///
/// # デフォルト実装
/// - `HandlerRegistry`: 起動時に構築し、以降は不変
pub trait HandlerLookup: Send + Sync {
    fn lookup(&self, key: &DispatchKey) -> Option<Arc<dyn DynHandler>>;

    /// 正規名（`CREATE_ORDER` など）で JSON codec を引く
    fn codec(&self, _name: &str) -> Option<PayloadCodec> {
        None
    }
}
