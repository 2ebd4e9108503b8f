//! Ports - 抽象化レイヤー
//!
//! dispatch エンジンが外部コラボレータに求める契約を定義します。
//! handler の登録（DI）そのものはこの crate の外側の責務で、
//! エンジンは「key を渡すと 0 または 1 個の handler が返る」ことだけを仮定します。

pub mod lookup;

pub use self::lookup::HandlerLookup;
