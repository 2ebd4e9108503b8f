//! Cancellation - 「呼び出し側はもう結果を必要としない」ことを伝えるシグナル
//!
//! mediator はシグナルを解釈せず handler にそのまま渡す。
//! 中止するか最後まで走るかは handler の契約。

use tokio::sync::watch;

/// CancellationSource はシグナルの発行側
///
/// # 使用例
/// ```ignore
/// let source = CancellationSource::new();
/// let pending = mediator.send_query(GetOrder { id }, source.signal());
/// source.cancel();
/// ```
#[derive(Debug)]
pub struct CancellationSource {
    tx: watch::Sender<bool>,
}

impl CancellationSource {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    /// このソースに紐づくシグナルを作成
    pub fn signal(&self) -> CancellationSignal {
        CancellationSignal {
            rx: Some(self.tx.subscribe()),
        }
    }

    /// キャンセルを通知（受信側がいなくても状態は残る）
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for CancellationSource {
    fn default() -> Self {
        Self::new()
    }
}

/// CancellationSignal は受信側（clone して複数の handler に渡せる）
#[derive(Debug, Clone, Default)]
pub struct CancellationSignal {
    rx: Option<watch::Receiver<bool>>,
}

impl CancellationSignal {
    /// 決してキャンセルされないシグナル
    pub fn none() -> Self {
        Self { rx: None }
    }

    pub fn is_cancelled(&self) -> bool {
        self.rx.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// キャンセルされるまで待つ
    ///
    /// ソースがキャンセルせずに drop された場合は永久に完了しない。
    pub async fn cancelled(&self) {
        let Some(rx) = &self.rx else {
            return std::future::pending().await;
        };
        let mut rx = rx.clone();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                return std::future::pending().await;
            }
        }
    }
}
