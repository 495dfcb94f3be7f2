//! 感情分類のための高水準API。
//!
//! 分類器は学習済みの凍結されたモデルであり、本サービスは学習も更新も行わない。
//! パイプラインはこのトレイト越しに分類器を注入されるため、テストでは
//! 決定的なスタブに差し替えられる。
mod model;

pub use model::LinearModel;

/// 凍結済み感情分類器のインターフェース。
pub trait SentimentClassifier: Send + Sync {
    /// モデルが学習したラベル集合。デプロイごとに 2 クラスにも 4 クラスにもなる。
    fn labels(&self) -> &[String];

    /// 正規化済みテキスト列を分類する。
    ///
    /// 返り値は入力と同じ長さ・同じ順序。語彙外の語はゼロ寄与として扱われ、
    /// エラーにはならない。
    fn classify(&self, texts: &[String]) -> Vec<String>;
}
