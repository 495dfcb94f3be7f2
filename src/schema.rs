//! レポート応答のワイヤ型。
//!
//! プレゼンテーション層（ダッシュボード）が消費する JSON 構造。
use serde::{Deserialize, Serialize};

/// 1 回のアップロードに対する解析レポート全体。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// アップロード内容の XXH3 ダイジェスト。ログとの突き合わせ用。
    pub digest: String,
    /// 取り込まれたレコード数。
    pub record_count: usize,
    /// フィルタ選択後のレコード数。
    pub filtered_count: usize,
    pub distribution: Vec<DistributionEntry>,
    /// フィルタ後の最多カテゴリ。空レポートでは `None`。
    pub dominant: Option<String>,
    pub top_terms: Vec<CategoryTerms>,
    /// 最多カテゴリの頻出語テーブル（ダッシュボードの概観チャート用）。
    pub overview: Vec<TermCount>,
    pub advisories: Vec<Advisory>,
}

/// カテゴリごとの件数と百分率。百分率は非空集合上で合計 100 になる。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionEntry {
    pub sentiment: String,
    pub count: usize,
    pub percent: f64,
}

/// カテゴリ単位の頻出語テーブル。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTerms {
    pub sentiment: String,
    pub terms: Vec<TermCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermCount {
    pub term: String,
    pub count: u64,
}

/// カテゴリ別の定型アドバイス。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advisory {
    pub sentiment: String,
    pub lines: Vec<String>,
}
