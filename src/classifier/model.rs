// 学習済み tf-idf ベクトライザと線形分類器を束ねた凍結モデル。
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rustc_hash::FxHashMap;
use serde::Deserialize;

use super::SentimentClassifier;

/// モデル成果物のシリアライズ形式。
///
/// 形式の所有者は学習側のコラボレータであり、本サービスは
/// 「ロード可能で transform/predict 相当の操作を備える」以上を要求しない。
#[derive(Debug, Deserialize)]
struct ModelArtifact {
    vocabulary: Vec<String>,
    #[serde(default)]
    idf: Vec<f32>,
    labels: Vec<String>,
    weights: Vec<Vec<f32>>,
    bias: Vec<f32>,
}

impl ModelArtifact {
    fn validate(&self) -> Result<()> {
        anyhow::ensure!(!self.labels.is_empty(), "label set is empty");
        anyhow::ensure!(!self.vocabulary.is_empty(), "vocabulary is empty");
        anyhow::ensure!(
            self.weights.len() == self.labels.len(),
            "weight matrix row count mismatch"
        );
        for row in &self.weights {
            anyhow::ensure!(
                row.len() == self.vocabulary.len(),
                "weight row length mismatch"
            );
        }
        anyhow::ensure!(self.bias.len() == self.labels.len(), "bias length mismatch");
        if !self.idf.is_empty() {
            anyhow::ensure!(
                self.idf.len() == self.vocabulary.len(),
                "idf vector length mismatch"
            );
        }
        Ok(())
    }
}

/// 起動時に一度だけロードされる線形感情モデル。
#[derive(Debug)]
pub struct LinearModel {
    labels: Vec<String>,
    vocab_index: FxHashMap<String, usize>,
    idf: Option<Vec<f32>>,
    weights: Vec<Vec<f32>>,
    bias: Vec<f32>,
}

impl LinearModel {
    /// JSON 重みファイルからモデルをロードし、構造を検証する。
    ///
    /// # Errors
    /// ファイルが読めない、JSON が壊れている、または次元が一致しない場合は
    /// エラーを返す。起動時の失敗は致命的で、リクエストは一切処理されない。
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = fs::read_to_string(path.as_ref())
            .with_context(|| format!("failed to read model weights from {:?}", path.as_ref()))?;
        let artifact: ModelArtifact =
            serde_json::from_str(&raw).context("failed to parse model weights json")?;
        artifact.validate()?;

        let vocab_index = artifact
            .vocabulary
            .iter()
            .enumerate()
            .map(|(idx, term)| (term.clone(), idx))
            .collect();
        let idf = if artifact.idf.is_empty() {
            None
        } else {
            Some(artifact.idf)
        };

        Ok(Self {
            labels: artifact.labels,
            vocab_index,
            idf,
            weights: artifact.weights,
            bias: artifact.bias,
        })
    }

    /// 正規化済みテキストを疎な tf-idf 特徴量に変換する。
    ///
    /// 語彙外のトークンは単に無視される（ゼロ寄与）。idf ベクトルを持つ
    /// 成果物では tf×idf を L2 正規化し、学習側のベクトライザ規約に合わせる。
    fn vectorize(&self, text: &str) -> FxHashMap<usize, f32> {
        let mut features: FxHashMap<usize, f32> = FxHashMap::default();
        for token in text.split_whitespace() {
            if let Some(&idx) = self.vocab_index.get(token) {
                *features.entry(idx).or_insert(0.0) += 1.0;
            }
        }

        if let Some(idf) = &self.idf {
            for (idx, value) in &mut features {
                *value *= idf[*idx];
            }
        }

        let norm: f32 = features.values().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in features.values_mut() {
                *value /= norm;
            }
        }

        features
    }

    /// 特徴量をスコアリングし、最大スコアのラベル番号を返す。
    ///
    /// 同率の場合はラベル番号の小さい方を採用する（決定的）。
    fn predict_index(&self, features: &FxHashMap<usize, f32>) -> usize {
        let mut best = 0;
        let mut best_score = f32::NEG_INFINITY;
        for (label_idx, row) in self.weights.iter().enumerate() {
            let mut score = self.bias[label_idx];
            for (&feature_idx, &value) in features {
                score += value * row[feature_idx];
            }
            if score > best_score {
                best = label_idx;
                best_score = score;
            }
        }
        best
    }
}

impl SentimentClassifier for LinearModel {
    fn labels(&self) -> &[String] {
        &self.labels
    }

    fn classify(&self, texts: &[String]) -> Vec<String> {
        texts
            .iter()
            .map(|text| {
                let features = self.vectorize(text);
                self.labels[self.predict_index(&features)].clone()
            })
            .collect()
    }
}
