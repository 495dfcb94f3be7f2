/// テキスト処理ユーティリティ。
///
/// 文分割、ハッシング、近似重複検出などを提供します。
use unicode_segmentation::UnicodeSegmentation;
use xxhash_rust::xxh3::xxh3_64;

/// テキストをXXH3でハッシュする。
///
/// XXH3は高速で衝突率が低いハッシュアルゴリズムです。
#[must_use]
pub(crate) fn hash_text(text: &str) -> u64 {
    xxh3_64(text.as_bytes())
}

/// テキストを文に分割する。
///
/// Unicode UAX#29に準拠した文境界検出を使用します。
#[must_use]
pub(crate) fn split_sentences(text: &str) -> Vec<String> {
    text.unicode_sentences()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// ローリングウィンドウでテキストのN文字窓ハッシュを生成する。
///
/// 近似重複検出に使用します。
#[must_use]
pub(crate) fn rolling_hash_windows(text: &str, window_size: usize) -> Vec<u64> {
    if text.len() < window_size {
        return vec![hash_text(text)];
    }

    let chars: Vec<char> = text.chars().collect();
    let mut hashes = Vec::new();

    for window in chars.windows(window_size) {
        let window_text: String = window.iter().collect();
        hashes.push(hash_text(&window_text));
    }

    hashes
}

/// 2つのテキストが近似重複かどうかを判定する。
///
/// # Arguments
/// * `text1` - 最初のテキスト
/// * `text2` - 2番目のテキスト
/// * `window_size` - ローリングウィンドウサイズ
/// * `threshold` - 重複と判定する類似度の閾値（0.0〜1.0）
///
/// # Returns
/// 近似重複の場合はtrue
#[must_use]
pub(crate) fn is_near_duplicate(
    text1: &str,
    text2: &str,
    window_size: usize,
    threshold: f64,
) -> bool {
    if text1.is_empty() || text2.is_empty() {
        return false;
    }

    let hashes1 = rolling_hash_windows(text1, window_size);
    let hashes2 = rolling_hash_windows(text2, window_size);

    if hashes1.is_empty() || hashes2.is_empty() {
        return false;
    }

    // Jaccard類似度を計算
    let set1: std::collections::HashSet<_> = hashes1.into_iter().collect();
    let set2: std::collections::HashSet<_> = hashes2.into_iter().collect();

    let intersection = set1.intersection(&set2).count();
    let union = set1.union(&set2).count();

    if union == 0 {
        return false;
    }

    let similarity = intersection as f64 / union as f64;
    similarity >= threshold
}
