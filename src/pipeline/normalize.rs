//! 入力レコードのテキスト正規化。
//!
//! 正規化は純粋関数であり、同じ入力は常に同じ出力を生む（分類の決定性の前提）。
use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

// URL らしきトークン（http/https/www から次の空白まで）を除去する。
static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"http\S+|www\S+|https\S+").expect("url regex"));
// 単語構成文字（英数字とアンダースコア）以外を空白に置換する。
static NON_WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\W").expect("non-word regex"));
// 連続する空白を 1 つに潰す。
static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace regex"));

/// 生テキストを正規化済みの小文字テキストへ変換する。
///
/// NFC 正規化 → 小文字化 → URL 除去 → 非単語文字の空白化 → 空白圧縮 → トリム。
/// 冪等であり、`normalize(normalize(x)) == normalize(x)` が成り立つ。
#[must_use]
pub fn normalize(text: &str) -> String {
    let composed = text.nfc().collect::<String>();
    let lowered = composed.to_lowercase();
    let without_urls = URL_RE.replace_all(&lowered, "");
    let words_only = NON_WORD_RE.replace_all(&without_urls, " ");
    let collapsed = WHITESPACE_RE.replace_all(&words_only, " ");
    collapsed.trim().to_string()
}
