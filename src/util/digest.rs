/// アップロード内容のダイジェスト。
///
/// レポートとログを突き合わせるための識別子として使う。
use xxhash_rust::xxh3::xxh3_64;

/// アップロードされたバイト列を XXH3 でハッシュし、16 桁の hex で返す。
#[must_use]
pub(crate) fn upload_digest(bytes: &[u8]) -> String {
    format!("{:016x}", xxh3_64(bytes))
}
