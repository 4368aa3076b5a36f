//! 位置属性管道指标
//!
//! 由 dispatcher 与 attribute_cache 调用；未安装 recorder 时为空操作。

use contracts::AttributeKey;
use metrics::counter;

/// 记录收到一条更新通知
pub fn record_notification_received() {
    counter!("position_notifications_total").increment(1);
}

/// 记录一次解码失败
///
/// `kind` 为 `DecodeError::kind()` 的稳定标签。
pub fn record_decode_failure(kind: &'static str) {
    counter!("position_decode_failures_total", "kind" => kind).increment(1);
}

/// 记录一次缓存写入
pub fn record_value_written(key: AttributeKey) {
    counter!("position_values_written_total", "attribute" => key.name()).increment(1);
}

/// 记录一次 `snapshot_all()` 查询
pub fn record_snapshot_query() {
    counter!("position_snapshot_queries_total").increment(1);
}
