use chrono::{DateTime, Utc};

use super::Fine;

/// 猶予日数（期限後この日数までは料金なし）
pub const GRACE_PERIOD_DAYS: i64 = 1;

/// 1日あたりの延滞料金（セント）
pub const DAILY_FINE_CENTS: u64 = 50;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// 返却期限から実返却日までの日数（端数は切り上げ）
///
/// 期限前の返却は0以下になる。
pub fn days_late(due_date: DateTime<Utc>, actual_return_date: DateTime<Utc>) -> i64 {
    let millis = (actual_return_date - due_date).num_milliseconds();
    // div_euclid は負方向へ丸めるので、符号を反転して切り上げにする
    -((-millis).div_euclid(MILLIS_PER_DAY))
}

/// 純粋関数：延滞料金を計算する
///
/// ビジネスルール：
/// - 期限内、または1日以内の遅れは料金なし（猶予期間）
/// - それ以降は (遅延日数 - 1) × 0.50
/// - 保存できる上限（`Fine::max()`）で頭打ち
///
/// 失敗しない。常に0以上の料金を返す。
pub fn compute_fine(due_date: DateTime<Utc>, actual_return_date: DateTime<Utc>) -> Fine {
    let late = days_late(due_date, actual_return_date);
    if late <= GRACE_PERIOD_DAYS {
        return Fine::zero();
    }

    let chargeable_days = (late - GRACE_PERIOD_DAYS) as u64;
    Fine::from_cents(chargeable_days.saturating_mul(DAILY_FINE_CENTS))
}
