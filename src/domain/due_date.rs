use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveTime, Utc, Weekday};

/// 貸出期間（日数）
pub const LOAN_PERIOD_DAYS: i64 = 30;

/// 時刻部分を切り捨てて0時に揃える
///
/// 日付の比較と日数差の計算を呼び出し元の時刻に依存させないために使う。
pub fn start_of_day(at: DateTime<Utc>) -> DateTime<Utc> {
    at.date_naive().and_time(NaiveTime::MIN).and_utc()
}

/// 呼び出し元の暦日の0時
///
/// 日付は呼び出し元の現地時間で決まる。オフセットは保持せず、
/// その暦日の0時をUTC表記で返す。
pub fn start_of_caller_day(at: DateTime<FixedOffset>) -> DateTime<Utc> {
    at.date_naive().and_time(NaiveTime::MIN).and_utc()
}

/// 純粋関数：返却期限を計算する
///
/// ビジネスルール：
/// - 貸出日 + 30日
/// - 土曜日なら2日後（月曜日）に繰り下げ
/// - 日曜日なら1日後（月曜日）に繰り下げ
/// - 結果は0時に正規化
///
/// 失敗しない。
pub fn compute_due_date(loan_date: DateTime<Utc>) -> DateTime<Utc> {
    let due = start_of_day(loan_date) + Duration::days(LOAN_PERIOD_DAYS);

    match due.weekday() {
        Weekday::Sat => due + Duration::days(2),
        Weekday::Sun => due + Duration::days(1),
        _ => due,
    }
}
