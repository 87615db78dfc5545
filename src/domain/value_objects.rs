use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::LoanDomainError;

/// 貸出ID - ストアが採番する
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LoanId(Uuid);

impl LoanId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl Default for LoanId {
    fn default() -> Self {
        Self::new()
    }
}

/// 書籍ID - 蔵書カタログへの参照
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookId(Uuid);

impl BookId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl Default for BookId {
    fn default() -> Self {
        Self::new()
    }
}

/// 利用者ID - 借り手アカウントへの参照
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(Uuid);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

/// 貸出ステータス
///
/// 取りうる値は3つのみ。文字列からの変換はシステム境界でだけ行う。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoanStatus {
    /// 貸出中（初期状態）
    OnLoan,
    /// 返却済み（終端）
    Returned,
    /// 紛失（終端）
    Lost,
}

impl LoanStatus {
    /// 文字列表現を取得する
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::OnLoan => "on-loan",
            LoanStatus::Returned => "returned",
            LoanStatus::Lost => "lost",
        }
    }

    /// 通常フローでこれ以上遷移しない状態か
    pub fn is_terminal(&self) -> bool {
        !matches!(self, LoanStatus::OnLoan)
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LoanStatus {
    type Err = LoanDomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "on-loan" => Ok(LoanStatus::OnLoan),
            "returned" => Ok(LoanStatus::Returned),
            "lost" => Ok(LoanStatus::Lost),
            other => Err(LoanDomainError::InvalidStatus(other.to_string())),
        }
    }
}

/// 延滞料金
///
/// 不変条件：
/// - 0以上、`Fine::max()` 以下（保存先は NUMERIC(8, 2)）
/// - 小数点以下2桁（通貨単位）
///
/// 範囲外の値は型の外に追い出し、`TryFrom<Decimal>`でのみ検証付きで作成できる。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Fine(Decimal);

impl Fine {
    /// 上限（セント）
    pub const MAX_CENTS: u64 = 99_999_999;

    /// 料金なし
    pub fn zero() -> Self {
        Self(Decimal::new(0, 2))
    }

    /// 保存できる最大の料金（999999.99）
    pub fn max() -> Self {
        Self::from_cents(Self::MAX_CENTS)
    }

    /// 最小通貨単位（セント）から作成する。上限を超える分は切り捨てる。
    pub fn from_cents(cents: u64) -> Self {
        let cents = cents.min(Self::MAX_CENTS);
        Self(Decimal::from(cents) / Decimal::ONE_HUNDRED).round_two_places()
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl Fine {
    fn round_two_places(self) -> Self {
        let mut rounded = self
            .0
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        rounded.rescale(2);
        Self(rounded)
    }
}

impl Default for Fine {
    fn default() -> Self {
        Self::zero()
    }
}

impl TryFrom<Decimal> for Fine {
    type Error = LoanDomainError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(LoanDomainError::NegativeFine(value));
        }
        let fine = Self(value).round_two_places();
        if fine > Self::max() {
            return Err(LoanDomainError::FineTooLarge(value));
        }
        Ok(fine)
    }
}

impl From<Fine> for Decimal {
    fn from(fine: Fine) -> Self {
        fine.0
    }
}

impl std::fmt::Display for Fine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_loan_id_creation() {
        let id1 = LoanId::new();
        let id2 = LoanId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_loan_id_from_uuid() {
        let uuid = Uuid::new_v4();
        let id = LoanId::from_uuid(uuid);
        assert_eq!(id.value(), uuid);
    }

    #[test]
    fn test_book_and_user_id_creation() {
        assert_ne!(BookId::new(), BookId::new());
        assert_ne!(UserId::new(), UserId::new());
    }

    #[test]
    fn test_status_round_trips_through_str() {
        for status in [LoanStatus::OnLoan, LoanStatus::Returned, LoanStatus::Lost] {
            assert_eq!(LoanStatus::from_str(status.as_str()).unwrap(), status);
        }
    }

    #[test]
    fn test_status_rejects_unknown_value() {
        let result = LoanStatus::from_str("overdue");
        assert_eq!(
            result.unwrap_err(),
            LoanDomainError::InvalidStatus("overdue".to_string())
        );
    }

    #[test]
    fn test_status_serializes_kebab_case() {
        let json = serde_json::to_string(&LoanStatus::OnLoan).unwrap();
        assert_eq!(json, "\"on-loan\"");

        let parsed: LoanStatus = serde_json::from_str("\"lost\"").unwrap();
        assert_eq!(parsed, LoanStatus::Lost);
    }

    #[test]
    fn test_only_on_loan_is_not_terminal() {
        assert!(!LoanStatus::OnLoan.is_terminal());
        assert!(LoanStatus::Returned.is_terminal());
        assert!(LoanStatus::Lost.is_terminal());
    }

    #[test]
    fn test_fine_rejects_negative() {
        let result = Fine::try_from(Decimal::new(-1, 2));
        assert_eq!(
            result.unwrap_err(),
            LoanDomainError::NegativeFine(Decimal::new(-1, 2))
        );
    }

    #[test]
    fn test_fine_rounds_to_two_places() {
        let fine = Fine::try_from(Decimal::new(12345, 3)).unwrap();
        assert_eq!(fine.value(), Decimal::new(1235, 2));
        assert_eq!(fine.to_string(), "12.35");
    }

    #[test]
    fn test_fine_from_cents() {
        let fine = Fine::from_cents(150);
        assert_eq!(fine.value(), Decimal::new(150, 2));
        assert_eq!(fine.to_string(), "1.50");
    }

    #[test]
    fn test_fine_rejects_values_above_storable_maximum() {
        assert_eq!(Fine::max().to_string(), "999999.99");
        assert_eq!(
            Fine::try_from(Decimal::new(99_999_999, 2)).unwrap(),
            Fine::max()
        );

        let result = Fine::try_from(Decimal::from(10_000_000));
        assert_eq!(
            result.unwrap_err(),
            LoanDomainError::FineTooLarge(Decimal::from(10_000_000))
        );
        // 丸めて上限を超える場合も不可
        assert!(Fine::try_from(Decimal::new(999_999_995, 3)).is_err());
    }

    #[test]
    fn test_fine_from_cents_saturates_at_maximum() {
        assert_eq!(Fine::from_cents(u64::MAX), Fine::max());
        assert_eq!(Fine::from_cents(Fine::MAX_CENTS + 1), Fine::max());
    }

    #[test]
    fn test_fine_zero_is_default() {
        assert!(Fine::default().is_zero());
        assert_eq!(Fine::zero().to_string(), "0.00");
    }
}
