use crate::domain::value_objects::BookId;
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 蔵書カタログポート
///
/// 貸出コンテキストと蔵書コンテキストの境界を維持する。
/// 貸出コンテキストはBookIDのみを知り、書籍詳細は知らない。
#[async_trait]
pub trait BookCatalog: Send + Sync {
    /// 書籍が存在するか確認する
    ///
    /// 貸出作成時と、訂正で書籍IDが変わる時に使用される。
    async fn exists(&self, book_id: BookId) -> Result<bool>;
}
