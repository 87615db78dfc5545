use crate::domain::value_objects::BookId;
use crate::ports::book_catalog::{BookCatalog as BookCatalogTrait, Result};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Mutex;

/// BookCatalogのモック実装
///
/// 書籍IDを保存することで状態を持ったテストをサポート。
pub struct BookCatalog {
    books: Mutex<HashSet<BookId>>,
}

impl BookCatalog {
    pub fn new() -> Self {
        Self {
            books: Mutex::new(HashSet::new()),
        }
    }

    /// テスト用に書籍を登録
    pub fn add_book(&self, book_id: BookId) {
        self.books.lock().unwrap().insert(book_id);
    }
}

impl Default for BookCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BookCatalogTrait for BookCatalog {
    /// 登録された書籍かチェック
    async fn exists(&self, book_id: BookId) -> Result<bool> {
        Ok(self.books.lock().unwrap().contains(&book_id))
    }
}
