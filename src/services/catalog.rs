//! Book catalog service

use crate::{
    error::{AppError, AppResult},
    models::{Book, BookPatch, CreateBook},
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list_books(&self) -> AppResult<Vec<Book>> {
        self.repository.books.list().await
    }

    pub async fn get_book(&self, id: i32) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await
    }

    /// Add a book to the catalog
    pub async fn create_book(&self, book: CreateBook) -> AppResult<Book> {
        if self.repository.books.isbn_exists(&book.isbn, None).await? {
            return Err(AppError::Conflict(format!(
                "A book with ISBN {} already exists",
                book.isbn
            )));
        }
        self.repository.books.create(&book).await
    }

    /// Partially update a catalog record
    pub async fn update_book(&self, id: i32, patch: BookPatch) -> AppResult<Book> {
        if patch.is_empty() {
            return Err(AppError::BadRequest(
                "Patch contains no fields to update".to_string(),
            ));
        }
        if let Some(ref isbn) = patch.isbn {
            if self.repository.books.isbn_exists(isbn, Some(id)).await? {
                return Err(AppError::Conflict(format!(
                    "A book with ISBN {} already exists",
                    isbn
                )));
            }
        }
        self.repository.books.update(id, &patch).await
    }

    /// Remove a book from the catalog (refused while open loans reference it)
    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        self.repository.books.delete(id).await
    }
}
