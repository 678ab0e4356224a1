use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum FilterError {
    #[error("Invalid sort column: {0}")]
    InvalidSortColumn(String),

    #[error("Invalid sort direction: {0}")]
    InvalidSortDirection(String),

    #[error("Invalid page: {0}")]
    InvalidPage(String),

    #[error("Invalid page size: {0}")]
    InvalidPageSize(String),

    #[error("Invalid price range: {0}")]
    InvalidRange(String),
}
