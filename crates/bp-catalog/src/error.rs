use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("unknown category {0:?}")]
    UnknownCategory(String),

    #[error("category {0:?} defined twice")]
    DuplicateCategory(String),

    #[error("class {label:?} already mapped to {existing:?}, cannot remap to {requested:?}")]
    ConflictingClass {
        label:     String,
        existing:  String,
        requested: String,
    },

    #[error("invalid {what} for category {category:?}")]
    InvalidParameter {
        category: String,
        what:     &'static str,
    },

    #[error("too many categories (max {})", u16::MAX - 1)]
    TooManyCategories,

    #[error("catalog parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type CatalogResult<T> = Result<T, CatalogError>;
