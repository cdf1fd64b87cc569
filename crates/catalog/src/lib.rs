pub mod key;
pub mod model;
pub mod store;

pub use key::*;
pub use model::*;
pub use store::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    Parse(String),
    DuplicateStudio(StudioId),
    DuplicateLocation { studio: StudioId, location: LocationId },
    InvalidRating { studio: StudioId, rating: String },
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::Parse(msg) => write!(f, "studio data is not valid json: {msg}"),
            CatalogError::DuplicateStudio(id) => write!(f, "duplicate studio id {id}"),
            CatalogError::DuplicateLocation { studio, location } => {
                write!(f, "studio {studio} lists location {location} more than once")
            }
            CatalogError::InvalidRating { studio, rating } => {
                write!(f, "studio {studio} has rating {rating} outside 0..=5")
            }
        }
    }
}

impl std::error::Error for CatalogError {}
