//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async queries that
//! accept `&PgPool` as the first argument.

pub mod admin_user_repo;
pub mod bio_repo;
pub mod blog_category_repo;
pub mod blog_entry_repo;
pub mod tag_repo;

pub use admin_user_repo::AdminUserRepo;
pub use bio_repo::BioRepo;
pub use blog_category_repo::BlogCategoryRepo;
pub use blog_entry_repo::BlogEntryRepo;
pub use tag_repo::TagRepo;
