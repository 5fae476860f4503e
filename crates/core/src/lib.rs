//! WordPress WXR export import engine.
//!
//! The engine walks the nodes of an export in document order and turns
//! published posts and pages into blog entries:
//!
//! - [`filter`] decides which nodes and nested children are imported.
//! - [`mapper`] builds attribute sets from the DEFAULTS table and field map.
//! - [`associations`] resolves inline tag/category references, creating
//!   each distinct term at most once.
//! - [`rewriter`] replaces bare embed URLs and expands `[caption]` shortcodes.
//! - [`importer`] drives a run and produces an [`ImportReport`].
//!
//! Storage stays behind the [`RecordStore`] and [`IdentityDirectory`]
//! traits; [`store`] ships in-memory implementations for dry runs.

pub mod associations;
pub mod context;
pub mod document;
pub mod error;
pub mod filter;
pub mod fragment;
pub mod importer;
pub mod mapper;
pub mod node_kind;
pub mod report;
pub mod rewriter;
pub mod status;
pub mod store;
pub mod types;

pub use context::RunContext;
pub use document::Document;
pub use error::{CoreError, MappingError, StoreError};
pub use fragment::{FragmentRenderer, TemplateRenderer};
pub use importer::Importer;
pub use mapper::ImportDefaults;
pub use report::{ImportReport, RunStatus};
pub use store::{IdentityDirectory, MemoryDirectory, MemoryStore, RecordStore};
