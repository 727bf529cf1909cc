// ==========================================
// Catalog import - pipeline module
// ==========================================
// Staged batch pipeline:
//   file_parser  - source bytes -> raw rows
//   field_mapper - raw rows -> canonical records (alias table)
//   resolver     - names -> store ids against the batch snapshot
//   matcher      - record -> existing product or new identity
//   reconciler   - desired vs current assignments -> plan (pure)
//   committer    - drives a batch, applies plans, gates removals
// ==========================================

pub mod committer;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod matcher;
pub mod reconciler;
pub mod resolver;

pub use committer::CatalogImporter;
pub use error::{ImportError, ImportResult};
pub use field_mapper::FieldMapper;
pub use file_parser::{parse_file, parse_source, RawRow, SourceFormat, SourceParser};
pub use matcher::{IdentityMatcher, MatchMethod, MatchOutcome};
pub use reconciler::reconcile;
pub use resolver::{normalize_name, ReferenceResolver};
