//! Component Code Generator
//!
//! Generates the Python builder functions and the variant map of a
//! computation-graph library from its JSON component schemas.
//!
//! ## Features
//!
//! - **Deterministic Output**: Schemas are processed in file name order; only
//!   the header timestamp changes between runs
//! - **Legal Signatures**: Required parameters always precede defaulted ones
//! - **Codec Rules**: Jagged arguments and privacy usages are wrapped, unknown
//!   type tags are rejected
//! - **All-or-Nothing Publication**: Generated files are staged and renamed
//!   into place together
//! - **Build Collaborators**: Drives the native library build and `protoc`,
//!   then rewrites message imports to be package-relative
//!
//! ## Layout
//!
//! ```text
//! whitenoise-core/validator-rust/prototypes/
//! ├── components/
//! │   ├── Add.json
//! │   └── Mean.json
//! └── *.proto
//! opendp/whitenoise/core/
//! ├── components.py            <- builder functions
//! ├── variant_message_map.py   <- id -> builder name
//! ├── *_pb2.py                 <- protoc output, imports rewritten
//! └── lib/                     <- native library
//! ```

pub mod checksum;
pub mod codegen;
pub mod config;
pub mod error;
pub mod loader;
pub mod native;
pub mod protos;
pub mod publish;
pub mod schema;

pub use checksum::Checksum;
pub use codegen::{GeneratedArtifacts, Generator};
pub use config::CodegenConfig;
pub use error::{CodegenError, Result};
pub use loader::load_components;
pub use schema::{ArgumentSpec, ComponentSchema, OptionSpec, ParameterSpec, ReturnSpec};
