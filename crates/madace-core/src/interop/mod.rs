//! Format interop — bidirectional conversion between the BMAD Markdown
//! agent format and the MADACE YAML agent format, plus the alias tables
//! reconciling the two ecosystems' naming conventions.
//!
//! # Architecture
//!
//! ```text
//! agent.md ──► parse_markdown ──► ParsedAgent ──► generate_yaml ──► agent.agent.yaml
//!                                      ▲                                   │
//!                                      └────── generate_markdown ◄─────────┘
//! ```
//!
//! Round-tripping markdown → yaml → markdown preserves role, identity,
//! principles, critical actions and workflow trigger/description pairs;
//! it does not promise byte-identical prose.

pub mod aliases;
pub mod converter;
pub mod discovery;
pub mod generator;
pub mod markdown;

pub use aliases::{get_framework_variants, get_module_variants, resolve_framework_alias, resolve_module_alias};
pub use converter::{markdown_file_to_yaml, yaml_file_to_markdown, ConversionOptions, ConversionResult};
pub use generator::{generate_markdown, generate_yaml};
pub use markdown::{parse_markdown, ParsedAgent, WorkflowEntry};
