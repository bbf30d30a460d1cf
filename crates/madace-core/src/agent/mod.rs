//! Agent definitions — schema types and the file loader.

pub mod loader;
pub mod schema;

pub use loader::{load_agent, load_agents_by_module, load_agents_from_directory, DirectoryLoad, LoadOptions, LoaderCache};
pub use schema::{AgentDefinition, AgentFile, AgentMetadata, MenuAction, MenuItem, Persona, PromptDef};
