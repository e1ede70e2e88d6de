//! Infrastructure layer: page storage, the editing engines, configuration.

pub mod config;
pub mod error;
pub mod ordering_engine;
pub mod page_assembler;
pub mod page_store;
pub mod provisioning;
pub mod edit_session;
pub mod variable_resolver;


pub use edit_session::EditSession;
pub use error::EditError;
pub use ordering_engine::PartOrderingEngine;
pub use page_assembler::PageAssembler;
pub use page_store::{InMemoryPageStore, PageStore, PostgresPageStore, StoreError};
pub use variable_resolver::VariableResolver;
