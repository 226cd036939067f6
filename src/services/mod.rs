// Service exports
pub mod appwrite;
pub mod completion;
pub mod error;
pub mod memory;
pub mod store;

pub use appwrite::AppwriteClient;
pub use completion::{CompletionRequest, CompletionService, Message, OpenAiClient, ResponseSchema, Role};
pub use error::{with_timeout, ServiceError};
pub use memory::MemoryVenueStore;
pub use store::{Predicate, VenueQuery, VenueStore};
