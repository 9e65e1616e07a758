//! Images domain: durable artifact store, display handles, generation
//! pipeline, and store health monitoring

pub mod api;
pub mod domain;
pub mod handles;
pub mod health;
pub mod pipeline;
pub mod refiner;
pub mod repository;

// Re-export domain types at the crate root for convenience
pub use domain::codec::{self, CodecError, FRAME_VERSION};
pub use domain::entities::{ImageArtifact, Payload, StoredImage, MAX_PAYLOAD_BYTES};

// Re-export repository types
pub use repository::{ImageRepository, SCHEMA_VERSION};

// Re-export services
pub use handles::{DisplayHandle, HandleCache, Resolution};
pub use health::{HealthMonitor, StoreHealth};
pub use pipeline::{GenerationService, FALLBACK_SOURCE};
pub use refiner::PromptRefiner;

// Re-export API types
pub use api::routes;
pub use api::ImagesState;
