//! The publication workflow: registering persistent identifiers ("handles")
//! with an external registry and tracking a resource's publish/hide state.

pub mod error;
pub mod handle;
pub mod public_url;
pub mod workflow;

pub use error::{HandleError, HandleResult, PublishError, PublishResult};
pub use handle::{HandleInfo, HandleServiceClient};
pub use public_url::build_public_url;
pub use workflow::{publication_status, publish, unpublish, PublicationStatus};
