//! Custom extractors.

mod context;
mod validated_json;

pub use context::{CurrentUser, RequestContext};
pub use validated_json::ValidatedJson;
