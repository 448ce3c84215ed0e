//! Request extractors that reject with the JSON error envelope.

mod params;
mod validated_json;

pub use params::{ValidatedPath, ValidatedQuery};
pub use validated_json::ValidatedJson;
