mod pipeline;
mod similarity;

pub use pipeline::{SearchHit, SearchPipeline};
pub use similarity::cosine_similarity;
