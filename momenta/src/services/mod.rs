mod moments;
mod stores;

pub use moments::{commit_classification, MomentService, Outcome};
pub use stores::{MediaFile, MediaStore, ThreadStore};
