//! View state for the listing and detail pages

mod detail;
mod listing;

pub use detail::{PostView, SectionView};
pub use listing::{ListedPost, LoadOutcome, PostListing};
