mod blog;
mod feed;
mod index;
mod listings;
mod not_found;

pub use blog::{BlogIndex, BlogPostPage};
pub use feed::FeedIndex;
pub use index::Index;
pub use listings::{PackagesIndex, ProjectsIndex, TalksIndex};
pub use not_found::NotFound;
