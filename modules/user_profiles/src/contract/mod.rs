pub mod model;

pub use model::UserProfile;
