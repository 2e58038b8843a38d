// Gateway module for api - follows the Train Station Pattern
// All external access must go through this gateway

mod client;
mod envelope;
mod types;

pub use client::ApiClient;
pub use envelope::{error_message, RemoteResponse};
pub use types::{
    Course, CourseDraft, Credentials, LoginResponse, Material, MaterialDraft, ProfileUpdate,
    UserProfile,
};
