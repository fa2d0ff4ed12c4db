pub mod blog_repo;
pub mod donation_request_repo;
pub mod error;
pub mod user_repo;
