pub mod auth;
pub mod cache;
pub mod id_codec;
