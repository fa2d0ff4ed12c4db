/*
 * Responsibility
 *  - 公開 ID extractor (core) とリソース別の型 (types) を束ねる
 */
mod core;
mod types;

pub use types::{PublicBlogId, PublicDonationRequestId};
