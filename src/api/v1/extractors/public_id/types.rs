/*
 * Responsibility
 *  - 公開 ID を持つリソースの marker 型
 *  - handler が使う alias (PublicBlogId など)
 */
use super::core::PublicId;

/// A resource addressed by a sqids-encoded id in the path.
pub trait Resource {
    /// Used in error messages ("invalid blog id").
    const NAME: &'static str;
}

pub enum Blog {}

impl Resource for Blog {
    const NAME: &'static str = "blog";
}

pub enum DonationRequest {}

impl Resource for DonationRequest {
    const NAME: &'static str = "donation request";
}

pub type PublicBlogId = PublicId<Blog>;
pub type PublicDonationRequestId = PublicId<DonationRequest>;
