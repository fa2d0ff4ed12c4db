/*
 * Responsibility
 * - handler 向け extractor の公開
 *   - AuthClaims: guard middleware が検証済みの Claims
 *   - PublicId<T>: 公開 ID → 内部 ID
 */
mod auth_claims;
pub mod public_id;

pub use auth_claims::AuthClaims;
