/*!
 * Verified claims extractor
 *
 * Responsibility:
 * - guard middleware が extensions に入れた Claims を handler に渡す
 * - 型 (Claims) は services::auth 側、axum 依存はここ (core) に閉じ込める
 */

mod core;

pub use core::AuthClaims;
