/*
 * Responsibility
 * - middleware の公開インターフェース
 * - guard (認証/認可), cors, http (request id / trace / limit), security headers
 */
pub mod cors;
pub mod guard;
pub mod http;
pub mod security_headers;
