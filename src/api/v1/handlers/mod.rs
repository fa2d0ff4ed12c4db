/*
 * Responsibility
 * - v1 handler の公開
 */
pub mod auth;
pub mod blogs;
pub mod donation_requests;
pub mod health;
pub mod stats;
pub mod users;
