/*
 * Responsibility
 * - request/response DTO と validate()
 */
pub mod auth;
pub mod blogs;
pub mod common;
pub mod donation_requests;
pub mod users;
