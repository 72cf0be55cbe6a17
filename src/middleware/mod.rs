/*
 * Responsibility
 * - middleware public surface
 * - auth: per-route AuthGuard; cors/http: router-wide layers
 */
pub mod auth;
pub mod cors;
pub mod http;
