// Business domains
pub mod alerts;
pub mod analytics;
pub mod auth;
pub mod children;
pub mod dashboard;
pub mod health;
pub mod messaging;
pub mod notifications;
pub mod nutrition;
pub mod orphanages;
pub mod partner_requests;
