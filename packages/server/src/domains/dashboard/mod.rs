// Dashboard domain - headline figures for the admin home page

pub mod activities;
pub mod models;

pub use models::DashboardStats;
