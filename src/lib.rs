//! Calculation engine for a multi-role college ERP
//!
//! This crate provides the computational core behind the campus dashboards:
//! attendance percentages and projections, attendance policy compliance per
//! course and per student, payment totals including gateway processing fees,
//! and fee obligation bookkeeping. Everything is exposed as a library and as
//! a small JSON-over-HTTP service.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
