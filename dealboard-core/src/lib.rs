//! Dealboard Core — sheet retrieval, resolution, and chart data.
//!
//! This crate contains the heart of the deals dashboard:
//! - Table source abstraction with a Google Sheets backend
//! - Resilient fetcher: bounded retry on rate limits, single-slot TTL cache
//! - Identifier resolver: coercion and owner/stage left joins
//! - Timeline extractor for the pipeline chart
//! - Count aggregation for the stacked bar chart
//! - Fiscal calendar presets, sidebar filters, and the outlook report

pub mod aggregate;
pub mod config;
pub mod data;
pub mod demo;
pub mod domain;
pub mod export;
pub mod filter;
pub mod fiscal;
pub mod report;
pub mod resolve;
pub mod schema;
pub mod timeline;
