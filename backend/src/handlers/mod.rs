//! HTTP handlers for Shoplog

pub mod analytics;
pub mod conversion;
pub mod expense;
pub mod health;
pub mod movement;
pub mod product;
pub mod receipt;
pub mod reporting;
pub mod sale;

pub use analytics::*;
pub use conversion::*;
pub use expense::*;
pub use health::*;
pub use movement::*;
pub use product::*;
pub use receipt::*;
pub use reporting::*;
pub use sale::*;
