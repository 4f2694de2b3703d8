//! Business logic services for Shoplog

pub mod analytics;
pub mod conversion;
pub mod expense;
pub mod movement;
pub mod product;
pub mod receipt;
pub mod reporting;
pub mod sale;
pub mod valuation;

pub use analytics::AnalyticsService;
pub use conversion::ConversionService;
pub use expense::ExpenseService;
pub use movement::MovementService;
pub use product::ProductService;
pub use receipt::ReceiptService;
pub use reporting::ReportingService;
pub use sale::SaleService;
pub use valuation::ValuationService;
