//! Business logic services for the ClimaSmart backend

pub mod alert;
pub mod analysis;
pub mod farm;
pub mod recommendation;

pub use alert::AlertService;
pub use analysis::AnalysisService;
pub use farm::FarmService;
pub use recommendation::RecommendationService;
