//! UI Components

pub mod chart_panel;
pub mod loading;

pub use chart_panel::ChartPanel;
pub use loading::ChartSkeleton;
