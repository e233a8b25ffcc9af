pub mod geo;
pub mod kpi;
