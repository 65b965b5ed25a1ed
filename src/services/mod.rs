pub mod gardener_service;
pub mod tip_service;
