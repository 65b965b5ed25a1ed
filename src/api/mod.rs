pub mod gardeners;
pub mod health;
pub mod swagger;
pub mod tips;
