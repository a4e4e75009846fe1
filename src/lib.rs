pub mod config;
pub mod engines;
pub mod image;
pub mod notifier;
pub mod reference;
pub mod shuttle;

// Re-exports for easy access
pub use config::Config;
pub use engines::{DockerEngine, ImageEngine};
pub use image::LocalImage;
pub use notifier::Notifier;
pub use reference::ImageReference;
pub use shuttle::ImageShuttle;
