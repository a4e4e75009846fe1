pub mod docker;
pub mod engine;

pub use docker::DockerEngine;
pub use engine::ImageEngine;
