pub mod ecs;
pub mod staging;
pub mod world;
