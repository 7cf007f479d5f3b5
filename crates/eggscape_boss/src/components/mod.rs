//! ECS компоненты boss entity
//!
//! - body: кинематика тела, которую пишет хост (физика вне ECS)
//! - target: ссылка на цель (игрока), резолвится один раз при спавне

pub mod body;
pub mod target;

pub use body::*;
pub use target::*;
