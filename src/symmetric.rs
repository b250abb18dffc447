//! 对称加密核心模块

pub mod systems;
pub mod traits;
