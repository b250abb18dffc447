//! 算法系统集合
//!
//! 目前只包含传统的RSA实现
pub mod traditional;
