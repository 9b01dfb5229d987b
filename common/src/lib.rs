//! 自然语言 SQL 控制台公共模块
//!
//! 提供以下共享功能：
//! - 环境变量配置加载
//! - 统一错误类型
//! - 查询结果与大模型接口数据模型
//! - SQL 分类与清洗工具

pub mod config;
pub mod errors;
pub mod models;
pub mod utils;
