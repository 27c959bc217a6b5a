// ==========================================
// 集成测试共享辅助模块
// ==========================================

#![allow(dead_code)]

pub mod instance_builder;
pub mod scripted_adapter;
