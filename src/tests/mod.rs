//! 单元测试模块
//! 覆盖导入改写、声明扫描、组件识别、渲染流程、片段存储与生成服务

pub mod rewrite_tests;
pub mod render_tests;
pub mod config_tests;
