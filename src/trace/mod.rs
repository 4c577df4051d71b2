//! 结构化事件记录（用于离线分析调度行为）
//!
//! 设计目标：
//! - **结构化**：用 JSON 事件而不是解析文本日志
//! - **轻量**：仿真期间只追加到内存，结束后一次性写出
//! - **可过滤**：每条事件带节点、包类型、名字，便于按 consumer/优先级筛选

mod types;

pub use types::{TraceEvent, TraceEventKind, TraceFaceInfo, TraceLogger, TraceNodeInfo};
