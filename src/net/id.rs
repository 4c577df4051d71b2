//! 标识符类型
//!
//! 定义节点和 face 的唯一标识符。face id 在整个网络内唯一，作为调度器的队列句柄。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 节点标识符
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub usize);

/// Face 标识符
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FaceId(pub u32);

impl FaceId {
    /// 节点本地应用（consumer/producer）所在的 face，不对应任何链路。
    pub const LOCAL: FaceId = FaceId(u32::MAX);

    pub fn is_local(self) -> bool {
        self == FaceId::LOCAL
    }
}

impl fmt::Display for FaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_local() {
            f.write_str("face:local")
        } else {
            write!(f, "face:{}", self.0)
        }
    }
}
