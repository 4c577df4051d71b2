//! 生产者：对前缀下的任意 Interest 回一个固定负载大小的 Data。

use crate::net::{Data, Interest, Name};

#[derive(Debug, Clone)]
pub struct Producer {
    prefix: Name,
    payload_bytes: u32,
    served: u64,
}

impl Producer {
    pub fn new(prefix: Name, payload_bytes: u32) -> Self {
        Self {
            prefix,
            payload_bytes,
            served: 0,
        }
    }

    pub fn prefix(&self) -> &Name {
        &self.prefix
    }

    pub fn served(&self) -> u64 {
        self.served
    }

    pub fn serves(&self, name: &Name) -> bool {
        self.prefix.is_prefix_of(name)
    }

    pub fn produce(&mut self, interest: &Interest) -> Data {
        self.served += 1;
        Data::new(interest.name.clone(), self.payload_bytes)
    }
}
