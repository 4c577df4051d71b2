//! 场景描述（JSON）与装配
//!
//! 一个场景 = 拓扑 + 调度器配置 + 应用 + 故障注入。`ScenarioSpec::build` 把它装配成
//! 可以直接 `run_until` 的仿真器与网络。

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::app::{ConsumerConfig, Producer, install_consumer, install_producer};
use crate::net::{FaceDown, Name, NetWorld};
use crate::qos::{ConfigError, QosConfig};
use crate::sim::{SimTime, Simulator};
use crate::topo::{LineOpts, StarOpts, Topology, build_line, build_star};

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("read scenario: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse scenario: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported schema_version {found} (expected {SCHEMA_VERSION})")]
    SchemaVersion { found: u32 },
    #[error("consumer {index}: rate_pps must be positive")]
    BadRate { index: usize },
    #[error("star topology needs at least one consumer")]
    NoConsumers,
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioSpec {
    pub schema_version: u32,
    pub topology: TopologySpec,
    #[serde(default)]
    pub qos: QosConfig,
    #[serde(default = "default_prefix")]
    pub prefix: String,
    #[serde(default)]
    pub producer: ProducerSpec,
    pub consumers: Vec<ConsumerSpec>,
    /// 在这些时刻拆除瓶颈链路
    #[serde(default)]
    pub face_failures: Vec<FaceFailureSpec>,
    #[serde(default)]
    pub until_ms: Option<u64>,
}

fn default_prefix() -> String {
    "/video".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TopologySpec {
    /// 每个 consumer 一个节点，经 r0 连到 producer
    Star {
        #[serde(default)]
        access_mbps: Option<u64>,
        #[serde(default)]
        access_latency_us: Option<u64>,
        #[serde(default)]
        bottleneck_mbps: Option<u64>,
        #[serde(default)]
        bottleneck_latency_us: Option<u64>,
    },
    /// 所有 consumer 挂在同一个 c0 上
    Line {
        #[serde(default)]
        routers: Option<usize>,
        #[serde(default)]
        link_mbps: Option<u64>,
        #[serde(default)]
        link_latency_us: Option<u64>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProducerSpec {
    #[serde(default = "default_payload_bytes")]
    pub payload_bytes: u32,
}

impl Default for ProducerSpec {
    fn default() -> Self {
        Self {
            payload_bytes: default_payload_bytes(),
        }
    }
}

fn default_payload_bytes() -> u32 {
    1024
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsumerSpec {
    #[serde(default)]
    pub priority: Option<u8>,
    #[serde(default = "default_rate_pps")]
    pub rate_pps: f64,
    #[serde(default = "default_count")]
    pub count: u64,
    #[serde(default)]
    pub start_ms: u64,
    #[serde(default = "default_lifetime_ms")]
    pub lifetime_ms: u64,
}

impl Default for ConsumerSpec {
    fn default() -> Self {
        Self {
            priority: None,
            rate_pps: default_rate_pps(),
            count: default_count(),
            start_ms: 0,
            lifetime_ms: default_lifetime_ms(),
        }
    }
}

fn default_rate_pps() -> f64 {
    100.0
}

fn default_count() -> u64 {
    100
}

fn default_lifetime_ms() -> u64 {
    1000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaceFailureSpec {
    pub at_ms: u64,
}

/// 装配好的场景
pub struct Scenario {
    pub sim: Simulator,
    pub world: NetWorld,
    pub topology: Topology,
    pub until: SimTime,
}

impl Scenario {
    pub fn run(&mut self) {
        self.sim.run_until(self.until, &mut self.world);
    }
}

impl ScenarioSpec {
    pub fn from_json(raw: &str) -> Result<Self, ScenarioError> {
        let spec: ScenarioSpec = serde_json::from_str(raw)?;
        if spec.schema_version != SCHEMA_VERSION {
            return Err(ScenarioError::SchemaVersion {
                found: spec.schema_version,
            });
        }
        Ok(spec)
    }

    pub fn from_path(path: &std::path::Path) -> Result<Self, ScenarioError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// 没有 `until_ms` 时，跑到最后一个请求的生命周期结束之后。
    pub fn until(&self) -> SimTime {
        if let Some(ms) = self.until_ms {
            return SimTime::from_millis(ms);
        }
        let last = self
            .consumers
            .iter()
            .map(|c| {
                let span = if c.rate_pps > 0.0 {
                    (c.count as f64 * 1000.0 / c.rate_pps).ceil() as u64
                } else {
                    0
                };
                c.start_ms.saturating_add(span).saturating_add(c.lifetime_ms)
            })
            .max()
            .unwrap_or(0);
        SimTime::from_millis(last.saturating_add(1))
    }

    /// 构建拓扑、安装应用并调度故障事件。
    pub fn build(&self, trace: bool) -> Result<Scenario, ScenarioError> {
        self.qos.validate()?;
        for (index, c) in self.consumers.iter().enumerate() {
            if c.rate_pps.is_nan() || c.rate_pps <= 0.0 {
                return Err(ScenarioError::BadRate { index });
            }
        }

        let prefix = Name::from_uri(&self.prefix);
        let mut sim = Simulator::default();
        let mut world = NetWorld::default();
        if trace {
            world.net.trace = Some(Default::default());
        }

        let topology = match &self.topology {
            TopologySpec::Star {
                access_mbps,
                access_latency_us,
                bottleneck_mbps,
                bottleneck_latency_us,
            } => {
                if self.consumers.is_empty() {
                    return Err(ScenarioError::NoConsumers);
                }
                let d = StarOpts::default();
                let opts = StarOpts {
                    consumers: self.consumers.len(),
                    access_mbps: access_mbps.unwrap_or(d.access_mbps),
                    access_latency: access_latency_us
                        .map_or(d.access_latency, SimTime::from_micros),
                    bottleneck_mbps: bottleneck_mbps.unwrap_or(d.bottleneck_mbps),
                    bottleneck_latency: bottleneck_latency_us
                        .map_or(d.bottleneck_latency, SimTime::from_micros),
                };
                build_star(&mut world, &opts, &self.qos, &prefix)?
            }
            TopologySpec::Line {
                routers,
                link_mbps,
                link_latency_us,
            } => {
                let d = LineOpts::default();
                let opts = LineOpts {
                    routers: routers.unwrap_or(d.routers),
                    link_mbps: link_mbps.unwrap_or(d.link_mbps),
                    link_latency: link_latency_us.map_or(d.link_latency, SimTime::from_micros),
                };
                build_line(&mut world, &opts, &self.qos, &prefix)?
            }
        };

        install_producer(
            &mut world.net,
            topology.producer,
            Producer::new(prefix.clone(), self.producer.payload_bytes),
        );
        for (i, c) in self.consumers.iter().enumerate() {
            let node = topology.consumers[i % topology.consumers.len()];
            let config = ConsumerConfig {
                // 每个 consumer 一个子前缀，避免同一节点上的请求互相聚合
                prefix: prefix.append(format!("c{i}")),
                priority: c.priority,
                rate_pps: c.rate_pps,
                count: c.count,
                start: SimTime::from_millis(c.start_ms),
                lifetime: SimTime::from_millis(c.lifetime_ms),
            };
            install_consumer(&mut world.net, &mut sim, node, config);
        }
        for f in &self.face_failures {
            sim.schedule(
                SimTime::from_millis(f.at_ms),
                FaceDown {
                    face: topology.bottleneck,
                },
            );
        }
        world.net.emit_trace_meta();

        info!(
            nodes = world.net.node_count(),
            consumers = self.consumers.len(),
            "场景装配完成"
        );
        Ok(Scenario {
            sim,
            world,
            until: self.until(),
            topology,
        })
    }
}
