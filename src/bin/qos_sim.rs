use clap::{Parser, ValueEnum};
use ndn_qos_rs::net::Network;
use ndn_qos_rs::qos::{BucketConfig, CostModel};
use ndn_qos_rs::scenario::{ConsumerSpec, FaceFailureSpec, SCHEMA_VERSION, ScenarioSpec, TopologySpec};
use ndn_qos_rs::trace::TraceLogger;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CostArg {
    PerPacket,
    PerByte,
}

#[derive(Debug, Parser)]
#[command(
    name = "qos-sim",
    about = "Run a priority admission scheduling scenario on a small NDN network"
)]
struct Args {
    /// Path to scenario.json; when given, the topology/app flags below are ignored
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Number of consumers in the star topology
    #[arg(long, default_value_t = 2)]
    consumers: usize,

    /// Priority tag per consumer, comma separated (missing entries are untagged)
    #[arg(long, value_delimiter = ',')]
    priorities: Vec<u8>,

    /// Interests per second per consumer
    #[arg(long, default_value_t = 200.0)]
    rate_pps: f64,

    /// Interests per consumer
    #[arg(long, default_value_t = 200)]
    count: u64,

    /// Bottleneck bandwidth (Mbps)
    #[arg(long, default_value_t = 10)]
    bottleneck_mbps: u64,

    /// Override per-face queue capacity (packets)
    #[arg(long)]
    queue_capacity: Option<usize>,

    /// Override every class bucket's capacity (tokens)
    #[arg(long)]
    bucket_capacity: Option<u64>,

    /// Override every class bucket's refill rate (tokens/s)
    #[arg(long)]
    refill_rate: Option<u64>,

    #[arg(long, value_enum)]
    cost_model: Option<CostArg>,

    /// Drop head-of-queue packets blocked longer than this (ms)
    #[arg(long)]
    stale_after_ms: Option<u64>,

    /// Tear down the bottleneck link at this time (ms)
    #[arg(long)]
    fail_at_ms: Option<u64>,

    /// Run until this time (ms); defaults to the end of the last request's lifetime
    #[arg(long)]
    until_ms: Option<u64>,

    /// Output trace JSON file
    #[arg(long)]
    trace_json: Option<PathBuf>,
}

fn spec_from_flags(args: &Args) -> ScenarioSpec {
    let consumers = (0..args.consumers)
        .map(|i| ConsumerSpec {
            priority: args.priorities.get(i).copied(),
            rate_pps: args.rate_pps,
            count: args.count,
            ..ConsumerSpec::default()
        })
        .collect();
    ScenarioSpec {
        schema_version: SCHEMA_VERSION,
        topology: TopologySpec::Star {
            access_mbps: None,
            access_latency_us: None,
            bottleneck_mbps: Some(args.bottleneck_mbps),
            bottleneck_latency_us: None,
        },
        qos: Default::default(),
        prefix: "/video".to_string(),
        producer: Default::default(),
        consumers,
        face_failures: args
            .fail_at_ms
            .map(|at_ms| vec![FaceFailureSpec { at_ms }])
            .unwrap_or_default(),
        until_ms: args.until_ms,
    }
}

fn apply_overrides(spec: &mut ScenarioSpec, args: &Args) {
    let qos = &mut spec.qos;
    if let Some(cap) = args.queue_capacity {
        qos.queue_capacity_per_face = cap;
    }
    if args.bucket_capacity.is_some() || args.refill_rate.is_some() {
        for b in &mut qos.buckets {
            *b = BucketConfig::new(
                args.bucket_capacity.unwrap_or(b.capacity),
                args.refill_rate.unwrap_or(b.refill_rate),
            );
        }
    }
    if let Some(c) = args.cost_model {
        qos.cost_model = match c {
            CostArg::PerPacket => CostModel::PerPacket,
            CostArg::PerByte => CostModel::PerByte,
        };
    }
    if let Some(ms) = args.stale_after_ms {
        qos.stale_after_ms = Some(ms);
    }
    if args.until_ms.is_some() {
        spec.until_ms = args.until_ms;
    }
}

fn print_summary(net: &Network) {
    for id in (0..net.node_count()).map(ndn_qos_rs::net::NodeId) {
        let Some(node) = net.node(id) else {
            continue;
        };
        for c in node.consumers() {
            let s = c.stats();
            let rtt = s
                .mean_rtt_ms()
                .map_or_else(|| "-".to_string(), |v| format!("{v:.3}"));
            let prio = c
                .config()
                .priority
                .map_or_else(|| "-".to_string(), |p| p.to_string());
            println!(
                "consumer node={} prefix={} priority={} sent={} satisfied={} nacked={} timed_out={} mean_rtt_ms={}",
                node.name(),
                c.config().prefix,
                prio,
                s.sent,
                s.satisfied,
                s.nacked,
                s.timed_out,
                rtt
            );
        }
    }
    for id in (0..net.node_count()).map(ndn_qos_rs::net::NodeId) {
        let Some(node) = net.node(id) else {
            continue;
        };
        let sched = node.scheduler();
        let d = sched.drop_stats();
        println!(
            "node name={} drops={} pushed_out={} rejected={} face_gone={} stale={} oversize={} sent_class={:?} backlog={}",
            node.name(),
            sched.drop_count(),
            d.pushed_out,
            d.rejected,
            d.face_gone,
            d.stale,
            d.oversize,
            sched.sent_per_class(),
            sched.backlog()
        );
    }
    let st = net.stats;
    println!(
        "network tx_interests={} tx_data={} tx_nacks={} tx_bytes={} link_drops={}",
        st.tx_interests, st.tx_data, st.tx_nacks, st.tx_bytes, st.link_drops
    );
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .init();

    let args = Args::parse();
    let mut spec = match &args.scenario {
        Some(path) => match ScenarioSpec::from_path(path) {
            Ok(spec) => spec,
            Err(e) => {
                eprintln!("error: {e}");
                process::exit(2);
            }
        },
        None => spec_from_flags(&args),
    };
    apply_overrides(&mut spec, &args);

    let mut scenario = match spec.build(args.trace_json.is_some()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(2);
        }
    };
    scenario.run();

    print_summary(&scenario.world.net);
    println!("done @ {}", scenario.sim.now());

    if let Some(path) = args.trace_json {
        if let Some(trace) = &scenario.world.net.trace {
            if let Err(e) = write_trace(&path, trace) {
                eprintln!("error: write trace {}: {e}", path.display());
                process::exit(2);
            }
            eprintln!("wrote {} trace events to {}", trace.len(), path.display());
        }
    }
}

fn write_trace(path: &Path, trace: &TraceLogger) -> io::Result<()> {
    let json = trace.to_json().map_err(io::Error::other)?;
    fs::write(path, json)
}
