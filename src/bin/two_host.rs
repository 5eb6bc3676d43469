//! 双主机单流实验
//!
//! 在 h0 <-> h1 的单条链路上跑一条拥塞控制流（Reno 或 FAST），
//! 可选导出每 tick 的观测采样 JSON。

use clap::{Parser, ValueEnum};
use netsim_rs::flow::{CongestionAlgorithm, FastConfig, FlowConfig};
use netsim_rs::sim::SimTime;
use netsim_rs::stats::Recorder;
use netsim_rs::topo::{TwoHostOpts, build_two_host, validate_run};
use std::fs;
use std::path::PathBuf;
use std::process;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Algo {
    Reno,
    Fast,
}

#[derive(Debug, Parser)]
#[command(name = "two-host", about = "双主机拓扑仿真：h0->h1 单流拥塞控制")]
struct Args {
    /// 要发送的数据包数
    #[arg(long, default_value_t = 2_000)]
    data_pkts: u64,

    /// 拥塞控制算法
    #[arg(long, value_enum, default_value_t = Algo::Reno)]
    algo: Algo,

    /// 链路速率（Mbps）
    #[arg(long, default_value_t = 10)]
    rate_mbps: u64,

    /// 单向传播时延（毫秒）
    #[arg(long, default_value_t = 10)]
    delay_ms: u64,

    /// 链路缓冲大小（数据包个数）
    #[arg(long, default_value_t = 64)]
    buffer_pkts: u64,

    /// 仿真步长（微秒）
    #[arg(long, default_value_t = 100)]
    dt_us: u64,

    /// 仿真运行到多少毫秒
    #[arg(long, default_value_t = 30_000)]
    until_ms: u64,

    /// 发数据前先握手并播种 RTT 估计
    #[arg(long, default_value_t = false)]
    handshake: bool,

    /// 采样步长（每多少个 tick 记一行）
    #[arg(long, default_value_t = 100)]
    sample_every: u64,

    /// 输出观测采样 JSON 文件；不填则不生成
    #[arg(long)]
    stats_json: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let args = Args::parse();

    let opts = TwoHostOpts {
        dt: SimTime::from_micros(args.dt_us),
        rate_bps: args.rate_mbps.saturating_mul(1_000_000),
        prop_delay: SimTime::from_millis(args.delay_ms),
        buffer_bits: args.buffer_pkts.saturating_mul(netsim_rs::net::DATA_PKT_BITS),
    };
    let until = SimTime::from_millis(args.until_ms);

    let (mut net, h0, h1, link) = match build_two_host(&opts).and_then(|t| {
        validate_run(until)?;
        if args.data_pkts == 0 {
            return Err(netsim_rs::topo::TopologyError::EmptyFlow);
        }
        Ok(t)
    }) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("invalid configuration: {e}");
            process::exit(2);
        }
    };

    let algo = match args.algo {
        Algo::Reno => CongestionAlgorithm::reno(),
        Algo::Fast => CongestionAlgorithm::fast(FastConfig::default()),
    };
    let cfg = FlowConfig {
        handshake: args.handshake,
        ..FlowConfig::default()
    };
    let fid = net.add_flow(h0, h1, args.data_pkts, cfg, algo);

    if args.stats_json.is_some() {
        net.set_recorder(Recorder::new(args.sample_every));
    }

    net.run_until(until);

    if let Some(path) = args.stats_json {
        if let Some(rec) = net.take_recorder() {
            let json =
                serde_json::to_string_pretty(rec.trace()).expect("serialize stats trace");
            fs::write(&path, json).expect("write stats json");
            eprintln!("wrote stats trace to {}", path.display());
        }
    }

    let f = net.flow(fid);
    let dur_ns = match (f.start_time(), f.done_time()) {
        (Some(s), Some(e)) if e >= s => Some(e.as_nanos() - s.as_nanos()),
        _ => None,
    };
    let goodput_mbps = dur_ns.map(|ns| {
        if ns == 0 {
            0.0
        } else {
            args.data_pkts as f64 * netsim_rs::net::DATA_PKT_BITS as f64 / ns as f64 * 1e3
        }
    });

    println!(
        "done @ {:?}\n  flow[{}]: done={}, cwnd={:.2}, rtt={:?}, retransmits={}, goodput_mbps={:?}\n  net: delivered_pkts={}, dropped_pkts={}, link_drops={}",
        net.now(),
        f.algorithm().name(),
        f.is_done(),
        f.cwnd(),
        f.rtt(),
        f.retransmits(),
        goodput_mbps,
        net.stats.delivered_pkts,
        net.stats.dropped_pkts,
        net.link_drops(link),
    );
}
