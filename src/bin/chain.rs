//! 链式拓扑竞争实验
//!
//! 两条流穿过同一排路由器（共享瓶颈），第二条流可以延迟启动，
//! 用来观察竞争下的窗口收敛与丢包行为。

use clap::{Parser, ValueEnum};
use netsim_rs::flow::{CongestionAlgorithm, FastConfig, FlowConfig};
use netsim_rs::sim::SimTime;
use netsim_rs::stats::Recorder;
use netsim_rs::topo::{ChainOpts, build_chain, validate_run};
use std::fs;
use std::path::PathBuf;
use std::process;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Algo {
    Reno,
    Fast,
}

#[derive(Debug, Parser)]
#[command(name = "chain", about = "链式拓扑仿真：两条流共享路由器瓶颈")]
struct Args {
    /// 每条流的数据包数
    #[arg(long, default_value_t = 2_000)]
    data_pkts: u64,

    /// 拥塞控制算法（两条流相同）
    #[arg(long, value_enum, default_value_t = Algo::Reno)]
    algo: Algo,

    /// 中间路由器个数
    #[arg(long, default_value_t = 2)]
    routers: usize,

    /// 接入链路速率（Mbps）
    #[arg(long, default_value_t = 100)]
    edge_mbps: u64,

    /// 瓶颈链路速率（Mbps）
    #[arg(long, default_value_t = 10)]
    core_mbps: u64,

    /// 单向传播时延（毫秒）
    #[arg(long, default_value_t = 5)]
    delay_ms: u64,

    /// 链路缓冲大小（数据包个数）
    #[arg(long, default_value_t = 64)]
    buffer_pkts: u64,

    /// 第二条流延迟启动（毫秒）
    #[arg(long, default_value_t = 1_000)]
    second_start_ms: u64,

    /// 仿真步长（微秒）
    #[arg(long, default_value_t = 100)]
    dt_us: u64,

    /// 仿真运行到多少毫秒
    #[arg(long, default_value_t = 60_000)]
    until_ms: u64,

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

    let opts = ChainOpts {
        dt: SimTime::from_micros(args.dt_us),
        routers: args.routers,
        edge_rate_bps: args.edge_mbps.saturating_mul(1_000_000),
        core_rate_bps: args.core_mbps.saturating_mul(1_000_000),
        prop_delay: SimTime::from_millis(args.delay_ms),
        buffer_bits: args.buffer_pkts.saturating_mul(netsim_rs::net::DATA_PKT_BITS),
    };
    let until = SimTime::from_millis(args.until_ms);

    let (mut net, h0, h1, routers) = match build_chain(&opts).and_then(|t| {
        validate_run(until)?;
        Ok(t)
    }) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("invalid configuration: {e}");
            process::exit(2);
        }
    };

    let algo = || match args.algo {
        Algo::Reno => CongestionAlgorithm::reno(),
        Algo::Fast => CongestionAlgorithm::fast(FastConfig::default()),
    };

    let f0 = net.add_flow(h0, h1, args.data_pkts, FlowConfig::default(), algo());
    let f1 = net.add_flow(
        h1,
        h0,
        args.data_pkts,
        FlowConfig {
            start_at: SimTime::from_millis(args.second_start_ms),
            ..FlowConfig::default()
        },
        algo(),
    );

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

    println!("done @ {:?} (routers: {})", net.now(), routers.len());
    for fid in [f0, f1] {
        let f = net.flow(fid);
        println!(
            "  flow {:?}: done={}, cwnd={:.2}, rtt={:?}, retransmits={}",
            fid,
            f.is_done(),
            f.cwnd(),
            f.rtt(),
            f.retransmits(),
        );
    }
    println!(
        "  net: delivered_pkts={}, dropped_pkts={}",
        net.stats.delivered_pkts, net.stats.dropped_pkts
    );
}
