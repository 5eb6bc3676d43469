use crate::flow::{CongestionAlgorithm, FastConfig, FlowConfig};
use crate::net::{DATA_PKT_BITS, Network};
use crate::sim::SimTime;
use crate::topo::{ChainOpts, TwoHostOpts, build_chain, build_two_host};

fn total_channel_drops(net: &Network) -> u64 {
    net.channels().iter().map(|ch| ch.drops()).sum()
}

#[test]
fn pinned_window_stop_and_wait_timing() {
    // 100 Mbps, 10 ms one-way, 10 us steps. With the window pinned to one
    // packet each round trip takes: serialization rounded up to the next
    // tick (90 us), propagation (10 ms), ack serialization rounded up
    // (10 us), propagation back (10 ms) = 20.1 ms exactly.
    let opts = TwoHostOpts {
        dt: SimTime::from_micros(10),
        rate_bps: 100_000_000,
        prop_delay: SimTime::from_millis(10),
        buffer_bits: 64 * DATA_PKT_BITS,
    };
    let (mut net, h0, h1, _) = build_two_host(&opts).expect("valid topology");
    let cfg = FlowConfig {
        max_cwnd: Some(1.0),
        ..FlowConfig::default()
    };
    let fid = net.add_flow(h0, h1, 3, cfg, CongestionAlgorithm::reno());

    net.run_until(SimTime::from_secs(1));

    let f = net.flow(fid);
    assert!(f.is_done());
    assert_eq!(f.start_time(), Some(SimTime::ZERO));
    assert_eq!(f.done_time(), Some(SimTime(60_300_000)));
    assert_eq!(f.rtt(), SimTime(20_100_000));
    assert_eq!(f.retransmits(), 0);
    // Three data packets and three acks, nothing dropped.
    assert_eq!(net.stats.delivered_pkts, 6);
    assert_eq!(net.stats.dropped_pkts, 0);
}

#[test]
fn losses_on_a_shallow_buffer_are_recovered() {
    // Buffer well below the bandwidth-delay product: slow start overshoots,
    // the tail drops, and retransmission still completes the transfer.
    let opts = TwoHostOpts {
        dt: SimTime::from_micros(100),
        rate_bps: 10_000_000,
        prop_delay: SimTime::from_millis(10),
        buffer_bits: 16 * DATA_PKT_BITS,
    };
    let (mut net, h0, h1, link) = build_two_host(&opts).expect("valid topology");
    let fid = net.add_flow(
        h0,
        h1,
        400,
        FlowConfig::default(),
        CongestionAlgorithm::reno(),
    );

    net.run_until(SimTime::from_secs(120));

    let f = net.flow(fid);
    assert!(f.is_done());
    assert!(f.retransmits() > 0);
    assert!(net.stats.dropped_pkts > 0);
    assert!(net.link_drops(link) > 0);
    // Every drop the context counted was counted by exactly one channel.
    assert_eq!(net.stats.dropped_pkts, total_channel_drops(&net));
    assert!(net.stats.delivered_bits >= 400 * DATA_PKT_BITS);
}

#[test]
fn fast_flow_completes_on_a_clean_link() {
    let opts = TwoHostOpts {
        dt: SimTime::from_micros(100),
        rate_bps: 10_000_000,
        prop_delay: SimTime::from_millis(10),
        buffer_bits: 64 * DATA_PKT_BITS,
    };
    let (mut net, h0, h1, _) = build_two_host(&opts).expect("valid topology");
    let fid = net.add_flow(
        h0,
        h1,
        500,
        FlowConfig::default(),
        CongestionAlgorithm::fast(FastConfig::default()),
    );

    net.run_until(SimTime::from_secs(60));

    let f = net.flow(fid);
    assert!(f.is_done());
    assert_eq!(f.algorithm().name(), "fast");
}

#[test]
fn two_flows_cross_a_router_chain() {
    let opts = ChainOpts {
        dt: SimTime::from_micros(100),
        routers: 2,
        edge_rate_bps: 100_000_000,
        core_rate_bps: 10_000_000,
        prop_delay: SimTime::from_millis(5),
        buffer_bits: 64 * DATA_PKT_BITS,
    };
    let (mut net, h0, h1, _) = build_chain(&opts).expect("valid topology");

    let f0 = net.add_flow(
        h0,
        h1,
        100,
        FlowConfig::default(),
        CongestionAlgorithm::reno(),
    );
    let f1 = net.add_flow(
        h1,
        h0,
        100,
        FlowConfig {
            start_at: SimTime::from_millis(100),
            ..FlowConfig::default()
        },
        CongestionAlgorithm::reno(),
    );

    net.run_until(SimTime::from_secs(60));

    assert!(net.flow(f0).is_done());
    assert!(net.flow(f1).is_done());
    // Each data packet and each ack is delivered once, at its destination.
    assert!(net.stats.delivered_pkts >= 400);
    assert!(net.flow(f1).start_time() >= Some(SimTime::from_millis(100)));
}

#[test]
fn identical_runs_are_bit_identical() {
    let run = || {
        let opts = TwoHostOpts {
            dt: SimTime::from_micros(100),
            rate_bps: 10_000_000,
            prop_delay: SimTime::from_millis(10),
            buffer_bits: 16 * DATA_PKT_BITS,
        };
        let (mut net, h0, h1, _) = build_two_host(&opts).expect("valid topology");
        let fid = net.add_flow(
            h0,
            h1,
            200,
            FlowConfig::default(),
            CongestionAlgorithm::reno(),
        );
        net.run_until(SimTime::from_secs(30));
        (
            net.flow(fid).done_time(),
            net.flow(fid).cwnd().to_bits(),
            net.flow(fid).rtt(),
            net.flow(fid).retransmits(),
            net.stats.dropped_pkts,
            net.stats.delivered_bits,
        )
    };

    assert_eq!(run(), run());
}

#[test]
fn occupancy_stays_within_capacity_throughout() {
    let opts = TwoHostOpts {
        dt: SimTime::from_micros(100),
        rate_bps: 10_000_000,
        prop_delay: SimTime::from_millis(10),
        buffer_bits: 16 * DATA_PKT_BITS,
    };
    let (mut net, h0, h1, _) = build_two_host(&opts).expect("valid topology");
    let fid = net.add_flow(
        h0,
        h1,
        100,
        FlowConfig::default(),
        CongestionAlgorithm::reno(),
    );

    for _ in 0..300_000 {
        net.tick();
        for ch in net.channels() {
            assert!(ch.occupancy_bits() <= ch.capacity_bits());
        }
        assert!(net.flow(fid).cwnd() >= 1.0);
        if net.flow(fid).is_done() {
            break;
        }
    }
    assert!(net.flow(fid).is_done());
}
