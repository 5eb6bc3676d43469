use crate::flow::{CongestionAlgorithm, Flow, FlowConfig};
use crate::net::{FlowId, NodeId, Packet, PacketKind};
use crate::sim::SimTime;
use crate::topo::{TwoHostOpts, build_two_host};

fn handshake_flow(total: u64) -> Flow {
    let cfg = FlowConfig {
        handshake: true,
        ..FlowConfig::default()
    };
    Flow::new(
        FlowId(0),
        NodeId(0),
        NodeId(1),
        total,
        cfg,
        CongestionAlgorithm::reno(),
    )
}

#[test]
fn syn_goes_out_first_and_backs_off() {
    let mut f = handshake_flow(10);
    assert!(!f.is_connected());

    let out = f.on_tick(SimTime::ZERO);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].kind, PacketKind::Syn);
    assert_eq!(out[0].sent_at, SimTime::ZERO);
    // No data leaves before the connection is up.
    assert!(f.on_tick(SimTime::from_micros(100)).is_empty());

    // Unanswered Syn is resent at the backed-off timer.
    let retry = f.on_tick(SimTime::from_secs(1));
    assert_eq!(retry.len(), 1);
    assert_eq!(retry[0].kind, PacketKind::Syn);
    assert_eq!(f.rto(), SimTime::from_secs(4));
}

#[test]
fn synack_seeds_the_rtt_estimate() {
    let mut f = handshake_flow(10);
    f.on_tick(SimTime::ZERO);

    let synack = Packet::new(
        NodeId(1),
        NodeId(0),
        Some(FlowId(0)),
        0,
        PacketKind::SynAck { stamp: SimTime::ZERO },
    );
    let now = SimTime::from_millis(20);
    assert!(f.process_ack(&synack, now).is_empty());

    assert!(f.is_connected());
    assert_eq!(f.rtt(), SimTime::from_millis(20));
    assert_eq!(f.rto(), SimTime::from_millis(40));

    // Data starts on the next tick.
    let sent = f.on_tick(SimTime::from_millis(21));
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].seq, 0);
    assert!(sent[0].is_data());
}

#[test]
fn late_duplicate_synack_is_ignored() {
    let mut f = handshake_flow(10);
    f.on_tick(SimTime::ZERO);

    let synack = |stamp| {
        Packet::new(
            NodeId(1),
            NodeId(0),
            Some(FlowId(0)),
            0,
            PacketKind::SynAck { stamp },
        )
    };
    f.process_ack(&synack(SimTime::ZERO), SimTime::from_millis(20));
    assert_eq!(f.rtt(), SimTime::from_millis(20));

    // A duplicate from a retried Syn must not skew the estimate.
    f.process_ack(&synack(SimTime::from_millis(5)), SimTime::from_millis(90));
    assert_eq!(f.rtt(), SimTime::from_millis(20));
}

#[test]
fn handshake_completes_over_a_real_link() {
    let (mut net, h0, h1, _) = build_two_host(&TwoHostOpts::default()).expect("valid topology");
    let cfg = FlowConfig {
        handshake: true,
        ..FlowConfig::default()
    };
    let fid = net.add_flow(h0, h1, 20, cfg, CongestionAlgorithm::reno());

    net.run_until(SimTime::from_secs(30));

    let f = net.flow(fid);
    assert!(f.is_connected());
    assert!(f.is_done());
    // The seeded estimate reflects the link, not the 1 s default.
    assert!(f.rtt() < SimTime::from_millis(100));
}
