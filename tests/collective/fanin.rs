use plenum::{Collective, FanIn, PlenumError};

use super::helpers::{run_team, star};

#[tokio::test]
async fn test_fanin_drains_to_group_eos() {
    // Two producers send one message each and close; the root sees exactly
    // two receptions (in whatever order) and then the group-level EOS.
    run_team(3, |rank, participants| async move {
        let mut fanin = FanIn::new(participants, 3, rank == 0, rank as u32, 8);

        if rank == 0 {
            let mut seen = 0;
            loop {
                let size = fanin.probe(true).await.unwrap();
                if size == 0 {
                    break;
                }
                let mut buf = vec![0u8; size];
                assert_eq!(fanin.receive(&mut buf).await.unwrap(), 1);
                assert_eq!(&buf, b"x");
                seen += 1;
            }
            assert_eq!(seen, 2);
            // Group EOS is sticky.
            assert_eq!(fanin.probe(true).await.unwrap(), 0);
        } else {
            fanin.send(b"x").await.unwrap();
            fanin.close(true, false).await;
        }
    })
    .await;
}

#[tokio::test]
async fn test_fanin_probe_is_idempotent() {
    let mut ranks = star(2).into_iter();
    let mut root = FanIn::new(ranks.next().unwrap(), 2, true, 0, 8);
    let mut leaf = FanIn::new(ranks.next().unwrap(), 2, false, 1, 8);

    leaf.send(b"abc").await.unwrap();

    assert_eq!(root.probe(true).await.unwrap(), 3);
    assert_eq!(root.probe(true).await.unwrap(), 3);
    assert_eq!(root.probe(false).await.unwrap(), 3);

    let mut buf = vec![0u8; 3];
    assert_eq!(root.receive(&mut buf).await.unwrap(), 3);
    assert_eq!(&buf, b"abc");
}

#[tokio::test]
async fn test_fanin_nonblocking_probe_would_block() {
    let mut ranks = star(2).into_iter();
    let mut root = FanIn::new(ranks.next().unwrap(), 2, true, 0, 8);
    let _leaf = FanIn::new(ranks.next().unwrap(), 2, false, 1, 8);

    let err = root.probe(false).await.unwrap_err();
    assert!(err.is_would_block());
}

#[tokio::test]
async fn test_fanin_receive_requires_probe() {
    let mut ranks = star(2).into_iter();
    let mut root = FanIn::new(ranks.next().unwrap(), 2, true, 0, 8);
    let leaf = ranks.next().unwrap();

    let mut buf = vec![0u8; 4];
    let err = root.receive(&mut buf).await.unwrap_err();
    assert!(matches!(err, PlenumError::ProbeRequired));
    drop(leaf);
}

#[tokio::test]
async fn test_fanin_interleaves_sources() {
    // With both sources loaded, consecutive rounds serve different sources:
    // the cursor moves past whoever won the previous round.
    let mut ranks = star(3).into_iter();
    let mut root = FanIn::new(ranks.next().unwrap(), 3, true, 0, 8);
    let mut leaf1 = FanIn::new(ranks.next().unwrap(), 3, false, 1, 8);
    let mut leaf2 = FanIn::new(ranks.next().unwrap(), 3, false, 2, 8);

    leaf1.send(b"1a").await.unwrap();
    leaf1.send(b"1b").await.unwrap();
    leaf2.send(b"2a").await.unwrap();
    leaf2.send(b"2b").await.unwrap();

    let mut order = Vec::new();
    for _ in 0..4 {
        let size = root.probe(true).await.unwrap();
        let mut buf = vec![0u8; size];
        root.receive(&mut buf).await.unwrap();
        order.push(buf[0]);
    }
    assert_eq!(order, vec![b'1', b'2', b'1', b'2']);
}

#[tokio::test]
async fn test_fanin_absorbs_single_eos() {
    // One source ends early; the other keeps the group alive.
    let mut ranks = star(3).into_iter();
    let mut root = FanIn::new(ranks.next().unwrap(), 3, true, 0, 8);
    let mut leaf1 = FanIn::new(ranks.next().unwrap(), 3, false, 1, 8);
    let mut leaf2 = FanIn::new(ranks.next().unwrap(), 3, false, 2, 8);

    leaf1.close(true, false).await;
    leaf2.send(b"still here").await.unwrap();

    let size = root.probe(true).await.unwrap();
    assert_eq!(size, 10);
    let mut buf = vec![0u8; size];
    root.receive(&mut buf).await.unwrap();
    assert_eq!(&buf, b"still here");

    leaf2.close(true, false).await;
    assert_eq!(root.probe(true).await.unwrap(), 0);
}
