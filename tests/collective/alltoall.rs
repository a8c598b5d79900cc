use plenum::{AllToAll, Collective, PlenumError};

use super::helpers::run_team;

#[tokio::test]
async fn test_alltoall_three_ranks() {
    // Rank r contributes "r0 r1 r2"; afterwards it holds "0r 1r 2r".
    run_team(3, |rank, participants| async move {
        let mut alltoall = AllToAll::new(participants, 3, rank == 0, rank as u32, 6);
        let send = format!("{rank}0{rank}1{rank}2").into_bytes();
        let mut buf = vec![0u8; 6];

        let own = alltoall
            .sendrecv(Some(&send), Some(&mut buf), 1)
            .await
            .unwrap();
        assert_eq!(own, 6);
        let expect = format!("0{rank}1{rank}2{rank}").into_bytes();
        assert_eq!(buf, expect, "rank {rank} exchange result");
    })
    .await;
}

#[tokio::test]
async fn test_alltoall_uneven_chunks() {
    // sendsize 7 over 3 ranks: destination chunks are 3, 2, 2 bytes, so the
    // destinations receive 9, 6 and 6 bytes respectively.
    run_team(3, |rank, participants| async move {
        let mut alltoall = AllToAll::new(participants, 3, rank == 0, rank as u32, 6);
        let send: Vec<u8> = (0..7).map(|i| (50 * rank + i) as u8).collect();
        let expected_own = if rank == 0 { 9 } else { 6 };
        let mut buf = vec![0u8; 9];

        let own = alltoall
            .sendrecv(Some(&send), Some(&mut buf), 1)
            .await
            .unwrap();
        assert_eq!(own, expected_own, "rank {rank} row size");

        // Sender j's slice for destination r, at slot j of the row.
        let range = match rank {
            0 => 0..3,
            1 => 3..5,
            _ => 5..7,
        };
        let expect: Vec<u8> = (0..3)
            .flat_map(|j| range.clone().map(move |i| (50 * j + i) as u8))
            .collect();
        assert_eq!(&buf[..own], &expect[..], "rank {rank} row payload");
    })
    .await;
}

#[tokio::test]
async fn test_alltoall_single_rank_self_exchange() {
    let mut alltoall = AllToAll::new(Vec::new(), 1, true, 0, 6);
    let mut buf = vec![0u8; 4];
    let own = alltoall
        .sendrecv(Some(b"wxyz"), Some(&mut buf), 2)
        .await
        .unwrap();
    assert_eq!(own, 4);
    assert_eq!(&buf, b"wxyz");
}

#[tokio::test]
async fn test_alltoall_undersized_recvbuf() {
    let mut alltoall = AllToAll::new(Vec::new(), 1, true, 0, 6);
    let mut buf = vec![0u8; 3];
    let err = alltoall
        .sendrecv(Some(b"wxyz"), Some(&mut buf), 2)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PlenumError::UndersizedBuffer {
            which: "receive",
            needed: 4,
            got: 3
        }
    ));
}

#[tokio::test]
async fn test_alltoall_rejects_sendrecv_only_ops() {
    let mut alltoall = AllToAll::new(Vec::new(), 1, true, 0, 6);
    let err = alltoall.probe(true).await.unwrap_err();
    assert!(matches!(
        err,
        PlenumError::UnsupportedOperation {
            operation: "probe",
            ..
        }
    ));
}
