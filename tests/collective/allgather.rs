use plenum::{AllGather, Collective, PlenumError};

use super::helpers::run_team;

#[tokio::test]
async fn test_allgather_agreement() {
    // Every participant ends with the same rank-ordered concatenation.
    run_team(3, |rank, participants| async move {
        let mut allgather = AllGather::new(participants, 3, rank == 0, rank as u32, 5);
        let share = vec![b'a' + rank as u8; 2];
        let mut buf = vec![0u8; 6];

        let own = allgather
            .sendrecv(Some(&share), Some(&mut buf), 1)
            .await
            .unwrap();
        assert_eq!(own, 2);
        assert_eq!(&buf, b"aabbcc", "rank {rank} disagrees on the result");
    })
    .await;
}

#[tokio::test]
async fn test_allgather_with_remainder() {
    // 7 one-byte elements over 3 ranks: contributions of 3, 2, 2 bytes.
    run_team(3, |rank, participants| async move {
        let mut allgather = AllGather::new(participants, 3, rank == 0, rank as u32, 5);
        let share: &[u8] = match rank {
            0 => b"abc",
            1 => b"de",
            _ => b"fg",
        };
        let mut buf = vec![0u8; 7];

        let own = allgather
            .sendrecv(Some(share), Some(&mut buf), 1)
            .await
            .unwrap();
        assert_eq!(own, share.len(), "rank {rank} chunk size");
        assert_eq!(&buf, b"abcdefg", "rank {rank} assembled buffer");
    })
    .await;
}

#[tokio::test]
async fn test_allgather_requires_both_buffers() {
    let mut allgather = AllGather::new(Vec::new(), 1, true, 0, 5);

    let mut buf = vec![0u8; 4];
    let err = allgather
        .sendrecv(None, Some(&mut buf), 1)
        .await
        .unwrap_err();
    assert!(matches!(err, PlenumError::MissingBuffer { which: "send" }));

    let err = allgather.sendrecv(Some(b"ab"), None, 1).await.unwrap_err();
    assert!(matches!(err, PlenumError::MissingBuffer { which: "receive" }));
}

#[tokio::test]
async fn test_allgather_undersized_contribution() {
    // A send buffer smaller than this rank's chunk is rejected up front.
    let mut allgather = AllGather::new(Vec::new(), 1, true, 0, 5);
    let mut buf = vec![0u8; 4];
    let err = allgather
        .sendrecv(Some(b"abc"), Some(&mut buf), 1)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PlenumError::UndersizedBuffer {
            which: "send",
            needed: 4,
            got: 3
        }
    ));
}
