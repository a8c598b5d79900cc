use plenum::{Collective, Gather, PlenumError, Scatter};

use super::helpers::run_team;

#[tokio::test]
async fn test_gather_four_ranks() {
    // Each rank contributes 2 two-byte elements; the root assembles 16 bytes
    // at displacements 0, 4, 8, 12.
    run_team(4, |rank, participants| async move {
        let mut gather = Gather::new(participants, 4, rank == 0, rank as u32, 3);
        let share: Vec<u8> = (0..4).map(|i| (rank * 10 + i) as u8).collect();

        if rank == 0 {
            let mut buf = vec![0u8; 16];
            let own = gather
                .sendrecv(Some(&share), Some(&mut buf), 2)
                .await
                .unwrap();
            assert_eq!(own, 4);
            let expect: Vec<u8> = (0..4).flat_map(|r| (0..4).map(move |i| (r * 10 + i) as u8)).collect();
            assert_eq!(buf, expect);
        } else {
            let sent = gather.sendrecv(Some(&share), None, 2).await.unwrap();
            assert_eq!(sent, 4, "rank {rank} contribution size");
        }
    })
    .await;
}

#[tokio::test]
async fn test_gather_with_remainder() {
    // 7 one-byte elements over 3 ranks: the root expects 3, 2, 2.
    run_team(3, |rank, participants| async move {
        let mut gather = Gather::new(participants, 3, rank == 0, rank as u32, 3);

        if rank == 0 {
            let mut buf = vec![0u8; 7];
            let own = gather
                .sendrecv(Some(b"abc"), Some(&mut buf), 1)
                .await
                .unwrap();
            assert_eq!(own, 3);
            assert_eq!(&buf, b"abcdefg");
        } else {
            let share: &[u8] = if rank == 1 { b"de" } else { b"fg" };
            assert_eq!(gather.sendrecv(Some(share), None, 1).await.unwrap(), 2);
        }
    })
    .await;
}

#[tokio::test]
async fn test_gather_nonroot_clips_to_chunk() {
    // A non-root that passes the group-total receive size sends exactly its
    // chunk even when its send buffer is larger.
    run_team(2, |rank, participants| async move {
        let mut gather = Gather::new(participants, 2, rank == 0, rank as u32, 3);

        if rank == 0 {
            let mut buf = vec![0u8; 4];
            gather.sendrecv(Some(b"AB"), Some(&mut buf), 1).await.unwrap();
            assert_eq!(&buf, b"ABcd");
        } else {
            let mut sizer = vec![0u8; 4];
            let sent = gather
                .sendrecv(Some(b"cdXX"), Some(&mut sizer), 1)
                .await
                .unwrap();
            assert_eq!(sent, 2);
        }
    })
    .await;
}

#[tokio::test]
async fn test_gather_inverse_of_scatter() {
    // Scattered shares gathered straight back reassemble the original buffer.
    let scatter_star = super::helpers::star(3);
    let gather_star = super::helpers::star(3);

    let mut tasks = Vec::new();
    for (rank, (down, up)) in scatter_star.into_iter().zip(gather_star).enumerate() {
        tasks.push(tokio::spawn(async move {
            let original = b"0123456789".to_vec();
            let mut scatter = Scatter::new(down, 3, rank == 0, rank as u32, 4);
            let mut gather = Gather::new(up, 3, rank == 0, rank as u32, 4);

            let mut share = vec![0u8; 4];
            let got = if rank == 0 {
                scatter
                    .sendrecv(Some(&original), Some(&mut share), 1)
                    .await
                    .unwrap()
            } else {
                scatter.sendrecv(None, Some(&mut share), 1).await.unwrap()
            };

            if rank == 0 {
                let mut buf = vec![0u8; 10];
                gather
                    .sendrecv(Some(&share[..got]), Some(&mut buf), 1)
                    .await
                    .unwrap();
                assert_eq!(buf, original);
            } else {
                gather.sendrecv(Some(&share[..got]), None, 1).await.unwrap();
            }
        }));
    }
    for t in tasks {
        t.await.unwrap();
    }
}

#[tokio::test]
async fn test_gather_requires_sendbuf() {
    let mut gather = Gather::new(Vec::new(), 1, true, 0, 3);
    let mut buf = vec![0u8; 4];
    let err = gather.sendrecv(None, Some(&mut buf), 1).await.unwrap_err();
    assert!(matches!(err, PlenumError::MissingBuffer { which: "send" }));
}

#[tokio::test]
async fn test_gather_rejects_indivisible_recvsize() {
    let mut gather = Gather::new(Vec::new(), 1, true, 0, 3);
    let mut buf = vec![0u8; 5];
    let err = gather
        .sendrecv(Some(b"abcde"), Some(&mut buf), 2)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PlenumError::IndivisibleBuffer {
            size: 5,
            datasize: 2
        }
    ));
}
