//! Rooted-team walkthrough: broadcast a header, scatter a payload, gather the
//! transformed shares back.
//!
//! ```bash
//! cargo run --example team
//! ```

use plenum::{Broadcast, Collective, Gather, Handle, Scatter, loopback_pair};

const RANKS: usize = 3;

/// One star of channels per collective, since each strategy owns its handles.
fn star() -> Vec<Vec<Handle>> {
    let mut root = Vec::new();
    let mut peers = Vec::new();
    for _ in 1..RANKS {
        let (to_peer, to_root) = loopback_pair();
        root.push(Handle::new(to_peer));
        peers.push(vec![Handle::new(to_root)]);
    }
    let mut all = vec![root];
    all.extend(peers);
    all
}

#[tokio::main]
async fn main() -> plenum::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let broadcast_star = star();
    let scatter_star = star();
    let gather_star = star();

    let mut tasks = Vec::new();
    for (rank, ((b, s), g)) in broadcast_star
        .into_iter()
        .zip(scatter_star)
        .zip(gather_star)
        .enumerate()
    {
        tasks.push(tokio::spawn(async move {
            let is_root = rank == 0;
            let mut broadcast = Broadcast::new(b, RANKS, is_root, rank as u32, 1);
            let mut scatter = Scatter::new(s, RANKS, is_root, rank as u32, 2);
            let mut gather = Gather::new(g, RANKS, is_root, rank as u32, 3);

            // Everyone learns the same header.
            let mut header = [0u8; 5];
            if is_root {
                broadcast
                    .sendrecv(Some(b"start"), Some(&mut header), 1)
                    .await
                    .unwrap();
            } else {
                broadcast
                    .sendrecv(None, Some(&mut header), 1)
                    .await
                    .unwrap();
            }

            // The root splits 0..=9 across the team; shares are 4, 3, 3.
            let payload: Vec<u8> = (0..10).collect();
            let mut share = vec![0u8; 4];
            let got = if is_root {
                scatter
                    .sendrecv(Some(&payload), Some(&mut share), 1)
                    .await
                    .unwrap()
            } else {
                scatter.sendrecv(None, Some(&mut share), 1).await.unwrap()
            };

            // Everyone doubles its share, the root reassembles.
            for byte in &mut share[..got] {
                *byte *= 2;
            }
            if is_root {
                let mut doubled = vec![0u8; 10];
                gather
                    .sendrecv(Some(&share[..got]), Some(&mut doubled), 1)
                    .await
                    .unwrap();
                println!("header: {:?}", std::str::from_utf8(&header).unwrap());
                println!("doubled payload at root: {doubled:?}");
            } else {
                gather
                    .sendrecv(Some(&share[..got]), None, 1)
                    .await
                    .unwrap();
            }
        }));
    }

    for t in tasks {
        t.await.unwrap();
    }

    Ok(())
}
