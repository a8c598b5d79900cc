//! Worker-farm pipeline: an emitter fans tasks out to two workers, which fan
//! their results in to a collector.
//!
//! ```bash
//! cargo run --example farm
//! ```

use plenum::{Collective, FanIn, FanOut, Handle, loopback_pair};

const WORKERS: usize = 2;
const TASKS: u32 = 8;

#[tokio::main]
async fn main() -> plenum::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Emitter -> worker channels, and worker -> collector channels.
    let mut emitter_handles = Vec::new();
    let mut collector_handles = Vec::new();
    let mut worker_ends = Vec::new();
    for _ in 0..WORKERS {
        let (from_emitter, to_worker) = loopback_pair();
        let (from_worker, to_collector) = loopback_pair();
        emitter_handles.push(Handle::new(from_emitter));
        collector_handles.push(Handle::new(from_worker));
        worker_ends.push((Handle::new(to_worker), Handle::new(to_collector)));
    }

    let nparticipants = WORKERS + 1;

    let emitter = tokio::spawn(async move {
        let mut fanout = FanOut::new(emitter_handles, nparticipants, true, 0, 1);
        for task in 0..TASKS {
            fanout.send(&task.to_le_bytes()).await.unwrap();
        }
        fanout.close(true, false).await;
    });

    let mut workers = Vec::new();
    for (w, (input, output)) in worker_ends.into_iter().enumerate() {
        workers.push(tokio::spawn(async move {
            let rank = (w + 1) as u32;
            let mut fanout = FanOut::new(vec![input], nparticipants, false, rank, 1);
            let mut fanin = FanIn::new(vec![output], nparticipants, false, rank, 2);

            loop {
                let size = fanout.probe(true).await.unwrap();
                if size == 0 {
                    break;
                }
                let mut buf = [0u8; 4];
                fanout.receive(&mut buf).await.unwrap();
                let task = u32::from_le_bytes(buf);

                // The "work": square the task id.
                let result = u64::from(task) * u64::from(task);
                fanin.send(&result.to_le_bytes()).await.unwrap();
            }
            fanin.close(true, false).await;
        }));
    }

    let collector = tokio::spawn(async move {
        let mut fanin = FanIn::new(collector_handles, nparticipants, true, 0, 2);
        let mut results = Vec::new();
        loop {
            let size = fanin.probe(true).await.unwrap();
            if size == 0 {
                break;
            }
            let mut buf = [0u8; 8];
            fanin.receive(&mut buf).await.unwrap();
            results.push(u64::from_le_bytes(buf));
        }
        results.sort_unstable();
        println!("collected {} results: {results:?}", results.len());
    });

    emitter.await.unwrap();
    for w in workers {
        w.await.unwrap();
    }
    collector.await.unwrap();

    Ok(())
}
