use crate::collective::{Collective, Team};
use crate::error::{PlenumError, Result};
use crate::handle::Handle;
use crate::types::{CollectiveKind, Rank};
use futures::future::BoxFuture;

/// Streaming many-to-one multiplexer.
///
/// The root probes its sources round-robin; whichever source has a pending
/// frame first wins the round, and the cursor moves past it so every source
/// gets served over time. A source that ends is dropped from the set; only
/// when the set empties does the caller observe the group-level EOS
/// (`probe` returning `Ok(0)`). Non-root views `send` toward the root and
/// announce their own end by closing.
pub struct FanIn {
    team: Team,
    cursor: usize,
    /// Index of the participant holding the probed-but-unreceived frame.
    probed_idx: Option<usize>,
}

impl FanIn {
    pub fn new(
        participants: Vec<Handle>,
        nparticipants: usize,
        root: bool,
        rank: Rank,
        uniqtag: u64,
    ) -> Self {
        Self {
            team: Team::new(participants, nparticipants, root, rank, uniqtag),
            cursor: 0,
            probed_idx: None,
        }
    }

    async fn probe_any(&mut self, blocking: bool) -> Result<usize> {
        // An outstanding probe keeps re-probing idempotent: the receive must
        // drain that frame before the scan moves on.
        if let Some(idx) = self.probed_idx {
            return Ok(self.team.participants[idx].probed_size().unwrap_or(0));
        }

        loop {
            if self.team.participants.is_empty() {
                // Every source has ended: synthesize the group-level EOS.
                return Ok(0);
            }

            let mut remaining = self.team.participants.len();
            while remaining > 0 {
                let len = self.team.participants.len();
                let idx = self.cursor % len;
                match self.team.participants[idx].probe_frame(false).await {
                    Ok(0) => {
                        // This source ended; drop it and keep scanning. The
                        // next handle slides into the same slot.
                        let mut ended = self.team.participants.remove(idx);
                        ended.close(true, true).await;
                        if self.team.participants.is_empty() {
                            return Ok(0);
                        }
                        remaining = self.team.participants.len();
                    }
                    Ok(size) => {
                        self.probed_idx = Some(idx);
                        self.cursor = idx + 1;
                        return Ok(size);
                    }
                    Err(e) if e.is_would_block() => {
                        self.cursor = idx + 1;
                        remaining -= 1;
                    }
                    Err(e) => return Err(e),
                }
            }

            if !blocking {
                return Err(PlenumError::WouldBlock);
            }
            // Let producers on this runtime make progress before rescanning.
            tokio::task::yield_now().await;
        }
    }

    async fn receive_probed(&mut self, buf: &mut [u8]) -> Result<usize> {
        let idx = self.probed_idx.ok_or(PlenumError::ProbeRequired)?;
        let res = self.team.participants[idx].receive_frame(buf).await?;
        self.probed_idx = None;
        Ok(res)
    }

    async fn send_all(&mut self, buf: &[u8]) -> Result<usize> {
        for h in &self.team.participants {
            h.send_frame(buf).await?;
        }
        Ok(buf.len())
    }
}

impl Collective for FanIn {
    fn kind(&self) -> CollectiveKind {
        CollectiveKind::FanIn
    }

    fn team(&self) -> &Team {
        &self.team
    }

    fn probe<'a>(&'a mut self, blocking: bool) -> BoxFuture<'a, Result<usize>> {
        Box::pin(self.probe_any(blocking))
    }

    fn send<'a>(&'a mut self, buf: &'a [u8]) -> BoxFuture<'a, Result<usize>> {
        Box::pin(self.send_all(buf))
    }

    fn receive<'a>(&'a mut self, buf: &'a mut [u8]) -> BoxFuture<'a, Result<usize>> {
        Box::pin(self.receive_probed(buf))
    }

    fn close<'a>(&'a mut self, _close_wr: bool, _close_rd: bool) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            // A non-root view announces EOS toward the root; the root just
            // drains until the group ends.
            if !self.team.root {
                if let Some(h) = self.team.participants.first_mut() {
                    h.close(true, false).await;
                }
            }
        })
    }
}
