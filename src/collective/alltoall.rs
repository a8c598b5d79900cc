use crate::collective::{ChunkLayout, Collective, Team};
use crate::error::{PlenumError, Result};
use crate::handle::Handle;
use crate::types::{CollectiveKind, Rank};
use futures::future::BoxFuture;

/// Full personalized exchange with centralized routing at the root.
///
/// Every participant contributes the same `sendsize` bytes, logically split
/// into one chunk per destination rank. The root stages every contribution,
/// then assembles and delivers each destination's row: that rank's chunk
/// from every participant, concatenated in rank order. A participant's
/// receive buffer must hold `chunk(rank) * nparticipants` bytes. Only
/// `sendrecv` is valid.
pub struct AllToAll {
    team: Team,
}

/// Concatenate the root's slice and every staged peer slice for one
/// destination rank.
fn assemble_row(dst: &mut [u8], send: &[u8], staging: &[u8], sendsize: usize, displ: usize, chunk: usize) {
    if chunk == 0 {
        return;
    }
    dst[..chunk].copy_from_slice(&send[displ..displ + chunk]);
    for (j, slot) in staging.chunks_exact(sendsize).enumerate() {
        dst[(j + 1) * chunk..(j + 2) * chunk].copy_from_slice(&slot[displ..displ + chunk]);
    }
}

impl AllToAll {
    pub fn new(
        participants: Vec<Handle>,
        nparticipants: usize,
        root: bool,
        rank: Rank,
        uniqtag: u64,
    ) -> Self {
        Self {
            team: Team::new(participants, nparticipants, root, rank, uniqtag),
        }
    }

    async fn run(
        &mut self,
        sendbuf: Option<&[u8]>,
        recvbuf: Option<&mut [u8]>,
        datasize: usize,
    ) -> Result<usize> {
        let send = sendbuf.ok_or(PlenumError::MissingBuffer { which: "send" })?;
        let recv = recvbuf.ok_or(PlenumError::MissingBuffer { which: "receive" })?;
        let n = self.team.nparticipants;
        let sendsize = send.len();
        let layout = ChunkLayout::new(sendsize, datasize, n)?;

        let own = layout.chunk_bytes(self.team.rank as usize) * n;
        if recv.len() < own {
            return Err(PlenumError::UndersizedBuffer {
                which: "receive",
                needed: own,
                got: recv.len(),
            });
        }

        if self.team.root {
            // Stage every peer's full contribution before routing anything.
            let mut staging = vec![0u8; sendsize * (n - 1)];
            for (i, h) in self.team.participants.iter_mut().enumerate() {
                let slot = &mut staging[i * sendsize..(i + 1) * sendsize];
                let got = h.receive_frame(slot).await?;
                if got == 0 {
                    return Ok(0);
                }
                if got != sendsize {
                    return Err(PlenumError::ConnectionReset);
                }
            }

            for i in 0..n {
                let chunk = layout.chunk_bytes(i);
                let displ = layout.offset_bytes(i);
                if i == 0 {
                    // The root is rank 0: its own row lands in recvbuf.
                    assemble_row(&mut recv[..chunk * n], send, &staging, sendsize, displ, chunk);
                } else {
                    let mut row = vec![0u8; chunk * n];
                    assemble_row(&mut row, send, &staging, sendsize, displ, chunk);
                    if self.team.participants[i - 1].send_frame(&row).await.is_err() {
                        return Err(PlenumError::ConnectionReset);
                    }
                }
            }
            Ok(own)
        } else {
            let h = &mut self.team.participants[0];
            if h.send_frame(send).await.is_err() {
                return Err(PlenumError::ConnectionReset);
            }
            if h.receive_frame(recv).await? == 0 {
                h.close(true, false).await;
            }
            Ok(own)
        }
    }
}

impl Collective for AllToAll {
    fn kind(&self) -> CollectiveKind {
        CollectiveKind::AllToAll
    }

    fn team(&self) -> &Team {
        &self.team
    }

    fn sendrecv<'a>(
        &'a mut self,
        sendbuf: Option<&'a [u8]>,
        recvbuf: Option<&'a mut [u8]>,
        datasize: usize,
    ) -> BoxFuture<'a, Result<usize>> {
        Box::pin(self.run(sendbuf, recvbuf, datasize))
    }

    fn close<'a>(&'a mut self, _close_wr: bool, _close_rd: bool) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            for h in &mut self.team.participants {
                h.close(true, false).await;
            }
        })
    }
}
