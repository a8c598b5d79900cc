use crate::collective::{ChunkLayout, Collective, Team};
use crate::error::{PlenumError, Result};
use crate::handle::Handle;
use crate::types::{CollectiveKind, Rank};
use futures::future::BoxFuture;

/// Gather followed by a reflect-back broadcast of the assembled buffer, so
/// every participant ends up with the same rank-ordered concatenation.
///
/// Only `sendrecv` is valid.
pub struct AllGather {
    team: Team,
}

impl AllGather {
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
        let layout = ChunkLayout::new(recv.len(), datasize, n)?;

        if self.team.root {
            let own = layout.chunk_bytes(0);
            if send.len() < own {
                return Err(PlenumError::UndersizedBuffer {
                    which: "send",
                    needed: own,
                    got: send.len(),
                });
            }
            recv[..own].copy_from_slice(&send[..own]);

            let mut displ = own;
            for (i, h) in self.team.participants.iter_mut().enumerate() {
                let chunk = layout.chunk_bytes(i + 1);
                let got = h.receive_frame(&mut recv[displ..displ + chunk]).await?;
                if got == 0 {
                    return Ok(0);
                }
                if got != chunk {
                    return Err(PlenumError::ConnectionReset);
                }
                displ += chunk;
            }

            // Reflect the assembled buffer back to every peer.
            for h in &self.team.participants {
                if h.send_frame(recv).await.is_err() {
                    return Err(PlenumError::ConnectionReset);
                }
            }
            Ok(own)
        } else {
            let chunk = layout.chunk_bytes(self.team.rank as usize);
            if send.len() < chunk {
                return Err(PlenumError::UndersizedBuffer {
                    which: "send",
                    needed: chunk,
                    got: send.len(),
                });
            }

            let h = &mut self.team.participants[0];
            if h.send_frame(&send[..chunk]).await.is_err() {
                return Err(PlenumError::ConnectionReset);
            }
            if h.receive_frame(recv).await? == 0 {
                h.close(true, false).await;
            }
            Ok(chunk)
        }
    }
}

impl Collective for AllGather {
    fn kind(&self) -> CollectiveKind {
        CollectiveKind::AllGather
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
