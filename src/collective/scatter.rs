use crate::collective::{ChunkLayout, Collective, Team};
use crate::error::{PlenumError, Result};
use crate::handle::Handle;
use crate::types::{CollectiveKind, Rank};
use futures::future::BoxFuture;

/// Partitioned distribution of the root's buffer.
///
/// The root keeps the first chunk for itself and streams one frame per peer,
/// walking the send buffer in rank order; each non-root receives exactly its
/// chunk. The first `remainder` ranks carry one extra element. Only
/// `sendrecv` is valid.
pub struct Scatter {
    team: Team,
}

impl Scatter {
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
        let recv = recvbuf.ok_or(PlenumError::MissingBuffer { which: "receive" })?;

        if self.team.root {
            let send = sendbuf.ok_or(PlenumError::MissingBuffer { which: "send" })?;
            let layout = ChunkLayout::new(send.len(), datasize, self.team.nparticipants)?;

            let own = layout.chunk_bytes(0);
            if recv.len() < own {
                return Err(PlenumError::UndersizedBuffer {
                    which: "receive",
                    needed: own,
                    got: recv.len(),
                });
            }
            recv[..own].copy_from_slice(&send[..own]);

            let mut offset = own;
            for (i, h) in self.team.participants.iter().enumerate() {
                let chunk = layout.chunk_bytes(i + 1);
                if h.send_frame(&send[offset..offset + chunk]).await.is_err() {
                    return Err(PlenumError::ConnectionReset);
                }
                offset += chunk;
            }
            Ok(own)
        } else {
            let h = &mut self.team.participants[0];
            let res = h.receive_frame(recv).await?;
            if res == 0 {
                h.close(true, false).await;
            }
            Ok(res)
        }
    }
}

impl Collective for Scatter {
    fn kind(&self) -> CollectiveKind {
        CollectiveKind::Scatter
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
            if self.team.root {
                for h in &mut self.team.participants {
                    h.close(true, false).await;
                }
            }
        })
    }
}
