use crate::collective::{ChunkLayout, Collective, Team};
use crate::error::{PlenumError, Result};
use crate::handle::Handle;
use crate::types::{CollectiveKind, Rank};
use futures::future::BoxFuture;

/// Inverse of scatter: the root assembles every rank's chunk into its
/// receive buffer, in rank order.
///
/// The root's receive buffer defines the group total; each peer's frame
/// lands at its packed displacement. A non-root contributes its whole send
/// buffer, or exactly its chunk when it passes a receive buffer sized to the
/// group total. Only `sendrecv` is valid.
pub struct Gather {
    team: Team,
}

impl Gather {
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
        let n = self.team.nparticipants;

        if self.team.root {
            let recv = recvbuf.ok_or(PlenumError::MissingBuffer { which: "receive" })?;
            let layout = ChunkLayout::new(recv.len(), datasize, n)?;

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
                    // A peer ended mid-gather: the group is corrupted.
                    return Ok(0);
                }
                if got != chunk {
                    return Err(PlenumError::ConnectionReset);
                }
                displ += chunk;
            }
            Ok(own)
        } else {
            // When the caller provides the group-total receive size, the
            // contribution is clipped to this rank's exact chunk; otherwise
            // the whole send buffer is the contribution.
            let share = match recvbuf {
                Some(recv) => {
                    let layout = ChunkLayout::new(recv.len(), datasize, n)?;
                    let chunk = layout.chunk_bytes(self.team.rank as usize);
                    if send.len() < chunk {
                        return Err(PlenumError::UndersizedBuffer {
                            which: "send",
                            needed: chunk,
                            got: send.len(),
                        });
                    }
                    chunk
                }
                None => send.len(),
            };
            let h = &self.team.participants[0];
            if h.send_frame(&send[..share]).await.is_err() {
                return Err(PlenumError::ConnectionReset);
            }
            Ok(share)
        }
    }
}

impl Collective for Gather {
    fn kind(&self) -> CollectiveKind {
        CollectiveKind::Gather
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
            // Both views write-close every owned handle.
            for h in &mut self.team.participants {
                h.close(true, false).await;
            }
        })
    }
}
