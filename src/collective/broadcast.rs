use crate::collective::{Collective, Team};
use crate::error::{PlenumError, Result};
use crate::handle::Handle;
use crate::types::{CollectiveKind, Rank};
use futures::future::BoxFuture;

/// One-to-all dissemination.
///
/// The root sends the same frame to every peer in rank order and delivers to
/// itself by copy; non-roots receive a single frame from the root. Only
/// `sendrecv` is valid.
pub struct Broadcast {
    team: Team,
}

impl Broadcast {
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
    ) -> Result<usize> {
        if self.team.root {
            let send = sendbuf.ok_or(PlenumError::MissingBuffer { which: "send" })?;
            for h in &self.team.participants {
                if h.send_frame(send).await.is_err() {
                    return Err(PlenumError::ConnectionReset);
                }
            }
            // Self-delivery.
            if let Some(recv) = recvbuf {
                if recv.len() < send.len() {
                    return Err(PlenumError::UndersizedBuffer {
                        which: "receive",
                        needed: send.len(),
                        got: recv.len(),
                    });
                }
                recv[..send.len()].copy_from_slice(send);
            }
            Ok(send.len())
        } else {
            let recv = recvbuf.ok_or(PlenumError::MissingBuffer { which: "receive" })?;
            let h = &mut self.team.participants[0];
            let res = h.receive_frame(recv).await?;
            if res == 0 {
                h.close(true, false).await;
            }
            Ok(res)
        }
    }
}

impl Collective for Broadcast {
    fn kind(&self) -> CollectiveKind {
        CollectiveKind::Broadcast
    }

    fn team(&self) -> &Team {
        &self.team
    }

    fn sendrecv<'a>(
        &'a mut self,
        sendbuf: Option<&'a [u8]>,
        recvbuf: Option<&'a mut [u8]>,
        _datasize: usize,
    ) -> BoxFuture<'a, Result<usize>> {
        Box::pin(self.run(sendbuf, recvbuf))
    }

    fn close<'a>(&'a mut self, _close_wr: bool, _close_rd: bool) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            // Only the root issues an explicit close; non-root handles drain
            // to EOS naturally.
            if self.team.root {
                for h in &mut self.team.participants {
                    h.close(true, false).await;
                }
            }
        })
    }
}
