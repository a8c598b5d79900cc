use crate::collective::{Collective, Team};
use crate::error::{PlenumError, Result};
use crate::handle::Handle;
use crate::types::{CollectiveKind, Rank};
use futures::future::BoxFuture;

/// Streaming one-to-many demultiplexer.
///
/// The root distributes each sent frame to one peer, round-robin; the cursor
/// advances after every send, including a failed one. Non-root views probe
/// and receive from their single handle to the root, and observe EOS when
/// the root closes.
pub struct FanOut {
    team: Team,
    cursor: usize,
}

impl FanOut {
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
        }
    }

    async fn probe_first(&mut self, blocking: bool) -> Result<usize> {
        if self.team.participants.is_empty() {
            return Err(PlenumError::ConnectionReset);
        }
        let res = self.team.participants[0].probe_frame(blocking).await?;
        if res == 0 {
            let mut ended = self.team.participants.remove(0);
            ended.close(true, true).await;
        }
        Ok(res)
    }

    async fn send_next(&mut self, buf: &[u8]) -> Result<usize> {
        if self.team.participants.is_empty() {
            return Err(PlenumError::ConnectionReset);
        }
        let count = self.team.participants.len();
        let res = self.team.participants[self.cursor % count].send_frame(buf).await;
        // The cursor advances even when the send failed.
        self.cursor = (self.cursor + 1) % count;
        res
    }

    async fn receive_first(&mut self, buf: &mut [u8]) -> Result<usize> {
        if self.team.participants.is_empty() {
            return Err(PlenumError::ConnectionReset);
        }
        self.team.participants[0].receive_frame(buf).await
    }
}

impl Collective for FanOut {
    fn kind(&self) -> CollectiveKind {
        CollectiveKind::FanOut
    }

    fn team(&self) -> &Team {
        &self.team
    }

    fn probe<'a>(&'a mut self, blocking: bool) -> BoxFuture<'a, Result<usize>> {
        Box::pin(self.probe_first(blocking))
    }

    fn send<'a>(&'a mut self, buf: &'a [u8]) -> BoxFuture<'a, Result<usize>> {
        Box::pin(self.send_next(buf))
    }

    fn receive<'a>(&'a mut self, buf: &'a mut [u8]) -> BoxFuture<'a, Result<usize>> {
        Box::pin(self.receive_first(buf))
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
