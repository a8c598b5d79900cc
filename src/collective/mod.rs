//! Collective strategies over unicast framed channels.
//!
//! One strategy per pattern, all implementing the common [`Collective`]
//! contract. A strategy owns an ordered list of peer [`Handle`]s, its team
//! rank, the participant count and an opaque group tag; rooted strategies
//! additionally know whether this view is the root. The root owns one handle
//! per non-root peer in peer-rank order; a non-root view owns the single
//! handle to the root.

mod allgather;
mod alltoall;
mod broadcast;
mod fan_in;
mod fan_out;
mod gather;
mod helpers;
mod scatter;

pub use allgather::AllGather;
pub use alltoall::AllToAll;
pub use broadcast::Broadcast;
pub use fan_in::FanIn;
pub use fan_out::FanOut;
pub use gather::Gather;
pub use scatter::Scatter;

pub(crate) use helpers::ChunkLayout;

use crate::error::{PlenumError, Result};
use crate::handle::Handle;
use crate::types::{CollectiveKind, Rank};
use futures::future::BoxFuture;

/// Shared state of a collective strategy: its peers and its place in the team.
pub struct Team {
    pub(crate) participants: Vec<Handle>,
    pub(crate) nparticipants: usize,
    pub(crate) rank: Rank,
    pub(crate) root: bool,
    pub(crate) uniqtag: u64,
}

impl Team {
    pub fn new(
        participants: Vec<Handle>,
        nparticipants: usize,
        root: bool,
        rank: Rank,
        uniqtag: u64,
    ) -> Self {
        debug_assert!(nparticipants >= 1);
        debug_assert!((rank as usize) < nparticipants);
        Self {
            participants,
            nparticipants,
            rank,
            root,
            uniqtag,
        }
    }

    /// Number of elements out of `buffcount` that fall to this rank: the
    /// even share, plus one when the rank is below the remainder.
    pub fn partition_size(&self, buffcount: usize) -> usize {
        let mut partition = buffcount / self.nparticipants;
        if (self.rank as usize) < buffcount % self.nparticipants {
            partition += 1;
        }
        partition
    }

    /// Opaque group tag, passed through without interpretation.
    pub fn uniqtag(&self) -> u64 {
        self.uniqtag
    }
}

fn unsupported(kind: CollectiveKind, operation: &'static str) -> PlenumError {
    tracing::warn!(%kind, operation, "operation not supported by this collective");
    PlenumError::UnsupportedOperation { kind, operation }
}

/// Common contract implemented by every collective strategy.
///
/// Strategies reject operations that are not native to their pattern: the
/// data-parallel collectives accept only `sendrecv`, the streaming ones only
/// `probe`/`send`/`receive`. The provided method bodies are the rejecting
/// implementations.
///
/// `Ok(0)` from `probe`, `receive` or `sendrecv` signals end-of-stream.
pub trait Collective: Send {
    /// Which pattern this strategy implements.
    fn kind(&self) -> CollectiveKind;

    /// Shared team state (peers, rank, participant count).
    fn team(&self) -> &Team;

    /// This participant's team rank.
    fn team_rank(&self) -> Rank {
        self.team().rank
    }

    /// Number of elements out of `buffcount` assigned to this rank.
    fn team_partition_size(&self, buffcount: usize) -> usize {
        self.team().partition_size(buffcount)
    }

    /// Probe for the next message, returning its payload size.
    fn probe<'a>(&'a mut self, blocking: bool) -> BoxFuture<'a, Result<usize>> {
        let _ = blocking;
        let err = unsupported(self.kind(), "probe");
        Box::pin(std::future::ready(Err(err)))
    }

    /// Send one message.
    fn send<'a>(&'a mut self, buf: &'a [u8]) -> BoxFuture<'a, Result<usize>> {
        let _ = buf;
        let err = unsupported(self.kind(), "send");
        Box::pin(std::future::ready(Err(err)))
    }

    /// Receive one previously probed message into `buf`.
    fn receive<'a>(&'a mut self, buf: &'a mut [u8]) -> BoxFuture<'a, Result<usize>> {
        let _ = buf;
        let err = unsupported(self.kind(), "receive");
        Box::pin(std::future::ready(Err(err)))
    }

    /// Run one round of the data-parallel collective.
    ///
    /// Buffer roles and sizing are pattern-specific; `datasize` is the
    /// element size the partition arithmetic may not split.
    fn sendrecv<'a>(
        &'a mut self,
        sendbuf: Option<&'a [u8]>,
        recvbuf: Option<&'a mut [u8]>,
        datasize: usize,
    ) -> BoxFuture<'a, Result<usize>> {
        let _ = (sendbuf, recvbuf, datasize);
        let err = unsupported(self.kind(), "sendrecv");
        Box::pin(std::future::ready(Err(err)))
    }

    /// True as soon as any participant has something to read.
    fn peek(&self) -> bool {
        self.team().participants.iter().any(|h| h.peek())
    }

    /// Tear down per the strategy's close policy.
    fn close<'a>(&'a mut self, close_wr: bool, close_rd: bool) -> BoxFuture<'a, ()>;

    /// Transport-specific completion hook; the generic strategies do nothing.
    fn finalize(&mut self, _flag: bool, _name: &str) {}
}

/// Instantiate the generic strategy for `kind`.
pub fn new_strategy(
    kind: CollectiveKind,
    participants: Vec<Handle>,
    nparticipants: usize,
    root: bool,
    rank: Rank,
    uniqtag: u64,
) -> Box<dyn Collective> {
    match kind {
        CollectiveKind::Broadcast => Box::new(Broadcast::new(
            participants,
            nparticipants,
            root,
            rank,
            uniqtag,
        )),
        CollectiveKind::Scatter => Box::new(Scatter::new(
            participants,
            nparticipants,
            root,
            rank,
            uniqtag,
        )),
        CollectiveKind::Gather => Box::new(Gather::new(
            participants,
            nparticipants,
            root,
            rank,
            uniqtag,
        )),
        CollectiveKind::AllGather => Box::new(AllGather::new(
            participants,
            nparticipants,
            root,
            rank,
            uniqtag,
        )),
        CollectiveKind::AllToAll => Box::new(AllToAll::new(
            participants,
            nparticipants,
            root,
            rank,
            uniqtag,
        )),
        CollectiveKind::FanIn => Box::new(FanIn::new(
            participants,
            nparticipants,
            root,
            rank,
            uniqtag,
        )),
        CollectiveKind::FanOut => Box::new(FanOut::new(
            participants,
            nparticipants,
            root,
            rank,
            uniqtag,
        )),
    }
}
