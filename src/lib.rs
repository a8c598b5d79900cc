pub mod collective;
pub mod config;
pub mod error;
pub mod handle;
pub mod transport;
pub mod types;

pub use collective::{
    AllGather, AllToAll, Broadcast, Collective, FanIn, FanOut, Gather, Scatter, Team, new_strategy,
};
pub use config::PlenumConfig;
pub use error::{PlenumError, Result};
pub use handle::Handle;
pub use transport::{Channel, LoopbackChannel, loopback_pair, loopback_pair_with};
pub use types::{CollectiveKind, Rank};
