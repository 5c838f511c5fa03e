//! Ports implemented by the infrastructure crates

mod clock;
mod ports;
mod repositories;

pub use clock::{Clock, ManualClock, SystemClock};
pub use ports::{KeyOrder, KeyPanel, PlatformGateway, PlatformResult};
pub use repositories::{ApplicationRepository, RepoResult, UserRepository};
