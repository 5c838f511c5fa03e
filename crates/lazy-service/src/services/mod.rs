//! Business logic services
//!
//! Each service borrows the shared [`ServiceContext`] and handles one area
//! of the bot: command rules, access, keys, private channels, invites.

pub mod access;
pub mod applications;
pub mod commands;
pub mod context;
pub mod error;
pub mod invites;
pub mod keys;
pub mod panels;
pub mod tickets;
pub mod transcript;
pub mod validator;
pub mod verification;

// Re-export all services for convenience
pub use access::{AccessDecision, AccessService, Gated};
pub use applications::ApplicationService;
pub use commands::{CommandCatalog, CommandSurface};
pub use context::{ServiceContext, ServiceContextBuilder};
pub use error::{ServiceError, ServiceResult};
pub use invites::{InviteService, JoinOutcome, JoiningMember};
pub use keys::KeyService;
pub use panels::{EmbedTemplate, PanelService};
pub use tickets::{CloseOutcome, OpenOutcome, PendingClose, TicketService};
pub use validator::CommandValidator;
pub use verification::VerificationService;
