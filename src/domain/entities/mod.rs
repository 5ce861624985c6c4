//! Domain entities - Plain data the application layer works with

pub mod guild;
pub mod notice;

pub use guild::{GuildInfo, GuildSummary, InviteSummary, MemberSummary, OwnerSummary};
pub use notice::{Notice, NoticeField};
