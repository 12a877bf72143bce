pub mod link;

pub use link::{
    LinkRecord, LinkStatus, LinkTag, LinkUpdate, NewLink, PublicLink, ScanVerdict, SecurityStatus,
};
