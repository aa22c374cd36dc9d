//! Built-in contingency checks.

mod acs;
mod cwmp;
mod default;
mod dns;
mod interface;
mod multicast;

pub use acs::{AcsCheck, SOFTWARE_VERSION_PARAMETER};
pub use cwmp::CwmpCheck;
pub use default::{DefaultChecks, PROMPT_PROBE, check_prompts};
pub use dns::{ACS_DOMAIN, DnsCheck};
pub use interface::CheckInterface;
pub use multicast::MulticastCheck;
