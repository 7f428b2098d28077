// ABOUTME: Platform client capability and its REST implementation.
// ABOUTME: Exports the Platform trait, resource kinds, pod model, and ApiClient.

mod client;
mod error;
mod kind;
mod pods;
mod service_account;
mod traits;

pub use client::{ApiClient, parse_access_token};
pub use error::PlatformError;
pub use kind::ResourceKind;
pub use pods::{PodInfo, PodList, PodPhase};
pub use service_account::{link_secret, unlink_secret};
pub use traits::Platform;
