//! Integration tests for nimbus-remote
//!
//! Uses wiremock to simulate the storage service and verifies end-to-end
//! behavior of the client, the `IRemoteStorage` adapter, the session flow,
//! and the core use cases running on top of them.

mod common;

mod test_mirror;
mod test_session;
mod test_transfers;
