//! The blocking call surface of an LDAP client library.
//!
//! Each handle the library hands out is an owned value: dropping it releases
//! the underlying resource, so every exit path of a search gives back what it
//! acquired.
use std::time::Duration;

use crate::{entry::Entry, ldap_url::Scope, result_code::ResultCode};

/// LDAP protocol version negotiated on every connection.
pub const PROTOCOL_VERSION: u8 = 3;

/// Entry point of an LDAP client library.
pub trait Directory: Send + Sync + 'static {
	/// Connection handle type.
	type Connection: Connection;

	/// Initialize a connection handle for a URI of the form
	/// `scheme://host:port/`.
	fn initialize(&self, uri: &str) -> Result<Self::Connection, ResultCode>;
}

/// An open connection handle. Released when dropped.
pub trait Connection {
	/// Result message handle type.
	type Message: SearchMessage;

	/// Select the protocol version spoken on this connection.
	fn set_protocol_version(&mut self, version: u8) -> Result<(), ResultCode>;

	/// Issue a search and block until its terminal result message arrives or
	/// `wait` elapses.
	fn search(&mut self, query: &SearchQuery<'_>, wait: Duration) -> Result<Self::Message, ResultCode>;
}

/// The terminal message of a search, giving access to the returned entries.
/// Released when dropped.
pub trait SearchMessage {
	/// Result code the server reported for the search.
	fn result_code(&self) -> ResultCode;

	/// Advance to the next returned entry.
	fn next_entry(&mut self) -> Option<Entry>;
}

/// Parameters of one search operation.
#[derive(Debug, Clone, Copy)]
pub struct SearchQuery<'a> {
	/// Search base
	pub base: &'a str,
	/// Search scope
	pub scope: Scope,
	/// Search filter
	pub filter: &'a str,
	/// Requested attributes; empty means all
	pub attributes: &'a [String],
}
