//! The blocking half of a search, run on a worker thread.
use std::time::Duration;

use tracing::{debug, warn};

use crate::{
	directory::{Connection, Directory, SearchMessage, SearchQuery, PROTOCOL_VERSION},
	entry::Entry,
	ldap_url::LdapUrl,
	result_code::ResultCode,
};

/// What the search phase produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
	/// The search completed and returned these entries.
	Success(Vec<Entry>),
	/// The library reported an error, carrying its description.
	LibraryError(String),
	/// No search was issued because the connection phase failed.
	NotAttempted,
}

/// Everything the worker hands back to the control thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerReport {
	/// Whether a connection handle was initialized
	pub connected: bool,
	/// Outcome of the search
	pub outcome: SearchOutcome,
}

impl WorkerReport {
	/// Report for a request whose connection could not be set up.
	fn not_connected() -> Self {
		Self { connected: false, outcome: SearchOutcome::NotAttempted }
	}
}

/// Connect to the server named by `url`, run its search and collect the
/// entries. Blocks; must not run on the control thread.
///
/// Every handle acquired here is dropped before returning.
#[must_use]
pub fn run<D: Directory>(directory: &D, url: &LdapUrl, wait: Duration) -> WorkerReport {
	let uri = url.connection_uri();
	let mut conn = match directory.initialize(&uri) {
		Ok(conn) => conn,
		Err(code) => {
			warn!("Could not initialize connection to {uri}: {code}");
			return WorkerReport::not_connected();
		}
	};
	if let Err(code) = conn.set_protocol_version(PROTOCOL_VERSION) {
		warn!("Could not select LDAPv{PROTOCOL_VERSION} on {uri}: {code}");
		return WorkerReport::not_connected();
	}

	let query = SearchQuery {
		base: &url.base_dn,
		scope: url.scope,
		filter: &url.filter,
		attributes: &url.attributes,
	};
	let outcome = match conn.search(&query, wait) {
		Ok(mut message) => collect(&mut message),
		Err(code) => library_error(code),
	};
	WorkerReport { connected: true, outcome }
}

/// Walk the entries of a terminal search message.
fn collect<M: SearchMessage>(message: &mut M) -> SearchOutcome {
	let code = message.result_code();
	if !code.is_success() {
		return library_error(code);
	}
	let entries: Vec<Entry> = std::iter::from_fn(|| message.next_entry()).collect();
	debug!("Search returned {} entries", entries.len());
	SearchOutcome::Success(entries)
}

/// Record a library failure.
fn library_error(code: ResultCode) -> SearchOutcome {
	warn!("Search failed: {code}");
	SearchOutcome::LibraryError(code.to_string())
}
