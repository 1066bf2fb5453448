//! Directory collaborator backed by the blocking `ldap3` client.

use std::{time::Duration, vec};

use ldap3::{LdapConn, LdapError, ResultEntry, SearchEntry, SearchResult};
use tracing::debug;

use crate::{
	config::ConnectionConfig,
	directory::{Connection, Directory, SearchMessage, SearchQuery, PROTOCOL_VERSION},
	entry::Entry,
	ldap_url::Scope,
	result_code::ResultCode,
};

/// Opens `ldap3` connections with the configured settings.
#[derive(Debug, Clone)]
pub struct Ldap {
	/// Settings applied to every connection.
	config: ConnectionConfig,
}

impl Ldap {
	/// Create a collaborator that connects with the given settings.
	#[must_use]
	pub fn new(config: ConnectionConfig) -> Self {
		Self { config }
	}
}

impl Directory for Ldap {
	type Connection = LdapConnection;

	fn initialize(&self, uri: &str) -> Result<Self::Connection, ResultCode> {
		let conn = LdapConn::with_settings(self.config.to_settings(), uri)
			.map_err(|err| result_code(&err))?;
		Ok(LdapConnection { conn })
	}
}

/// An open `ldap3` connection, unbound when dropped.
#[allow(missing_debug_implementations)]
pub struct LdapConnection {
	/// The underlying synchronous connection.
	conn: LdapConn,
}

impl Connection for LdapConnection {
	type Message = LdapMessage;

	fn set_protocol_version(&mut self, version: u8) -> Result<(), ResultCode> {
		// ldap3 only speaks LDAPv3
		if version == PROTOCOL_VERSION {
			Ok(())
		} else {
			Err(ResultCode::NOT_SUPPORTED)
		}
	}

	fn search(&mut self, query: &SearchQuery<'_>, wait: Duration) -> Result<Self::Message, ResultCode> {
		let SearchResult(entries, result) = self
			.conn
			.with_timeout(wait)
			.search(query.base, to_ldap3_scope(query.scope), query.filter, query.attributes)
			.map_err(|err| result_code(&err))?;
		Ok(LdapMessage { code: ResultCode::from(result.rc), entries: entries.into_iter() })
	}
}

impl Drop for LdapConnection {
	fn drop(&mut self) {
		if let Err(err) = self.conn.unbind() {
			debug!("Unbinding LDAP connection failed: {err}");
		}
	}
}

/// The collected result of an `ldap3` search.
#[allow(missing_debug_implementations)]
pub struct LdapMessage {
	/// Result code of the search
	code: ResultCode,
	/// Entries not yet walked
	entries: vec::IntoIter<ResultEntry>,
}

impl SearchMessage for LdapMessage {
	fn result_code(&self) -> ResultCode {
		self.code
	}

	fn next_entry(&mut self) -> Option<Entry> {
		self.entries.next().map(SearchEntry::construct).map(Entry::from)
	}
}

/// Map a scope to its `ldap3` counterpart
fn to_ldap3_scope(scope: Scope) -> ldap3::Scope {
	match scope {
		Scope::Base => ldap3::Scope::Base,
		Scope::OneLevel => ldap3::Scope::OneLevel,
		Scope::Subtree => ldap3::Scope::Subtree,
	}
}

/// Map an `ldap3` error to the result code the C library would have reported
fn result_code(err: &LdapError) -> ResultCode {
	match err {
		LdapError::LdapResult { result } => ResultCode::from(result.rc),
		LdapError::Timeout { .. } => ResultCode::TIMEOUT,
		LdapError::Io { .. } | LdapError::EndOfStream => ResultCode::SERVER_DOWN,
		LdapError::FilterParsing => ResultCode::FILTER_ERROR,
		LdapError::UrlParsing { .. } | LdapError::UnknownScheme(_) => ResultCode::PARAM_ERROR,
		_ => ResultCode::LOCAL_ERROR,
	}
}
