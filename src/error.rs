//! Error codes

use crate::ldap_url::UrlError;

/// Message delivered for URLs that fail to parse.
pub const INVALID_URI: &str = "Invalid LDAP URI";

/// Errors that can occur when using this library
#[derive(thiserror::Error, Debug)]
pub enum Error {
	/// The URL of a search request could not be parsed as an LDAP URL.
	#[error("Invalid LDAP URI")]
	InvalidUri(#[from] UrlError),
	/// No connection handle could be initialized for the request.
	#[error("Could not connect to LDAP server")]
	Connect,
	/// The LDAP library reported a failure, carrying its error string.
	#[error("{0}")]
	Library(String),
	/// The bridge configuration is unusable.
	#[error("Invalid configuration: {0}")]
	Config(String),
	/// The worker runtime could not be started.
	#[error(transparent)]
	Io(#[from] std::io::Error),
}

/// The arguments passed to a search did not have the expected shape. This is
/// the only error raised synchronously, before any work is scheduled.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ArgumentError(pub(crate) &'static str);

impl ArgumentError {
	/// The message describing which argument was wrong.
	#[must_use]
	pub fn message(&self) -> &'static str {
		self.0
	}
}
