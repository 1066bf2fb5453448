//! Parsing of LDAP URLs as described in [RFC 4516].
//!
//! An LDAP URL names a server and a complete search:
//! `ldap://host:port/base?attributes?scope?filter?extensions`. Every part after
//! the host is optional.
//!
//! [RFC 4516]: https://www.rfc-editor.org/rfc/rfc4516.html
use std::{borrow::Cow, fmt, str::FromStr};

use percent_encoding::percent_decode_str;
use url::Url;

/// Filter used when the URL does not carry one.
pub const DEFAULT_FILTER: &str = "(objectClass=*)";

/// URL scheme, which selects plain or TLS transport and the default port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
	/// `ldap://`
	Ldap,
	/// `ldaps://`
	Ldaps,
}

impl Scheme {
	/// Port used when the URL does not specify one.
	#[must_use]
	pub fn default_port(self) -> u16 {
		match self {
			Scheme::Ldap => 389,
			Scheme::Ldaps => 636,
		}
	}

	/// The scheme as written in a URL.
	#[must_use]
	pub fn as_str(self) -> &'static str {
		match self {
			Scheme::Ldap => "ldap",
			Scheme::Ldaps => "ldaps",
		}
	}
}

/// How far below the base DN a search reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scope {
	/// Only the base entry itself.
	Base,
	/// Immediate children of the base entry.
	OneLevel,
	/// The base entry and everything below it.
	#[default]
	Subtree,
}

impl FromStr for Scope {
	type Err = UrlError;

	fn from_str(scope: &str) -> Result<Self, Self::Err> {
		match scope.to_ascii_lowercase().as_str() {
			"" | "sub" => Ok(Scope::Subtree),
			"one" => Ok(Scope::OneLevel),
			"base" => Ok(Scope::Base),
			_ => Err(UrlError::Scope(scope.to_owned())),
		}
	}
}

/// A parsed LDAP URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LdapUrl {
	/// Transport scheme
	pub scheme: Scheme,
	/// Host name or address literal
	pub host: String,
	/// Port, explicit or the scheme default
	pub port: u16,
	/// Search base, percent-decoded
	pub base_dn: String,
	/// Requested attributes; empty requests all user attributes
	pub attributes: Vec<String>,
	/// Search scope, [`Scope::Subtree`] unless given
	pub scope: Scope,
	/// Search filter, always parenthesized
	pub filter: String,
	/// Non-critical extensions, kept verbatim
	pub extensions: Vec<String>,
}

impl LdapUrl {
	/// Parse an LDAP URL.
	pub fn parse(input: &str) -> Result<Self, UrlError> {
		let url = Url::parse(input)?;

		let scheme = match url.scheme() {
			"ldap" => Scheme::Ldap,
			"ldaps" => Scheme::Ldaps,
			other => return Err(UrlError::Scheme(other.to_owned())),
		};
		if !url.username().is_empty() || url.password().is_some() {
			return Err(UrlError::Userinfo);
		}
		if url.fragment().is_some() {
			return Err(UrlError::Fragment);
		}
		let host = match url.host_str() {
			Some(host) if !host.is_empty() => host.to_owned(),
			_ => return Err(UrlError::MissingHost),
		};
		let port = url.port().unwrap_or_else(|| scheme.default_port());
		let base_dn = decode(url.path().strip_prefix('/').unwrap_or(url.path()))?;

		let fields: Vec<&str> = url.query().map(|query| query.split('?').collect()).unwrap_or_default();
		if fields.len() > 4 {
			return Err(UrlError::TooManyFields);
		}
		let field = |index: usize| fields.get(index).copied().unwrap_or_default();

		let attributes = split_list(field(0))?;
		let scope = decode(field(1))?.parse()?;
		let filter = normalize_filter(&decode(field(2))?);
		let extensions = split_list(field(3))?;
		if let Some(critical) = extensions.iter().find(|ext| ext.starts_with('!')) {
			return Err(UrlError::CriticalExtension(critical.clone()));
		}

		Ok(Self { scheme, host, port, base_dn, attributes, scope, filter, extensions })
	}

	/// The URI naming only the server, used to initialize a connection.
	#[must_use]
	pub fn connection_uri(&self) -> String {
		format!("{}://{}:{}/", self.scheme.as_str(), self.host, self.port)
	}
}

impl FromStr for LdapUrl {
	type Err = UrlError;

	fn from_str(input: &str) -> Result<Self, Self::Err> {
		Self::parse(input)
	}
}

impl fmt::Display for LdapUrl {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}{}", self.connection_uri(), self.base_dn)
	}
}

/// Percent-decode one URL component.
fn decode(component: &str) -> Result<String, UrlError> {
	percent_decode_str(component)
		.decode_utf8()
		.map(Cow::into_owned)
		.map_err(|_| UrlError::Encoding)
}

/// Split a comma separated component, dropping empty items.
fn split_list(component: &str) -> Result<Vec<String>, UrlError> {
	component.split(',').filter(|item| !item.is_empty()).map(decode).collect()
}

/// Apply the default filter and add the outer parentheses LDAP filters
/// require.
fn normalize_filter(filter: &str) -> String {
	let filter = filter.trim();
	if filter.is_empty() {
		DEFAULT_FILTER.to_owned()
	} else if filter.starts_with('(') {
		filter.to_owned()
	} else {
		format!("({filter})")
	}
}

/// Reasons an LDAP URL can be rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UrlError {
	/// Not a URL at all.
	#[error("Malformed URL: {0}")]
	Syntax(#[from] url::ParseError),
	/// A scheme other than `ldap` or `ldaps`.
	#[error("Unsupported scheme {0:?}")]
	Scheme(String),
	/// No host name was given.
	#[error("Missing host")]
	MissingHost,
	/// LDAP URLs never carry credentials.
	#[error("User information is not allowed")]
	Userinfo,
	/// LDAP URLs have no fragment.
	#[error("Fragments are not allowed")]
	Fragment,
	/// More than the four `?` separated query fields.
	#[error("Too many query fields")]
	TooManyFields,
	/// The scope field is not `base`, `one` or `sub`.
	#[error("Unknown scope {0:?}")]
	Scope(String),
	/// A component does not decode to UTF-8.
	#[error("Invalid percent-encoding")]
	Encoding,
	/// A critical extension that cannot be honored.
	#[error("Unsupported critical extension {0:?}")]
	CriticalExtension(String),
}
