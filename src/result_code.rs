//! LDAP result codes and their human-readable descriptions.
use std::fmt;

/// A status reported by the LDAP library. Non-negative values are protocol
/// result codes sent by the server, negative values are client-side
/// conditions such as a lost connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResultCode(pub i32);

impl ResultCode {
	/// The operation completed.
	pub const SUCCESS: Self = Self(0);
	/// Server-side operations error.
	pub const OPERATIONS_ERROR: Self = Self(1);
	/// The request violated the protocol.
	pub const PROTOCOL_ERROR: Self = Self(2);
	/// The server-side time limit was hit.
	pub const TIME_LIMIT_EXCEEDED: Self = Self(3);
	/// The server-side size limit was hit.
	pub const SIZE_LIMIT_EXCEEDED: Self = Self(4);
	/// The base object does not exist.
	pub const NO_SUCH_OBJECT: Self = Self(32);
	/// The base DN is not a valid DN.
	pub const INVALID_DN_SYNTAX: Self = Self(34);
	/// Bind credentials were rejected.
	pub const INVALID_CREDENTIALS: Self = Self(49);
	/// Access control denied the operation.
	pub const INSUFFICIENT_ACCESS: Self = Self(50);
	/// The server is unavailable.
	pub const UNAVAILABLE: Self = Self(52);
	/// Catch-all server error.
	pub const OTHER: Self = Self(80);
	/// The server could not be reached or the connection was lost.
	pub const SERVER_DOWN: Self = Self(-1);
	/// A client-side error.
	pub const LOCAL_ERROR: Self = Self(-2);
	/// A request could not be encoded.
	pub const ENCODING_ERROR: Self = Self(-3);
	/// A response could not be decoded.
	pub const DECODING_ERROR: Self = Self(-4);
	/// No result arrived in time.
	pub const TIMEOUT: Self = Self(-5);
	/// The search filter could not be parsed.
	pub const FILTER_ERROR: Self = Self(-7);
	/// A parameter passed to the library was invalid.
	pub const PARAM_ERROR: Self = Self(-9);
	/// The connection could not be established.
	pub const CONNECT_ERROR: Self = Self(-11);
	/// The requested feature is not supported by the library.
	pub const NOT_SUPPORTED: Self = Self(-12);

	/// Whether this is [`ResultCode::SUCCESS`].
	#[must_use]
	pub fn is_success(self) -> bool {
		self == Self::SUCCESS
	}

	/// The library's description of this code.
	#[must_use]
	pub fn description(self) -> &'static str {
		match self.0 {
			0 => "Success",
			1 => "Operations error",
			2 => "Protocol error",
			3 => "Time limit exceeded",
			4 => "Size limit exceeded",
			5 => "Compare False",
			6 => "Compare True",
			7 => "Authentication method not supported",
			8 => "Strong(er) authentication required",
			10 => "Referral",
			11 => "Administrative limit exceeded",
			12 => "Critical extension is unavailable",
			13 => "Confidentiality required",
			14 => "SASL bind in progress",
			16 => "No such attribute",
			17 => "Undefined attribute type",
			18 => "Inappropriate matching",
			19 => "Constraint violation",
			20 => "Type or value exists",
			21 => "Invalid syntax",
			32 => "No such object",
			33 => "Alias problem",
			34 => "Invalid DN syntax",
			35 => "Entry is a leaf",
			36 => "Alias dereferencing problem",
			48 => "Inappropriate authentication",
			49 => "Invalid credentials",
			50 => "Insufficient access",
			51 => "Server is busy",
			52 => "Server is unavailable",
			53 => "Server is unwilling to perform",
			54 => "Loop detected",
			64 => "Naming violation",
			65 => "Object class violation",
			66 => "Operation not allowed on non-leaf",
			67 => "Operation not allowed on RDN",
			68 => "Already exists",
			69 => "Cannot modify object class",
			70 => "Results too large",
			71 => "Operation affects multiple DSAs",
			80 => "Other (e.g., implementation specific) error",
			-1 => "Can't contact LDAP server",
			-2 => "Local error",
			-3 => "Encoding error",
			-4 => "Decoding error",
			-5 => "Timed out",
			-6 => "Unknown authentication method",
			-7 => "Bad search filter",
			-8 => "User cancelled operation",
			-9 => "Bad parameter to an ldap routine",
			-10 => "Out of memory",
			-11 => "Connect error",
			-12 => "Not Supported",
			-13 => "Control not found",
			-14 => "No results returned",
			-15 => "More results to return",
			-16 => "Client Loop",
			-17 => "Referral Limit Exceeded",
			_ => "Unknown error",
		}
	}
}

impl fmt::Display for ResultCode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.description())
	}
}

impl From<u32> for ResultCode {
	fn from(rc: u32) -> Self {
		i32::try_from(rc).map_or(Self::OTHER, Self)
	}
}
