/// Full `Content-Type` header value attached to every request and response
/// produced by this codec.
pub const CONTENT_TYPE: &str = "application/bitcode; charset=binary";

/// Media type portion of [`CONTENT_TYPE`].
///
/// Dispatchers supporting several codecs should match on this value after
/// stripping any `;`-separated parameters from the incoming header.
pub const CONTENT_TYPE_MEDIA: &str = "application/bitcode";

/// Correlation id reserved for notifications (no reply expected).
pub const NOTIFICATION_ID: u64 = 0;

/// Wire name of the dynamic destination type (see `codec::Value`).
pub const ANY_TYPE_NAME: &str = "any";

/// Hint appended to encode failures caused by an error that is not one of
/// the registered shapes.
pub const UNREGISTERED_ERROR_HINT: &str = " (hint: use bitrpc::new_error() instead)";
