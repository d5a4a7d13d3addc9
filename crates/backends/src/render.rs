//! Helpers shared by the translators for building wire lines.

use kvbridge_command::join;
use kvbridge_core::Result;

/// Shell-quote and join tokens into one command line.
pub(crate) fn line<S: AsRef<str>>(tokens: &[S]) -> Result<String> {
    join(tokens.iter().map(AsRef::as_ref))
}

pub(crate) fn utf8(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
