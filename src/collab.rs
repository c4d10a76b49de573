//! Interfaces to the remote collaborators the pipeline can be wired to.
//!
//! The crate owns no network code: generation and naming are traits the
//! embedding application implements against its AI provider of choice.

use crate::error::Result;

/// Fallback sticker name used whenever auto-naming fails or returns nothing.
pub const FALLBACK_NAME: &str = "sticker";

/// Generates a fresh sticker sheet from a reference image.
///
/// Implementations call a remote image-generation service. Failures are
/// propagated with human-readable messages (`Error::Generation`,
/// `Error::MissingCredential`); the pipeline never retries.
pub trait SheetGenerator {
    /// Generate one sheet image (encoded bytes, e.g. PNG) from the encoded
    /// `reference` image and an optional free-text style description.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Generation`] when no image comes back and
    /// [`crate::Error::MissingCredential`] when no API key is configured.
    fn generate_sheet(&self, reference: &[u8], style: Option<&str>) -> Result<Vec<u8>>;
}

/// Suggests a short name for one finished sticker image.
pub trait StickerNamer {
    /// Return a short identifier string for the encoded sticker image.
    ///
    /// # Errors
    ///
    /// May fail for any reason (missing credential, malformed response,
    /// network error); callers are expected to go through
    /// [`name_or_default`], which absorbs the failure.
    fn name_sticker(&self, sticker: &[u8]) -> Result<String>;
}

/// Ask `namer` for a name, falling back to [`FALLBACK_NAME`] on any error
/// or on a blank response. Never propagates a failure.
pub fn name_or_default(namer: &dyn StickerNamer, sticker: &[u8]) -> String {
    match namer.name_sticker(sticker) {
        Ok(name) if !name.trim().is_empty() => name.trim().to_string(),
        _ => FALLBACK_NAME.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    struct FixedNamer(&'static str);

    impl StickerNamer for FixedNamer {
        fn name_sticker(&self, _sticker: &[u8]) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct FailingNamer;

    impl StickerNamer for FailingNamer {
        fn name_sticker(&self, _sticker: &[u8]) -> Result<String> {
            Err(Error::MissingCredential)
        }
    }

    #[test]
    fn successful_name_is_trimmed_and_used() {
        assert_eq!(name_or_default(&FixedNamer("  cat \n"), b""), "cat");
    }

    #[test]
    fn failure_falls_back_to_default() {
        assert_eq!(name_or_default(&FailingNamer, b""), FALLBACK_NAME);
    }

    #[test]
    fn blank_response_falls_back_to_default() {
        assert_eq!(name_or_default(&FixedNamer("   "), b""), FALLBACK_NAME);
    }
}
