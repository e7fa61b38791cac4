//! Platform text normalization for enumerated file names.
//!
//! Some filesystems (HFS+, APFS via the Finder) hand back file names in
//! decomposed Unicode form (NFD) while asset references in game data are
//! written in composed form (NFC). The path cache canonicalizes every name
//! it records so that both spellings land on the same key.

use std::borrow::Cow;

use unicode_normalization::{is_nfc, UnicodeNormalization};

/// Canonicalization applied to raw names before they are indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NameNormalization {
    /// Leave names untouched.
    Preserve,

    /// Compose decomposed sequences into NFC.
    Nfc,

    /// Pick [`NameNormalization::Nfc`] on platforms that decompose file
    /// names, [`NameNormalization::Preserve`] elsewhere.
    #[default]
    Platform,
}

impl NameNormalization {
    /// Resolve [`NameNormalization::Platform`] to a concrete policy.
    pub fn effective(self) -> Self {
        match self {
            NameNormalization::Platform => {
                if cfg!(target_os = "macos") {
                    NameNormalization::Nfc
                } else {
                    NameNormalization::Preserve
                }
            }
            other => other,
        }
    }

    /// Apply the policy to a name.
    ///
    /// Borrows when the name is already canonical.
    ///
    /// ```
    /// use assetfs::NameNormalization;
    ///
    /// let decomposed = "Cafe\u{301}.png";
    /// assert_eq!(NameNormalization::Nfc.apply(decomposed), "Café.png");
    /// assert_eq!(NameNormalization::Preserve.apply(decomposed), decomposed);
    /// ```
    pub fn apply<'a>(self, name: &'a str) -> Cow<'a, str> {
        match self.effective() {
            NameNormalization::Nfc if !is_nfc(name) => Cow::Owned(name.nfc().collect()),
            _ => Cow::Borrowed(name),
        }
    }
}

impl std::fmt::Display for NameNormalization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NameNormalization::Preserve => write!(f, "preserve"),
            NameNormalization::Nfc => write!(f, "nfc"),
            NameNormalization::Platform => write!(f, "platform"),
        }
    }
}
