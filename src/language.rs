// src/language.rs
// Supported language table for the Sarvam model chain

/// The language the document and the LLM answer are assumed to be in.
pub const BASE_LANGUAGE: &str = "en-IN";

/// Voice used when the detected language carries no dedicated speaker.
pub const DEFAULT_VOICE: &str = "ananya";

/// One entry in the closed supported-language set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageInfo {
    /// BCP-47 style code as the Sarvam API expects it (e.g. "hi-IN")
    pub code: &'static str,
    pub name: &'static str,
    pub native_name: &'static str,
    /// Bulbul speaker for this language
    pub voice: &'static str,
}

/// Closed set of languages the pipeline can translate into and speak.
/// Any other code falls back to [`BASE_LANGUAGE`] + [`DEFAULT_VOICE`].
pub const SUPPORTED_LANGUAGES: [LanguageInfo; 11] = [
    LanguageInfo { code: "hi-IN", name: "Hindi", native_name: "हिन्दी", voice: "ananya" },
    LanguageInfo { code: "ta-IN", name: "Tamil", native_name: "தமிழ்", voice: "ananya" },
    LanguageInfo { code: "te-IN", name: "Telugu", native_name: "తెలుగు", voice: "ananya" },
    LanguageInfo { code: "kn-IN", name: "Kannada", native_name: "ಕನ್ನಡ", voice: "ananya" },
    LanguageInfo { code: "ml-IN", name: "Malayalam", native_name: "മലയാളം", voice: "ananya" },
    LanguageInfo { code: "bn-IN", name: "Bengali", native_name: "বাংলা", voice: "ananya" },
    LanguageInfo { code: "gu-IN", name: "Gujarati", native_name: "ગુજરાતી", voice: "ananya" },
    LanguageInfo { code: "mr-IN", name: "Marathi", native_name: "मराठी", voice: "ananya" },
    LanguageInfo { code: "pa-IN", name: "Punjabi", native_name: "ਪੰਜਾਬੀ", voice: "ananya" },
    LanguageInfo { code: "or-IN", name: "Odia", native_name: "ଓଡ଼ିଆ", voice: "ananya" },
    LanguageInfo { code: "en-IN", name: "English", native_name: "English", voice: "ananya" },
];

/// Look up a language by exact code.
pub fn find(code: &str) -> Option<&'static LanguageInfo> {
    SUPPORTED_LANGUAGES.iter().find(|l| l.code == code)
}

pub fn is_supported(code: &str) -> bool {
    find(code).is_some()
}

/// Resolve the (language, speaker) pair for speech synthesis.
///
/// Unsupported codes fall back to the base language with the default voice
/// rather than failing the synthesis stage.
pub fn voice_for(code: &str) -> (&'static str, &'static str) {
    match find(code) {
        Some(lang) => (lang.code, lang.voice),
        None => (BASE_LANGUAGE, DEFAULT_VOICE),
    }
}
