/// Transient, non-blocking user-facing message.
///
/// The `Display` text is what a front-end shows verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// The watch failed or timed out; the default origin is back in use.
    LocationUnavailable,
    LocationUnsupported,
    /// Clipboard fallback succeeded.
    Copied,
    CopyFailed,
}

impl Notice {
    /// `true` for notices reporting a failure rather than a confirmation.
    #[must_use]
    pub fn is_error(self) -> bool {
        !matches!(self, Notice::Copied)
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Notice::LocationUnavailable => {
                "Impossible de suivre votre position. Utilisation de l'emplacement par défaut."
            }
            Notice::LocationUnsupported => {
                "La géolocalisation n'est pas supportée par votre navigateur."
            }
            Notice::Copied => "Copié !",
            Notice::CopyFailed => "Impossible de copier les informations.",
        };
        f.write_str(text)
    }
}
