/// Illumina strand designation (TOP/BOT convention), independent of the
/// reference-forward strand
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strand {
    Top,
    Bot,
}

impl Strand {
    /// Parse a strand token as written in array manifests
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "Top" | "TOP" => Some(Self::Top),
            "Bot" | "BOT" => Some(Self::Bot),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_top(self) -> bool {
        matches!(self, Self::Top)
    }
}

impl std::fmt::Display for Strand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Top => write!(f, "TOP"),
            Self::Bot => write!(f, "BOT"),
        }
    }
}

/// Policy used to line up sample streams with the manifest
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum SyncMode {
    /// Samples follow manifest order exactly; no lookup table is built
    #[default]
    IndexFree,
    /// Manifest is preloaded into a name-keyed table and the first sample drives iteration
    Map,
}

impl std::fmt::Display for SyncMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IndexFree => write!(f, "index-free"),
            Self::Map => write!(f, "map"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strand_parse() {
        assert_eq!(Strand::parse("Top"), Some(Strand::Top));
        assert_eq!(Strand::parse("TOP"), Some(Strand::Top));
        assert_eq!(Strand::parse("Bot"), Some(Strand::Bot));
        assert_eq!(Strand::parse("BOT"), Some(Strand::Bot));
        assert_eq!(Strand::parse("PLUS"), None);
        assert_eq!(Strand::parse(""), None);
    }

    #[test]
    fn test_sync_mode_default() {
        assert_eq!(SyncMode::default(), SyncMode::IndexFree);
        assert_eq!(SyncMode::Map.to_string(), "map");
    }
}
