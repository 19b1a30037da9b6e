//! Anatomical view classification for thumbnail sorting.

use std::fmt;

/// Placeholder for a missing laterality or view position.
pub const UNKNOWN: &str = "Unknown";

/// Builds the "`<laterality>-<view>`" key used to pick a container.
pub fn formatted_tags(laterality: Option<&str>, view_position: Option<&str>) -> String {
    let part = |value: Option<&str>| {
        value
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(UNKNOWN)
            .to_string()
    };
    format!("{}-{}", part(laterality), part(view_position))
}

/// Thumbnail container an image is sorted into.
///
/// The four standard screening mammography views get their own container;
/// anything else lands in [`ViewContainer::NonMammo`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ViewContainer {
    /// Right craniocaudal
    RightCc,
    /// Left craniocaudal
    LeftCc,
    /// Right mediolateral oblique
    RightMlo,
    /// Left mediolateral oblique
    LeftMlo,
    NonMammo,
}

impl ViewContainer {
    pub const ALL: [ViewContainer; 5] = [
        ViewContainer::RightCc,
        ViewContainer::LeftCc,
        ViewContainer::RightMlo,
        ViewContainer::LeftMlo,
        ViewContainer::NonMammo,
    ];

    /// Maps a formatted "`<laterality>-<view>`" key to its container.
    pub fn from_formatted(formatted: &str) -> Self {
        match formatted {
            "R-CC" => Self::RightCc,
            "L-CC" => Self::LeftCc,
            "R-MLO" => Self::RightMlo,
            "L-MLO" => Self::LeftMlo,
            _ => Self::NonMammo,
        }
    }

    pub fn from_tags(laterality: Option<&str>, view_position: Option<&str>) -> Self {
        Self::from_formatted(&formatted_tags(laterality, view_position))
    }

    /// Container element id.
    pub fn id(&self) -> &'static str {
        match self {
            Self::RightCc => "R-CC-container",
            Self::LeftCc => "L-CC-container",
            Self::RightMlo => "R-MLO-container",
            Self::LeftMlo => "L-MLO-container",
            Self::NonMammo => "non-mammo-container",
        }
    }

    /// Short label, also used as the per-container export directory name.
    pub fn label(&self) -> &'static str {
        match self {
            Self::RightCc => "R-CC",
            Self::LeftCc => "L-CC",
            Self::RightMlo => "R-MLO",
            Self::LeftMlo => "L-MLO",
            Self::NonMammo => "non-mammo",
        }
    }
}

impl fmt::Display for ViewContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formatted_tags_fills_unknown_parts() {
        assert_eq!(formatted_tags(Some("R"), Some("CC")), "R-CC");
        assert_eq!(formatted_tags(None, Some("MLO")), "Unknown-MLO");
        assert_eq!(formatted_tags(Some(" "), None), "Unknown-Unknown");
    }

    #[test]
    fn standard_views_get_their_own_container() {
        assert_eq!(ViewContainer::from_tags(Some("R"), Some("CC")), ViewContainer::RightCc);
        assert_eq!(ViewContainer::from_tags(Some("L"), Some("CC")), ViewContainer::LeftCc);
        assert_eq!(ViewContainer::from_tags(Some("R"), Some("MLO")), ViewContainer::RightMlo);
        assert_eq!(ViewContainer::from_tags(Some("L"), Some("MLO")), ViewContainer::LeftMlo);
        assert_eq!(ViewContainer::LeftMlo.id(), "L-MLO-container");
    }

    #[test]
    fn everything_else_is_non_mammo() {
        for (lat, view) in [
            (Some("B"), Some("CC")),
            (Some("R"), Some("ML")),
            (None, Some("CC")),
            (Some("L"), None),
            (Some("r"), Some("cc")),
        ] {
            assert_eq!(ViewContainer::from_tags(lat, view), ViewContainer::NonMammo);
        }
        assert_eq!(ViewContainer::NonMammo.id(), "non-mammo-container");
    }
}
