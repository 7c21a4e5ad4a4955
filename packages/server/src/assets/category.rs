use serde::{Deserialize, Serialize};

/// Which of an event's reference collections a file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AssetCategory {
    Pdf,
    GuestImages,
    WinnerImages,
    RandomImages,
}

impl AssetCategory {
    /// Classify a multipart file field by its name.
    ///
    /// Image fields are matched by prefix so clients may send indexed names
    /// such as `guestImages[0]`.
    pub fn from_field_name(field: &str) -> Option<Self> {
        if field == "pdfFile" {
            Some(Self::Pdf)
        } else if field.starts_with("guestImages") {
            Some(Self::GuestImages)
        } else if field.starts_with("winnerRunnerUpImages") {
            Some(Self::WinnerImages)
        } else if field.starts_with("eventImages") {
            Some(Self::RandomImages)
        } else {
            None
        }
    }
}
