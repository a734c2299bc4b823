//! Project status.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a portfolio project.
///
/// Serialized as `completed` / `in-progress`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectStatus {
    #[default]
    Completed,
    InProgress,
}

impl ProjectStatus {
    /// The wire and storage form of this status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::InProgress => "in-progress",
        }
    }
}

impl std::fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProjectStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "completed" => Ok(Self::Completed),
            "in-progress" => Ok(Self::InProgress),
            _ => Err(format!("invalid project status: {s}")),
        }
    }
}

// Stored as TEXT with a CHECK constraint rather than a Postgres enum type.
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for ProjectStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for ProjectStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(s.parse()?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for ProjectStatus {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <&str as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.as_str(), buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names() {
        assert_eq!(
            serde_json::to_string(&ProjectStatus::InProgress).unwrap(),
            "\"in-progress\""
        );
        assert_eq!(
            serde_json::from_str::<ProjectStatus>("\"completed\"").unwrap(),
            ProjectStatus::Completed
        );
        assert!(serde_json::from_str::<ProjectStatus>("\"archived\"").is_err());
    }

    #[test]
    fn test_from_str_matches_display() {
        for status in [ProjectStatus::Completed, ProjectStatus::InProgress] {
            assert_eq!(status.to_string().parse::<ProjectStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_default_is_completed() {
        assert_eq!(ProjectStatus::default(), ProjectStatus::Completed);
    }
}
