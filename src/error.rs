use thiserror::Error;

use crate::{models::BlockKind, parsing::error::ParsingError};

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("{block} block malformed: {reason}")]
    MalformedBlock {
        block: BlockKind,
        reason: &'static str,
    },
    #[error("{block} start date missing (YYYY-MM-DD)")]
    MissingStartDate { block: BlockKind },
    #[error("{block} start date is not a calendar date: {value}")]
    InvalidStartDate { block: BlockKind, value: String },
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
    #[error("Invalid time: {0}")]
    InvalidTime(ParsingError),
    #[error("Json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ScheduleError {
    /// The block a structural error belongs to, if any.
    pub fn block(&self) -> Option<BlockKind> {
        match self {
            Self::MalformedBlock { block, .. }
            | Self::MissingStartDate { block }
            | Self::InvalidStartDate { block, .. } => Some(*block),
            _ => None,
        }
    }
}

pub type SResult<T> = Result<T, ScheduleError>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn error_display() {
        let err = ScheduleError::MalformedBlock {
            block: BlockKind::BusWeek,
            reason: "END marker missing",
        };
        assert_eq!(err.to_string(), "BUS WEEK block malformed: END marker missing");
        assert_eq!(err.block(), Some(BlockKind::BusWeek));

        let err = ScheduleError::MissingStartDate {
            block: BlockKind::FourWeekMenu,
        };
        assert_eq!(
            err.to_string(),
            "4-WEEK MENU start date missing (YYYY-MM-DD)"
        );

        let err = ScheduleError::InvalidPayload("missing field `buses`".to_string());
        assert_eq!(err.to_string(), "Invalid payload: missing field `buses`");
        assert_eq!(err.block(), None);
    }
}
