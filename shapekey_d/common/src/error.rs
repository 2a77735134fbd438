use thiserror::Error;

/// Reasons one axis cannot be extracted from the current frame.
///
/// These never leave the frame driver: the affected axis holds its previous
/// value instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtractError {
    #[error("landmark {index} out of range for snapshot of {len} points")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("mapping has no {0} configured")]
    MissingPoint(&'static str),
    #[error("non-finite value in {0}")]
    NonFinite(&'static str),
}

pub(crate) fn point(snapshot: &api::LandmarkSnapshot, index: usize) -> Result<glam::Vec3, ExtractError> {
    snapshot.get(index).ok_or(ExtractError::IndexOutOfRange {
        index,
        len: snapshot.len(),
    })
}
