use crate::archive::ArchiveHandle;
use crate::error::CrossCheckError;

/// Supplies the ordered list of archives for a run.
///
/// The order returned here is the order archives are partitioned into
/// batches. [`DirectorySource`](crate::DirectorySource) lists a folder in
/// file-name order; a plain `Vec<ArchiveHandle>` is used as given.
///
/// # Thread Safety
///
/// `Send + Sync` are required so the builder can hold sources as
/// `Box<dyn Source>`.
///
/// # Example
///
/// ```rust
/// use crosscheck::{ArchiveHandle, CrossCheckError, Source};
///
/// struct Fixed(Vec<&'static str>);
///
/// impl Source for Fixed {
///     fn archives(&self) -> Result<Vec<ArchiveHandle>, CrossCheckError> {
///         Ok(self.0.iter().map(|p| ArchiveHandle::new(*p)).collect())
///     }
/// }
///
/// let names: Vec<_> = Fixed(vec!["a.zip", "b.zip"])
///     .archives()
///     .unwrap()
///     .into_iter()
///     .map(|a| a.name)
///     .collect();
/// assert_eq!(names, ["a.zip", "b.zip"]);
/// ```
pub trait Source: Send + Sync {
    /// Produce the archives to check.
    ///
    /// Errors here are fatal: the run aborts before any task is dispatched.
    fn archives(&self) -> Result<Vec<ArchiveHandle>, CrossCheckError>;
}

impl Source for Vec<ArchiveHandle> {
    fn archives(&self) -> Result<Vec<ArchiveHandle>, CrossCheckError> {
        Ok(self.clone())
    }
}
