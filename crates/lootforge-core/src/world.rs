use crate::error::Result;
use crate::ids::RecordId;
use crate::records::Record;

/// Access to the layered record store the pipeline reads from and writes to.
///
/// Reads always observe winning overrides. Writes only ever append new
/// records or touch override copies in the writable layer.
pub trait WorldModel {
    /// Winning version of the record with `id`, if it exists as a `T`.
    fn resolve<T: Record>(&self, id: RecordId) -> Option<&T>;

    /// Highest-priority version of every record of type `T`, ordered by id.
    fn winning_overrides<T: Record>(&self) -> Vec<&T>;

    /// Fresh identifier, disjoint from every existing record.
    fn allocate_id(&mut self) -> Result<RecordId>;

    /// Insert a new record into the writable layer.
    fn add_new<T: Record>(&mut self, record: T) -> Result<RecordId>;

    /// Writable override of an existing record, created on first access.
    fn get_or_create_override<T: Record>(&mut self, id: RecordId) -> Result<&mut T>;
}
