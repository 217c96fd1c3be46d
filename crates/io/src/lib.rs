// Schema-driven workbook writing
//
// A Schema declares, per field, how a value column is exported: header text,
// explicit position, editability, dropdown options, header comment. The
// WorkbookWriter turns records into a gridport-engine Workbook, notifying
// registered WriteHandlers at each lifecycle point; LockHandler and
// DropdownHandler implement the cell-locking and validation/comment
// behaviors on top of those hooks. The finished workbook is saved with xlsx.

pub mod columns;
pub mod dropdown;
pub mod lock;
pub mod schema;
pub mod writer;
pub mod xlsx;
