/*!
 * Document layout model.
 *
 * Input records from the extraction collaborator and the harvested spans the
 * pipeline works on.
 */

pub mod model;

pub use model::{
    LayoutDocument, LayoutPage, OcrWord, PageGeometry, RawCell, RawSpan, RawTable, Rect,
    SpanSource, TableRef, TextSpan,
};
