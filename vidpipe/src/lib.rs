/*!
    Decode a media file into a stream of raw frame records.

    The [`pipeline`] module turns a container file into records; the
    [`protocol`] module defines the record format and provides both the
    writer used by the pipeline and a reader for consumers.
*/

pub mod pipeline;
pub mod protocol;
