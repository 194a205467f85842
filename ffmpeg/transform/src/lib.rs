/*!
    Video frame conversion for vidpipe.

    Decoded frames arrive in whatever pixel layout the codec produces. This
    crate converts them into one fixed target layout, writing into a reusable
    output buffer. Both the converter context and the buffer are created on
    the first frame that needs them and kept for as long as the frame
    geometry stays the same.
*/

mod buffer;
mod video;

pub use self::buffer::{
    BUFFER_ALIGN, GeometryPolicy, OutputBuffer, OutputBufferManager, PlaneLayout,
};
pub use self::video::{ConversionContext, ScalingAlgorithm, VideoConverter, VideoConverterConfig};
