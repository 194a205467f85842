use ffmpeg_types::{Packet, Result};

/**
    Outcome of one decoder invocation.
*/
#[derive(Debug, PartialEq, Eq)]
pub struct DecodeStep<F> {
    /// Bytes of the packet remainder the decoder took. May exceed what was
    /// offered; callers clamp.
    pub consumed: usize,
    /// A decoded frame, if one became available.
    pub frame: Option<F>,
}

impl<F> DecodeStep<F> {
    pub fn new(consumed: usize, frame: Option<F>) -> Self {
        Self { consumed, frame }
    }

    /**
        A step that consumed nothing and produced nothing.
    */
    pub fn idle() -> Self {
        Self {
            consumed: 0,
            frame: None,
        }
    }
}

/**
    A decoder driven one invocation at a time.

    With `Some(packet)`, the decoder is offered `packet.data()` (the bytes
    not yet consumed) and reports how many it took. With `None`, the decoder
    is in flush mode: it returns a frame it buffered internally, or no frame
    once it is drained.
*/
pub trait PacketDecoder {
    type Frame;

    fn decode(&mut self, packet: Option<&Packet>) -> Result<DecodeStep<Self::Frame>>;
}
