/*!
    Draining frames a decoder is still holding after input ends.
*/

use tracing::debug;

use ffmpeg_decode::PacketDecoder;

use super::{PipelineError, StreamKind};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FlushState {
    /// Packets are still arriving.
    #[default]
    Streaming,
    /// Input is exhausted; buffered frames are being pulled out.
    Draining,
    /// The decoder reported it holds nothing more.
    Done,
}

/**
    Tracks the end-of-input phase of one decoder.

    Once the packet source runs dry, the decoder is called in flush mode
    until a call returns no frame. Frames held back for reordering come out
    this way; skipping the drain would lose them.
*/
#[derive(Debug, Default)]
pub struct FlushController {
    state: FlushState,
    calls: u64,
}

impl FlushController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> FlushState {
        self.state
    }

    /**
        Flush-mode decoder calls made so far.
    */
    pub fn calls(&self) -> u64 {
        self.calls
    }

    /**
        Mark the packet source as exhausted.
    */
    pub fn begin_drain(&mut self) {
        if self.state == FlushState::Streaming {
            self.state = FlushState::Draining;
        }
    }

    /**
        Pull every buffered frame out of `decoder`, handing each to
        `on_frame`. Returns the number of frames drained.

        Starts the drain if it has not been started. Does nothing once the
        controller is done.
    */
    pub fn drain<D, F>(
        &mut self,
        decoder: &mut D,
        kind: StreamKind,
        mut on_frame: F,
    ) -> Result<u64, PipelineError>
    where
        D: PacketDecoder,
        F: FnMut(D::Frame) -> Result<(), PipelineError>,
    {
        self.begin_drain();

        let mut frames = 0;
        while self.state == FlushState::Draining {
            let step = decoder
                .decode(None)
                .map_err(|source| PipelineError::Decode { kind, source })?;
            self.calls += 1;

            match step.frame {
                Some(frame) => {
                    frames += 1;
                    on_frame(frame)?;
                }
                None => self.state = FlushState::Done,
            }
        }

        debug!(%kind, frames, calls = self.calls, "decoder drained");
        Ok(frames)
    }
}
