/*!
    Feeding one packet through a decoder.
*/

use tracing::trace;

use ffmpeg_decode::PacketDecoder;
use ffmpeg_types::Packet;

use super::{PipelineError, StreamKind};

/**
    Feed `packet` to `decoder` until every byte has been consumed, handing
    each produced frame to `on_frame`.

    Decoders may take only part of a packet per call; the remainder is
    offered again. A reported consumption larger than what is left is
    clamped. A call that takes no bytes and yields no frame means the
    decoder cannot make progress and fails the run.

    Returns the number of decoder calls made.
*/
pub fn decode_packet<D, F>(
    decoder: &mut D,
    packet: &mut Packet,
    kind: StreamKind,
    mut on_frame: F,
) -> Result<u64, PipelineError>
where
    D: PacketDecoder,
    F: FnMut(D::Frame) -> Result<(), PipelineError>,
{
    let mut calls = 0;

    while !packet.is_consumed() {
        let step = decoder
            .decode(Some(packet))
            .map_err(|source| PipelineError::Decode { kind, source })?;
        calls += 1;

        let taken = packet.advance(step.consumed);
        if taken < step.consumed {
            trace!(%kind, reported = step.consumed, taken, "clamped decoder consumption");
        }

        match step.frame {
            Some(frame) => on_frame(frame)?,
            None if taken == 0 => {
                return Err(PipelineError::Stalled {
                    kind,
                    remaining: packet.remaining(),
                });
            }
            None => {}
        }
    }

    Ok(calls)
}

#[cfg(test)]
mod tests {
    use ffmpeg_decode::DecodeStep;
    use ffmpeg_types::{Error, Result};

    use super::*;

    /// Takes a fixed number of bytes per call and returns the offered size
    /// as its "frame".
    struct ChunkDecoder {
        chunk: usize,
        overreport: usize,
        offered: Vec<usize>,
        reported: Vec<usize>,
    }

    impl ChunkDecoder {
        fn new(chunk: usize) -> Self {
            Self {
                chunk,
                overreport: 0,
                offered: Vec::new(),
                reported: Vec::new(),
            }
        }
    }

    impl PacketDecoder for ChunkDecoder {
        type Frame = usize;

        fn decode(&mut self, packet: Option<&Packet>) -> Result<DecodeStep<usize>> {
            let remaining = packet.map_or(0, Packet::remaining);
            self.offered.push(remaining);
            let consumed = self.chunk.min(remaining) + self.overreport;
            self.reported.push(consumed);
            Ok(DecodeStep::new(consumed, Some(remaining)))
        }
    }

    #[test]
    fn partial_consumption_reoffers_remainder() {
        let mut decoder = ChunkDecoder::new(4);
        let mut packet = Packet::new(0, vec![0; 10]);
        let mut frames = Vec::new();

        let calls = decode_packet(&mut decoder, &mut packet, StreamKind::Audio, |f| {
            frames.push(f);
            Ok(())
        })
        .unwrap();

        assert_eq!(calls, 3);
        assert_eq!(decoder.offered, vec![10, 6, 2]);
        assert_eq!(frames.len(), 3);
        assert!(packet.is_consumed());
    }

    #[test]
    fn consumed_bytes_sum_to_packet_size() {
        for chunk in [1, 3, 7, 64] {
            let mut decoder = ChunkDecoder::new(chunk);
            let mut packet = Packet::new(0, vec![0; 50]);
            decode_packet(&mut decoder, &mut packet, StreamKind::Audio, |_| Ok(())).unwrap();

            let consumed: usize = decoder.reported.iter().sum();
            assert_eq!(consumed, 50, "chunk {chunk}");
        }
    }

    #[test]
    fn overreported_consumption_is_clamped() {
        let mut decoder = ChunkDecoder::new(4);
        decoder.overreport = 100;
        let mut packet = Packet::new(0, vec![0; 10]);

        let calls =
            decode_packet(&mut decoder, &mut packet, StreamKind::Video, |_| Ok(())).unwrap();

        assert_eq!(calls, 1);
        assert_eq!(packet.remaining(), 0);
    }

    #[test]
    fn empty_packet_makes_no_calls() {
        let mut decoder = ChunkDecoder::new(4);
        let mut packet = Packet::new(0, Vec::new());
        let calls =
            decode_packet(&mut decoder, &mut packet, StreamKind::Video, |_| Ok(())).unwrap();
        assert_eq!(calls, 0);
    }

    struct StuckDecoder;

    impl PacketDecoder for StuckDecoder {
        type Frame = ();

        fn decode(&mut self, _packet: Option<&Packet>) -> Result<DecodeStep<()>> {
            Ok(DecodeStep::idle())
        }
    }

    #[test]
    fn stalled_decoder_fails() {
        let mut packet = Packet::new(0, vec![0; 8]);
        let err = decode_packet(&mut StuckDecoder, &mut packet, StreamKind::Video, |_| Ok(()))
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Stalled {
                kind: StreamKind::Video,
                remaining: 8
            }
        ));
    }

    struct FailingDecoder {
        calls: usize,
    }

    impl PacketDecoder for FailingDecoder {
        type Frame = ();

        fn decode(&mut self, _packet: Option<&Packet>) -> Result<DecodeStep<()>> {
            self.calls += 1;
            if self.calls == 2 {
                return Err(Error::codec("invalid data found when processing input"));
            }
            Ok(DecodeStep::new(2, Some(())))
        }
    }

    #[test]
    fn decoder_error_aborts_packet() {
        let mut decoder = FailingDecoder { calls: 0 };
        let mut packet = Packet::new(0, vec![0; 8]);
        let mut frames = 0;

        let err = decode_packet(&mut decoder, &mut packet, StreamKind::Audio, |_| {
            frames += 1;
            Ok(())
        })
        .unwrap_err();

        assert!(matches!(err, PipelineError::Decode { kind: StreamKind::Audio, .. }));
        assert_eq!(decoder.calls, 2);
        assert_eq!(frames, 1);
        assert_eq!(packet.remaining(), 6);
    }

    #[test]
    fn frame_handler_error_propagates() {
        let mut decoder = ChunkDecoder::new(2);
        let mut packet = Packet::new(0, vec![0; 8]);
        let err = decode_packet(&mut decoder, &mut packet, StreamKind::Video, |_| {
            Err(PipelineError::Convert(Error::invalid_data("bad frame")))
        })
        .unwrap_err();

        assert!(matches!(err, PipelineError::Convert(_)));
        assert_eq!(decoder.offered.len(), 1);
    }
}
