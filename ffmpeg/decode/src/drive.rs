/*!
    Adapter from FFmpeg's send/receive API to single-step decoding.
*/

use ffmpeg_next::{codec::decoder::Opened, ffi, packet::Flags as PacketFlags, util::frame::Frame};

use ffmpeg_types::{Error, Packet, Result};

/**
    Flush bookkeeping shared by the audio and video decoders.
*/
#[derive(Debug, Default)]
pub(crate) struct DriveState {
    eof_sent: bool,
}

fn is_again(e: &ffmpeg_next::Error) -> bool {
    matches!(e, ffmpeg_next::Error::Other { errno } if *errno == ffi::EAGAIN)
}

/**
    Run one decoder step.

    A successful send takes the whole packet remainder. When the decoder's
    input queue is full the send is refused and nothing is consumed, but a
    frame is guaranteed to be ready, so the caller makes progress either way.

    Returns the number of bytes consumed and whether `frame` was filled.
*/
pub(crate) fn drive(
    decoder: &mut Opened,
    state: &mut DriveState,
    packet: Option<&Packet>,
    frame: &mut Frame,
) -> Result<(usize, bool)> {
    let consumed = match packet {
        Some(packet) if !packet.data().is_empty() => {
            let mut ffmpeg_pkt = ffmpeg_next::Packet::copy(packet.data());
            ffmpeg_pkt.set_pts(packet.pts);
            ffmpeg_pkt.set_dts(packet.dts);
            if packet.is_keyframe {
                ffmpeg_pkt.set_flags(PacketFlags::KEY);
            }

            match decoder.send_packet(&ffmpeg_pkt) {
                Ok(()) => packet.remaining(),
                Err(e) if is_again(&e) => 0,
                Err(e) => return Err(Error::codec(e.to_string())),
            }
        }
        Some(_) => 0,
        None => {
            if !state.eof_sent {
                match decoder.send_eof() {
                    Ok(()) | Err(ffmpeg_next::Error::Eof) => state.eof_sent = true,
                    // Pending output first; EOF is retried on the next flush call
                    Err(e) if is_again(&e) => {}
                    Err(e) => return Err(Error::codec(e.to_string())),
                }
            }
            0
        }
    };

    match decoder.receive_frame(frame) {
        Ok(()) => Ok((consumed, true)),
        Err(ffmpeg_next::Error::Eof) => Ok((consumed, false)),
        Err(e) if is_again(&e) => Ok((consumed, false)),
        Err(e) => Err(Error::codec(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use ffmpeg_next::{codec, util::frame::video::Video as VideoFrameFFmpeg};

    use super::*;

    const WIDTH: i32 = 4;
    const HEIGHT: i32 = 2;
    const FRAME_BYTES: usize = (WIDTH * HEIGHT) as usize;

    /// Raw GRAY8 decoder: every 8-byte packet is one 4x2 frame.
    fn raw_gray_decoder() -> Opened {
        ffmpeg_next::init().unwrap();
        let codec = codec::decoder::find(codec::Id::RAWVIDEO).expect("rawvideo decoder");
        let mut ctx = codec::context::Context::new_with_codec(codec);
        unsafe {
            let raw = ctx.as_mut_ptr();
            (*raw).width = WIDTH;
            (*raw).height = HEIGHT;
            (*raw).pix_fmt = ffi::AVPixelFormat::AV_PIX_FMT_GRAY8;
        }
        ctx.decoder().open_as(codec).expect("open rawvideo decoder")
    }

    fn gray_packet(value: u8) -> Packet {
        Packet::new(0, vec![value; FRAME_BYTES]).with_keyframe(true)
    }

    #[test]
    fn accepted_packet_is_consumed_whole() {
        let mut decoder = raw_gray_decoder();
        let mut state = DriveState::default();
        let mut frame = VideoFrameFFmpeg::empty();

        let (consumed, got_frame) =
            drive(&mut decoder, &mut state, Some(&gray_packet(7)), &mut frame).unwrap();

        assert_eq!(consumed, FRAME_BYTES);
        assert!(got_frame);
        assert_eq!(frame.width(), WIDTH as u32);
        assert_eq!(&frame.data(0)[..WIDTH as usize], &[7; 4]);
    }

    #[test]
    fn empty_remainder_consumes_nothing() {
        let mut decoder = raw_gray_decoder();
        let mut state = DriveState::default();
        let mut frame = VideoFrameFFmpeg::empty();

        let mut packet = gray_packet(1);
        packet.advance(FRAME_BYTES);

        let (consumed, got_frame) =
            drive(&mut decoder, &mut state, Some(&packet), &mut frame).unwrap();
        assert_eq!(consumed, 0);
        assert!(!got_frame);
        assert!(!state.eof_sent);
    }

    #[test]
    fn refused_send_consumes_nothing_but_yields_a_frame() {
        let mut decoder = raw_gray_decoder();
        let mut state = DriveState::default();
        let mut frame = VideoFrameFFmpeg::empty();

        // Fill the decoder's input queue without reading anything back
        for value in [1, 2] {
            let ffmpeg_pkt = ffmpeg_next::Packet::copy(&[value; FRAME_BYTES]);
            decoder.send_packet(&ffmpeg_pkt).unwrap();
        }

        let packet = gray_packet(3);
        let (consumed, got_frame) =
            drive(&mut decoder, &mut state, Some(&packet), &mut frame).unwrap();
        assert_eq!(consumed, 0);
        assert!(got_frame);
        assert_eq!(frame.data(0)[0], 1);

        // Re-feeding the same packet eventually gets it accepted
        let mut seen = vec![1];
        let mut accepted = false;
        for _ in 0..4 {
            let (consumed, got_frame) =
                drive(&mut decoder, &mut state, Some(&packet), &mut frame).unwrap();
            if got_frame {
                seen.push(frame.data(0)[0]);
            }
            if consumed == FRAME_BYTES {
                accepted = true;
                break;
            }
            assert_eq!(consumed, 0);
        }
        assert!(accepted);
        assert_eq!(seen, vec![1, 2, 3]);
    }

    #[test]
    fn flush_sends_eof_once_and_then_reports_no_frames() {
        let mut decoder = raw_gray_decoder();
        let mut state = DriveState::default();
        let mut frame = VideoFrameFFmpeg::empty();

        drive(&mut decoder, &mut state, Some(&gray_packet(5)), &mut frame).unwrap();

        let (consumed, got_frame) = drive(&mut decoder, &mut state, None, &mut frame).unwrap();
        assert_eq!(consumed, 0);
        assert!(!got_frame);
        assert!(state.eof_sent);

        // A second flush call must not fail on an already-draining decoder
        let (consumed, got_frame) = drive(&mut decoder, &mut state, None, &mut frame).unwrap();
        assert_eq!(consumed, 0);
        assert!(!got_frame);
        assert!(state.eof_sent);
    }
}
