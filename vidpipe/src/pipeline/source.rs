use ffmpeg_source::Source;
use ffmpeg_types::{Packet, Result};

/**
    Anything that yields compressed packets tagged with a stream index.
*/
pub trait PacketSource {
    /**
        Next packet, or `None` once the input is exhausted.
    */
    fn next_packet(&mut self) -> Result<Option<Packet>>;

    /**
        Packets the source dropped itself because no decoder wants them.
    */
    fn skipped_packets(&self) -> u64 {
        0
    }
}

impl PacketSource for Source {
    fn next_packet(&mut self) -> Result<Option<Packet>> {
        Source::next_packet(self)
    }

    fn skipped_packets(&self) -> u64 {
        Source::skipped_packets(self)
    }
}
