/*!
    Compressed packet with a consumable cursor.
*/

/**
    One demuxed, still-compressed unit of a single elementary stream.

    Some decoders consume only part of a packet per call, so the packet
    carries a cursor: [`Packet::data`] is the unconsumed remainder and
    [`Packet::advance`] moves past bytes the decoder has taken.
*/
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Packet {
    /// Index of the container stream this packet belongs to.
    pub stream_index: usize,
    /// Presentation timestamp in stream time base units.
    pub pts: Option<i64>,
    /// Decode timestamp in stream time base units.
    pub dts: Option<i64>,
    /// Whether the packet starts a keyframe.
    pub is_keyframe: bool,
    data: Vec<u8>,
    cursor: usize,
}

impl Packet {
    pub fn new(stream_index: usize, data: Vec<u8>) -> Self {
        Self {
            stream_index,
            pts: None,
            dts: None,
            is_keyframe: false,
            data,
            cursor: 0,
        }
    }

    pub fn with_timestamps(mut self, pts: Option<i64>, dts: Option<i64>) -> Self {
        self.pts = pts;
        self.dts = dts;
        self
    }

    pub fn with_keyframe(mut self, is_keyframe: bool) -> Self {
        self.is_keyframe = is_keyframe;
        self
    }

    /**
        The bytes not yet consumed by a decoder.
    */
    pub fn data(&self) -> &[u8] {
        &self.data[self.cursor..]
    }

    /**
        Number of bytes not yet consumed.
    */
    pub fn remaining(&self) -> usize {
        self.data.len() - self.cursor
    }

    /**
        Size of the packet as read from the container.
    */
    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn is_consumed(&self) -> bool {
        self.remaining() == 0
    }

    /**
        Mark `count` bytes as consumed, clamped to what remains.

        Returns the number of bytes actually consumed. Decoders may report
        over-reading the packet; clamping keeps the remainder from going
        negative.
    */
    pub fn advance(&mut self, count: usize) -> usize {
        let taken = count.min(self.remaining());
        self.cursor += taken;
        taken
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_moves_cursor() {
        let mut packet = Packet::new(0, vec![1, 2, 3, 4, 5]);
        assert_eq!(packet.advance(2), 2);
        assert_eq!(packet.data(), &[3, 4, 5]);
        assert_eq!(packet.remaining(), 3);
        assert_eq!(packet.size(), 5);
    }

    #[test]
    fn advance_clamps_over_read() {
        let mut packet = Packet::new(1, vec![0; 4]);
        packet.advance(1);
        assert_eq!(packet.advance(100), 3);
        assert!(packet.is_consumed());
        assert!(packet.data().is_empty());
    }
}
