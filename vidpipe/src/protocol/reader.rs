/*!
    Record parsing, for consumers of the record stream.
*/

use std::io::{ErrorKind, Read};

use super::{
    AUDIO_HEADER_LEN, AUDIO_TAG, AudioHeader, ProtocolError, Record, VIDEO_HEADER_LEN, VIDEO_TAG,
    VideoHeader,
};

/**
    Reads records from a byte source until it is exhausted.

    A source that ends between records is a clean end of stream. A source
    that ends inside a record is [`ProtocolError::Truncated`]. An unknown
    tag stops the reader; there is no attempt to resynchronize.
*/
pub struct RecordReader<R: Read> {
    source: R,
    records: u64,
}

impl<R: Read> RecordReader<R> {
    pub fn new(source: R) -> Self {
        Self { source, records: 0 }
    }

    /**
        Number of records read so far.
    */
    pub fn records_read(&self) -> u64 {
        self.records
    }

    /**
        Read the next record, or `None` at a clean end of stream.
    */
    pub fn read_record(&mut self) -> Result<Option<Record>, ProtocolError> {
        let mut prefix = [0u8; 8];
        match self.fill(&mut prefix)? {
            0 => return Ok(None),
            8 => {}
            got => return Err(ProtocolError::Truncated { needed: 8 - got }),
        }

        let length = u32::from_le_bytes([prefix[0], prefix[1], prefix[2], prefix[3]]);
        let tag = u32::from_le_bytes([prefix[4], prefix[5], prefix[6], prefix[7]]);

        let minimum = match tag {
            VIDEO_TAG => VIDEO_HEADER_LEN,
            AUDIO_TAG => AUDIO_HEADER_LEN,
            tag => return Err(ProtocolError::UnknownTag { tag }),
        };
        if (length as usize) < minimum {
            return Err(ProtocolError::LengthTooSmall { length, minimum });
        }

        // Grow with the data actually read; the length field is untrusted
        let body_len = length as usize - 8;
        let mut body = Vec::new();
        (&mut self.source)
            .take(body_len as u64)
            .read_to_end(&mut body)?;
        if body.len() < body_len {
            return Err(ProtocolError::Truncated {
                needed: body_len - body.len(),
            });
        }

        let fields_len = minimum - 8;
        let payload = body.split_off(fields_len);
        let record = if tag == VIDEO_TAG {
            let mut fields = [0u8; VIDEO_HEADER_LEN - 8];
            fields.copy_from_slice(&body);
            let header = VideoHeader::decode(&fields);
            header.check_payload(payload.len())?;
            Record::Video { header, payload }
        } else {
            let mut fields = [0u8; AUDIO_HEADER_LEN - 8];
            fields.copy_from_slice(&body);
            let header = AudioHeader::decode(&fields);
            header.check_payload(payload.len())?;
            Record::Audio { header, payload }
        };

        self.records += 1;
        Ok(Some(record))
    }

    /**
        Read until `buf` is full or the source ends. Returns bytes read.
    */
    fn fill(&mut self, buf: &mut [u8]) -> Result<usize, ProtocolError> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.source.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(filled)
    }
}

impl<R: Read> Iterator for RecordReader<R> {
    type Item = Result<Record, ProtocolError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_record().transpose()
    }
}
