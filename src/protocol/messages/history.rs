//! Temperature history query
//!
//! The gateway acknowledges a history query with an empty frame and then
//! pushes the samples in a separate [`MessageCode::HistoryData`] frame.

use bytes::Bytes;
use chrono::NaiveDateTime;

use super::config::count;
use crate::protocol::codec::DATE_TIME_SIZE;
use crate::protocol::message::{empty_response, expect_code};
use crate::protocol::{Decoder, Encoder, FrameHeader, MessageCode, Request, Response, Result};

/// Encoded size of one sample: date-time plus a `u32` temperature
const SAMPLE_SIZE: usize = DATE_TIME_SIZE + 4;

/// Sample lists of unknown meaning between the pool water series and the timestamp list
const LEADING_OPAQUE_LISTS: usize = 3;

/// Sample lists of unknown meaning after the timestamp list
const TRAILING_OPAQUE_LISTS: usize = 4;

/// Ask for the samples recorded between `start` and `end`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryRequest {
    /// Controller index, normally 0
    pub controller_index: u32,
    /// Range start
    pub start: NaiveDateTime,
    /// Range end
    pub end: NaiveDateTime,
    /// Sender id, unused by the gateway
    pub sender_id: u32,
}

impl Request for HistoryRequest {
    const CODE: MessageCode = MessageCode::History;

    fn encode_body(&self, encoder: &mut Encoder) -> Result<()> {
        encoder.put_u32(self.controller_index);
        encoder.put_date_time(&self.start)?;
        encoder.put_date_time(&self.end)?;
        encoder.put_u32(self.sender_id);
        Ok(())
    }
}

empty_response!(
    /// History query acknowledgement (no body)
    HistoryResponse => MessageCode::HistoryResponse
);

/// One recorded temperature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HistorySample {
    /// When the sample was taken, controller local time
    pub timestamp: NaiveDateTime,
    /// Temperature in the controller's unit
    pub temperature: u32,
}

/// Pushed history samples
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HistoryData {
    /// Outside air temperature series
    pub outside_air: Vec<HistorySample>,
    /// Pool water temperature series
    pub pool_water: Vec<HistorySample>,
}

impl Response for HistoryData {
    const CODE: MessageCode = MessageCode::HistoryData;

    fn decode(header: &FrameHeader, body: &[u8]) -> Result<Self> {
        expect_code(header, Self::CODE)?;
        let mut dec = Decoder::new(body);

        let outside_air = read_samples(&mut dec)?;
        let pool_water = read_samples(&mut dec)?;

        for _ in 0..LEADING_OPAQUE_LISTS {
            skip_list(&mut dec, SAMPLE_SIZE)?;
        }
        // timestamp list: the count only precedes the first half
        let stamps = dec.read_u32()? as usize;
        dec.skip(stamps.saturating_mul(2 * DATE_TIME_SIZE))?;
        for _ in 0..TRAILING_OPAQUE_LISTS {
            skip_list(&mut dec, SAMPLE_SIZE)?;
        }

        Ok(Self {
            outside_air,
            pool_water,
        })
    }
}

fn read_samples(dec: &mut Decoder<'_>) -> Result<Vec<HistorySample>> {
    let n = dec.read_u32()?;
    let mut samples = Vec::new();
    for _ in 0..n {
        samples.push(HistorySample {
            timestamp: dec.read_date_time()?,
            temperature: dec.read_u32()?,
        });
    }
    Ok(samples)
}

fn skip_list(dec: &mut Decoder<'_>, record_size: usize) -> Result<()> {
    let n = dec.read_u32()? as usize;
    dec.skip(n.saturating_mul(record_size))
}

impl HistoryData {
    /// Encode into the wire layout with every opaque list empty (used by test gateways)
    pub fn encode(&self) -> Result<Bytes> {
        let mut enc = Encoder::new();
        for series in [&self.outside_air, &self.pool_water] {
            enc.put_u32(count(series.len())?);
            for sample in series {
                enc.put_date_time(&sample.timestamp)?;
                enc.put_u32(sample.temperature);
            }
        }
        for _ in 0..LEADING_OPAQUE_LISTS + 1 + TRAILING_OPAQUE_LISTS {
            enc.put_u32(0);
        }
        Ok(enc.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use chrono::NaiveDate;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 7, 4)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn decode(body: &[u8]) -> Result<HistoryData> {
        HistoryData::decode(&FrameHeader::new(0, 12502, 0), body)
    }

    #[test]
    fn test_request_layout() {
        let req = HistoryRequest {
            controller_index: 0,
            start: at(8),
            end: at(20),
            sender_id: 0,
        };
        let (code, body) = req.encode().unwrap();
        assert_eq!(code, 12534);
        assert_eq!(body.len(), 4 + 2 * DATE_TIME_SIZE + 4);

        let mut dec = Decoder::new(&body);
        dec.skip(4).unwrap();
        assert_eq!(dec.read_date_time().unwrap(), at(8));
        assert_eq!(dec.read_date_time().unwrap(), at(20));
    }

    #[test]
    fn test_ack_is_empty() {
        assert!(HistoryResponse::decode(&FrameHeader::new(3, 12535, 0), &[]).is_ok());
    }

    #[test]
    fn test_decode_series() {
        let data = HistoryData {
            outside_air: vec![
                HistorySample {
                    timestamp: at(9),
                    temperature: 70,
                },
                HistorySample {
                    timestamp: at(10),
                    temperature: 72,
                },
            ],
            pool_water: vec![HistorySample {
                timestamp: at(9),
                temperature: 81,
            }],
        };
        assert_eq!(decode(&data.encode().unwrap()).unwrap(), data);
    }

    #[test]
    fn test_opaque_lists_consumed() {
        let mut enc = Encoder::new();
        enc.put_u32(0);
        enc.put_u32(0);
        // one record in the first opaque sample list
        enc.put_u32(1);
        enc.put_date_time(&at(1)).unwrap();
        enc.put_u32(99);
        enc.put_u32(0);
        enc.put_u32(0);
        // two paired timestamps
        enc.put_u32(2);
        for hour in [1, 2, 3, 4] {
            enc.put_date_time(&at(hour)).unwrap();
        }
        for _ in 0..4 {
            enc.put_u32(0);
        }
        let body = enc.finish();

        let data = decode(&body).unwrap();
        assert!(data.outside_air.is_empty());
        assert!(data.pool_water.is_empty());

        // dropping the final count must be noticed
        assert!(matches!(
            decode(&body[..body.len() - 4]),
            Err(Error::Truncated { .. })
        ));
    }

    #[test]
    fn test_huge_opaque_count_is_truncated() {
        let mut enc = Encoder::new();
        enc.put_u32(0);
        enc.put_u32(0);
        enc.put_u32(u32::MAX);
        assert!(matches!(
            decode(&enc.finish()),
            Err(Error::Truncated { .. })
        ));
    }
}
